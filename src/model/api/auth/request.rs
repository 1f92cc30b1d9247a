use serde::{Deserialize, Serialize};

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A successful login: the bearer token to send with later requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::db::user::{NewUser, EXAMPLE_ADMIN_PASSWORD};

    impl LoginRequest {
        pub fn admin_example() -> Self {
            Self {
                email: NewUser::admin_example().email,
                password: EXAMPLE_ADMIN_PASSWORD.to_string(),
            }
        }
    }
}
