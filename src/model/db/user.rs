use std::ops::Deref;

use argon2::Config as Argon2Config;
use log::{info, warn};
use mongodb::bson::doc;
use rand::Rng;
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::mongodb::{is_duplicate_key_error, Coll, Id},
    Config,
};

/// What a user is allowed to do.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Voter,
}

/// Core user data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCore {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Argon2 encoded password hash.
    #[serde(default, alias = "password")]
    pub password_hash: String,
}

impl UserCore {
    /// Create a user, hashing their password.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        password: &str,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            password_hash: hash_password(password),
        }
    }

    /// Check whether the given password is correct.
    /// Hashes we cannot parse never match.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// Hash a password with a fresh random salt.
fn hash_password(password: &str) -> String {
    // 16 bytes is the recommended salt length for Argon2.
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill(&mut salt);
    argon2::hash_encoded(password.as_bytes(), &salt, &Argon2Config::default())
        .expect("The default Argon2 config is valid")
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// Create the configured admin account if there are no admins at all,
/// so a fresh deployment can be signed into.
pub async fn ensure_admin_exists(users: &Coll<NewUser>, config: &Config) -> Result<()> {
    let admins = users
        .count_documents(doc! { "role": "admin" }, None)
        .await?;
    if admins > 0 {
        return Ok(());
    }

    if config.admin_password().is_empty() {
        return Err(Error::Status(
            Status::InternalServerError,
            "No admin user exists and `admin_password` is empty".to_string(),
        ));
    }
    let admin = NewUser::new(
        "Administrator",
        config.admin_email(),
        Role::Admin,
        config.admin_password(),
    );
    match users.insert_one(&admin, None).await {
        Ok(_) => {
            info!("Created default admin {}", config.admin_email());
            Ok(())
        }
        // Another instance seeded it first.
        Err(e) if is_duplicate_key_error(&e) => {
            warn!("Default admin email {} is already taken", config.admin_email());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    pub const EXAMPLE_ADMIN_PASSWORD: &str = "returning-officer";
    pub const EXAMPLE_VOTER_PASSWORD: &str = "first-time-voter";

    impl UserCore {
        pub fn admin_example() -> Self {
            Self::new(
                "Ada Admin",
                "ada@campus.example",
                Role::Admin,
                EXAMPLE_ADMIN_PASSWORD,
            )
        }

        pub fn voter_example(n: u32) -> Self {
            Self::new(
                format!("Voter {n}"),
                format!("voter{n}@campus.example"),
                Role::Voter,
                EXAMPLE_VOTER_PASSWORD,
            )
        }
    }
}

#[cfg(test)]
pub use examples::{EXAMPLE_ADMIN_PASSWORD, EXAMPLE_VOTER_PASSWORD};
