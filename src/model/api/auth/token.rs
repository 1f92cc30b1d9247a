use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use log::debug;
use mongodb::Database;
use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        db::user::User,
        mongodb::{Coll, Id},
    },
};

use super::Rights;

/// An authentication token representing a specific user with specific rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Id,
    #[serde(rename = "rgt")]
    pub rights: Rights,
}

impl AuthToken {
    /// Create a new [`AuthToken`] for the given user, with the rights of their role.
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            rights: user.role.into(),
        }
    }

    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights == target
    }

    /// Sign this token, valid for the configured lifetime.
    pub fn encode(self, config: &Config) -> Result<String> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;
        Ok(token)
    }

    /// Verify and decode a signed token.
    pub fn decode(raw: &str, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            raw,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// Token claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

fn unauthorized(msg: &str) -> Outcome<AuthToken, Error> {
    Outcome::Failure((Status::Unauthorized, Error::unauthorized(msg)))
}

fn misconfigured(what: &str) -> Outcome<AuthToken, Error> {
    Outcome::Failure((
        Status::InternalServerError,
        Error::Status(Status::InternalServerError, format!("{what} is not managed")),
    ))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = Error;

    /// Get an [`AuthToken`] from the `Authorization: Bearer` header and check
    /// that its user still exists. The rights reflect the user's current role.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = req.rocket().state::<Config>() else {
            return misconfigured("Config");
        };
        let Some(db) = req.rocket().state::<Database>() else {
            return misconfigured("Database");
        };

        let Some(header) = req.headers().get_one("Authorization") else {
            return unauthorized("Missing bearer token");
        };
        let Some(raw) = header.strip_prefix("Bearer ") else {
            return unauthorized("Authorization header is not a bearer token");
        };

        let token = match Self::decode(raw.trim(), config) {
            Ok(token) => token,
            Err(e) => {
                debug!("Rejected bearer token: {e}");
                return unauthorized("Invalid or expired token");
            }
        };

        let user = Coll::<User>::from_db(db)
            .find_one(token.id.as_doc(), None)
            .await;
        match user {
            Ok(Some(user)) => Outcome::Success(Self::new(&user)),
            Ok(None) => unauthorized("User no longer exists"),
            Err(e) => Outcome::Failure((Status::InternalServerError, e.into())),
        }
    }
}

/// An [`AuthToken`] whose user is an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminToken(pub AuthToken);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = try_outcome!(req.guard::<AuthToken>().await);
        if token.permits(Rights::Admin) {
            Outcome::Success(Self(token))
        } else {
            Outcome::Failure((
                Status::Forbidden,
                Error::forbidden("Administrator rights required"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn tokens_round_trip() {
        let config = Config::example();
        let token = AuthToken {
            id: Id::new(),
            rights: Rights::Admin,
        };
        let raw = token.encode(&config).unwrap();
        assert_eq!(AuthToken::decode(&raw, &config).unwrap(), token);
    }

    #[test]
    fn tampered_or_expired_tokens_fail() {
        let config = Config::example();
        let token = AuthToken {
            id: Id::new(),
            rights: Rights::Voter,
        };
        let mut raw = token.encode(&config).unwrap();
        raw.push('x');
        assert!(AuthToken::decode(&raw, &config).is_err());

        let expired = Claims {
            token,
            expire_at: Utc::now() - Duration::hours(1),
        };
        let raw = jsonwebtoken::encode(
            &Header::default(),
            &expired,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap();
        assert!(AuthToken::decode(&raw, &config).is_err());
    }

    #[test]
    fn only_matching_rights_permit() {
        let token = AuthToken {
            id: Id::new(),
            rights: Rights::Voter,
        };
        assert!(token.permits(Rights::Voter));
        assert!(!token.permits(Rights::Admin));
    }
}
