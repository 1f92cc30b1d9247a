use jsonwebtoken::errors::Error as JwtError;
use log::{debug, error};
use mongodb::{bson::oid::Error as OidError, error::Error as DbError};
use rocket::{
    http::Status,
    response::{self, status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("Invalid ID: {0}")]
    OidParse(#[from] OidError),
    #[error("{1}")]
    Status(Status, String),
    /// A failure wrapped with a description of the operation that failed.
    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn not_found(what: impl AsRef<str>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.as_ref()))
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Status(Status::Unauthorized, msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Status(Status::Forbidden, msg.into())
    }

    /// The HTTP status this error should be reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Jwt(_) => Status::InternalServerError,
            Self::OidParse(_) => Status::BadRequest,
            Self::Status(status, _) => *status,
            Self::Context { source, .. } => source.status(),
        }
    }
}

/// Attach a human-readable description of the failed operation to an error.
pub trait Context<T> {
    fn context(self, message: &str) -> Result<T>;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: &str) -> Result<T> {
        self.map_err(|e| Error::Context {
            message: message.to_string(),
            source: Box::new(e.into()),
        })
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        match err {
            Error::Context { message, source } => Self {
                message: message.clone(),
                error: source.to_string(),
            },
            other => Self {
                message: other.to_string(),
                error: other.to_string(),
            },
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("Request failed: {self}");
        } else {
            debug!("Request rejected: {self}");
        }
        Custom(status, Json(ErrorBody::from(&self))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_inner_status() {
        let result: Result<()> = Err(Error::not_found("Election 1"));
        let err = result.context("Failed to fetch election").unwrap_err();
        assert_eq!(err.status(), Status::NotFound);

        let body = ErrorBody::from(&err);
        assert_eq!(body.message, "Failed to fetch election");
        assert_eq!(body.error, "Election 1 not found");
    }

    #[test]
    fn failed_reports_are_server_errors() {
        let result: Result<()> = Err(Error::Status(
            Status::InternalServerError,
            "connection pool closed".to_string(),
        ));
        let err = result.context("Failed to fetch report summary").unwrap_err();
        assert_eq!(err.status(), Status::InternalServerError);

        let body = ErrorBody::from(&err);
        assert_eq!(body.message, "Failed to fetch report summary");
        assert_eq!(body.error, "connection pool closed");
    }

    #[test]
    fn database_failures_keep_their_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store unreachable");
        let result: std::result::Result<(), DbError> = Err(DbError::from(io));
        let err = result.context("Failed to fetch report summary").unwrap_err();
        assert_eq!(err.status(), Status::InternalServerError);

        let body = ErrorBody::from(&err);
        assert_eq!(body.message, "Failed to fetch report summary");
        assert!(body.error.contains("store unreachable"), "{}", body.error);
    }

    #[test]
    fn bad_ids_are_client_errors() {
        let err: Error = "not-an-id"
            .parse::<mongodb::bson::oid::ObjectId>()
            .unwrap_err()
            .into();
        assert_eq!(err.status(), Status::BadRequest);
    }
}
