mod request;
mod rights;
mod token;

pub use request::{LoginRequest, LoginResponse};
pub use rights::Rights;
pub use token::{AdminToken, AuthToken};
