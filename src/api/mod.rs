use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

mod auth;
mod elections;
mod reports;

/// Routes mounted under `/api`.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(elections::routes());
    routes
}

/// Routes mounted under `/api/reports`.
pub fn report_routes() -> Vec<Route> {
    reports::routes()
}

/// JSON bodies for failures that never reach a handler, such as rejected
/// request guards or unparseable request bodies.
pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Json<ErrorBody> {
    let reason = status.reason().unwrap_or("Unknown error");
    let message = match status.code {
        401 => "Authentication required",
        403 => "Administrator rights required",
        404 => "Not found",
        422 => "Malformed request body",
        _ => reason,
    };
    Json(ErrorBody {
        message: message.to_string(),
        error: format!("{} {} failed: {reason}", req.method(), req.uri()),
    })
}
