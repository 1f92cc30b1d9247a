use log::info;
use mongodb::bson::doc;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::auth::{AuthToken, LoginRequest, LoginResponse, Rights},
        db::user::User,
        mongodb::Coll,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![login]
}

#[post("/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    credentials: Json<LoginRequest>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>> {
    let with_email = doc! {
        "email": credentials.email.trim(),
    };

    let user = users
        .find_one(with_email, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::unauthorized("No user found with the provided email and password combination.")
        })?;

    info!("{} signed in as {}", user.email, Rights::from(user.role));
    let token = AuthToken::new(&user).encode(config)?;
    Ok(Json(LoginResponse { token }))
}
