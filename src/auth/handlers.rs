use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::session::{self, LoginResponse};
use crate::config::Config;
use crate::error::ApiError;
use crate::store::DocStore;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogoutQuery {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(store, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginRequest>,
    store: web::Data<DocStore>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("email and password are required").into());
    }

    let response = session::login(
        store.get_ref(),
        payload.email.trim(),
        &payload.password,
        config.session_ttl_secs,
    )
    .await?;

    info!("login successful");
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    params(LogoutQuery),
    responses(
        (status = 200, description = "Session dropped, whether or not it existed")
    ),
    tag = "Auth"
)]
pub async fn logout(
    query: web::Query<LogoutQuery>,
    store: web::Data<DocStore>,
) -> actix_web::Result<impl Responder> {
    session::logout(store.get_ref(), &query.token).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
