use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password;
use crate::error::ApiError;
use crate::model::collections;
use crate::model::session::Session;
use crate::model::user::{User, UserRole};
use crate::store::{DocStore, Filter};

const TOKEN_BYTES: usize = 24;

/// Opaque bearer token: hex of 24 bytes from the OS RNG.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: UserRole,
    pub name: String,
    pub user_id: String,
}

/// Validate credentials and open a session. Unknown email and wrong password
/// are indistinguishable to the caller.
pub async fn login(
    store: &DocStore,
    email: &str,
    password: &str,
    ttl_secs: i64,
) -> Result<LoginResponse, ApiError> {
    let doc = store
        .find_one(collections::USER, &Filter::new().eq("email", email))
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    let user: User = doc.parse()?;

    if !password::verify_password(password, &user.password_hash) {
        return Err(ApiError::Unauthenticated);
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);
    store
        .insert(
            collections::SESSION,
            &Session {
                user_id: doc.id.clone(),
                token: token.clone(),
                expires_at,
            },
        )
        .await?;

    Ok(LoginResponse {
        token,
        role: user.role,
        name: user.name,
        user_id: doc.id,
    })
}

/// Drop any session holding the token. Succeeds even when none existed.
pub async fn logout(store: &DocStore, token: &str) -> Result<(), ApiError> {
    store
        .delete_many(collections::SESSION, &Filter::new().eq("token", token))
        .await?;
    Ok(())
}

/// Resolve a bearer token back to its user. A session past its expiry reads
/// as absent and is removed on the way out.
pub async fn resolve_token(store: &DocStore, token: &str) -> Result<Option<AuthUser>, ApiError> {
    let filter = Filter::new().eq("token", token);
    let Some(session_doc) = store.find_one(collections::SESSION, &filter).await? else {
        return Ok(None);
    };
    let session: Session = session_doc.parse()?;

    if session.expires_at <= Utc::now() {
        store.delete_many(collections::SESSION, &filter).await?;
        return Ok(None);
    }

    let Some(user_doc) = store.get(collections::USER, &session.user_id).await? else {
        return Ok(None);
    };
    let user: User = user_doc.parse()?;

    Ok(Some(AuthUser {
        user_id: user_doc.id,
        name: user.name,
        role: user.role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    const WEEK_SECS: i64 = 7 * 24 * 3600;

    async fn seed_user(store: &DocStore, email: &str, password: &str, role: UserRole) -> String {
        store
            .insert(
                collections::USER,
                &User {
                    name: "Ada Lovelace".to_string(),
                    email: email.to_string(),
                    role,
                    password_hash: password::hash_password(password),
                    is_active: true,
                },
            )
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn login_then_resolve_returns_the_same_user() {
        let store = db::open_in_memory().await;
        let user_id = seed_user(&store, "ada@example.com", "s3cret", UserRole::Superadmin).await;

        let login = login(&store, "ada@example.com", "s3cret", WEEK_SECS)
            .await
            .unwrap();
        assert_eq!(login.user_id, user_id);
        assert_eq!(login.role, UserRole::Superadmin);
        assert_eq!(login.name, "Ada Lovelace");
        assert_eq!(login.token.len(), TOKEN_BYTES * 2);

        let resolved = resolve_token(&store, &login.token).await.unwrap().unwrap();
        assert_eq!(resolved.user_id, user_id);
        assert_eq!(resolved.role, UserRole::Superadmin);
    }

    #[actix_web::test]
    async fn unknown_email_is_unauthenticated() {
        let store = db::open_in_memory().await;
        let err = login(&store, "nobody@example.com", "s3cret", WEEK_SECS)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthenticated() {
        let store = db::open_in_memory().await;
        seed_user(&store, "ada@example.com", "s3cret", UserRole::Employee).await;
        let err = login(&store, "ada@example.com", "wrong", WEEK_SECS)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[actix_web::test]
    async fn logout_invalidates_the_token_and_tolerates_unknown_tokens() {
        let store = db::open_in_memory().await;
        seed_user(&store, "ada@example.com", "s3cret", UserRole::Employee).await;
        let login = login(&store, "ada@example.com", "s3cret", WEEK_SECS)
            .await
            .unwrap();

        logout(&store, &login.token).await.unwrap();
        assert!(resolve_token(&store, &login.token).await.unwrap().is_none());

        // a second logout with the same (now unknown) token still succeeds
        logout(&store, &login.token).await.unwrap();
    }

    #[actix_web::test]
    async fn expired_session_resolves_to_none() {
        let store = db::open_in_memory().await;
        seed_user(&store, "ada@example.com", "s3cret", UserRole::Employee).await;
        let login = login(&store, "ada@example.com", "s3cret", -60).await.unwrap();

        assert!(resolve_token(&store, &login.token).await.unwrap().is_none());
        // the expired session record is gone as well
        assert!(
            store
                .find_one(collections::SESSION, &Filter::new().eq("token", login.token.as_str()))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn session_for_a_deleted_user_resolves_to_none() {
        let store = db::open_in_memory().await;
        seed_user(&store, "ada@example.com", "s3cret", UserRole::Employee).await;
        let login = login(&store, "ada@example.com", "s3cret", WEEK_SECS)
            .await
            .unwrap();

        store
            .delete_many(
                collections::USER,
                &Filter::new().eq("email", "ada@example.com"),
            )
            .await
            .unwrap();
        assert!(resolve_token(&store, &login.token).await.unwrap().is_none());
    }
}
