use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::collections;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{DocStore, Document, Filter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LeaveCreateRequest {
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-03-06", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApproveQuery {
    pub approver_id: String,
    /// Defaults to "approved"; passed through to the record as supplied.
    pub status: Option<String>,
}

/// File a leave application; it always starts out `pending`. Date order and
/// overlaps with existing leave are deliberately not checked.
pub async fn insert_leave(
    store: &DocStore,
    user_id: &str,
    req: LeaveCreateRequest,
) -> Result<String, ApiError> {
    let leave = LeaveRequest {
        user_id: user_id.to_owned(),
        start_date: req.start_date,
        end_date: req.end_date,
        leave_type: req.leave_type,
        reason: req.reason,
        status: LeaveStatus::Pending,
        approver_id: None,
    };
    Ok(store.insert(collections::LEAVE_REQUEST, &leave).await?)
}

pub async fn fetch_leaves(store: &DocStore, user_id: &str) -> Result<Vec<Value>, ApiError> {
    Ok(store
        .find(
            collections::LEAVE_REQUEST,
            &Filter::new().eq("user_id", user_id),
        )
        .await?
        .into_iter()
        .map(Document::into_json)
        .collect())
}

/// Stamp a decision onto the identified application. A well-formed id that
/// matches nothing is a no-op; the status string is stored as supplied.
pub async fn apply_leave_decision(
    store: &DocStore,
    leave_id: &str,
    approver_id: &str,
    status: &str,
) -> Result<(), ApiError> {
    Uuid::parse_str(leave_id).map_err(|_| ApiError::validation("invalid id format"))?;

    let mut fields = Map::new();
    fields.insert("status".to_string(), Value::String(status.to_owned()));
    fields.insert(
        "approver_id".to_string(),
        Value::String(approver_id.to_owned()),
    );
    store
        .update_by_id(collections::LEAVE_REQUEST, leave_id, &fields)
        .await?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/leaves/{user_id}",
    params(("user_id", Path, description = "User applying for leave")),
    request_body = LeaveCreateRequest,
    responses(
        (status = 200, description = "Leave application filed", body = Object, example = json!({"_id": "..."})),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    payload: web::Json<LeaveCreateRequest>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let leave_id = insert_leave(store.get_ref(), &user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "_id": leave_id })))
}

#[utoipa::path(
    get,
    path = "/leaves/{user_id}",
    params(("user_id", Path, description = "User whose applications to list")),
    responses(
        (status = 200, description = "Leave applications"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leaves(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let leaves = fetch_leaves(store.get_ref(), &user_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    post,
    path = "/leaves/approve/{leave_id}",
    params(
        ("leave_id", Path, description = "Leave application to decide on"),
        ApproveQuery
    ),
    responses(
        (status = 200, description = "Decision stored (no-op for an unknown id)", body = Object, example = json!({"success": true})),
        (status = 400, description = "Malformed leave id"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    query: web::Query<ApproveQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_superadmin()?;

    let leave_id = path.into_inner();
    let status = query.status.as_deref().unwrap_or("approved");
    apply_leave_decision(store.get_ref(), &leave_id, &query.approver_id, status).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn march_leave() -> LeaveCreateRequest {
        LeaveCreateRequest {
            start_date: "2024-03-04".parse().unwrap(),
            end_date: "2024-03-06".parse().unwrap(),
            leave_type: LeaveType::Sick,
            reason: Some("flu".to_string()),
        }
    }

    #[actix_web::test]
    async fn applications_start_pending() {
        let store = db::open_in_memory().await;
        insert_leave(&store, "user-1", march_leave()).await.unwrap();

        let leaves = fetch_leaves(&store, "user-1").await.unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0]["status"], json!("pending"));
        assert_eq!(leaves[0]["approver_id"], json!(null));
    }

    #[actix_web::test]
    async fn decision_stamps_status_and_approver() {
        let store = db::open_in_memory().await;
        let leave_id = insert_leave(&store, "user-1", march_leave()).await.unwrap();

        apply_leave_decision(&store, &leave_id, "boss-1", "approved")
            .await
            .unwrap();

        let leaves = fetch_leaves(&store, "user-1").await.unwrap();
        assert_eq!(leaves[0]["status"], json!("approved"));
        assert_eq!(leaves[0]["approver_id"], json!("boss-1"));
    }

    #[actix_web::test]
    async fn rejection_goes_through_the_same_path() {
        let store = db::open_in_memory().await;
        let leave_id = insert_leave(&store, "user-1", march_leave()).await.unwrap();

        apply_leave_decision(&store, &leave_id, "boss-1", "rejected")
            .await
            .unwrap();

        let leaves = fetch_leaves(&store, "user-1").await.unwrap();
        assert_eq!(leaves[0]["status"], json!("rejected"));
    }

    #[actix_web::test]
    async fn unknown_id_is_a_quiet_noop() {
        let store = db::open_in_memory().await;
        apply_leave_decision(&store, &Uuid::new_v4().to_string(), "boss-1", "approved")
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn malformed_id_is_rejected() {
        let store = db::open_in_memory().await;
        let err = apply_leave_decision(&store, "not-a-uuid", "boss-1", "approved")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
