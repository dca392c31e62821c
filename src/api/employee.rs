use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::collections;
use crate::model::employee::{BankDetails, Employee, SalaryStructure, StatutoryAccounts};
use crate::store::{self, DocStore, Filter};

/// Partial update for an employee profile. Fields left out (or sent as null)
/// keep their stored values; there is no way to clear a field through this
/// endpoint.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<BankDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statutory: Option<StatutoryAccounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryStructure>,
}

/// Apply a partial update, creating the profile on first contact. Only the
/// fields present in the patch are touched.
pub async fn upsert_employee(
    store: &DocStore,
    user_id: &str,
    patch: EmployeeUpdate,
) -> Result<(), ApiError> {
    let filter = Filter::new().eq("user_id", user_id);

    if store
        .find_one(collections::EMPLOYEE, &filter)
        .await?
        .is_none()
    {
        store
            .insert(collections::EMPLOYEE, &Employee::empty(user_id))
            .await?;
    }

    let fields = store::to_object(&patch)?;
    store
        .update_one(collections::EMPLOYEE, &filter, &fields, true)
        .await?;
    Ok(())
}

pub async fn fetch_employee(store: &DocStore, user_id: &str) -> Result<Value, ApiError> {
    store
        .find_one(collections::EMPLOYEE, &Filter::new().eq("user_id", user_id))
        .await?
        .map(|doc| doc.into_json())
        .ok_or_else(|| ApiError::not_found("employee profile not found"))
}

#[utoipa::path(
    put,
    path = "/employee/{user_id}",
    params(("user_id", Path, description = "User ID the profile belongs to")),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Profile updated", body = Object, example = json!({"success": true})),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    payload: web::Json<EmployeeUpdate>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    upsert_employee(store.get_ref(), &user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/employee/{user_id}",
    params(("user_id", Path, description = "User ID the profile belongs to")),
    responses(
        (status = 200, description = "Employee profile"),
        (status = 401),
        (status = 404, description = "No profile for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let profile = fetch_employee(store.get_ref(), &user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}
