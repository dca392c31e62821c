use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::collections;
use crate::model::employee::Employee;
use crate::model::payroll::Payslip;
use crate::store::{DocStore, Document, Filter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayslipGenerateRequest {
    #[schema(example = 2)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayslipSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub gross: f64,
    pub net: f64,
}

/// Expand the employee's salary structure into a payslip and persist it.
/// Nothing stops a second slip for the same month.
pub async fn create_payslip(
    store: &DocStore,
    user_id: &str,
    month: u32,
    year: i32,
    generated_by: Option<String>,
) -> Result<PayslipSummary, ApiError> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::validation("month must be between 1 and 12"));
    }

    let salary = store
        .find_one(collections::EMPLOYEE, &Filter::new().eq("user_id", user_id))
        .await?
        .map(|doc| doc.parse::<Employee>())
        .transpose()?
        .and_then(|employee| employee.salary)
        .ok_or_else(|| ApiError::invalid_state("salary structure not defined"))?;

    let slip = Payslip::compute(user_id, month, year, &salary, generated_by);
    let id = store.insert(collections::PAYROLL, &slip).await?;

    Ok(PayslipSummary {
        id,
        gross: slip.gross,
        net: slip.net,
    })
}

pub async fn fetch_payslips(store: &DocStore, user_id: &str) -> Result<Vec<Value>, ApiError> {
    Ok(store
        .find(collections::PAYROLL, &Filter::new().eq("user_id", user_id))
        .await?
        .into_iter()
        .map(Document::into_json)
        .collect())
}

#[utoipa::path(
    post,
    path = "/payroll/generate/{user_id}",
    params(("user_id", Path, description = "User to generate the payslip for")),
    request_body = PayslipGenerateRequest,
    responses(
        (status = 200, description = "Payslip generated", body = PayslipSummary),
        (status = 400, description = "No salary structure, or month outside 1-12"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payslip(
    auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    payload: web::Json<PayslipGenerateRequest>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let summary = create_payslip(
        store.get_ref(),
        &user_id,
        payload.month,
        payload.year,
        Some(auth.user_id),
    )
    .await?;

    info!(user_id = %user_id, month = payload.month, year = payload.year, "payslip generated");
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/payroll/{user_id}",
    params(("user_id", Path, description = "User whose payslips to list")),
    responses(
        (status = 200, description = "Payslips"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payslips(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let slips = fetch_payslips(store.get_ref(), &user_id).await?;
    Ok(HttpResponse::Ok().json(slips))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::employee::{EmployeeUpdate, upsert_employee};
    use crate::db;
    use crate::model::employee::SalaryStructure;
    use serde_json::json;

    async fn seed_salary(store: &DocStore, user_id: &str) {
        upsert_employee(
            store,
            user_id,
            EmployeeUpdate {
                salary: Some(SalaryStructure {
                    basic: 30000.0,
                    hra: 12000.0,
                    special_allowance: 5000.0,
                    other_earnings: 0.0,
                    deductions: 3000.0,
                }),
                ..EmployeeUpdate::default()
            },
        )
        .await
        .unwrap();
    }

    #[actix_web::test]
    async fn payslip_totals_follow_the_salary_structure() {
        let store = db::open_in_memory().await;
        seed_salary(&store, "user-1").await;

        let summary = create_payslip(&store, "user-1", 2, 2024, None).await.unwrap();
        assert_eq!(summary.gross, 47000.0);
        assert_eq!(summary.net, 44000.0);

        let slips = fetch_payslips(&store, "user-1").await.unwrap();
        assert_eq!(slips.len(), 1);
        assert_eq!(slips[0]["_id"], json!(summary.id));
        assert_eq!(slips[0]["status"], json!("generated"));
        assert_eq!(slips[0]["earnings"].as_array().unwrap().len(), 4);
        assert_eq!(slips[0]["deductions"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn missing_profile_is_an_invalid_state() {
        let store = db::open_in_memory().await;
        let err = create_payslip(&store, "ghost", 2, 2024, None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn profile_without_salary_is_an_invalid_state() {
        let store = db::open_in_memory().await;
        upsert_employee(
            &store,
            "user-1",
            EmployeeUpdate {
                designation: Some("Engineer".to_string()),
                ..EmployeeUpdate::default()
            },
        )
        .await
        .unwrap();

        let err = create_payslip(&store, "user-1", 2, 2024, None).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn month_outside_range_is_rejected() {
        let store = db::open_in_memory().await;
        seed_salary(&store, "user-1").await;
        let err = create_payslip(&store, "user-1", 13, 2024, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn regenerating_a_month_duplicates_the_slip() {
        let store = db::open_in_memory().await;
        seed_salary(&store, "user-1").await;

        create_payslip(&store, "user-1", 2, 2024, None).await.unwrap();
        create_payslip(&store, "user-1", 2, 2024, None).await.unwrap();

        assert_eq!(fetch_payslips(&store, "user-1").await.unwrap().len(), 2);
    }
}
