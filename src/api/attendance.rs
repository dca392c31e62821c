use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::collections;
use crate::store::{DocStore, Document, Filter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    #[schema(example = "2024-02-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[schema(example = "2024-02-01T09:00:00Z", format = "date-time", value_type = Option<String>)]
    pub check_in: Option<DateTime<Utc>>,
    #[schema(example = "2024-02-01T18:00:00Z", format = "date-time", value_type = Option<String>)]
    pub check_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Half-open date range covering one calendar month, with December rolling
/// into January of the next year.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let bad_month = || ApiError::validation("month must be between 1 and 12");
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad_month)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(bad_month)?;
    Ok((start, end))
}

/// Always inserts; a second record for the same date is accepted.
pub async fn insert_attendance(
    store: &DocStore,
    user_id: &str,
    req: AttendanceRequest,
) -> Result<(), ApiError> {
    let record = Attendance {
        user_id: user_id.to_owned(),
        date: req.date,
        status: req.status,
        check_in: req.check_in,
        check_out: req.check_out,
    };
    store.insert(collections::ATTENDANCE, &record).await?;
    Ok(())
}

pub async fn fetch_attendance(
    store: &DocStore,
    user_id: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Vec<Value>, ApiError> {
    let mut filter = Filter::new().eq("user_id", user_id);
    if let (Some(month), Some(year)) = (month, year) {
        let (start, end) = month_range(year, month)?;
        filter = filter.gte("date", start).lt("date", end);
    }
    Ok(store
        .find(collections::ATTENDANCE, &filter)
        .await?
        .into_iter()
        .map(Document::into_json)
        .collect())
}

#[utoipa::path(
    post,
    path = "/attendance/{user_id}",
    params(("user_id", Path, description = "User the attendance belongs to")),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = Object, example = json!({"success": true})),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    insert_attendance(store.get_ref(), &user_id, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/attendance/{user_id}",
    params(
        ("user_id", Path, description = "User the attendance belongs to"),
        AttendanceQuery
    ),
    responses(
        (status = 200, description = "Attendance records, optionally filtered to one month"),
        (status = 400, description = "Month outside 1-12"),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    _auth: AuthUser,
    store: web::Data<DocStore>,
    path: web::Path<String>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    let records = fetch_attendance(store.get_ref(), &user_id, query.month, query.year).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn on(date: &str) -> AttendanceRequest {
        AttendanceRequest {
            date: date.parse().unwrap(),
            status: AttendanceStatus::Present,
            check_in: None,
            check_out: None,
        }
    }

    #[test]
    fn month_range_covers_the_calendar_month() {
        let (start, end) = month_range(2024, 2).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let (start, end) = month_range(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn month_outside_range_is_rejected() {
        assert!(matches!(
            month_range(2024, 0),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            month_range(2024, 13),
            Err(ApiError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn month_filter_keeps_only_that_month() {
        let store = db::open_in_memory().await;
        for day in ["2024-01-31", "2024-02-01", "2024-02-29", "2024-03-01"] {
            insert_attendance(&store, "user-1", on(day)).await.unwrap();
        }
        // someone else's February is invisible
        insert_attendance(&store, "user-2", on("2024-02-10"))
            .await
            .unwrap();

        let records = fetch_attendance(&store, "user-1", Some(2), Some(2024))
            .await
            .unwrap();
        let days: Vec<_> = records.iter().map(|r| r["date"].as_str().unwrap()).collect();
        assert_eq!(days, ["2024-02-01", "2024-02-29"]);
    }

    #[actix_web::test]
    async fn december_filter_excludes_january() {
        let store = db::open_in_memory().await;
        insert_attendance(&store, "user-1", on("2024-12-15"))
            .await
            .unwrap();
        insert_attendance(&store, "user-1", on("2025-01-01"))
            .await
            .unwrap();

        let records = fetch_attendance(&store, "user-1", Some(12), Some(2024))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["date"], json!("2024-12-15"));
    }

    #[actix_web::test]
    async fn without_month_and_year_everything_returns() {
        let store = db::open_in_memory().await;
        insert_attendance(&store, "user-1", on("2024-02-01"))
            .await
            .unwrap();
        insert_attendance(&store, "user-1", on("2024-05-01"))
            .await
            .unwrap();

        // month alone is not enough to trigger the range filter
        let records = fetch_attendance(&store, "user-1", Some(2), None).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[actix_web::test]
    async fn duplicate_dates_are_accepted() {
        let store = db::open_in_memory().await;
        insert_attendance(&store, "user-1", on("2024-02-01"))
            .await
            .unwrap();
        insert_attendance(&store, "user-1", on("2024-02-01"))
            .await
            .unwrap();

        let records = fetch_attendance(&store, "user-1", Some(2), Some(2024))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
