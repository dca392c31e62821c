use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password;
use crate::error::ApiError;
use crate::model::collections;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::user::{User, UserRole};
use crate::store::{DocStore, Document, Filter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    pub role: UserRole,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartmentRequest {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = "ENG")]
    pub code: String,
    pub description: Option<String>,
}

/// Insert a user; for the `employee` role also seed an empty profile
/// referencing it. The two writes are independent and not transactional.
pub async fn insert_user(store: &DocStore, req: CreateUserRequest) -> Result<String, ApiError> {
    if store
        .find_one(collections::USER, &Filter::new().eq("email", req.email.as_str()))
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("email already exists"));
    }

    let user = User {
        name: req.name,
        email: req.email,
        role: req.role,
        password_hash: password::hash_password(&req.password),
        is_active: true,
    };
    let user_id = store.insert(collections::USER, &user).await?;

    if user.role == UserRole::Employee {
        store
            .insert(collections::EMPLOYEE, &Employee::empty(&user_id))
            .await?;
    }

    Ok(user_id)
}

/// List every user, with the stored credential stripped from the wire shape.
pub async fn fetch_users(store: &DocStore) -> Result<Vec<Value>, ApiError> {
    Ok(store
        .find(collections::USER, &Filter::new())
        .await?
        .into_iter()
        .map(|doc| {
            let mut json = doc.into_json();
            if let Some(obj) = json.as_object_mut() {
                obj.remove("password_hash");
            }
            json
        })
        .collect())
}

pub async fn insert_department(
    store: &DocStore,
    req: DepartmentRequest,
) -> Result<String, ApiError> {
    let department = Department {
        name: req.name,
        code: req.code,
        description: req.description,
    };
    Ok(store.insert(collections::DEPARTMENT, &department).await?)
}

pub async fn fetch_departments(store: &DocStore) -> Result<Vec<Value>, ApiError> {
    Ok(store
        .find(collections::DEPARTMENT, &Filter::new())
        .await?
        .into_iter()
        .map(Document::into_json)
        .collect())
}

#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = Object, example = json!({"_id": "..."})),
        (status = 401),
        (status = 403),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    auth: AuthUser,
    store: web::Data<DocStore>,
    payload: web::Json<CreateUserRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_superadmin()?;

    let user_id = insert_user(store.get_ref(), payload.into_inner()).await?;
    info!(user_id = %user_id, "user created");
    Ok(HttpResponse::Ok().json(json!({ "_id": user_id })))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    auth: AuthUser,
    store: web::Data<DocStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_superadmin()?;

    let users = fetch_users(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/admin/departments",
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Department created", body = Object, example = json!({"_id": "..."})),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_department(
    auth: AuthUser,
    store: web::Data<DocStore>,
    payload: web::Json<DepartmentRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_superadmin()?;

    let department_id = insert_department(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "_id": department_id })))
}

#[utoipa::path(
    get,
    path = "/admin/departments",
    responses(
        (status = 200, description = "All departments"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_departments(
    auth: AuthUser,
    store: web::Data<DocStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_superadmin()?;

    let departments = fetch_departments(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(departments))
}
