use crate::api::admin::{CreateUserRequest, DepartmentRequest};
use crate::api::attendance::AttendanceRequest;
use crate::api::employee::EmployeeUpdate;
use crate::api::leave_request::LeaveCreateRequest;
use crate::api::payroll::{PayslipGenerateRequest, PayslipSummary};
use crate::auth::handlers::LoginRequest;
use crate::auth::session::LoginResponse;
use crate::model::attendance::AttendanceStatus;
use crate::model::employee::{BankDetails, SalaryStructure, StatutoryAccounts};
use crate::model::leave_request::LeaveType;
use crate::model::payroll::PayrollItem;
use crate::model::user::UserRole;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

Backend for core HR operations, persisted in a schema-flexible document store.

### 🔹 Key Features
- **Users & Departments**
  - Superadmin-managed accounts and a flat department directory
- **Employee Profiles**
  - Lazily created profiles with bank, statutory and salary details
- **Attendance & Leave**
  - Daily attendance records, leave applications with approve/reject
- **Payroll**
  - Payslip generation from the stored salary structure

### 🔐 Security
Login issues an opaque bearer token with a 7-day lifetime; protected
endpoints resolve it against the session collection. Admin routes require
the **superadmin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::admin::create_user,
        crate::api::admin::list_users,
        crate::api::admin::create_department,
        crate::api::admin::list_departments,

        crate::api::employee::update_employee,
        crate::api::employee::get_employee,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::apply_leave,
        crate::api::leave_request::list_leaves,
        crate::api::leave_request::approve_leave,

        crate::api::payroll::generate_payslip,
        crate::api::payroll::list_payslips
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserRole,
            CreateUserRequest,
            DepartmentRequest,
            EmployeeUpdate,
            BankDetails,
            StatutoryAccounts,
            SalaryStructure,
            AttendanceRequest,
            AttendanceStatus,
            LeaveCreateRequest,
            LeaveType,
            PayslipGenerateRequest,
            PayslipSummary,
            PayrollItem
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Session management APIs"),
        (name = "Admin", description = "User and department directory APIs"),
        (name = "Employee", description = "Employee profile APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}
