use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankDetails {
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub bank_name: Option<String>,
    pub branch: Option<String>,
}

/// Statutory account identifiers (PF, UAN, ESI, PAN).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatutoryAccounts {
    pub pf_number: Option<String>,
    pub uan: Option<String>,
    pub esi_number: Option<String>,
    pub pan: Option<String>,
}

/// Monthly salary components. Missing components read as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SalaryStructure {
    pub basic: f64,
    pub hra: f64,
    pub special_allowance: f64,
    pub other_earnings: f64,
    pub deductions: f64,
}

/// Employee profile, 1:1 with a user. Everything beyond the user reference is
/// filled in later through partial updates.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Employee {
    pub user_id: String,
    pub department_id: Option<String>,
    pub designation: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub work_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub bank: Option<BankDetails>,
    pub statutory: Option<StatutoryAccounts>,
    pub salary: Option<SalaryStructure>,
}

impl Employee {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_owned(),
            ..Self::default()
        }
    }
}
