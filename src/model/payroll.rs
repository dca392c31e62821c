use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::employee::SalaryStructure;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayslipStatus {
    Generated,
    Processed,
    Paid,
}

/// Generated payroll record for one user/month/year. Immutable once stored;
/// regenerating the same month produces a second record.
#[derive(Debug, Serialize, Deserialize)]
pub struct Payslip {
    pub user_id: String,
    pub month: u32,
    pub year: i32,
    pub earnings: Vec<PayrollItem>,
    pub deductions: Vec<PayrollItem>,
    pub gross: f64,
    pub net: f64,
    pub generated_by: Option<String>,
    pub status: PayslipStatus,
}

impl Payslip {
    /// Expand a salary structure into labelled earning/deduction line items
    /// with gross and net totals.
    pub fn compute(
        user_id: &str,
        month: u32,
        year: i32,
        salary: &SalaryStructure,
        generated_by: Option<String>,
    ) -> Self {
        let gross = salary.basic + salary.hra + salary.special_allowance + salary.other_earnings;
        let net = gross - salary.deductions;
        Payslip {
            user_id: user_id.to_owned(),
            month,
            year,
            earnings: vec![
                PayrollItem {
                    label: "Basic".to_string(),
                    amount: salary.basic,
                },
                PayrollItem {
                    label: "HRA".to_string(),
                    amount: salary.hra,
                },
                PayrollItem {
                    label: "Special Allowance".to_string(),
                    amount: salary.special_allowance,
                },
                PayrollItem {
                    label: "Other Earnings".to_string(),
                    amount: salary.other_earnings,
                },
            ],
            deductions: vec![PayrollItem {
                label: "Deductions".to_string(),
                amount: salary.deductions,
            }],
            gross,
            net,
            generated_by,
            status: PayslipStatus::Generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_sums_earnings_and_subtracts_deductions() {
        let salary = SalaryStructure {
            basic: 30000.0,
            hra: 12000.0,
            special_allowance: 5000.0,
            other_earnings: 0.0,
            deductions: 3000.0,
        };
        let slip = Payslip::compute("user-1", 2, 2024, &salary, None);

        assert_eq!(slip.gross, 47000.0);
        assert_eq!(slip.net, 44000.0);
        assert_eq!(slip.earnings.len(), 4);
        assert_eq!(slip.deductions.len(), 1);
        assert_eq!(slip.status, PayslipStatus::Generated);

        let labels: Vec<_> = slip.earnings.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Basic", "HRA", "Special Allowance", "Other Earnings"]);
    }

    #[test]
    fn compute_with_zeroed_structure_yields_zero_totals() {
        let slip = Payslip::compute("user-1", 6, 2025, &SalaryStructure::default(), None);
        assert_eq!(slip.gross, 0.0);
        assert_eq!(slip.net, 0.0);
        assert_eq!(slip.earnings.len(), 4);
    }
}
