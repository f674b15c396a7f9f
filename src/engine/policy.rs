use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn dec(s: &str) -> BigDecimal {
    s.parse().expect("valid decimal literal")
}

/// Clock-in/out rules. `minimum_work_hours` is the full-day threshold;
/// anything short of it settles as a half day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AttendanceRules {
    pub grace_period_minutes: i64,
    pub rounding_enabled: bool,
    pub rounding_interval_minutes: i64,
    pub minimum_work_hours: i64,
}

impl Default for AttendanceRules {
    fn default() -> Self {
        Self {
            grace_period_minutes: 10,
            rounding_enabled: false,
            rounding_interval_minutes: 15,
            minimum_work_hours: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DayClassRule {
    pub enabled: bool,
    pub multiplier: BigDecimal,
    pub cap_hours: Option<BigDecimal>,
    pub minimum_payment: BigDecimal,
}

impl DayClassRule {
    fn with_multiplier(multiplier: &str) -> Self {
        Self {
            enabled: true,
            multiplier: dec(multiplier),
            cap_hours: None,
            minimum_payment: BigDecimal::from(0),
        }
    }
}

impl Default for DayClassRule {
    fn default() -> Self {
        Self::with_multiplier("1.5")
    }
}

/// Day classification and per-class pay rules. Saturday, Sunday and the
/// configured non-working weekday all settle at the weekend rate, even
/// when one of them is a working day for the company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OvertimePolicy {
    /// 0 = Sunday .. 6 = Saturday.
    pub non_working_weekday: u32,
    pub holidays: Vec<NaiveDate>,
    pub weekday: DayClassRule,
    pub weekend: DayClassRule,
    pub holiday: DayClassRule,
}

impl Default for OvertimePolicy {
    fn default() -> Self {
        Self {
            non_working_weekday: 1,
            holidays: Vec::new(),
            weekday: DayClassRule::with_multiplier("1.5"),
            weekend: DayClassRule::with_multiplier("2.0"),
            holiday: DayClassRule::with_multiplier("3.0"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LeavePolicy {
    /// When false every leave type runs in quota mode:
    /// balance = max_balance - used, nothing accrues.
    pub accrual_enabled: bool,
    /// When true, stored balance rows are authoritative and exempt
    /// from recomputation.
    pub manual_quota: bool,
    /// Month (1-12) in which carryover from the reference month lands.
    pub carryover_month: u32,
    /// Month (1-12) of the prior year whose balance seeds carryover.
    pub reference_month: u32,
    /// Weekday (0 = Sunday) excluded from leave day counting.
    pub non_working_weekday: u32,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            accrual_enabled: true,
            manual_quota: false,
            carryover_month: 1,
            reference_month: 12,
            non_working_weekday: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContributionBasis {
    /// Values are percentages of base pay.
    Percentage,
    /// Values are flat amounts per period.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContributionScheme {
    pub enabled: bool,
    pub basis: ContributionBasis,
    pub employee_value: BigDecimal,
    pub employer_value: BigDecimal,
}

impl Default for ContributionScheme {
    fn default() -> Self {
        Self {
            enabled: false,
            basis: ContributionBasis::Percentage,
            employee_value: BigDecimal::from(0),
            employer_value: BigDecimal::from(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PayrollConfig {
    pub health_insurance: ContributionScheme,
    pub employment_insurance: ContributionScheme,
    pub transport_bonus: BigDecimal,
    pub lunch_bonus: BigDecimal,
    pub holiday_bonus: BigDecimal,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            health_insurance: ContributionScheme::default(),
            employment_insurance: ContributionScheme::default(),
            transport_bonus: BigDecimal::from(0),
            lunch_bonus: BigDecimal::from(0),
            holiday_bonus: BigDecimal::from(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let policy: OvertimePolicy =
            serde_json::from_str(r#"{"weekday":{"multiplier":"1.25"}}"#).unwrap();
        assert_eq!(policy.weekday.multiplier, dec("1.25"));
        assert!(policy.weekday.enabled);
        assert_eq!(policy.weekend, DayClassRule::with_multiplier("2.0"));
        assert_eq!(policy.non_working_weekday, 1);
    }

    #[test]
    fn empty_payroll_config_is_default() {
        let config: PayrollConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PayrollConfig::default());
        assert!(!config.health_insurance.enabled);
    }
}
