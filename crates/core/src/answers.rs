//! Questionnaire answers
//!
//! Answers arrive exactly as the visitor typed or picked them: band labels,
//! contract labels and free-text numbers. [`ResolvedInputs::resolve`] turns
//! them into calculator inputs, substituting a documented default for
//! anything empty or unusable instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Fallback values used when an answer is absent or unusable
pub mod defaults {
    /// Average revenue per attended appointment (AUD)
    pub const AVG_REVENUE_PER_APPOINTMENT: f64 = 68.49;
    /// Baseline did-not-attend rate (percent)
    pub const NO_SHOW_RATE_PERCENT: f64 = 8.0;
    /// Share of missed calls the AI receptionist recovers (percent)
    pub const AI_ROUTING_SHARE_PERCENT: f64 = 60.0;
    /// Existing monthly after-hours answering spend
    pub const AFTERHOURS_SPEND: f64 = 0.0;
    /// Monthly receptionist wage including super
    pub const MONTHLY_WAGE: f64 = 5500.0;
    /// Monthly attended appointments (3 providers x 40 patients x 22 days)
    pub const APPOINTMENTS_PER_MONTH: f64 = 2640.0;
    /// Unanswered calls per clinic per day
    pub const MISSED_CALLS_PER_DAY: f64 = 50.0;
    /// After-hours calls per clinic per day
    pub const AFTER_HOURS_CALLS_PER_DAY: f64 = 0.0;
    /// Clinics covered by one calculation
    pub const CLINIC_COUNT: u32 = 1;
}

/// Raw quiz answers as captured by the form
///
/// Field names on the wire match the quiz form. Numbers may be sent either as
/// JSON strings or JSON numbers; `null` and missing keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireAnswers {
    /// Health care providers per clinic band ("1–5", "6–10", "10+")
    #[serde(deserialize_with = "lenient_text")]
    pub providers: String,
    /// Contract label ("Flexible", "12-month contract", "24-month contract")
    #[serde(deserialize_with = "lenient_text")]
    pub preferred_pricing: String,
    /// "per-use" or "fixed"
    #[serde(deserialize_with = "lenient_text")]
    pub billing_model: String,
    /// Average daily inbound calls per clinic (validation only)
    #[serde(deserialize_with = "lenient_text")]
    pub call_volume: String,
    /// Average daily unanswered calls per clinic
    #[serde(deserialize_with = "lenient_text")]
    pub unanswered_calls: String,
    /// Average daily after-hours calls per clinic
    #[serde(deserialize_with = "lenient_text")]
    pub after_hours_calls: String,
    /// Baseline DNA rate in percent
    #[serde(deserialize_with = "lenient_text")]
    pub no_show_rate: String,
    #[serde(deserialize_with = "lenient_text")]
    pub avg_revenue_per_appointment: String,
    /// Monthly receptionist wage including super
    #[serde(deserialize_with = "lenient_text")]
    pub monthly_wage: String,
    /// Share of missed calls recovered by the AI, in percent
    #[serde(deserialize_with = "lenient_text")]
    pub ai_routing_share: String,
    /// Existing monthly after-hours answering spend
    #[serde(deserialize_with = "lenient_text")]
    pub afterhours_spend: String,
    #[serde(deserialize_with = "lenient_text")]
    pub appointments_per_month: String,
    /// Number of clinics to project across. Empty means one clinic.
    #[serde(deserialize_with = "lenient_text", skip_serializing_if = "String::is_empty")]
    pub clinic_count: String,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Health care provider headcount band, used for fixed-tier pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HcpBand {
    #[serde(rename = "1-5")]
    OneToFive,
    #[serde(rename = "6-10")]
    SixToTen,
    #[serde(rename = "10+")]
    TenPlus,
}

impl HcpBand {
    /// Band applied when the providers answer is not recognised
    pub const FALLBACK: Self = Self::TenPlus;

    /// Parse a form label. Only the exact en-dash labels shown in the quiz
    /// match; anything else, `as_key` spellings included, is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "1–5" => Some(Self::OneToFive),
            "6–10" => Some(Self::SixToTen),
            "10+" => Some(Self::TenPlus),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::OneToFive => "1-5",
            Self::SixToTen => "6-10",
            Self::TenPlus => "10+",
        }
    }

    /// Label as displayed in the quiz
    pub fn label(&self) -> &'static str {
        match self {
            Self::OneToFive => "1–5",
            Self::SixToTen => "6–10",
            Self::TenPlus => "10+",
        }
    }
}

/// Contract term selected by the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractTerm {
    #[serde(rename = "flexible")]
    Flexible,
    #[serde(rename = "12-month")]
    TwelveMonth,
    #[serde(rename = "24-month")]
    TwentyFourMonth,
}

impl ContractTerm {
    /// Term applied when the pricing answer is not recognised
    pub const FALLBACK: Self = Self::TwentyFourMonth;

    /// Exact form label only
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Flexible" => Some(Self::Flexible),
            "12-month contract" => Some(Self::TwelveMonth),
            "24-month contract" => Some(Self::TwentyFourMonth),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Flexible => "flexible",
            Self::TwelveMonth => "12-month",
            Self::TwentyFourMonth => "24-month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Flexible => "Flexible",
            Self::TwelveMonth => "12-month contract",
            Self::TwentyFourMonth => "24-month contract",
        }
    }
}

/// Usage-based or flat-fee billing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingModel {
    #[serde(rename = "per-use")]
    PerUse,
    #[serde(rename = "fixed")]
    Fixed,
}

impl BillingModel {
    /// The quiz form preselects per-use billing
    pub const FALLBACK: Self = Self::PerUse;

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "per-use" => Some(Self::PerUse),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::PerUse => "per-use",
            Self::Fixed => "fixed",
        }
    }
}

/// An answer that was replaced by its default during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultedField {
    Providers,
    PreferredPricing,
    BillingModel,
    UnansweredCalls,
    AfterHoursCalls,
    NoShowRate,
    AvgRevenuePerAppointment,
    MonthlyWage,
    AiRoutingShare,
    AfterhoursSpend,
    AppointmentsPerMonth,
    ClinicCount,
}

/// Calculator inputs after parsing and default substitution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    pub hcp_band: HcpBand,
    pub contract_term: ContractTerm,
    pub billing_model: BillingModel,
    pub missed_calls_per_day: f64,
    pub after_hours_calls_per_day: f64,
    pub no_show_rate_percent: f64,
    pub avg_revenue_per_appointment: f64,
    pub monthly_wage: f64,
    pub ai_routing_share_percent: f64,
    pub afterhours_spend: f64,
    pub appointments_per_month: f64,
    pub clinic_count: u32,
    /// Answers that fell back to a default, in resolution order
    pub defaulted: Vec<DefaultedField>,
}

impl ResolvedInputs {
    /// Resolve raw answers. Never fails.
    pub fn resolve(answers: &QuestionnaireAnswers) -> Self {
        let mut defaulted = Vec::new();

        let hcp_band = resolve_label(
            &answers.providers,
            HcpBand::from_label,
            HcpBand::FALLBACK,
            DefaultedField::Providers,
            &mut defaulted,
        );
        let contract_term = resolve_label(
            &answers.preferred_pricing,
            ContractTerm::from_label,
            ContractTerm::FALLBACK,
            DefaultedField::PreferredPricing,
            &mut defaulted,
        );
        let billing_model = resolve_label(
            &answers.billing_model,
            BillingModel::from_label,
            BillingModel::FALLBACK,
            DefaultedField::BillingModel,
            &mut defaulted,
        );

        let mut amount = |raw: &str, default: f64, field: DefaultedField, zero_is_absent: bool| {
            match parse_amount(raw) {
                Some(value) if !(zero_is_absent && value == 0.0) => value,
                _ => {
                    defaulted.push(field);
                    default
                }
            }
        };

        // Call counts treat zero as "not answered"; every other figure keeps
        // an explicit zero.
        let missed_calls_per_day = amount(
            &answers.unanswered_calls,
            defaults::MISSED_CALLS_PER_DAY,
            DefaultedField::UnansweredCalls,
            true,
        );
        let after_hours_calls_per_day = amount(
            &answers.after_hours_calls,
            defaults::AFTER_HOURS_CALLS_PER_DAY,
            DefaultedField::AfterHoursCalls,
            true,
        );
        let no_show_rate_percent = amount(
            &answers.no_show_rate,
            defaults::NO_SHOW_RATE_PERCENT,
            DefaultedField::NoShowRate,
            false,
        );
        let avg_revenue_per_appointment = amount(
            &answers.avg_revenue_per_appointment,
            defaults::AVG_REVENUE_PER_APPOINTMENT,
            DefaultedField::AvgRevenuePerAppointment,
            false,
        );
        let monthly_wage = amount(
            &answers.monthly_wage,
            defaults::MONTHLY_WAGE,
            DefaultedField::MonthlyWage,
            false,
        );
        let ai_routing_share_percent = amount(
            &answers.ai_routing_share,
            defaults::AI_ROUTING_SHARE_PERCENT,
            DefaultedField::AiRoutingShare,
            false,
        );
        let afterhours_spend = amount(
            &answers.afterhours_spend,
            defaults::AFTERHOURS_SPEND,
            DefaultedField::AfterhoursSpend,
            false,
        );
        let appointments_per_month = amount(
            &answers.appointments_per_month,
            defaults::APPOINTMENTS_PER_MONTH,
            DefaultedField::AppointmentsPerMonth,
            false,
        );

        let clinic_count = resolve_clinic_count(&answers.clinic_count, &mut defaulted);

        Self {
            hcp_band,
            contract_term,
            billing_model,
            missed_calls_per_day,
            after_hours_calls_per_day,
            no_show_rate_percent,
            avg_revenue_per_appointment,
            monthly_wage,
            ai_routing_share_percent,
            afterhours_spend,
            appointments_per_month,
            clinic_count,
            defaulted,
        }
    }

    pub fn was_defaulted(&self, field: DefaultedField) -> bool {
        self.defaulted.contains(&field)
    }
}

/// Parse a free-text amount. Empty, non-numeric, non-finite and negative
/// text all count as absent.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn resolve_label<T: Copy + std::fmt::Debug>(
    raw: &str,
    parse: fn(&str) -> Option<T>,
    fallback: T,
    field: DefaultedField,
    defaulted: &mut Vec<DefaultedField>,
) -> T {
    if let Some(value) = parse(raw) {
        return value;
    }

    defaulted.push(field);
    if raw.trim().is_empty() {
        tracing::debug!(field = ?field, fallback = ?fallback, "Answer not given yet, using fallback");
    } else {
        tracing::warn!(
            field = ?field,
            value = %raw,
            fallback = ?fallback,
            "Unrecognised answer label, using fallback"
        );
    }
    fallback
}

fn resolve_clinic_count(raw: &str, defaulted: &mut Vec<DefaultedField>) -> u32 {
    if raw.trim().is_empty() {
        return defaults::CLINIC_COUNT;
    }
    match raw.trim().parse::<u32>() {
        Ok(count) if count > 0 => count,
        _ => {
            tracing::warn!(value = %raw, "Invalid clinic count, projecting for one clinic");
            defaulted.push(DefaultedField::ClinicCount);
            defaults::CLINIC_COUNT
        }
    }
}
