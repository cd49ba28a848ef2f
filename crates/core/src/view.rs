//! Results presentation
//!
//! Re-expresses a [`CalculationResult`] for a monthly or annual display:
//! headline impact, net profit, AI cost, benefit cards and payback period.
//! Nothing here derives new money figures beyond dividing by twelve or
//! multiplying by twelve.

use serde::{Deserialize, Serialize};

use crate::calculator::{round_half_up, CalculationResult, RoiFigures};

/// Display period for the results screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Monthly,
    Annual,
}

impl Period {
    fn months(self) -> f64 {
        match self {
            Self::Monthly => 1.0,
            Self::Annual => 12.0,
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Ok(Self::Monthly),
            "annual" | "annually" | "yearly" | "year" => Ok(Self::Annual),
            other => Err(format!("Unknown period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BenefitKind {
    StaffingSavings,
    RecoveredRevenue,
    AfterHoursRevenue,
    NoShowSavings,
    AfterHoursSpendSaving,
}

impl BenefitKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::StaffingSavings => "Staff Reduction Savings",
            Self::RecoveredRevenue => "Revenue From Missed Calls",
            Self::AfterHoursRevenue => "Revenue From After Hour Calls",
            Self::NoShowSavings => "Revenue From DNAs",
            Self::AfterHoursSpendSaving => "After Hours Service Savings",
        }
    }

    fn annual(&self, figures: &RoiFigures) -> i64 {
        match self {
            Self::StaffingSavings => figures.annual_staff_saved,
            Self::RecoveredRevenue => figures.annual_recovered_revenue,
            Self::AfterHoursRevenue => figures.annual_after_hours_revenue,
            Self::NoShowSavings => figures.annual_no_show_savings,
            Self::AfterHoursSpendSaving => figures.annual_after_hours_spend_saving,
        }
    }
}

/// One "where your savings come from" card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitCard {
    pub kind: BenefitKind,
    pub title: &'static str,
    /// Per-clinic value for the period
    pub value: i64,
    /// Value across all clinics for the period
    pub total_value: i64,
    /// Share of the per-clinic headline impact, in whole percent
    pub share_percent: i64,
}

/// Months until the AI cost is covered by net profit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "months", rename_all = "camelCase")]
pub enum Payback {
    LessThanOneMonth,
    Months(i64),
    /// Net profit is zero or negative
    NotReached,
}

impl Payback {
    /// Payback for a cost over the period against the net profit over the
    /// same period.
    pub fn compute(cost: i64, net_for_period: i64, period: Period) -> Self {
        if net_for_period <= 0 {
            return Self::NotReached;
        }
        let net_per_month = net_for_period as f64 / period.months();
        let months = (cost as f64 / net_per_month).ceil();
        if months < 1.0 {
            Self::LessThanOneMonth
        } else {
            Self::Months(months as i64)
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::LessThanOneMonth => "<1".to_string(),
            Self::Months(months) => months.to_string(),
            Self::NotReached => "n/a".to_string(),
        }
    }
}

/// Results screen for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub period: Period,
    pub clinics: u32,
    pub total_impact_per_clinic: i64,
    pub total_impact: i64,
    pub net_profit_per_clinic: i64,
    pub net_profit: i64,
    /// Monthly AI cost, or first-year cost for the annual view
    pub ai_cost_per_clinic: i64,
    pub ai_cost: i64,
    pub human_monthly_cost: i64,
    pub benefits: Vec<BenefitCard>,
    pub payback: Payback,
}

impl ResultsView {
    pub fn new(result: &CalculationResult, period: Period) -> Self {
        let per_clinic = &result.per_clinic;
        let totals = &result.totals;

        let total_impact_per_clinic = for_period(per_clinic.total_annual_impact, period);
        let net_profit_per_clinic = net_for_period(per_clinic, period);
        let ai_cost_per_clinic = ai_cost_for_period(per_clinic, period);

        let benefits = [
            BenefitKind::StaffingSavings,
            BenefitKind::RecoveredRevenue,
            BenefitKind::AfterHoursRevenue,
            BenefitKind::NoShowSavings,
            BenefitKind::AfterHoursSpendSaving,
        ]
        .into_iter()
        .filter(|kind| match kind {
            // Optional cards only appear when they contribute
            BenefitKind::AfterHoursRevenue | BenefitKind::AfterHoursSpendSaving => {
                kind.annual(per_clinic) > 0
            }
            _ => true,
        })
        .map(|kind| {
            let value = for_period(kind.annual(per_clinic), period);
            BenefitCard {
                kind,
                title: kind.title(),
                value,
                total_value: for_period(kind.annual(totals), period),
                share_percent: share_percent(value, total_impact_per_clinic),
            }
        })
        .collect();

        Self {
            period,
            clinics: result.clinics,
            total_impact_per_clinic,
            total_impact: for_period(totals.total_annual_impact, period),
            net_profit_per_clinic,
            net_profit: net_for_period(totals, period),
            ai_cost_per_clinic,
            ai_cost: ai_cost_for_period(totals, period),
            human_monthly_cost: per_clinic.human_monthly_cost,
            benefits,
            payback: Payback::compute(ai_cost_per_clinic, net_profit_per_clinic, period),
        }
    }
}

fn for_period(annual: i64, period: Period) -> i64 {
    match period {
        Period::Monthly => round_half_up(annual as f64 / 12.0),
        Period::Annual => annual,
    }
}

fn net_for_period(figures: &RoiFigures, period: Period) -> i64 {
    match period {
        Period::Monthly => figures.net_monthly_profit,
        Period::Annual => figures.net_monthly_profit * 12,
    }
}

fn ai_cost_for_period(figures: &RoiFigures, period: Period) -> i64 {
    match period {
        Period::Monthly => figures.monthly_ai_cost,
        Period::Annual => figures.year1_cost,
    }
}

fn share_percent(value: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    round_half_up(value as f64 / total as f64 * 100.0)
}

/// Whole-dollar amount with thousands separators, e.g. `$23,100`
pub fn format_currency(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::QuestionnaireAnswers;
    use crate::calculator::calculate;
    use crate::pricing::PricingTable;

    fn result(after_hours: &str, clinics: &str) -> CalculationResult {
        let answers = QuestionnaireAnswers {
            providers: "1–5".into(),
            preferred_pricing: "Flexible".into(),
            billing_model: "per-use".into(),
            unanswered_calls: "50".into(),
            after_hours_calls: after_hours.into(),
            clinic_count: clinics.into(),
            ..Default::default()
        };
        calculate(&answers, &PricingTable::standard())
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "$0");
        assert_eq!(format_currency(999), "$999");
        assert_eq!(format_currency(23100), "$23,100");
        assert_eq!(format_currency(1234567), "$1,234,567");
        assert_eq!(format_currency(-4500), "-$4,500");
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("Monthly".parse::<Period>(), Ok(Period::Monthly));
        assert_eq!("annual".parse::<Period>(), Ok(Period::Annual));
        assert!("weekly".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::Monthly);
    }

    #[test]
    fn test_monthly_and_annual_headlines() {
        let result = result("", "");
        let monthly = ResultsView::new(&result, Period::Monthly);
        let annual = ResultsView::new(&result, Period::Annual);

        assert_eq!(annual.total_impact_per_clinic, result.per_clinic.total_annual_impact);
        assert_eq!(
            monthly.total_impact_per_clinic,
            round_half_up(result.per_clinic.total_annual_impact as f64 / 12.0)
        );
        assert_eq!(monthly.net_profit_per_clinic, result.per_clinic.net_monthly_profit);
        assert_eq!(annual.net_profit_per_clinic, result.per_clinic.net_monthly_profit * 12);
        assert_eq!(monthly.ai_cost_per_clinic, 763);
        assert_eq!(annual.ai_cost_per_clinic, 9755);
    }

    #[test]
    fn test_after_hours_card_only_when_positive() {
        let without = ResultsView::new(&result("", ""), Period::Monthly);
        assert_eq!(without.benefits.len(), 3);
        assert!(without
            .benefits
            .iter()
            .all(|card| card.kind != BenefitKind::AfterHoursRevenue));

        let with = ResultsView::new(&result("10", ""), Period::Monthly);
        assert_eq!(with.benefits.len(), 4);
        assert_eq!(with.benefits[2].kind, BenefitKind::AfterHoursRevenue);
        assert_eq!(with.benefits[2].title, "Revenue From After Hour Calls");
    }

    #[test]
    fn test_benefit_shares_sum_to_about_100() {
        let view = ResultsView::new(&result("10", ""), Period::Annual);
        let total: i64 = view.benefits.iter().map(|card| card.share_percent).sum();
        assert!((98..=102).contains(&total), "shares summed to {}", total);
    }

    #[test]
    fn test_totals_across_clinics() {
        let view = ResultsView::new(&result("", "2"), Period::Annual);
        assert_eq!(view.clinics, 2);
        assert_eq!(view.ai_cost, 2 * 9755);
        assert_eq!(view.benefits[0].total_value, 2 * view.benefits[0].value);
    }

    #[test]
    fn test_payback() {
        assert_eq!(Payback::compute(763, 800, Period::Monthly), Payback::Months(1));
        assert_eq!(Payback::compute(9755, 12000, Period::Annual), Payback::Months(10));
        assert_eq!(Payback::compute(0, 500, Period::Monthly), Payback::LessThanOneMonth);
        assert_eq!(Payback::compute(763, 0, Period::Monthly), Payback::NotReached);
        assert_eq!(Payback::compute(763, -20, Period::Monthly), Payback::NotReached);
        assert_eq!(Payback::LessThanOneMonth.display(), "<1");
        assert_eq!(Payback::Months(3).display(), "3");
    }

    #[test]
    fn test_payback_serialization() {
        let json = serde_json::to_value(Payback::Months(4)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "months", "months": 4}));
        let json = serde_json::to_value(Payback::NotReached).unwrap();
        assert_eq!(json, serde_json::json!({"status": "notReached"}));
    }
}
