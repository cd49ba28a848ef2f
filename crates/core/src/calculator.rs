//! ROI calculator
//!
//! Projects what an AI receptionist is worth to a clinic: staffing savings,
//! revenue from recovered missed calls, revenue from after-hours calls,
//! fewer no-shows and displaced after-hours answering spend, set against the
//! monthly AI cost from the price list.
//!
//! All arithmetic runs on unrounded `f64` values. Figures are rounded once,
//! on the way out, with [`round_half_up`]. Totals across clinics are scaled
//! from the unrounded per-clinic values before rounding.
//!
//! # Example
//!
//! ```
//! use roi_quiz_core::{calculate, PricingTable, QuestionnaireAnswers};
//!
//! let answers = QuestionnaireAnswers {
//!     unanswered_calls: "50".into(),
//!     preferred_pricing: "Flexible".into(),
//!     billing_model: "per-use".into(),
//!     ..Default::default()
//! };
//! let result = calculate(&answers, &PricingTable::standard());
//!
//! assert_eq!(result.drivers.ai_routed_per_month, 660);
//! assert_eq!(result.per_clinic.monthly_ai_cost, 763);
//! assert_eq!(result.per_clinic.year1_cost, 9755);
//! ```

use serde::Serialize;

use crate::answers::{
    BillingModel, ContractTerm, DefaultedField, HcpBand, QuestionnaireAnswers, ResolvedInputs,
};
use crate::pricing::PricingTable;

/// Fixed assumptions behind the projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConstants {
    pub business_days_per_month: f64,
    pub months_per_year: f64,
    /// Share of one receptionist's wage treated as avoided cost
    pub staffing_reduction_rate: f64,
    /// Share of after-hours calls that become bookings
    pub after_hours_booking_rate: f64,
    /// Fraction of the baseline DNA rate that remains with AI reminders
    pub no_show_improvement_factor: f64,
}

impl Default for CalculatorConstants {
    fn default() -> Self {
        Self {
            business_days_per_month: 22.0,
            months_per_year: 12.0,
            staffing_reduction_rate: 0.35,
            after_hours_booking_rate: 0.5,
            no_show_improvement_factor: 0.5,
        }
    }
}

/// Rounded money figures for one clinic, or for all clinics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiFigures {
    pub monthly_staff_saved: i64,
    pub annual_staff_saved: i64,
    pub monthly_recovered_revenue: i64,
    pub annual_recovered_revenue: i64,
    pub monthly_after_hours_revenue: i64,
    pub annual_after_hours_revenue: i64,
    pub monthly_no_show_savings: i64,
    pub annual_no_show_savings: i64,
    pub monthly_after_hours_spend_saving: i64,
    pub annual_after_hours_spend_saving: i64,
    /// Sum of the five monthly benefits
    pub monthly_benefit: i64,
    /// Sum of the five annual benefits
    pub total_annual_impact: i64,
    pub monthly_ai_cost: i64,
    /// Twelve months of AI cost plus the setup fee
    pub year1_cost: i64,
    pub net_monthly_profit: i64,
    pub net_annual_profit: i64,
    /// Receptionist wage, shown next to the AI cost
    pub human_monthly_cost: i64,
}

/// Plan the projection was priced on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub hcp_band: HcpBand,
    pub contract_term: ContractTerm,
    pub billing_model: BillingModel,
    pub setup_fee: i64,
    pub subscription_fee: f64,
    pub per_use_rate: f64,
    pub fixed_tier: Option<f64>,
    /// Per-use charges in the monthly cost (zero for fixed billing)
    pub monthly_usage_fee: i64,
}

/// Call and appointment volumes behind the money figures, per clinic
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDrivers {
    pub missed_calls_per_day: f64,
    pub missed_calls_per_month: f64,
    pub ai_routed_per_month: i64,
    pub recovered_bookings: i64,
    pub after_hours_bookings: i64,
    pub appointments_per_month: f64,
    pub show_up_rate_percent: f64,
    pub routing_share_percent: f64,
    pub staffing_reduction_rate: f64,
}

/// Output of one calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub clinics: u32,
    pub per_clinic: RoiFigures,
    /// Per-clinic figures scaled by `clinics`
    pub totals: RoiFigures,
    pub plan: PlanSummary,
    pub drivers: VolumeDrivers,
    /// Answers that were replaced by defaults
    pub defaulted: Vec<DefaultedField>,
}

/// ROI calculator interface
///
/// Implementations must be pure: the same answers always give the same
/// result, and nothing outside the arguments is read or written.
pub trait RoiCalculator: Send + Sync {
    fn calculate(&self, answers: &QuestionnaireAnswers) -> CalculationResult;

    fn pricing(&self) -> &PricingTable;

    fn constants(&self) -> &CalculatorConstants;
}

/// Calculator over a price list and a set of assumptions
#[derive(Debug, Clone, Default)]
pub struct ConfigDrivenCalculator {
    pricing: PricingTable,
    constants: CalculatorConstants,
}

impl ConfigDrivenCalculator {
    pub fn new(pricing: PricingTable, constants: CalculatorConstants) -> Self {
        Self { pricing, constants }
    }

    /// Published price list with the standard assumptions
    pub fn standard() -> Self {
        Self::default()
    }

    fn project(&self, inputs: &ResolvedInputs) -> (Breakdown, PlanSummary, VolumeDrivers) {
        let c = &self.constants;
        let quote = self
            .pricing
            .quote(inputs.hcp_band, inputs.contract_term, inputs.billing_model);

        let routing_share = inputs.ai_routing_share_percent / 100.0;
        let show_up_rate = (100.0 - inputs.no_show_rate_percent) / 100.0;
        let avg_revenue = inputs.avg_revenue_per_appointment;

        // Missed calls routed to the AI, rounded to whole calls before pricing
        let missed_per_month = inputs.missed_calls_per_day * c.business_days_per_month;
        let ai_routed = round_half_up(missed_per_month * routing_share) as f64;

        let usage_fee = quote.usage_fee(ai_routed);
        let monthly_ai_cost = quote.monthly_cost(ai_routed);

        let monthly_staff_saved = inputs.monthly_wage * c.staffing_reduction_rate;

        let recovered_bookings = ai_routed * show_up_rate;
        let monthly_recovered_revenue = recovered_bookings * avg_revenue;

        let after_hours_bookings =
            inputs.after_hours_calls_per_day * c.business_days_per_month * c.after_hours_booking_rate;
        let monthly_after_hours_revenue = after_hours_bookings * avg_revenue;

        let baseline_dna = inputs.no_show_rate_percent / 100.0;
        let improved_dna = baseline_dna * c.no_show_improvement_factor;
        let appointments_saved = inputs.appointments_per_month * (baseline_dna - improved_dna);
        let monthly_no_show_savings = appointments_saved * avg_revenue;

        let monthly_after_hours_spend_saving = if inputs.afterhours_spend > 0.0 {
            inputs.afterhours_spend
        } else {
            0.0
        };

        let breakdown = Breakdown {
            monthly_staff_saved,
            monthly_recovered_revenue,
            monthly_after_hours_revenue,
            monthly_no_show_savings,
            monthly_after_hours_spend_saving,
            monthly_ai_cost,
            setup_fee: quote.setup_fee,
            human_monthly_cost: inputs.monthly_wage,
        };

        let plan = PlanSummary {
            hcp_band: inputs.hcp_band,
            contract_term: inputs.contract_term,
            billing_model: inputs.billing_model,
            setup_fee: round_half_up(quote.setup_fee),
            subscription_fee: quote.subscription_fee,
            per_use_rate: quote.per_use_rate,
            fixed_tier: quote.fixed_tier,
            monthly_usage_fee: round_half_up(usage_fee),
        };

        let drivers = VolumeDrivers {
            missed_calls_per_day: inputs.missed_calls_per_day,
            missed_calls_per_month: missed_per_month,
            ai_routed_per_month: ai_routed as i64,
            recovered_bookings: round_half_up(recovered_bookings),
            after_hours_bookings: round_half_up(after_hours_bookings),
            appointments_per_month: inputs.appointments_per_month,
            show_up_rate_percent: show_up_rate * 100.0,
            routing_share_percent: routing_share * 100.0,
            staffing_reduction_rate: c.staffing_reduction_rate,
        };

        (breakdown, plan, drivers)
    }
}

impl RoiCalculator for ConfigDrivenCalculator {
    fn calculate(&self, answers: &QuestionnaireAnswers) -> CalculationResult {
        let inputs = ResolvedInputs::resolve(answers);
        let (per_clinic, plan, drivers) = self.project(&inputs);
        let months = self.constants.months_per_year;

        CalculationResult {
            clinics: inputs.clinic_count,
            per_clinic: per_clinic.figures(months),
            totals: per_clinic.scaled(f64::from(inputs.clinic_count)).figures(months),
            plan,
            drivers,
            defaulted: inputs.defaulted,
        }
    }

    fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    fn constants(&self) -> &CalculatorConstants {
        &self.constants
    }
}

/// Calculate with the given price list and the standard assumptions
pub fn calculate(answers: &QuestionnaireAnswers, pricing: &PricingTable) -> CalculationResult {
    ConfigDrivenCalculator::new(*pricing, CalculatorConstants::default()).calculate(answers)
}

/// Round to the nearest whole number, halves toward positive infinity
/// (`2.5 -> 3`, `-2.5 -> -2`). Quiz figures have always been rounded this way.
pub fn round_half_up(value: f64) -> i64 {
    let rounded = value.round();
    // f64::round sends negative halves away from zero
    if value - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

/// Unrounded monthly amounts for one or more clinics
#[derive(Debug, Clone, Copy)]
struct Breakdown {
    monthly_staff_saved: f64,
    monthly_recovered_revenue: f64,
    monthly_after_hours_revenue: f64,
    monthly_no_show_savings: f64,
    monthly_after_hours_spend_saving: f64,
    monthly_ai_cost: f64,
    setup_fee: f64,
    human_monthly_cost: f64,
}

impl Breakdown {
    fn monthly_benefit(&self) -> f64 {
        self.monthly_staff_saved
            + self.monthly_recovered_revenue
            + self.monthly_after_hours_revenue
            + self.monthly_no_show_savings
            + self.monthly_after_hours_spend_saving
    }

    fn scaled(&self, clinics: f64) -> Self {
        Self {
            monthly_staff_saved: self.monthly_staff_saved * clinics,
            monthly_recovered_revenue: self.monthly_recovered_revenue * clinics,
            monthly_after_hours_revenue: self.monthly_after_hours_revenue * clinics,
            monthly_no_show_savings: self.monthly_no_show_savings * clinics,
            monthly_after_hours_spend_saving: self.monthly_after_hours_spend_saving * clinics,
            monthly_ai_cost: self.monthly_ai_cost * clinics,
            setup_fee: self.setup_fee * clinics,
            human_monthly_cost: self.human_monthly_cost * clinics,
        }
    }

    fn figures(&self, months: f64) -> RoiFigures {
        let annual_staff_saved = self.monthly_staff_saved * months;
        let annual_recovered_revenue = self.monthly_recovered_revenue * months;
        let annual_after_hours_revenue = self.monthly_after_hours_revenue * months;
        let annual_no_show_savings = self.monthly_no_show_savings * months;
        let annual_after_hours_spend_saving = self.monthly_after_hours_spend_saving * months;

        let total_annual_impact = annual_staff_saved
            + annual_recovered_revenue
            + annual_after_hours_revenue
            + annual_no_show_savings
            + annual_after_hours_spend_saving;
        let monthly_benefit = self.monthly_benefit();
        let net_monthly_profit = monthly_benefit - self.monthly_ai_cost;

        RoiFigures {
            monthly_staff_saved: round_half_up(self.monthly_staff_saved),
            annual_staff_saved: round_half_up(annual_staff_saved),
            monthly_recovered_revenue: round_half_up(self.monthly_recovered_revenue),
            annual_recovered_revenue: round_half_up(annual_recovered_revenue),
            monthly_after_hours_revenue: round_half_up(self.monthly_after_hours_revenue),
            annual_after_hours_revenue: round_half_up(annual_after_hours_revenue),
            monthly_no_show_savings: round_half_up(self.monthly_no_show_savings),
            annual_no_show_savings: round_half_up(annual_no_show_savings),
            monthly_after_hours_spend_saving: round_half_up(self.monthly_after_hours_spend_saving),
            annual_after_hours_spend_saving: round_half_up(annual_after_hours_spend_saving),
            monthly_benefit: round_half_up(monthly_benefit),
            total_annual_impact: round_half_up(total_annual_impact),
            monthly_ai_cost: round_half_up(self.monthly_ai_cost),
            year1_cost: round_half_up(self.monthly_ai_cost * months + self.setup_fee),
            net_monthly_profit: round_half_up(net_monthly_profit),
            net_annual_profit: round_half_up(net_monthly_profit * months),
            human_monthly_cost: round_half_up(self.human_monthly_cost),
        }
    }
}
