//! AI reception price list
//!
//! The table is compiled in. It is serialisable so the price list can be
//! shown to visitors, but nothing reads prices from configuration.

use serde::{Deserialize, Serialize};

use crate::answers::{BillingModel, ContractTerm, HcpBand};

/// One price per contract term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermPrices {
    pub flexible: f64,
    #[serde(rename = "12-month")]
    pub twelve_month: f64,
    #[serde(rename = "24-month")]
    pub twenty_four_month: f64,
}

impl TermPrices {
    pub const fn new(flexible: f64, twelve_month: f64, twenty_four_month: f64) -> Self {
        Self {
            flexible,
            twelve_month,
            twenty_four_month,
        }
    }

    pub fn get(&self, term: ContractTerm) -> f64 {
        match term {
            ContractTerm::Flexible => self.flexible,
            ContractTerm::TwelveMonth => self.twelve_month,
            ContractTerm::TwentyFourMonth => self.twenty_four_month,
        }
    }
}

/// Flat monthly fee for unlimited usage, by clinic size band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedTiers {
    #[serde(rename = "1-5")]
    pub one_to_five: TermPrices,
    #[serde(rename = "6-10")]
    pub six_to_ten: TermPrices,
    #[serde(rename = "10+")]
    pub ten_plus: TermPrices,
}

impl FixedTiers {
    pub fn get(&self, band: HcpBand) -> &TermPrices {
        match band {
            HcpBand::OneToFive => &self.one_to_five,
            HcpBand::SixToTen => &self.six_to_ten,
            HcpBand::TenPlus => &self.ten_plus,
        }
    }
}

/// Complete price list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTable {
    /// One-time setup fee
    pub setup: TermPrices,
    /// Monthly subscription for per-use billing, same for every term
    pub subscription_fee: f64,
    /// Charge per AI-handled interaction
    pub per_use_rate: TermPrices,
    pub fixed_tier: FixedTiers,
}

/// Prices that apply to one band/term/billing combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuote {
    pub billing_model: BillingModel,
    pub setup_fee: f64,
    pub subscription_fee: f64,
    pub per_use_rate: f64,
    /// Present only for fixed billing
    pub fixed_tier: Option<f64>,
}

impl PlanQuote {
    /// Monthly usage charge for the given number of AI-handled calls.
    /// Zero under fixed billing.
    pub fn usage_fee(&self, ai_routed_per_month: f64) -> f64 {
        match self.billing_model {
            BillingModel::PerUse => ai_routed_per_month * self.per_use_rate,
            BillingModel::Fixed => 0.0,
        }
    }

    /// Monthly AI reception cost for one clinic
    pub fn monthly_cost(&self, ai_routed_per_month: f64) -> f64 {
        match (self.billing_model, self.fixed_tier) {
            (BillingModel::Fixed, Some(tier)) => tier,
            _ => self.subscription_fee + self.usage_fee(ai_routed_per_month),
        }
    }
}

impl PricingTable {
    /// The published price list
    pub const fn standard() -> Self {
        Self {
            setup: TermPrices::new(599.0, 0.0, 0.0),
            subscription_fee: 499.0,
            per_use_rate: TermPrices::new(0.40, 0.40, 0.30),
            fixed_tier: FixedTiers {
                one_to_five: TermPrices::new(1999.0, 1999.0, 1499.0),
                six_to_ten: TermPrices::new(3999.0, 3999.0, 3499.0),
                ten_plus: TermPrices::new(5999.0, 5999.0, 4499.0),
            },
        }
    }

    pub fn quote(&self, band: HcpBand, term: ContractTerm, billing: BillingModel) -> PlanQuote {
        PlanQuote {
            billing_model: billing,
            setup_fee: self.setup.get(term),
            subscription_fee: self.subscription_fee,
            per_use_rate: self.per_use_rate.get(term),
            fixed_tier: match billing {
                BillingModel::Fixed => Some(self.fixed_tier.get(band).get(term)),
                BillingModel::PerUse => None,
            },
        }
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::standard()
    }
}
