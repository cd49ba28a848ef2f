//! Core types and calculations for the AI reception ROI quiz
//!
//! This crate is pure: nothing here performs I/O or holds shared state.
//!
//! - [`answers`] - raw questionnaire answers and their resolution into numbers
//! - [`pricing`] - the compiled-in AI reception price list
//! - [`calculator`] - the ROI calculation itself
//! - [`view`] - monthly/annual presentation of a calculation result
//! - [`questionnaire`] - question steps, validation and the immutable quiz session
//! - [`lead`] - contact and practice details captured alongside the answers

pub mod answers;
pub mod calculator;
pub mod lead;
pub mod pricing;
pub mod questionnaire;
pub mod view;

pub use answers::{
    defaults, BillingModel, ContractTerm, DefaultedField, HcpBand, QuestionnaireAnswers,
    ResolvedInputs,
};
pub use calculator::{
    calculate, round_half_up, CalculationResult, CalculatorConstants, ConfigDrivenCalculator,
    PlanSummary, RoiCalculator, RoiFigures, VolumeDrivers,
};
pub use lead::{Consent, ContactDetails, PracticeProfile, RetryContact};
pub use pricing::{FixedTiers, PlanQuote, PricingTable, TermPrices};
pub use questionnaire::{
    questions, validate_answers, validate_contact, validate_profile, Problem, Question,
    QuestionKind, QuizField, QuizSession, Step, ValidationIssue,
};
pub use view::{format_currency, BenefitCard, BenefitKind, Payback, Period, ResultsView};
