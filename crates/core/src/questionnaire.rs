//! Quiz questions, form validation and the quiz session
//!
//! [`QuizSession`] is an immutable value. Every transition returns a new
//! session, so a caller can keep the previous one for undo or rendering
//! without coordinating shared state. The calculator never validates; these
//! checks are what stops the visitor from moving on with an answer the form
//! would reject.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answers::{parse_amount, BillingModel, ContractTerm, HcpBand, QuestionnaireAnswers};
use crate::lead::{Consent, ContactDetails, PracticeProfile};

/// Most priorities a visitor may pick
pub const MAX_PRIORITIES: usize = 3;

pub const ROLE_OTHER: &str = "Other";
pub const SOFTWARE_OTHER: &str = "Other";

pub const ROLES: &[&str] = &[
    "Practice Owner",
    "Practice Manager",
    "Executive / Director (CEO or CMO)",
    ROLE_OTHER,
];
pub const SOFTWARE: &[&str] = &["Best Practice", "Medical Director", SOFTWARE_OTHER];
pub const TIMELINES: &[&str] = &[
    "Immediately",
    "Within 1 month",
    "1-3 months",
    "3-6 months",
    "Just exploring",
];
pub const PRIORITIES: &[&str] = &[
    "Reduce costs",
    "Improve patient experience",
    "Increase revenue",
    "Staff efficiency",
    "24/7 availability",
];
pub const PROVIDER_BANDS: &[&str] = &["1–5", "6–10", "10+"];
pub const PRICING_OPTIONS: &[&str] = &["Flexible", "12-month contract", "24-month contract"];
pub const BILLING_OPTIONS: &[&str] = &["per-use", "fixed"];
/// Clinic count bands asked of every role except "Other"
pub const CLINIC_COUNT_BANDS: &[&str] = &["1-3", "3-5", "5-7", "7+"];

pub const AUSTRALIAN_STATES: &[&str] = &[
    "Australian Capital Territory (ACT)",
    "New South Wales (NSW)",
    "Northern Territory (NT)",
    "Queensland (QLD)",
    "South Australia (SA)",
    "Tasmania (TAS)",
    "Victoria (VIC)",
    "Western Australia (WA)",
];

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Field answered by one quiz step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizField {
    Role,
    Software,
    Timeline,
    Priorities,
    Providers,
    PreferredPricing,
    BillingModel,
    CallVolume,
    UnansweredCalls,
    AfterHoursCalls,
    NoShowRate,
    AvgRevenuePerAppointment,
    MonthlyWage,
}

impl QuizField {
    /// Wire name of the field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Software => "software",
            Self::Timeline => "timeline",
            Self::Priorities => "priorities",
            Self::Providers => "providers",
            Self::PreferredPricing => "preferredPricing",
            Self::BillingModel => "billingModel",
            Self::CallVolume => "callVolume",
            Self::UnansweredCalls => "unansweredCalls",
            Self::AfterHoursCalls => "afterHoursCalls",
            Self::NoShowRate => "noShowRate",
            Self::AvgRevenuePerAppointment => "avgRevenuePerAppointment",
            Self::MonthlyWage => "monthlyWage",
        }
    }

    /// Fields whose issues block leaving this step
    fn step_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Role => &["role", "roleOther", "clinicCountBand"],
            Self::Software => &["software", "softwareOther"],
            Self::Timeline => &["timeline"],
            Self::Priorities => &["priorities"],
            Self::Providers => &["providers"],
            Self::PreferredPricing => &["preferredPricing"],
            Self::BillingModel => &["billingModel"],
            Self::CallVolume => &["callVolume"],
            Self::UnansweredCalls => &["unansweredCalls"],
            Self::AfterHoursCalls => &["afterHoursCalls"],
            Self::NoShowRate => &["noShowRate"],
            Self::AvgRevenuePerAppointment => &["avgRevenuePerAppointment"],
            Self::MonthlyWage => &["monthlyWage"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuestionKind {
    Choice {
        options: &'static [&'static str],
    },
    #[serde(rename_all = "camelCase")]
    MultiChoice {
        options: &'static [&'static str],
        max_selections: usize,
    },
    /// Free-text number. The unanswered-calls maximum is the visitor's own
    /// call volume and is checked separately.
    Number {
        min: f64,
        max: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Question {
    pub field: QuizField,
    pub title: &'static str,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

static QUESTIONS: [Question; 13] = [
    Question {
        field: QuizField::Role,
        title: "What's your role?",
        kind: QuestionKind::Choice { options: ROLES },
    },
    Question {
        field: QuizField::Software,
        title: "Practice software used",
        kind: QuestionKind::Choice { options: SOFTWARE },
    },
    Question {
        field: QuizField::Timeline,
        title: "Timeline for exploring solutions",
        kind: QuestionKind::Choice { options: TIMELINES },
    },
    Question {
        field: QuizField::Priorities,
        title: "What are your top priorities? (choose up to 3)",
        kind: QuestionKind::MultiChoice {
            options: PRIORITIES,
            max_selections: MAX_PRIORITIES,
        },
    },
    Question {
        field: QuizField::Providers,
        title: "Number of Health Care Providers (Doctors, Nurses and Allied Health) per clinic?",
        kind: QuestionKind::Choice { options: PROVIDER_BANDS },
    },
    Question {
        field: QuizField::PreferredPricing,
        title: "Preferred pricing",
        kind: QuestionKind::Choice { options: PRICING_OPTIONS },
    },
    Question {
        field: QuizField::BillingModel,
        title: "Billing Model",
        kind: QuestionKind::Choice { options: BILLING_OPTIONS },
    },
    Question {
        field: QuizField::CallVolume,
        title: "Average Daily Patient call volume per clinic",
        kind: QuestionKind::Number { min: 1.0, max: None },
    },
    Question {
        field: QuizField::UnansweredCalls,
        title: "Average Daily Unanswered calls per clinic",
        kind: QuestionKind::Number { min: 1.0, max: None },
    },
    Question {
        field: QuizField::AfterHoursCalls,
        title: "Average Daily After hours calls expected per clinic",
        kind: QuestionKind::Number { min: 1.0, max: None },
    },
    Question {
        field: QuizField::NoShowRate,
        title: "Average no-show (Did Not Attend) rate as a percentage (min: 5%, max: 8%)",
        kind: QuestionKind::Number {
            min: 5.0,
            max: Some(8.0),
        },
    },
    Question {
        field: QuizField::AvgRevenuePerAppointment,
        title: "Average revenue per attended appointment",
        kind: QuestionKind::Number {
            min: 68.49,
            max: None,
        },
    },
    Question {
        field: QuizField::MonthlyWage,
        title: "Monthly Average wage for receptionist/s incl. 12% super (Sick leave and Annual leave not included)",
        kind: QuestionKind::Number { min: 1.0, max: None },
    },
];

/// Quiz questions in the order they are asked
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

/// What is wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Problem {
    #[error("an answer is required")]
    Missing,
    #[error("must be a number")]
    NotANumber,
    #[error("must be at least {min}")]
    BelowMinimum { min: f64 },
    #[error("must be at most {max}")]
    AboveMaximum { max: f64 },
    #[error("cannot exceed the daily call volume")]
    ExceedsCallVolume,
    #[error("choose at most {max} options")]
    #[serde(rename_all = "camelCase")]
    TooManySelections { max: usize },
    #[error("not one of the listed options")]
    UnknownOption,
    #[error("must be a valid email address")]
    InvalidEmail,
    #[error("consent is required")]
    ConsentRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[error("{field}: {problem}")]
pub struct ValidationIssue {
    pub field: &'static str,
    pub problem: Problem,
}

impl ValidationIssue {
    fn new(field: &'static str, problem: Problem) -> Self {
        Self { field, problem }
    }
}

/// Check the calculator answers the way the quiz form does
pub fn validate_answers(answers: &QuestionnaireAnswers) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_label(&mut issues, "providers", &answers.providers, |s| {
        HcpBand::from_label(s).is_some()
    });
    check_label(&mut issues, "preferredPricing", &answers.preferred_pricing, |s| {
        ContractTerm::from_label(s).is_some()
    });
    check_label(&mut issues, "billingModel", &answers.billing_model, |s| {
        BillingModel::from_label(s).is_some()
    });

    let call_volume = check_number(&mut issues, "callVolume", &answers.call_volume, 1.0, None);
    if let Some(unanswered) =
        check_number(&mut issues, "unansweredCalls", &answers.unanswered_calls, 1.0, None)
    {
        if call_volume.is_some_and(|volume| unanswered > volume) {
            issues.push(ValidationIssue::new("unansweredCalls", Problem::ExceedsCallVolume));
        }
    }
    check_number(&mut issues, "afterHoursCalls", &answers.after_hours_calls, 1.0, None);
    check_number(&mut issues, "noShowRate", &answers.no_show_rate, 5.0, Some(8.0));
    check_number(
        &mut issues,
        "avgRevenuePerAppointment",
        &answers.avg_revenue_per_appointment,
        68.49,
        None,
    );
    check_number(&mut issues, "monthlyWage", &answers.monthly_wage, 1.0, None);

    issues
}

/// Check the role and practice profile steps
pub fn validate_profile(contact: &ContactDetails, profile: &PracticeProfile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if check_option(&mut issues, "role", &contact.role, ROLES) {
        if contact.role == ROLE_OTHER {
            require(&mut issues, "roleOther", &contact.role_other);
        } else if require(&mut issues, "clinicCountBand", &profile.clinic_count_band) {
            check_option(
                &mut issues,
                "clinicCountBand",
                &profile.clinic_count_band,
                CLINIC_COUNT_BANDS,
            );
        }
    }

    if check_option(&mut issues, "software", &profile.software, SOFTWARE)
        && profile.software == SOFTWARE_OTHER
    {
        require(&mut issues, "softwareOther", &profile.software_other);
    }

    check_option(&mut issues, "timeline", &profile.timeline, TIMELINES);

    if profile.priorities.is_empty() {
        issues.push(ValidationIssue::new("priorities", Problem::Missing));
    } else if profile.priorities.len() > MAX_PRIORITIES {
        issues.push(ValidationIssue::new(
            "priorities",
            Problem::TooManySelections { max: MAX_PRIORITIES },
        ));
    }
    if profile
        .priorities
        .iter()
        .any(|p| !PRIORITIES.contains(&p.as_str()))
    {
        issues.push(ValidationIssue::new("priorities", Problem::UnknownOption));
    }

    issues
}

/// Check the lead step: names, email, phone, state and all three consents
pub fn validate_contact(contact: &ContactDetails, consent: &Consent) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    require(&mut issues, "firstName", &contact.first_name);
    require(&mut issues, "lastName", &contact.last_name);
    if require(&mut issues, "email", &contact.email) && !EMAIL.is_match(contact.email.trim()) {
        issues.push(ValidationIssue::new("email", Problem::InvalidEmail));
    }
    require(&mut issues, "phone", &contact.phone);
    if require(&mut issues, "state", &contact.state) && !is_australian_state(&contact.state) {
        issues.push(ValidationIssue::new("state", Problem::UnknownOption));
    }

    for (field, given) in [
        ("consentMarketing", consent.marketing),
        ("consentData", consent.data),
        ("consentContact", consent.contact),
    ] {
        if !given {
            issues.push(ValidationIssue::new(field, Problem::ConsentRequired));
        }
    }

    issues
}

/// Accepts the full label ("Victoria (VIC)") or the bare code ("VIC")
fn is_australian_state(value: &str) -> bool {
    let value = value.trim();
    AUSTRALIAN_STATES.iter().any(|label| {
        *label == value
            || label
                .rsplit_once('(')
                .and_then(|(_, code)| code.strip_suffix(')'))
                .is_some_and(|code| code.eq_ignore_ascii_case(value))
    })
}

fn require(issues: &mut Vec<ValidationIssue>, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(field, Problem::Missing));
        false
    } else {
        true
    }
}

fn check_option(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: &str,
    options: &[&str],
) -> bool {
    if !require(issues, field, value) {
        return false;
    }
    if options.contains(&value.trim()) {
        true
    } else {
        issues.push(ValidationIssue::new(field, Problem::UnknownOption));
        false
    }
}

fn check_label(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    value: &str,
    known: impl Fn(&str) -> bool,
) {
    if require(issues, field, value) && !known(value) {
        issues.push(ValidationIssue::new(field, Problem::UnknownOption));
    }
}

fn check_number(
    issues: &mut Vec<ValidationIssue>,
    field: &'static str,
    raw: &str,
    min: f64,
    max: Option<f64>,
) -> Option<f64> {
    if !require(issues, field, raw) {
        return None;
    }
    let Some(value) = parse_amount(raw) else {
        issues.push(ValidationIssue::new(field, Problem::NotANumber));
        return None;
    };
    if value < min {
        issues.push(ValidationIssue::new(field, Problem::BelowMinimum { min }));
        return None;
    }
    if let Some(max) = max.filter(|max| value > *max) {
        issues.push(ValidationIssue::new(field, Problem::AboveMaximum { max }));
        return None;
    }
    Some(value)
}

/// Where the visitor is in the quiz. A question index past the last
/// question is rejected when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "index",
    rename_all = "camelCase",
    try_from = "UncheckedStep"
)]
pub enum Step {
    Question(usize),
    /// Contact details and consent, after the last question
    Lead,
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
enum UncheckedStep {
    Question(usize),
    Lead,
}

impl TryFrom<UncheckedStep> for Step {
    type Error = String;

    fn try_from(step: UncheckedStep) -> Result<Self, Self::Error> {
        match step {
            UncheckedStep::Question(index) if index < QUESTIONS.len() => Ok(Step::Question(index)),
            UncheckedStep::Question(index) => Err(format!(
                "question index {} out of range (0..{})",
                index,
                QUESTIONS.len()
            )),
            UncheckedStep::Lead => Ok(Step::Lead),
        }
    }
}

/// Immutable quiz state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    step: Step,
    answers: QuestionnaireAnswers,
    contact: ContactDetails,
    profile: PracticeProfile,
    consent: Consent,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Session on the first question. Average revenue starts pre-filled with
    /// the minimum, as the form does.
    pub fn new() -> Self {
        Self {
            step: Step::Question(0),
            answers: QuestionnaireAnswers {
                avg_revenue_per_appointment: "68.49".to_string(),
                ..Default::default()
            },
            contact: ContactDetails::default(),
            profile: PracticeProfile::default(),
            consent: Consent::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn answers(&self) -> &QuestionnaireAnswers {
        &self.answers
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    pub fn profile(&self) -> &PracticeProfile {
        &self.profile
    }

    pub fn consent(&self) -> Consent {
        self.consent
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        match self.step {
            Step::Question(index) => QUESTIONS.get(index),
            Step::Lead => None,
        }
    }

    pub fn is_on_lead_step(&self) -> bool {
        self.step == Step::Lead
    }

    /// Percent shown in the progress bar. The lead step counts as one more
    /// step and shows 100.
    pub fn progress_percent(&self) -> u8 {
        match self.step {
            Step::Question(index) => {
                let total = QUESTIONS.len() + 1;
                let done = index.min(QUESTIONS.len() - 1) + 1;
                ((done * 100 + total / 2) / total) as u8
            }
            Step::Lead => 100,
        }
    }

    /// Record an answer. For [`QuizField::Priorities`] the value toggles one
    /// option; a fourth selection is ignored.
    pub fn answer(&self, field: QuizField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            QuizField::Role => {
                if next.contact.role != value {
                    next.contact.role_other.clear();
                    next.profile.clinic_count_band.clear();
                }
                next.contact.role = value;
            }
            QuizField::Software => {
                if value != SOFTWARE_OTHER {
                    next.profile.software_other.clear();
                }
                next.profile.software = value;
            }
            QuizField::Timeline => next.profile.timeline = value,
            QuizField::Priorities => {
                let selected = &mut next.profile.priorities;
                if let Some(pos) = selected.iter().position(|p| *p == value) {
                    selected.remove(pos);
                } else if selected.len() < MAX_PRIORITIES {
                    selected.push(value);
                } else {
                    tracing::debug!(option = %value, "Priority selection limit reached");
                }
            }
            QuizField::Providers => next.answers.providers = value,
            QuizField::PreferredPricing => next.answers.preferred_pricing = value,
            QuizField::BillingModel => next.answers.billing_model = value,
            QuizField::CallVolume => next.answers.call_volume = value,
            QuizField::UnansweredCalls => next.answers.unanswered_calls = value,
            QuizField::AfterHoursCalls => next.answers.after_hours_calls = value,
            QuizField::NoShowRate => next.answers.no_show_rate = value,
            QuizField::AvgRevenuePerAppointment => next.answers.avg_revenue_per_appointment = value,
            QuizField::MonthlyWage => next.answers.monthly_wage = value,
        }
        next
    }

    pub fn with_role_other(&self, role: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.contact.role_other = role.into();
        next
    }

    pub fn with_clinic_count_band(&self, band: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.profile.clinic_count_band = band.into();
        next
    }

    pub fn with_software_other(&self, software: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.profile.software_other = software.into();
        next
    }

    /// Replace the lead-step contact fields, keeping the role answers
    pub fn with_contact(&self, contact: ContactDetails) -> Self {
        let mut next = self.clone();
        next.contact = ContactDetails {
            role: self.contact.role.clone(),
            role_other: self.contact.role_other.clone(),
            ..contact
        };
        next
    }

    pub fn with_consent(&self, consent: Consent) -> Self {
        let mut next = self.clone();
        next.consent = consent;
        next
    }

    /// Issues that stop the visitor leaving the current step
    pub fn blocking_issues(&self) -> Vec<ValidationIssue> {
        match self.current_question() {
            Some(question) => {
                let keys = question.field.step_keys();
                validate_answers(&self.answers)
                    .into_iter()
                    .chain(validate_profile(&self.contact, &self.profile))
                    .filter(|issue| keys.contains(&issue.field))
                    .collect()
            }
            None => validate_contact(&self.contact, &self.consent),
        }
    }

    /// Advance one question, or to the lead step from the last question.
    /// On the lead step this is a no-op.
    pub fn next(&self) -> Result<Self, Vec<ValidationIssue>> {
        let issues = self.blocking_issues();
        if !issues.is_empty() {
            return Err(issues);
        }
        let mut next = self.clone();
        next.step = match self.step {
            Step::Question(index) if index + 1 < QUESTIONS.len() => Step::Question(index + 1),
            Step::Question(_) | Step::Lead => Step::Lead,
        };
        Ok(next)
    }

    /// Go back one step. The lead step returns to the last question and the
    /// first question stays put.
    pub fn back(&self) -> Self {
        let mut next = self.clone();
        next.step = match self.step {
            Step::Question(index) => Step::Question(index.saturating_sub(1)),
            Step::Lead => Step::Question(QUESTIONS.len() - 1),
        };
        next
    }

    /// True when every step and the lead step are complete
    pub fn is_ready_to_submit(&self) -> bool {
        self.is_on_lead_step()
            && validate_answers(&self.answers).is_empty()
            && validate_profile(&self.contact, &self.profile).is_empty()
            && validate_contact(&self.contact, &self.consent).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_answers() -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            providers: "1–5".into(),
            preferred_pricing: "Flexible".into(),
            billing_model: "per-use".into(),
            call_volume: "120".into(),
            unanswered_calls: "30".into(),
            after_hours_calls: "5".into(),
            no_show_rate: "7".into(),
            avg_revenue_per_appointment: "75".into(),
            monthly_wage: "6000".into(),
            ..Default::default()
        }
    }

    fn valid_contact() -> ContactDetails {
        ContactDetails {
            first_name: "Alex".into(),
            last_name: "Chen".into(),
            email: "alex@clinic.com.au".into(),
            phone: "0400 123 456".into(),
            role: "Practice Owner".into(),
            state: "Victoria (VIC)".into(),
            ..Default::default()
        }
    }

    fn fields(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|issue| issue.field).collect()
    }

    #[test]
    fn test_question_order() {
        let keys: Vec<_> = questions().iter().map(|q| q.field.key()).collect();
        assert_eq!(keys.len(), 13);
        assert_eq!(keys[0], "role");
        assert_eq!(keys[4], "providers");
        assert_eq!(keys[12], "monthlyWage");
    }

    #[test]
    fn test_valid_answers_pass() {
        assert!(validate_answers(&valid_answers()).is_empty());
    }

    #[test]
    fn test_unanswered_cannot_exceed_volume() {
        let answers = QuestionnaireAnswers {
            unanswered_calls: "150".into(),
            ..valid_answers()
        };
        let issues = validate_answers(&answers);
        assert_eq!(
            issues,
            vec![ValidationIssue::new("unansweredCalls", Problem::ExceedsCallVolume)]
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let answers = QuestionnaireAnswers {
            no_show_rate: "9".into(),
            avg_revenue_per_appointment: "50".into(),
            monthly_wage: "abc".into(),
            after_hours_calls: String::new(),
            ..valid_answers()
        };
        let issues = validate_answers(&answers);

        assert!(issues.contains(&ValidationIssue::new(
            "noShowRate",
            Problem::AboveMaximum { max: 8.0 }
        )));
        assert!(issues.contains(&ValidationIssue::new(
            "avgRevenuePerAppointment",
            Problem::BelowMinimum { min: 68.49 }
        )));
        assert!(issues.contains(&ValidationIssue::new("monthlyWage", Problem::NotANumber)));
        assert!(issues.contains(&ValidationIssue::new("afterHoursCalls", Problem::Missing)));
    }

    #[test]
    fn test_profile_rules() {
        let mut contact = valid_contact();
        let mut profile = PracticeProfile {
            software: "Other".into(),
            timeline: "Immediately".into(),
            priorities: vec!["Reduce costs".into()],
            ..Default::default()
        };
        let issues = validate_profile(&contact, &profile);
        assert_eq!(fields(&issues), vec!["clinicCountBand", "softwareOther"]);

        contact.role = "Other".into();
        profile.software_other = "Zedmed".into();
        let issues = validate_profile(&contact, &profile);
        assert_eq!(fields(&issues), vec!["roleOther"]);

        profile.priorities = PRIORITIES[..4].iter().map(|p| p.to_string()).collect();
        contact.role_other = "Nurse unit manager".into();
        let issues = validate_profile(&contact, &profile);
        assert_eq!(
            issues,
            vec![ValidationIssue::new(
                "priorities",
                Problem::TooManySelections { max: 3 }
            )]
        );
    }

    #[test]
    fn test_contact_rules() {
        assert!(validate_contact(&valid_contact(), &Consent::all()).is_empty());

        let contact = ContactDetails {
            email: "not-an-email".into(),
            state: "VIC".into(),
            phone: String::new(),
            ..valid_contact()
        };
        let issues = validate_contact(&contact, &Consent::default());
        assert_eq!(
            fields(&issues),
            vec!["email", "phone", "consentMarketing", "consentData", "consentContact"]
        );

        let elsewhere = ContactDetails {
            state: "Auckland".into(),
            ..valid_contact()
        };
        assert_eq!(
            validate_contact(&elsewhere, &Consent::all()),
            vec![ValidationIssue::new("state", Problem::UnknownOption)]
        );
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new("noShowRate", Problem::BelowMinimum { min: 5.0 });
        assert_eq!(issue.to_string(), "noShowRate: must be at least 5");
    }

    #[test]
    fn test_session_is_immutable() {
        let start = QuizSession::new();
        let answered = start.answer(QuizField::Role, "Practice Manager");

        assert_eq!(start.contact().role, "");
        assert_eq!(answered.contact().role, "Practice Manager");
    }

    #[test]
    fn test_next_blocks_until_step_complete() {
        let session = QuizSession::new().answer(QuizField::Role, "Practice Owner");
        let issues = session.next().unwrap_err();
        assert_eq!(fields(&issues), vec!["clinicCountBand"]);

        let moved = session.with_clinic_count_band("1-3").next().unwrap();
        assert_eq!(moved.step(), Step::Question(1));
        assert_eq!(moved.current_question().map(|q| q.field), Some(QuizField::Software));
    }

    #[test]
    fn test_priorities_toggle_with_limit() {
        let mut session = QuizSession::new();
        for option in PRIORITIES {
            session = session.answer(QuizField::Priorities, *option);
        }
        assert_eq!(session.profile().priorities.len(), 3);

        let session = session.answer(QuizField::Priorities, "Reduce costs");
        assert_eq!(
            session.profile().priorities,
            vec!["Improve patient experience", "Increase revenue"]
        );
    }

    #[test]
    fn test_full_walk_to_lead_step() {
        let answers = valid_answers();
        let steps: Vec<(QuizField, String)> = vec![
            (QuizField::Role, "Practice Owner".into()),
            (QuizField::Software, "Best Practice".into()),
            (QuizField::Timeline, "Within 1 month".into()),
            (QuizField::Priorities, "Increase revenue".into()),
            (QuizField::Providers, answers.providers.clone()),
            (QuizField::PreferredPricing, answers.preferred_pricing.clone()),
            (QuizField::BillingModel, answers.billing_model.clone()),
            (QuizField::CallVolume, answers.call_volume.clone()),
            (QuizField::UnansweredCalls, answers.unanswered_calls.clone()),
            (QuizField::AfterHoursCalls, answers.after_hours_calls.clone()),
            (QuizField::NoShowRate, answers.no_show_rate.clone()),
            (QuizField::AvgRevenuePerAppointment, answers.avg_revenue_per_appointment.clone()),
            (QuizField::MonthlyWage, answers.monthly_wage.clone()),
        ];

        let mut session = QuizSession::new();
        assert_eq!(session.progress_percent(), 7);
        for (field, value) in steps {
            session = session.answer(field, value);
            if field == QuizField::Role {
                session = session.with_clinic_count_band("3-5");
            }
            session = session.next().unwrap();
        }

        assert!(session.is_on_lead_step());
        assert_eq!(session.progress_percent(), 100);
        assert!(!session.is_ready_to_submit());

        let ready = session
            .with_contact(valid_contact())
            .with_consent(Consent::all());
        assert!(ready.is_ready_to_submit());
        assert_eq!(ready.contact().role, "Practice Owner");

        let back = ready.back();
        assert_eq!(back.step(), Step::Question(12));
        assert_eq!(back.progress_percent(), 93);
    }

    #[test]
    fn test_back_from_first_question_stays() {
        let session = QuizSession::new();
        assert_eq!(session.back().step(), Step::Question(0));
    }

    #[test]
    fn test_out_of_range_step_is_rejected() {
        let mut json = serde_json::to_value(QuizSession::new()).unwrap();

        json["step"]["index"] = serde_json::json!(QUESTIONS.len() - 1);
        let last: QuizSession = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(last.step(), Step::Question(QUESTIONS.len() - 1));

        for index in [serde_json::json!(QUESTIONS.len()), serde_json::json!(1000), serde_json::json!(u64::MAX)] {
            json["step"]["index"] = index.clone();
            assert!(
                serde_json::from_value::<QuizSession>(json.clone()).is_err(),
                "index {} was accepted",
                index
            );
        }
    }

    #[test]
    fn test_lead_step_deserializes() {
        let mut json = serde_json::to_value(QuizSession::new()).unwrap();
        json["step"] = serde_json::json!({"kind": "lead"});

        let session: QuizSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.step(), Step::Lead);
        assert_eq!(session.progress_percent(), 100);
    }
}
