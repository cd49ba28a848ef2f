//! Lead payload sent to the capture endpoint

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roi_quiz_core::{
    CalculationResult, Consent, ContactDetails, PracticeProfile, QuestionnaireAnswers,
    RetryContact,
};

/// Everything the visitor entered, as received from the quiz
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    /// Set by clients that retry on their own, so the same lead is not
    /// recorded twice
    pub client_submission_id: Option<Uuid>,
    pub answers: QuestionnaireAnswers,
    pub contact: ContactDetails,
    pub profile: PracticeProfile,
    pub consent: Consent,
}

/// Calculated figures sent with the lead, per clinic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMetrics {
    /// Net monthly profit
    pub total_monthly_savings: i64,
    pub total_annual_impact: i64,
    /// Annual staffing savings
    pub staffing_savings: i64,
    /// Annual revenue recovered from missed calls
    pub revenue_savings: i64,
    /// Annual no-show savings
    pub no_show_savings: i64,
    pub human_monthly_cost: i64,
    pub ai_monthly_cost: i64,
    pub setup_fee: i64,
    pub year1_total_cost: i64,
}

impl LeadMetrics {
    pub fn from_result(result: &CalculationResult) -> Self {
        let figures = &result.per_clinic;
        Self {
            total_monthly_savings: figures.net_monthly_profit,
            total_annual_impact: figures.total_annual_impact,
            staffing_savings: figures.annual_staff_saved,
            revenue_savings: figures.annual_recovered_revenue,
            no_show_savings: figures.annual_no_show_savings,
            human_monthly_cost: figures.human_monthly_cost,
            ai_monthly_cost: figures.monthly_ai_cost,
            setup_fee: result.plan.setup_fee,
            year1_total_cost: figures.year1_cost,
        }
    }
}

/// Flat JSON object posted to the lead capture endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub client_submission_id: Uuid,
    #[serde(flatten)]
    pub contact: ContactDetails,
    #[serde(flatten)]
    pub profile: PracticeProfile,
    #[serde(flatten)]
    pub answers: QuestionnaireAnswers,
    #[serde(flatten)]
    pub metrics: LeadMetrics,
    pub consent_marketing: bool,
    pub consent_data: bool,
    pub consent_contact: bool,
}

impl LeadPayload {
    pub fn build(id: Uuid, submission: &LeadSubmission, result: &CalculationResult) -> Self {
        Self {
            client_submission_id: id,
            contact: submission.contact.clone(),
            profile: submission.profile.clone(),
            answers: submission.answers.clone(),
            metrics: LeadMetrics::from_result(result),
            consent_marketing: submission.consent.marketing,
            consent_data: submission.consent.data,
            consent_contact: submission.consent.contact,
        }
    }
}

/// Reduced payload replayed from the retry queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPayload<'a> {
    pub client_submission_id: Uuid,
    #[serde(flatten)]
    pub contact: &'a RetryContact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use roi_quiz_core::{calculate, PricingTable};

    fn submission() -> LeadSubmission {
        LeadSubmission {
            client_submission_id: None,
            answers: QuestionnaireAnswers {
                providers: "1–5".into(),
                preferred_pricing: "Flexible".into(),
                billing_model: "per-use".into(),
                unanswered_calls: "50".into(),
                ..Default::default()
            },
            contact: ContactDetails {
                first_name: "Jo".into(),
                last_name: "Park".into(),
                email: "jo@clinic.com.au".into(),
                phone: "0412 345 678".into(),
                role: "Practice Manager".into(),
                state: "New South Wales (NSW)".into(),
                ..Default::default()
            },
            profile: PracticeProfile {
                priorities: vec!["Reduce costs".into(), "Increase revenue".into()],
                clinic_count_band: "1-3".into(),
                ..Default::default()
            },
            consent: Consent::all(),
        }
    }

    #[test]
    fn test_payload_is_flat() {
        let submission = submission();
        let result = calculate(&submission.answers, &PricingTable::standard());
        let id = Uuid::new_v4();
        let json = serde_json::to_value(LeadPayload::build(id, &submission, &result)).unwrap();

        assert_eq!(json["clientSubmissionId"], id.to_string());
        assert_eq!(json["firstName"], "Jo");
        assert_eq!(json["clinicCountBand"], "1-3");
        assert_eq!(json["priorities"][1], "Increase revenue");
        assert_eq!(json["preferredPricing"], "Flexible");
        assert_eq!(json["aiMonthlyCost"], 763);
        assert_eq!(json["setupFee"], 599);
        assert_eq!(json["year1TotalCost"], 9755);
        assert_eq!(json["staffingSavings"], 23100);
        assert_eq!(json["humanMonthlyCost"], 5500);
        assert_eq!(json["consentData"], true);
        assert!(json.get("clinicCount").is_none());
    }

    #[test]
    fn test_metrics_use_net_monthly_profit() {
        let submission = submission();
        let result = calculate(&submission.answers, &PricingTable::standard());
        let metrics = LeadMetrics::from_result(&result);

        assert_eq!(metrics.total_monthly_savings, result.per_clinic.net_monthly_profit);
        assert_eq!(metrics.revenue_savings, result.per_clinic.annual_recovered_revenue);
    }

    #[test]
    fn test_submission_deserializes_partial_body() {
        let submission: LeadSubmission = serde_json::from_value(serde_json::json!({
            "answers": {"providers": "6–10", "unansweredCalls": 12},
            "contact": {"firstName": "Jo", "email": "jo@clinic.com.au"},
            "consent": {"marketing": true, "data": true, "contact": true}
        }))
        .unwrap();

        assert_eq!(submission.answers.unanswered_calls, "12");
        assert_eq!(submission.contact.first_name, "Jo");
        assert!(submission.profile.priorities.is_empty());
        assert!(submission.consent.is_complete());
        assert!(submission.client_submission_id.is_none());
    }

    #[test]
    fn test_retry_payload_shape() {
        let contact = submission().contact.retry_contact();
        let id = Uuid::new_v4();
        let json = serde_json::to_value(RetryPayload {
            client_submission_id: id,
            contact: &contact,
        })
        .unwrap();

        assert_eq!(json.as_object().unwrap().len(), 7);
        assert_eq!(json["email"], "jo@clinic.com.au");
        assert_eq!(json["state"], "New South Wales (NSW)");
    }
}
