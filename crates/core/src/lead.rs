//! Contact and practice details captured on the lead step

use serde::{Deserialize, Serialize};

/// Who to contact about the quote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    /// Free-text role, only used when `role` is "Other"
    pub role_other: String,
    /// Australian state or territory code
    pub state: String,
    pub preferred_call_time: String,
}

impl ContactDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Reduced record kept for retrying a failed submission
    pub fn retry_contact(&self) -> RetryContact {
        RetryContact {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role.clone(),
            state: self.state.clone(),
        }
    }
}

/// Practice details from the profile questions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeProfile {
    pub software: String,
    pub software_other: String,
    pub priorities: Vec<String>,
    pub timeline: String,
    /// Clinic count band ("1-3", "3-5", "5-7", "7+"), asked of non-"Other" roles.
    /// Informational only; never used as a calculation multiplier.
    pub clinic_count_band: String,
    pub fte_receptionists: String,
}

/// Consents ticked on the lead step. All three are required to submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consent {
    pub marketing: bool,
    pub data: bool,
    pub contact: bool,
}

impl Consent {
    pub fn all() -> Self {
        Self {
            marketing: true,
            data: true,
            contact: true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.marketing && self.data && self.contact
    }
}

/// Minimal contact record queued when a submission fails
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub state: String,
}
