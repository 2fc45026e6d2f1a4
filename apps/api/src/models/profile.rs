use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanyStatus {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    /// Storage default only; never accepted from a submission.
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl CompanyStatus {
    /// Parses a submitted value. Blank and unknown values are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(CompanyStatus::Yes),
            "no" => Some(CompanyStatus::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanyStatus::Yes => "yes",
            CompanyStatus::No => "no",
            CompanyStatus::Unset => "",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalInfo {
    pub current_position: String,
    pub company_name: String,
    pub company_status: CompanyStatus,
    pub experience: String,
    pub skills: String,
}

/// Reserved for future form fields; every current flow leaves these empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    pub education: String,
    pub achievements: String,
    pub goals: String,
}

/// The mutable part of a profile. A resubmission overwrites all of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFields {
    pub personal_info: PersonalInfo,
    pub professional_info: ProfessionalInfo,
    pub additional_info: AdditionalInfo,
    pub email_sent_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub profile_id: Uuid,
    pub token: String,
    pub personal_info: PersonalInfo,
    pub professional_info: ProfessionalInfo,
    pub additional_info: AdditionalInfo,
    pub email_sent_to: String,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn new(token: &str, fields: ProfileFields, now: DateTime<Utc>) -> Self {
        ProfileRecord {
            profile_id: Uuid::new_v4(),
            token: token.to_string(),
            personal_info: fields.personal_info,
            professional_info: fields.professional_info,
            additional_info: fields.additional_info,
            email_sent_to: fields.email_sent_to,
            submitted_at: now,
            updated_at: now,
        }
    }

    /// Full overwrite of the mutable groups; identity and `submitted_at` stay.
    pub fn overwrite(&mut self, fields: ProfileFields, now: DateTime<Utc>) {
        self.personal_info = fields.personal_info;
        self.professional_info = fields.professional_info;
        self.additional_info = fields.additional_info;
        self.email_sent_to = fields.email_sent_to;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub profile_id: Uuid,
    pub token: String,
    pub personal_info: Json<PersonalInfo>,
    pub professional_info: Json<ProfessionalInfo>,
    pub additional_info: Json<AdditionalInfo>,
    pub email_sent_to: String,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        ProfileRecord {
            profile_id: row.profile_id,
            token: row.token,
            personal_info: row.personal_info.0,
            professional_info: row.professional_info.0,
            additional_info: row.additional_info.0,
            email_sent_to: row.email_sent_to,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        }
    }
}
