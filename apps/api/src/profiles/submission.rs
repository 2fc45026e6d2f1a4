use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::profile::{
    AdditionalInfo, CompanyStatus, PersonalInfo, ProfessionalInfo, ProfileFields,
};

/// Raw body posted by the profile form (or an interactive email form).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSubmission {
    #[serde(alias = "uploadToken")]
    pub token: Option<String>,
    pub recipient_email: Option<String>,
    pub full_name: Option<String>,
    pub company_status: Option<String>,
    pub new_skills: Option<String>,
    pub current_role: Option<String>,
    pub company_name: Option<String>,
    /// Years of experience; forms send it as a string, API clients sometimes as a number.
    pub experience_years: Option<Value>,
}

/// A submission that passed validation, already normalized into the stored schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSubmission {
    pub token: String,
    pub fields: ProfileFields,
}

impl ValidSubmission {
    /// Uses `email` for the contact and sent-to addresses when the form left them out.
    pub fn fill_missing_email(&mut self, email: &str) {
        let email = normalize_email(Some(email));
        if self.fields.personal_info.email.is_empty() {
            self.fields.personal_info.email = email.clone();
        }
        if self.fields.email_sent_to.is_empty() {
            self.fields.email_sent_to = email;
        }
    }
}

impl ProfileSubmission {
    /// Checks required fields in order (token, full name, company status); first failure wins.
    pub fn validate(&self) -> Result<ValidSubmission, AppError> {
        let token = trimmed(self.token.as_deref());
        if token.is_empty() {
            return Err(AppError::Validation(
                "Submission token is required".to_string(),
            ));
        }

        let full_name = trimmed(self.full_name.as_deref());
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        let raw_status = trimmed(self.company_status.as_deref());
        if raw_status.is_empty() {
            return Err(AppError::Validation(
                "Company status is required".to_string(),
            ));
        }
        let company_status = CompanyStatus::parse(&raw_status).ok_or_else(|| {
            AppError::Validation(format!(
                "Company status must be 'yes' or 'no', got '{raw_status}'"
            ))
        })?;

        let email = normalize_email(self.recipient_email.as_deref());

        Ok(ValidSubmission {
            token,
            fields: ProfileFields {
                personal_info: PersonalInfo {
                    full_name,
                    email: email.clone(),
                    phone: String::new(),
                    address: String::new(),
                },
                professional_info: ProfessionalInfo {
                    current_position: trimmed(self.current_role.as_deref()),
                    company_name: trimmed(self.company_name.as_deref()),
                    company_status,
                    experience: format_experience(self.experience_years.as_ref()),
                    skills: trimmed(self.new_skills.as_deref()),
                },
                additional_info: AdditionalInfo::default(),
                email_sent_to: email,
            },
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn normalize_email(value: Option<&str>) -> String {
    trimmed(value).to_lowercase()
}

/// Turns a years count into its display form: `5` → "5 years", `1` → "1 year".
/// Fractional numbers keep their digits whether sent as JSON numbers or strings;
/// text that is not a number is kept as written.
pub fn format_experience(value: Option<&Value>) -> String {
    let years = match value {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(years) => years,
            None => return format!("{n} years"),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return String::new();
            }
            match s.parse::<u64>() {
                Ok(years) => years,
                Err(_) => match s.parse::<f64>() {
                    Ok(years) if years.is_finite() => return format!("{years} years"),
                    _ => return s.to_string(),
                },
            }
        }
        _ => return String::new(),
    };
    if years == 1 {
        "1 year".to_string()
    } else {
        format!("{years} years")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(body: Value) -> ProfileSubmission {
        serde_json::from_value(body).unwrap()
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_submission_is_normalized() {
        let valid = submission(json!({
            "token": " T1 ",
            "recipientEmail": "  Alice@Example.COM ",
            "fullName": "  Alice A ",
            "companyStatus": "YES",
            "newSkills": "Rust, SQL ",
            "currentRole": "Engineer",
            "companyName": " Acme ",
            "experienceYears": "5"
        }))
        .validate()
        .unwrap();

        assert_eq!(valid.token, "T1");
        let f = &valid.fields;
        assert_eq!(f.personal_info.full_name, "Alice A");
        assert_eq!(f.personal_info.email, "alice@example.com");
        assert_eq!(f.email_sent_to, "alice@example.com");
        assert_eq!(f.professional_info.company_status, CompanyStatus::Yes);
        assert_eq!(f.professional_info.company_name, "Acme");
        assert_eq!(f.professional_info.current_position, "Engineer");
        assert_eq!(f.professional_info.skills, "Rust, SQL");
        assert_eq!(f.professional_info.experience, "5 years");
        assert_eq!(f.additional_info, AdditionalInfo::default());
    }

    #[test]
    fn test_upload_token_alias_is_accepted() {
        let valid = submission(json!({
            "uploadToken": "legacy",
            "fullName": "Ben",
            "companyStatus": "no"
        }))
        .validate()
        .unwrap();
        assert_eq!(valid.token, "legacy");
    }

    #[test]
    fn test_missing_token_fails_first() {
        let err = submission(json!({})).validate().unwrap_err();
        assert_eq!(validation_message(err), "Submission token is required");
    }

    #[test]
    fn test_missing_full_name_fails_before_company_status() {
        let err = submission(json!({ "token": "t", "fullName": "   " }))
            .validate()
            .unwrap_err();
        assert_eq!(validation_message(err), "Full name is required");
    }

    #[test]
    fn test_missing_company_status() {
        let err = submission(json!({ "token": "t", "fullName": "Cy" }))
            .validate()
            .unwrap_err();
        assert_eq!(validation_message(err), "Company status is required");
    }

    #[test]
    fn test_unknown_company_status_is_rejected() {
        let err = submission(json!({ "token": "t", "fullName": "Cy", "companyStatus": "maybe" }))
            .validate()
            .unwrap_err();
        assert!(validation_message(err).contains("'yes' or 'no'"));
    }

    #[test]
    fn test_fill_missing_email_only_fills_blanks() {
        let mut valid = submission(json!({ "token": "t", "fullName": "Di", "companyStatus": "no" }))
            .validate()
            .unwrap();
        valid.fill_missing_email("Di@Example.com");
        assert_eq!(valid.fields.personal_info.email, "di@example.com");
        assert_eq!(valid.fields.email_sent_to, "di@example.com");

        let mut explicit = submission(json!({
            "token": "t", "fullName": "Di", "companyStatus": "no", "recipientEmail": "own@example.com"
        }))
        .validate()
        .unwrap();
        explicit.fill_missing_email("other@example.com");
        assert_eq!(explicit.fields.personal_info.email, "own@example.com");
    }

    #[test]
    fn test_format_experience() {
        assert_eq!(format_experience(Some(&json!("5"))), "5 years");
        assert_eq!(format_experience(Some(&json!(12))), "12 years");
        assert_eq!(format_experience(Some(&json!("1"))), "1 year");
        assert_eq!(format_experience(Some(&json!(" 3 "))), "3 years");
        assert_eq!(format_experience(Some(&json!(2.5))), "2.5 years");
        assert_eq!(format_experience(Some(&json!("2.5"))), "2.5 years");
        assert_eq!(format_experience(Some(&json!(" 0.5 "))), "0.5 years");
        assert_eq!(format_experience(Some(&json!("NaN"))), "NaN");
        assert_eq!(format_experience(Some(&json!("about ten"))), "about ten");
        assert_eq!(format_experience(Some(&json!(""))), "");
        assert_eq!(format_experience(Some(&Value::Null)), "");
        assert_eq!(format_experience(None), "");
    }
}
