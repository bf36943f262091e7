use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::schema::profiles;

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub goal: Option<String>,
    pub skills: serde_json::Value,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub website_url: Option<String>,
    pub avatar_url: Option<String>,
    pub onboarding_step: i16,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub user_id: Uuid,
}

// --- Step 1: personal info ---

#[derive(Debug, AsChangeset)]
#[diesel(table_name = profiles, treat_none_as_null = true)]
pub struct PersonalChanges {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub onboarding_step: i16,
}

// --- Step 2: professional background ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_experience_years"))]
pub struct ExperienceEntry {
    #[validate(length(min = 1, max = 120, message = "company must be 1-120 characters"))]
    pub company: String,
    #[validate(length(min = 1, max = 120, message = "title must be 1-120 characters"))]
    pub title: String,
    #[validate(range(min = 1950, max = 2100))]
    pub start_year: i32,
    #[validate(range(min = 1950, max = 2100))]
    pub end_year: Option<i32>,
}

fn validate_experience_years(entry: &ExperienceEntry) -> Result<(), ValidationError> {
    match entry.end_year {
        Some(end) if end < entry.start_year => {
            let mut err = ValidationError::new("end_before_start");
            err.message = Some("end_year must not be before start_year".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EducationEntry {
    #[validate(length(min = 1, max = 120, message = "school must be 1-120 characters"))]
    pub school: String,
    #[validate(length(max = 120))]
    pub degree: Option<String>,
    #[validate(length(max = 120))]
    pub field: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub graduation_year: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfessionalChanges {
    pub goal: String,
    pub skills: serde_json::Value,
    pub experience: serde_json::Value,
    pub education: serde_json::Value,
    pub onboarding_step: i16,
}

// --- Step 3: social links ---

/// `None` leaves a column untouched, `Some(None)` clears it.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct SocialChanges {
    pub github_url: Option<Option<String>>,
    pub linkedin_url: Option<Option<String>>,
    pub twitter_url: Option<Option<String>>,
    pub website_url: Option<Option<String>>,
    pub onboarding_step: Option<i16>,
}

// --- Batch lookup (service-to-service) ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProfileCard {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub avatar_url: Option<String>,
    pub goal: Option<String>,
    pub is_online: bool,
}

impl ProfileCard {
    pub fn from_profile(p: &Profile, is_online: bool) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name.clone(),
            headline: p.headline.clone(),
            avatar_url: p.avatar_url.clone(),
            goal: p.goal.clone(),
            is_online,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(start: i32, end: Option<i32>) -> ExperienceEntry {
        ExperienceEntry {
            company: "Acme".into(),
            title: "Engineer".into(),
            start_year: start,
            end_year: end,
        }
    }

    #[test]
    fn experience_years_must_be_ordered() {
        assert!(job(2018, Some(2021)).validate().is_ok());
        assert!(job(2018, Some(2018)).validate().is_ok());
        assert!(job(2018, None).validate().is_ok());
        assert!(job(2021, Some(2018)).validate().is_err());
    }

    #[test]
    fn experience_requires_company_and_title() {
        let mut entry = job(2018, None);
        entry.company = String::new();
        assert!(entry.validate().is_err());
    }

    #[test]
    fn education_year_range() {
        let entry = EducationEntry {
            school: "MIT".into(),
            degree: Some("BSc".into()),
            field: None,
            graduation_year: Some(1800),
        };
        assert!(entry.validate().is_err());
    }
}
