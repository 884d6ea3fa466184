use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Resume upload metadata (`resumes` table). A user may have several;
/// profile and location lookups use the most recently created one.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub resume_id: String,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Contact fields extracted from a resume (`personal_information`),
/// overriding the account-level ones. One row per resume.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PersonalInfoRow {
    pub name: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// One work-experience entry attached to a resume. Serialized as-is into
/// the profile's `workExperiences` array.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceRow {
    pub company: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub location_city: Option<String>,
    pub location_country: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One education entry attached to a resume.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EducationRow {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A work-experience date range keyed by user, used to derive the
/// `totalExperience` aggregate without joining children into the base query.
#[derive(Debug, Clone, FromRow)]
pub struct ExperienceSpanRow {
    pub user_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// The `location` of a user's most recent resume's personal information.
#[derive(Debug, Clone, FromRow)]
pub struct UserLocationRow {
    pub user_id: String,
    pub location: Option<String>,
}
