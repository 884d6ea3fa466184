use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row of the `users` table.
///
/// Every operation selects exactly this column set (see
/// `directory::queries::USER_COLUMNS`), so the listing, batch and profile
/// paths cannot drift apart. Ids are opaque strings assigned by the
/// upstream ingestion pipeline; this service never parses them.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub residence: Option<String>,
    pub profile_pic: Option<String>,
    pub preferred_role: Option<String>,
    pub full_time: bool,
    pub part_time: bool,
    pub full_time_status: Option<String>,
    pub work_availability: Option<String>,
    pub full_time_salary: Option<f64>,
    pub full_time_salary_currency: Option<String>,
    pub part_time_salary: Option<f64>,
    pub part_time_salary_currency: Option<String>,
    pub is_active: bool,
    pub is_complete: bool,
    pub pre_vetted_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
