//! Response shaping for the directory operations.
//!
//! The queries in this crate deliberately return flat row sets (users,
//! skills, locations, date spans) instead of joined fan-outs. This module
//! owns the other half of that bargain: grouping child rows by user and
//! assembling the wire types, with one defaulting policy for users that
//! have no skills, no resume, or no dated work history.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::resume::{
    EducationRow, ExperienceSpanRow, PersonalInfoRow, ResumeRow, UserLocationRow,
    WorkExperienceRow,
};
use crate::models::skill::UserSkillRow;
use crate::models::user::UserRow;

pub const SKILL_SEPARATOR: &str = ", ";

/// Groups skill rows by user and joins each group into a single string.
/// Row order (the store sorts by display order) is preserved; repeated
/// names keep their first occurrence. Users without skills get no entry.
pub fn concat_skills(rows: &[UserSkillRow]) -> HashMap<String, String> {
    let mut names: HashMap<String, Vec<&str>> = HashMap::new();
    for row in rows {
        let list = names.entry(row.user_id.clone()).or_default();
        if !list.contains(&row.skill_name.as_str()) {
            list.push(&row.skill_name);
        }
    }
    names
        .into_iter()
        .map(|(user_id, list)| (user_id, list.join(SKILL_SEPARATOR)))
        .collect()
}

/// One user's skills in alphabetical order. This is the canonical form for
/// comparison: two users with the same skill set produce identical strings
/// regardless of display order.
pub fn sorted_skills(rows: &[UserSkillRow], user_id: &str) -> String {
    let mut names: Vec<&str> = rows
        .iter()
        .filter(|row| row.user_id == user_id)
        .map(|row| row.skill_name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names.join(SKILL_SEPARATOR)
}

/// Days covered by one work-experience span. Spans missing either endpoint
/// contribute nothing, and a span that ends before it starts clamps to zero
/// rather than subtracting from the total.
fn span_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => (end - start).num_days().max(0),
        _ => 0,
    }
}

/// Sums work-experience spans per user, in whole days.
pub fn total_experience_days(rows: &[ExperienceSpanRow]) -> HashMap<String, i64> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for row in rows {
        *totals.entry(row.user_id.clone()).or_insert(0) +=
            span_days(row.start_date, row.end_date);
    }
    totals
}

pub fn location_map(rows: Vec<UserLocationRow>) -> HashMap<String, Option<String>> {
    rows.into_iter()
        .map(|row| (row.user_id, row.location))
        .collect()
}

/// Page count for a filtered total. `page_size` is already validated to be
/// at least 1, so zero matches mean zero pages and anything else rounds up.
pub fn total_pages(total_users: i64, page_size: i64) -> i64 {
    (total_users + page_size - 1) / page_size
}

/// One user as the listing and batch operations return them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub residence: Option<String>,
    pub profile_pic: Option<String>,
    pub full_time_salary: Option<f64>,
    pub full_time_salary_currency: Option<String>,
    pub part_time_salary: Option<f64>,
    pub part_time_salary_currency: Option<String>,
    pub preferred_role: Option<String>,
    pub full_time: bool,
    pub part_time: bool,
    pub work_availability: Option<String>,
    pub is_active: bool,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub skills: String,
    #[serde(rename = "totalExperience")]
    pub total_experience_days: i64,
}

/// Combines base rows with the grouped child data. Output order follows
/// `rows`; users absent from a child map fall back to an empty skill
/// string, no location, and zero experience.
pub fn assemble_summaries(
    rows: Vec<UserRow>,
    skills: &HashMap<String, String>,
    locations: &HashMap<String, Option<String>>,
    experience: &HashMap<String, i64>,
) -> Vec<UserSummary> {
    rows.into_iter()
        .map(|row| {
            let user_skills = skills.get(&row.user_id).cloned().unwrap_or_default();
            let location = locations.get(&row.user_id).cloned().flatten();
            let total_experience_days = experience.get(&row.user_id).copied().unwrap_or(0);
            UserSummary {
                user_id: row.user_id,
                email: row.email,
                name: row.name,
                phone: row.phone,
                residence: row.residence,
                profile_pic: row.profile_pic,
                full_time_salary: row.full_time_salary,
                full_time_salary_currency: row.full_time_salary_currency,
                part_time_salary: row.part_time_salary,
                part_time_salary_currency: row.part_time_salary_currency,
                preferred_role: row.preferred_role,
                full_time: row.full_time,
                part_time: row.part_time,
                work_availability: row.work_availability,
                is_active: row.is_active,
                summary: row.summary,
                created_at: row.created_at,
                last_login: row.last_login,
                location,
                skills: user_skills,
                total_experience_days,
            }
        })
        .collect()
}

/// Reorders summaries to match the id order of the request. Ids with no
/// matching summary are skipped, which is how unknown ids stay silently
/// absent from batch responses.
pub fn order_by_requested(summaries: Vec<UserSummary>, ids: &[String]) -> Vec<UserSummary> {
    let mut by_id: HashMap<String, UserSummary> = summaries
        .into_iter()
        .map(|summary| (summary.user_id.clone(), summary))
        .collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// One comparable attribute, with a value per side.
#[derive(Debug, Serialize)]
pub struct Compared<T> {
    pub user1: T,
    pub user2: T,
}

/// The fixed attribute set the comparison operation reports. Every field
/// carries both sides even when the values are equal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserComparison {
    pub user_id: Compared<String>,
    pub name: Compared<Option<String>>,
    pub email: Compared<String>,
    pub profile_pic: Compared<Option<String>>,
    pub phone: Compared<Option<String>>,
    pub full_time_salary: Compared<Option<f64>>,
    pub full_time_salary_currency: Compared<Option<String>>,
    pub part_time_salary: Compared<Option<f64>>,
    pub part_time_salary_currency: Compared<Option<String>>,
    #[serde(rename = "totalExperience")]
    pub total_experience_days: Compared<i64>,
    pub skills: Compared<String>,
}

/// Everything the comparison needs about one side.
pub struct ComparisonSide {
    pub row: UserRow,
    pub skills: String,
    pub total_experience_days: i64,
}

/// Pivots two sides into the per-field comparison map. Side assignment is
/// positional: the first argument is `user1` everywhere.
pub fn build_comparison(user1: ComparisonSide, user2: ComparisonSide) -> UserComparison {
    let (r1, r2) = (user1.row, user2.row);
    UserComparison {
        user_id: Compared {
            user1: r1.user_id,
            user2: r2.user_id,
        },
        name: Compared {
            user1: r1.name,
            user2: r2.name,
        },
        email: Compared {
            user1: r1.email,
            user2: r2.email,
        },
        profile_pic: Compared {
            user1: r1.profile_pic,
            user2: r2.profile_pic,
        },
        phone: Compared {
            user1: r1.phone,
            user2: r2.phone,
        },
        full_time_salary: Compared {
            user1: r1.full_time_salary,
            user2: r2.full_time_salary,
        },
        full_time_salary_currency: Compared {
            user1: r1.full_time_salary_currency,
            user2: r2.full_time_salary_currency,
        },
        part_time_salary: Compared {
            user1: r1.part_time_salary,
            user2: r2.part_time_salary,
        },
        part_time_salary_currency: Compared {
            user1: r1.part_time_salary_currency,
            user2: r2.part_time_salary_currency,
        },
        total_experience_days: Compared {
            user1: user1.total_experience_days,
            user2: user2.total_experience_days,
        },
        skills: Compared {
            user1: user1.skills,
            user2: user2.skills,
        },
    }
}

/// The full single-user record: every user column plus the latest resume
/// and its children, kept as nested structures instead of flattened rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
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
    pub skills: String,
    pub resume: Option<ResumeRow>,
    pub personal_info: Option<PersonalInfoRow>,
    pub work_experiences: Vec<WorkExperienceRow>,
    pub education: Vec<EducationRow>,
}

pub fn assemble_profile(
    row: UserRow,
    skills: String,
    resume: Option<ResumeRow>,
    personal_info: Option<PersonalInfoRow>,
    work_experiences: Vec<WorkExperienceRow>,
    education: Vec<EducationRow>,
) -> UserProfile {
    UserProfile {
        user_id: row.user_id,
        email: row.email,
        name: row.name,
        phone: row.phone,
        residence: row.residence,
        profile_pic: row.profile_pic,
        preferred_role: row.preferred_role,
        full_time: row.full_time,
        part_time: row.part_time,
        full_time_status: row.full_time_status,
        work_availability: row.work_availability,
        full_time_salary: row.full_time_salary,
        full_time_salary_currency: row.full_time_salary_currency,
        part_time_salary: row.part_time_salary,
        part_time_salary_currency: row.part_time_salary_currency,
        is_active: row.is_active,
        is_complete: row.is_complete,
        pre_vetted_at: row.pre_vetted_at,
        summary: row.summary,
        created_at: row.created_at,
        last_login: row.last_login,
        skills,
        resume,
        personal_info,
        work_experiences,
        education,
    }
}
