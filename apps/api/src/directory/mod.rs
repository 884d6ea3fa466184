//! The talent directory: read-only operations over users, their skills,
//! and the history carried by their resumes.
//!
//! Layering: [`params`] validates requests, [`queries`] talks to the
//! store, [`shaping`] assembles rows into wire types, and the functions
//! here sequence the three. [`handlers`] binds them to routes.

pub mod handlers;
pub mod params;
pub mod queries;
pub mod shaping;

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::UserRow;

use params::ListParams;
use shaping::{ComparisonSide, UserComparison, UserProfile, UserSummary};

/// Lists one page of users with the filter-wide page count.
pub async fn get_users(
    pool: &PgPool,
    list_params: &ListParams,
) -> Result<(Vec<UserSummary>, i64), AppError> {
    let page = queries::fetch_user_page(pool, list_params).await?;
    let total_pages = shaping::total_pages(page.total_users, list_params.page_size);
    let summaries = summarize(pool, page.rows).await?;
    Ok((summaries, total_pages))
}

/// Enriches base rows into summaries: three child queries keyed by the
/// rows' ids, then in-memory assembly. Row order is preserved.
async fn summarize(pool: &PgPool, rows: Vec<UserRow>) -> Result<Vec<UserSummary>, AppError> {
    let ids: Vec<String> = rows.iter().map(|row| row.user_id.clone()).collect();

    let skills = shaping::concat_skills(&queries::fetch_skills_for_users(pool, &ids).await?);
    let locations = shaping::location_map(queries::fetch_locations_for_users(pool, &ids).await?);
    let experience =
        shaping::total_experience_days(&queries::fetch_experience_spans(pool, &ids).await?);

    Ok(shaping::assemble_summaries(rows, &skills, &locations, &experience))
}

/// Fetches one user's full record. The latest resume (when there is one)
/// scopes the personal information, work experience, and education lists.
pub async fn get_user(pool: &PgPool, user_id: &str) -> Result<UserProfile, AppError> {
    let row = queries::fetch_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let skill_rows =
        queries::fetch_skills_for_users(pool, std::slice::from_ref(&row.user_id)).await?;
    let skills = shaping::concat_skills(&skill_rows)
        .remove(user_id)
        .unwrap_or_default();

    let resume = queries::fetch_latest_resume(pool, user_id).await?;
    let (personal_info, work_experiences, education) = match &resume {
        Some(resume) => (
            queries::fetch_personal_info(pool, &resume.resume_id).await?,
            queries::fetch_work_experiences(pool, &resume.resume_id).await?,
            queries::fetch_education(pool, &resume.resume_id).await?,
        ),
        None => (None, Vec::new(), Vec::new()),
    };

    Ok(shaping::assemble_profile(
        row,
        skills,
        resume,
        personal_info,
        work_experiences,
        education,
    ))
}

/// Compares two users field by field. Sides follow request order. Anything
/// short of two distinct matching rows (unknown ids, or the same id twice)
/// is `NotFound`.
pub async fn compare_users(
    pool: &PgPool,
    first_id: &str,
    second_id: &str,
) -> Result<UserComparison, AppError> {
    let ids = [first_id.to_string(), second_id.to_string()];
    let rows = queries::fetch_users_by_ids(pool, &ids).await?;

    let mut first_row = None;
    let mut second_row = None;
    for row in rows {
        if row.user_id == first_id && first_row.is_none() {
            first_row = Some(row);
        } else if row.user_id == second_id {
            second_row = Some(row);
        }
    }
    let (first_row, second_row) = match (first_row, second_row) {
        (Some(first), Some(second)) => (first, second),
        _ => {
            return Err(AppError::NotFound(
                "One or both users not found".to_string(),
            ))
        }
    };

    let skill_rows = queries::fetch_skills_for_users(pool, &ids).await?;
    let experience =
        shaping::total_experience_days(&queries::fetch_experience_spans(pool, &ids).await?);

    let side = |row: UserRow| {
        let skills = shaping::sorted_skills(&skill_rows, &row.user_id);
        let total_experience_days = experience.get(&row.user_id).copied().unwrap_or(0);
        ComparisonSide {
            row,
            skills,
            total_experience_days,
        }
    };

    Ok(shaping::build_comparison(side(first_row), side(second_row)))
}

/// Fetches summaries for an explicit id list, in request order. Ids that
/// match no user are left out of the result without erroring.
pub async fn get_users_by_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<UserSummary>, AppError> {
    let rows = queries::fetch_users_by_ids(pool, ids).await?;
    let summaries = summarize(pool, rows).await?;
    Ok(shaping::order_by_requested(summaries, ids))
}
