//! SQL for the directory operations.
//!
//! Two rules hold everywhere in this module: untrusted input reaches the
//! store only through bind parameters (identifiers spliced into statements
//! come from the allow-lists in [`params`](crate::directory::params)), and
//! no statement joins a user to more than one child table at a time. Child
//! collections are fetched separately and stitched together in
//! [`shaping`](crate::directory::shaping), so row counts stay honest and
//! the page COUNT never drifts with the number of skills or resumes.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::errors::AppError;
use crate::models::resume::{
    EducationRow, ExperienceSpanRow, PersonalInfoRow, ResumeRow, UserLocationRow,
    WorkExperienceRow,
};
use crate::models::skill::UserSkillRow;
use crate::models::user::UserRow;

use super::params::{ListParams, SortColumn};

/// The one column set every user-shaped SELECT uses, so [`UserRow`] maps
/// cleanly no matter which operation fetched it.
pub const USER_COLUMNS: &str = "u.user_id, u.email, u.name, u.phone, u.residence, \
     u.profile_pic, u.preferred_role, u.full_time, u.part_time, u.full_time_status, \
     u.work_availability, u.full_time_salary, u.full_time_salary_currency, \
     u.part_time_salary, u.part_time_salary_currency, u.is_active, u.is_complete, \
     u.pre_vetted_at, u.summary, u.created_at, u.last_login";

/// One page of users plus the filter-wide total, counted independently of
/// LIMIT/OFFSET.
pub struct UserPageRows {
    pub rows: Vec<UserRow>,
    pub total_users: i64,
}

/// Wraps a raw filter term for LIKE matching: `%` and `_` (and the escape
/// character itself) are escaped so the term matches literally, then the
/// whole thing is wrapped in wildcards for substring search.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{escaped}%")
}

/// Builds the WHERE clause for `term_count` filter terms. Each term matches
/// when the user has a skill, name, or email containing it; terms are ANDed.
/// Returns the empty string for zero terms so callers can splice it directly.
///
/// Each term binds a single placeholder reused across its three predicates,
/// so term `i` (1-based) is `$i` and pagination binds continue after
/// `$term_count`.
fn filter_where_clause(term_count: usize) -> String {
    if term_count == 0 {
        return String::new();
    }

    let clauses: Vec<String> = (1..=term_count)
        .map(|n| {
            format!(
                "(EXISTS (SELECT 1 FROM user_skills us \
                 JOIN skills s ON s.skill_id = us.skill_id \
                 WHERE us.user_id = u.user_id AND s.skill_name ILIKE ${n}) \
                 OR u.name ILIKE ${n} OR u.email ILIKE ${n})"
            )
        })
        .collect();

    format!(" WHERE {}", clauses.join(" AND "))
}

/// The pair of statements behind the listing operation, plus the bind
/// patterns they share.
pub struct ListStatements {
    pub count_sql: String,
    pub page_sql: String,
    pub patterns: Vec<String>,
}

pub fn build_list_statements(params: &ListParams) -> ListStatements {
    let patterns: Vec<String> = params
        .filter_terms
        .iter()
        .map(|term| like_pattern(term))
        .collect();
    let where_clause = filter_where_clause(patterns.len());

    // Email and name are not unique; without a final sort key the page
    // windows shift between requests whenever values tie.
    let order_by = match params.sort_by {
        SortColumn::UserId => format!("u.user_id {}", params.sort_order.as_sql()),
        other => format!("{} {}, u.user_id", other.as_sql(), params.sort_order.as_sql()),
    };

    let count_sql = format!("SELECT COUNT(*) FROM users u{where_clause}");
    let page_sql = format!(
        "SELECT {USER_COLUMNS} FROM users u{where_clause} ORDER BY {order_by} LIMIT ${} OFFSET ${}",
        patterns.len() + 1,
        patterns.len() + 2,
    );

    ListStatements {
        count_sql,
        page_sql,
        patterns,
    }
}

/// Runs the listing pair: an unpaginated COUNT over the filtered set, then
/// the requested page. Asking for a page past the end is not an error; the
/// row set is simply empty while the count still reflects the whole filter.
pub async fn fetch_user_page(pool: &PgPool, params: &ListParams) -> Result<UserPageRows, AppError> {
    let statements = build_list_statements(params);
    debug!(
        page = params.page,
        page_size = params.page_size,
        terms = statements.patterns.len(),
        "running user page query"
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&statements.count_sql);
    for pattern in &statements.patterns {
        count_query = count_query.bind(pattern);
    }
    let total_users = count_query
        .fetch_one(pool)
        .await
        .map_err(AppError::store("user count query"))?;

    let mut page_query = sqlx::query_as::<_, UserRow>(&statements.page_sql);
    for pattern in &statements.patterns {
        page_query = page_query.bind(pattern);
    }
    let rows = page_query
        .bind(params.page_size)
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .map_err(AppError::store("user page query"))?;

    Ok(UserPageRows { rows, total_users })
}

/// Assembles `prefix ( $1, $2, ... ) suffix` with one bind per id.
fn in_list_query<'a>(
    prefix: &str,
    ids: &'a [String],
    suffix: &str,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new(prefix);
    builder.push(" (");
    {
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
    }
    builder.push(")");
    builder.push(suffix);
    builder
}

/// Fetches full user rows for the given ids. Unknown ids are simply absent
/// from the result; row order is whatever the store returns.
pub async fn fetch_users_by_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<UserRow>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    debug!(count = ids.len(), "running users-by-ids query");

    let mut builder = in_list_query(
        &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id IN"),
        ids,
        "",
    );
    builder
        .build_query_as::<UserRow>()
        .fetch_all(pool)
        .await
        .map_err(AppError::store("users by ids query"))
}

/// Skill names for a set of users, ordered per user by display order with
/// name as the tie-breaker so concatenation is deterministic.
pub async fn fetch_skills_for_users(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<UserSkillRow>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = in_list_query(
        "SELECT us.user_id, s.skill_name FROM user_skills us \
         JOIN skills s ON s.skill_id = us.skill_id WHERE us.user_id IN",
        ids,
        " ORDER BY us.user_id, us.display_order, s.skill_name",
    );
    builder
        .build_query_as::<UserSkillRow>()
        .fetch_all(pool)
        .await
        .map_err(AppError::store("user skills query"))
}

/// Location from each user's most recent resume's personal information.
/// `DISTINCT ON` with the `created_at DESC` sort keeps exactly the newest
/// resume per user; users without resumes produce no row.
pub async fn fetch_locations_for_users(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<UserLocationRow>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = in_list_query(
        "SELECT DISTINCT ON (r.user_id) r.user_id, p.location FROM resumes r \
         JOIN personal_information p ON p.resume_id = r.resume_id WHERE r.user_id IN",
        ids,
        " ORDER BY r.user_id, r.created_at DESC",
    );
    builder
        .build_query_as::<UserLocationRow>()
        .fetch_all(pool)
        .await
        .map_err(AppError::store("user locations query"))
}

/// Every work-experience date span across all of a user's resumes. Spans
/// are summed in memory; rows with a missing endpoint still come back so
/// the summation policy lives in one place.
pub async fn fetch_experience_spans(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<ExperienceSpanRow>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = in_list_query(
        "SELECT r.user_id, we.start_date, we.end_date FROM work_experiences we \
         JOIN resumes r ON r.resume_id = we.resume_id WHERE r.user_id IN",
        ids,
        "",
    );
    builder
        .build_query_as::<ExperienceSpanRow>()
        .fetch_all(pool)
        .await
        .map_err(AppError::store("experience spans query"))
}

pub async fn fetch_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<UserRow>, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::store("user by id query"))
}

/// The user's most recent resume, or `None` when they have none.
pub async fn fetch_latest_resume(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<ResumeRow>, AppError> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT r.resume_id, r.url, r.filename, r.source, r.created_at, r.updated_at \
         FROM resumes r WHERE r.user_id = $1 ORDER BY r.created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::store("latest resume query"))
}

pub async fn fetch_personal_info(
    pool: &PgPool,
    resume_id: &str,
) -> Result<Option<PersonalInfoRow>, AppError> {
    sqlx::query_as::<_, PersonalInfoRow>(
        "SELECT p.name, p.location, p.email, p.phone FROM personal_information p \
         WHERE p.resume_id = $1",
    )
    .bind(resume_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::store("personal information query"))
}

pub async fn fetch_work_experiences(
    pool: &PgPool,
    resume_id: &str,
) -> Result<Vec<WorkExperienceRow>, AppError> {
    sqlx::query_as::<_, WorkExperienceRow>(
        "SELECT we.company, we.role, we.description, we.location_city, we.location_country, \
         we.start_date, we.end_date FROM work_experiences we \
         WHERE we.resume_id = $1 ORDER BY we.start_date ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::store("work experiences query"))
}

pub async fn fetch_education(
    pool: &PgPool,
    resume_id: &str,
) -> Result<Vec<EducationRow>, AppError> {
    sqlx::query_as::<_, EducationRow>(
        "SELECT e.school, e.degree, e.start_date, e.end_date FROM education e \
         WHERE e.resume_id = $1 ORDER BY e.start_date ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::store("education query"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::params::{ListParams, ListUsersQuery};

    fn params_for(query: ListUsersQuery) -> ListParams {
        ListParams::from_query(query).unwrap()
    }

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("O'Brien"), "%O'Brien%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn unfiltered_statements_have_no_where_clause() {
        let statements = build_list_statements(&params_for(ListUsersQuery::default()));
        assert_eq!(statements.count_sql, "SELECT COUNT(*) FROM users u");
        assert_eq!(
            statements.page_sql,
            format!(
                "SELECT {USER_COLUMNS} FROM users u ORDER BY u.user_id ASC LIMIT $1 OFFSET $2"
            )
        );
        assert!(statements.patterns.is_empty());
    }

    #[test]
    fn each_filter_term_gets_one_placeholder_reused_three_times() {
        let statements = build_list_statements(&params_for(ListUsersQuery {
            filter: Some("rust, tokio".to_string()),
            ..Default::default()
        }));

        assert_eq!(statements.patterns, vec!["%rust%", "%tokio%"]);
        assert_eq!(statements.page_sql.matches("$1").count(), 3);
        assert_eq!(statements.page_sql.matches("$2").count(), 3);
        assert!(statements.page_sql.contains(" AND "));
        assert!(statements.page_sql.ends_with("LIMIT $3 OFFSET $4"));
        assert_eq!(statements.count_sql.matches("$1").count(), 3);
        assert!(!statements.count_sql.contains("LIMIT"));
        assert!(!statements.count_sql.contains("OFFSET"));
    }

    #[test]
    fn count_statement_ignores_pagination_and_sorting() {
        let statements = build_list_statements(&params_for(ListUsersQuery {
            page: Some(7),
            page_size: Some(50),
            sort_by: Some("email".to_string()),
            sort_order: Some("DESC".to_string()),
            ..Default::default()
        }));
        assert_eq!(statements.count_sql, "SELECT COUNT(*) FROM users u");
        assert!(statements.page_sql.contains("ORDER BY u.email DESC, u.user_id"));
    }

    #[test]
    fn non_unique_sort_columns_carry_a_stable_tie_breaker() {
        let statements = build_list_statements(&params_for(ListUsersQuery {
            sort_by: Some("name".to_string()),
            ..Default::default()
        }));
        assert!(statements
            .page_sql
            .contains("ORDER BY u.name ASC, u.user_id LIMIT"));

        // The id sort is already total and gets no second key.
        let statements = build_list_statements(&params_for(ListUsersQuery::default()));
        assert_eq!(statements.page_sql.matches("u.user_id").count(), 2);
    }

    #[test]
    fn filter_text_never_lands_in_the_statement() {
        let hostile = "x'; DROP TABLE users; --";
        let statements = build_list_statements(&params_for(ListUsersQuery {
            filter: Some(hostile.to_string()),
            ..Default::default()
        }));
        assert!(!statements.page_sql.contains("DROP TABLE"));
        assert!(!statements.count_sql.contains("DROP TABLE"));
        assert_eq!(statements.patterns, vec!["%x'; DROP TABLE users; --%".to_string()]);
    }

    #[test]
    fn in_list_query_binds_one_placeholder_per_id() {
        let ids = vec!["u1".to_string(), "u2".to_string()];
        let builder = in_list_query("SELECT x FROM t WHERE id IN", &ids, " ORDER BY id");
        assert_eq!(
            builder.sql(),
            "SELECT x FROM t WHERE id IN ($1, $2) ORDER BY id"
        );
    }
}
