use sqlx::FromRow;

/// One (user, skill name) pair from the `user_skills`/`skills` join.
/// Rows arrive ordered by the per-user `display_order`, so consumers can
/// concatenate names in stored order without re-sorting.
#[derive(Debug, Clone, FromRow)]
pub struct UserSkillRow {
    pub user_id: String,
    pub skill_name: String,
}
