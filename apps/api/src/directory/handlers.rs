//! HTTP handlers for the directory routes. Each one validates input,
//! delegates to the operations in [`super`], and wraps the result in the
//! envelope shape the route promises.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

use super::params::{self, ListParams, ListUsersQuery};
use super::shaping::{UserComparison, UserProfile, UserSummary};

#[derive(Debug, Serialize)]
pub struct UserPageBody {
    pub results: Vec<UserSummary>,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// `GET /users` envelope. The capitalized `Users` key is part of the wire
/// contract, as is nesting `results` and `totalPages` under it.
#[derive(Debug, Serialize)]
pub struct UsersPageResponse {
    #[serde(rename = "Users")]
    pub users: UserPageBody,
}

/// `POST /users-by-ids` envelope: same key, but a bare list.
#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    #[serde(rename = "Users")]
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub comparison: UserComparison,
}

pub async fn handle_list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UsersPageResponse>, AppError> {
    let list_params = ListParams::from_query(query)?;
    let (results, total_pages) = super::get_users(&state.db, &list_params).await?;
    Ok(Json(UsersPageResponse {
        users: UserPageBody {
            results,
            total_pages,
        },
    }))
}

pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = super::get_user(&state.db, &user_id).await?;
    Ok(Json(profile))
}

pub async fn handle_compare_users(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<ComparisonResponse>, AppError> {
    let (first_id, second_id) = params::comparison_ids(&body)?;
    let comparison = super::compare_users(&state.db, &first_id, &second_id).await?;
    Ok(Json(ComparisonResponse { comparison }))
}

pub async fn handle_users_by_ids(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<UsersListResponse>, AppError> {
    let ids = params::batch_ids(&body)?;
    let users = super::get_users_by_ids(&state.db, &ids).await?;
    Ok(Json(UsersListResponse { users }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_envelope_nests_results_under_capitalized_users() {
        let response = UsersPageResponse {
            users: UserPageBody {
                results: Vec::new(),
                total_pages: 0,
            },
        };
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["Users"]["totalPages"], 0);
        assert_eq!(body["Users"]["results"], json!([]));
        assert!(body.get("users").is_none());
    }

    #[test]
    fn batch_envelope_is_a_bare_list_under_the_same_key() {
        let response = UsersListResponse { users: Vec::new() };
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["Users"], json!([]));
    }
}
