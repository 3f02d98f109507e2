use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::goal::{CreateGoalRequest, Goal, UpdateGoalRequest};
use crate::services::goals;
use crate::AppState;

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<Json<Goal>> {
    let goal = goals::create_goal(&state.db, auth_user.id, body).await?;
    Ok(Json(goal))
}

pub async fn list_root_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let roots = goals::list_roots(&state.db, auth_user.id).await?;
    Ok(Json(roots))
}

pub async fn get_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Goal>> {
    let goal = goals::get_goal(&state.db, auth_user.id, goal_id).await?;
    Ok(Json(goal))
}

pub async fn list_goal_children(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<Vec<Goal>>> {
    let children = goals::list_children(&state.db, auth_user.id, goal_id).await?;
    Ok(Json(children))
}

pub async fn update_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalRequest>,
) -> AppResult<Json<Goal>> {
    let goal = goals::update_goal(&state.db, auth_user.id, goal_id, body).await?;
    Ok(Json(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    goals::delete_goal(&state.db, auth_user.id, goal_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
