use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::weekly_focus::{AddFocusRequest, WeeklyFocusWithItem};
use crate::services::weekly_focus;
use crate::AppState;

pub async fn list_current_focuses(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<WeeklyFocusWithItem>>> {
    let focuses = weekly_focus::current_focuses(&state.db, auth_user.id).await?;
    Ok(Json(focuses))
}

pub async fn add_focus(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<AddFocusRequest>,
) -> AppResult<Json<WeeklyFocusWithItem>> {
    let focus = weekly_focus::add_focus(&state.db, auth_user.id, body).await?;
    Ok(Json(focus))
}

pub async fn remove_focus(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(focus_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    weekly_focus::remove_focus(&state.db, auth_user.id, focus_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
