use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::followup::{
    CreateFollowupRequest, Followup, FollowupQuery, UpdateFollowupRequest,
};
use crate::services::{associations, items};
use crate::AppState;

pub async fn create_followup(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateFollowupRequest>,
) -> AppResult<Json<Followup>> {
    let (owner_id, _) = items::resolve_item(&state.db, body.item_type, body.item_id)
        .await?
        .ok_or(AppError::NotFound("Item not found".into()))?;

    if owner_id != auth_user.id {
        return Err(AppError::Forbidden);
    }

    let followup = sqlx::query_as::<_, Followup>(
        r#"
        INSERT INTO followups (id, user_id, item_type, item_id, memo, followup_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.item_type)
    .bind(body.item_id)
    .bind(&body.memo)
    .bind(body.followup_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(followup))
}

pub async fn list_followups(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<FollowupQuery>,
) -> AppResult<Json<Vec<Followup>>> {
    let followups = associations::followups_for_item(
        &state.db,
        auth_user.id,
        query.item_type,
        query.item_id,
    )
    .await?;

    Ok(Json(followups))
}

pub async fn update_followup(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFollowupRequest>,
) -> AppResult<Json<Followup>> {
    let followup = sqlx::query_as::<_, Followup>(
        r#"
        UPDATE followups SET
            status = COALESCE($3, status),
            memo = COALESCE($4, memo),
            followup_date = COALESCE($5, followup_date)
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(body.status)
    .bind(&body.memo)
    .bind(body.followup_date)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Followup not found".into()))?;

    Ok(Json(followup))
}

pub async fn delete_followup(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM followups WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Followup not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
