//! Handlers for good points and improvements. The two kinds live in separate
//! tables but share the request/response shapes; followups are attached via
//! the tagged (item_type, item_id) reference.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::daily_reports::fetch_owned_report;
use crate::models::followup::Followup;
use crate::models::item::{
    CreateItemRequest, GoodPoint, Improvement, ItemType, UpdateItemRequest,
};
use crate::services::associations;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GoodPointDetail {
    #[serde(flatten)]
    pub good_point: GoodPoint,
    pub followups: Vec<Followup>,
}

#[derive(Debug, Serialize)]
pub struct ImprovementDetail {
    #[serde(flatten)]
    pub improvement: Improvement,
    pub followups: Vec<Followup>,
}

// ── Good points ──────────────────────────────────────────────────────────

pub async fn create_good_point(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    Json(body): Json<CreateItemRequest>,
) -> AppResult<Json<GoodPoint>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    fetch_owned_report(&state.db, auth_user.id, report_id).await?;

    let good_point = sqlx::query_as::<_, GoodPoint>(
        r#"
        INSERT INTO good_points (id, user_id, daily_report_id, content, factors)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(report_id)
    .bind(&body.content)
    .bind(&body.factors)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(good_point))
}

pub async fn get_good_point(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<GoodPointDetail>> {
    let good_point = sqlx::query_as::<_, GoodPoint>(
        "SELECT * FROM good_points WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Good point not found".into()))?;

    let followups =
        associations::followups_for_item(&state.db, auth_user.id, ItemType::GoodPoint, id).await?;

    Ok(Json(GoodPointDetail {
        good_point,
        followups,
    }))
}

pub async fn update_good_point(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> AppResult<Json<GoodPoint>> {
    let good_point = sqlx::query_as::<_, GoodPoint>(
        r#"
        UPDATE good_points SET
            content = COALESCE($3, content),
            factors = COALESCE($4, factors),
            status = COALESCE($5, status),
            success_count = COALESCE($6, success_count),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(&body.factors)
    .bind(body.status)
    .bind(body.success_count)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Good point not found".into()))?;

    Ok(Json(good_point))
}

pub async fn delete_good_point(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM good_points WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Good point not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

// ── Improvements ─────────────────────────────────────────────────────────

pub async fn create_improvement(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    Json(body): Json<CreateItemRequest>,
) -> AppResult<Json<Improvement>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    fetch_owned_report(&state.db, auth_user.id, report_id).await?;

    let improvement = sqlx::query_as::<_, Improvement>(
        r#"
        INSERT INTO improvements (id, user_id, daily_report_id, content, factors, action)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(report_id)
    .bind(&body.content)
    .bind(&body.factors)
    .bind(&body.action)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(improvement))
}

pub async fn get_improvement(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ImprovementDetail>> {
    let improvement = sqlx::query_as::<_, Improvement>(
        "SELECT * FROM improvements WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Improvement not found".into()))?;

    let followups =
        associations::followups_for_item(&state.db, auth_user.id, ItemType::Improvement, id)
            .await?;

    Ok(Json(ImprovementDetail {
        improvement,
        followups,
    }))
}

pub async fn update_improvement(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateItemRequest>,
) -> AppResult<Json<Improvement>> {
    let improvement = sqlx::query_as::<_, Improvement>(
        r#"
        UPDATE improvements SET
            content = COALESCE($3, content),
            factors = COALESCE($4, factors),
            action = COALESCE($5, action),
            status = COALESCE($6, status),
            success_count = COALESCE($7, success_count),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(&body.factors)
    .bind(&body.action)
    .bind(body.status)
    .bind(body.success_count)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Improvement not found".into()))?;

    Ok(Json(improvement))
}

pub async fn delete_improvement(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM improvements WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Improvement not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
