use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::daily_report::{
    CreateDailyReportRequest, DailyReport, DailyReportDetail, DailyReportQuery,
    DailyReportWithGoals, UpdateDailyReportRequest,
};
use crate::models::item::{GoodPoint, Improvement};
use crate::services::associations;
use crate::AppState;

pub async fn create_daily_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateDailyReportRequest>,
) -> AppResult<Json<DailyReportWithGoals>> {
    let report_date = body.report_date.unwrap_or_else(|| Utc::now().date_naive());
    let goal_ids = dedup(body.goal_ids.unwrap_or_default());
    ensure_goals_owned(&state.db, auth_user.id, &goal_ids).await?;

    let mut tx = state.db.begin().await?;

    let report = sqlx::query_as::<_, DailyReport>(
        r#"
        INSERT INTO daily_reports (id, user_id, report_date, events, learnings)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(report_date)
    .bind(body.events.as_deref().unwrap_or(""))
    .bind(body.learnings.as_deref().unwrap_or(""))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(
            e,
            AppError::Conflict("A report already exists for this date".into()),
        )
    })?;

    insert_goal_links(&mut tx, report.id, &goal_ids).await?;
    tx.commit().await?;

    let goals = associations::goals_for_daily_reports(&state.db, auth_user.id, &[report.id])
        .await?
        .remove(&report.id)
        .unwrap_or_default();

    Ok(Json(DailyReportWithGoals { report, goals }))
}

pub async fn list_daily_reports(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<Vec<DailyReportWithGoals>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let reports = sqlx::query_as::<_, DailyReport>(
        r#"
        SELECT * FROM daily_reports
        WHERE user_id = $1 AND report_date BETWEEN $2 AND $3
        ORDER BY report_date DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    // One batched lookup for all goal associations, not one query per report.
    let report_ids: Vec<Uuid> = reports.iter().map(|r| r.id).collect();
    let mut goals_by_report =
        associations::goals_for_daily_reports(&state.db, auth_user.id, &report_ids).await?;

    let result = reports
        .into_iter()
        .map(|report| {
            let goals = goals_by_report.remove(&report.id).unwrap_or_default();
            DailyReportWithGoals { report, goals }
        })
        .collect();

    Ok(Json(result))
}

pub async fn get_daily_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<DailyReportDetail>> {
    let report = fetch_owned_report(&state.db, auth_user.id, report_id).await?;

    let goals = associations::goals_for_daily_reports(&state.db, auth_user.id, &[report.id])
        .await?
        .remove(&report.id)
        .unwrap_or_default();

    let good_points = sqlx::query_as::<_, GoodPoint>(
        "SELECT * FROM good_points WHERE daily_report_id = $1 ORDER BY created_at ASC",
    )
    .bind(report.id)
    .fetch_all(&state.db)
    .await?;

    let improvements = sqlx::query_as::<_, Improvement>(
        "SELECT * FROM improvements WHERE daily_report_id = $1 ORDER BY created_at ASC",
    )
    .bind(report.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(DailyReportDetail {
        report,
        goals,
        good_points,
        improvements,
    }))
}

pub async fn update_daily_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
    Json(body): Json<UpdateDailyReportRequest>,
) -> AppResult<Json<DailyReportWithGoals>> {
    fetch_owned_report(&state.db, auth_user.id, report_id).await?;

    let goal_ids = body.goal_ids.map(dedup);
    if let Some(ids) = &goal_ids {
        ensure_goals_owned(&state.db, auth_user.id, ids).await?;
    }

    let mut tx = state.db.begin().await?;

    let report = sqlx::query_as::<_, DailyReport>(
        r#"
        UPDATE daily_reports SET
            events = COALESCE($3, events),
            learnings = COALESCE($4, learnings),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(report_id)
    .bind(auth_user.id)
    .bind(&body.events)
    .bind(&body.learnings)
    .fetch_one(&mut *tx)
    .await?;

    // goal_ids present = replace the whole association set.
    if let Some(ids) = &goal_ids {
        sqlx::query("DELETE FROM daily_report_goals WHERE daily_report_id = $1")
            .bind(report_id)
            .execute(&mut *tx)
            .await?;
        insert_goal_links(&mut tx, report_id, ids).await?;
    }

    tx.commit().await?;

    let goals = associations::goals_for_daily_reports(&state.db, auth_user.id, &[report.id])
        .await?
        .remove(&report.id)
        .unwrap_or_default();

    Ok(Json(DailyReportWithGoals { report, goals }))
}

pub async fn delete_daily_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Cascades to good points, improvements and goal links.
    let result = sqlx::query("DELETE FROM daily_reports WHERE id = $1 AND user_id = $2")
        .bind(report_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Daily report not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub(crate) async fn fetch_owned_report(
    db: &sqlx::PgPool,
    user_id: Uuid,
    report_id: Uuid,
) -> AppResult<DailyReport> {
    sqlx::query_as::<_, DailyReport>("SELECT * FROM daily_reports WHERE id = $1 AND user_id = $2")
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Daily report not found".into()))
}

async fn ensure_goals_owned(
    db: &sqlx::PgPool,
    user_id: Uuid,
    goal_ids: &[Uuid],
) -> AppResult<()> {
    if goal_ids.is_empty() {
        return Ok(());
    }

    let owned = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM goals WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(goal_ids)
    .fetch_one(db)
    .await?;

    if owned != goal_ids.len() as i64 {
        return Err(AppError::Validation(
            "One or more goals do not exist".into(),
        ));
    }
    Ok(())
}

async fn insert_goal_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    report_id: Uuid,
    goal_ids: &[Uuid],
) -> AppResult<()> {
    for goal_id in goal_ids {
        sqlx::query(
            r#"
            INSERT INTO daily_report_goals (id, daily_report_id, goal_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (daily_report_id, goal_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report_id)
        .bind(goal_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup(vec![a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup(vec![]).is_empty());
    }
}
