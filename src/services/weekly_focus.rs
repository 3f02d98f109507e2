//! Weekly focus manager.
//!
//! A user pins good points or improvements as focuses for the current week
//! (partition key: Monday of the week, see [`crate::services::week`]). At most
//! five focuses per user per week, and an item can only be pinned once per
//! week. Both checks run inside the insert transaction; the unique index on
//! (user_id, week_start_date, item_type, item_id) closes the duplicate race at
//! the database level. Two concurrent inserts of distinct items can still both
//! pass the count check; accepted for a single-user tool.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::weekly_focus::{AddFocusRequest, WeeklyFocus, WeeklyFocusWithItem};
use crate::services::items::resolve_item;
use crate::services::week::current_week_start;

pub const MAX_FOCUSES_PER_WEEK: i64 = 5;

/// This week's focuses, each enriched with the item it references. A focus
/// whose item has since been deleted is still returned, with `item: null`.
pub async fn current_focuses(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<WeeklyFocusWithItem>> {
    let week_start_date = current_week_start();

    let focuses = sqlx::query_as::<_, WeeklyFocus>(
        r#"
        SELECT * FROM weekly_focuses
        WHERE user_id = $1 AND week_start_date = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(week_start_date)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(focuses.len());
    for focus in focuses {
        let item = resolve_item(pool, focus.item_type, focus.item_id)
            .await?
            .map(|(_, summary)| summary);
        result.push(WeeklyFocusWithItem { focus, item });
    }

    Ok(result)
}

pub async fn add_focus(
    pool: &PgPool,
    user_id: Uuid,
    req: AddFocusRequest,
) -> AppResult<WeeklyFocusWithItem> {
    let (owner_id, item) = resolve_item(pool, req.item_type, req.item_id)
        .await?
        .ok_or(AppError::NotFound("Item not found".into()))?;

    if owner_id != user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(goal_id) = req.goal_id {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM goals WHERE id = $1 AND user_id = $2)",
        )
        .bind(goal_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        if !exists {
            return Err(AppError::Validation("Goal not found".into()));
        }
    }

    let week_start_date = current_week_start();
    let mut tx = pool.begin().await?;

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM weekly_focuses WHERE user_id = $1 AND week_start_date = $2",
    )
    .bind(user_id)
    .bind(week_start_date)
    .fetch_one(&mut *tx)
    .await?;

    let already = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM weekly_focuses
            WHERE user_id = $1 AND week_start_date = $2 AND item_type = $3 AND item_id = $4
        )
        "#,
    )
    .bind(user_id)
    .bind(week_start_date)
    .bind(req.item_type)
    .bind(req.item_id)
    .fetch_one(&mut *tx)
    .await?;

    admission_decision(count, already)?;

    let focus = sqlx::query_as::<_, WeeklyFocus>(
        r#"
        INSERT INTO weekly_focuses (id, user_id, item_type, item_id, goal_id, week_start_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(req.item_type)
    .bind(req.item_id)
    .bind(req.goal_id)
    .bind(week_start_date)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(
            e,
            AppError::Duplicate("Item is already a focus for this week".into()),
        )
    })?;

    tx.commit().await?;

    Ok(WeeklyFocusWithItem {
        focus,
        item: Some(item),
    })
}

/// Capacity before duplicate: a full week reads as capacity exceeded even
/// when the item is also already pinned.
fn admission_decision(count_this_week: i64, already_pinned: bool) -> AppResult<()> {
    if count_this_week >= MAX_FOCUSES_PER_WEEK {
        return Err(AppError::Capacity(format!(
            "At most {} focuses per week",
            MAX_FOCUSES_PER_WEEK
        )));
    }
    if already_pinned {
        return Err(AppError::Duplicate(
            "Item is already a focus for this week".into(),
        ));
    }
    Ok(())
}

pub async fn remove_focus(pool: &PgPool, user_id: Uuid, focus_id: Uuid) -> AppResult<()> {
    let focus = sqlx::query_as::<_, WeeklyFocus>("SELECT * FROM weekly_focuses WHERE id = $1")
        .bind(focus_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Focus not found".into()))?;

    if focus.user_id != user_id {
        return Err(AppError::Forbidden);
    }

    sqlx::query("DELETE FROM weekly_focuses WHERE id = $1")
        .bind(focus_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_under_cap_unpinned_item() {
        assert!(admission_decision(0, false).is_ok());
        assert!(admission_decision(MAX_FOCUSES_PER_WEEK - 1, false).is_ok());
    }

    #[test]
    fn test_sixth_focus_exceeds_capacity() {
        let result = admission_decision(MAX_FOCUSES_PER_WEEK, false);
        assert!(matches!(result, Err(AppError::Capacity(_))));
    }

    #[test]
    fn test_same_item_twice_in_one_week_is_duplicate() {
        let result = admission_decision(MAX_FOCUSES_PER_WEEK - 1, true);
        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[test]
    fn test_full_week_reports_capacity_before_duplicate() {
        let result = admission_decision(MAX_FOCUSES_PER_WEEK, true);
        assert!(matches!(result, Err(AppError::Capacity(_))));
    }
}
