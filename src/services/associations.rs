//! Batched association lookups, to keep list endpoints off the N+1 path.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::followup::Followup;
use crate::models::goal::Goal;
use crate::models::item::ItemType;

#[derive(sqlx::FromRow)]
struct ReportGoalRow {
    daily_report_id: Uuid,
    #[sqlx(flatten)]
    goal: Goal,
}

/// Goals associated with each of the given daily reports, via the join table,
/// in one query. Reports with no associations are simply absent from the map;
/// callers treat a missing key as an empty list.
pub async fn goals_for_daily_reports(
    pool: &PgPool,
    user_id: Uuid,
    report_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Goal>>> {
    if report_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, ReportGoalRow>(
        r#"
        SELECT drg.daily_report_id, g.*
        FROM daily_report_goals drg
        JOIN goals g ON g.id = drg.goal_id
        WHERE g.user_id = $1 AND drg.daily_report_id = ANY($2)
        ORDER BY drg.created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(report_ids)
    .fetch_all(pool)
    .await?;

    let mut map: HashMap<Uuid, Vec<Goal>> = HashMap::new();
    for row in rows {
        map.entry(row.daily_report_id).or_default().push(row.goal);
    }

    Ok(map)
}

/// All followups referencing a tagged item, newest first, scoped to the
/// calling user.
pub async fn followups_for_item(
    pool: &PgPool,
    user_id: Uuid,
    item_type: ItemType,
    item_id: Uuid,
) -> AppResult<Vec<Followup>> {
    let followups = sqlx::query_as::<_, Followup>(
        r#"
        SELECT * FROM followups
        WHERE user_id = $1 AND item_type = $2 AND item_id = $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(item_type)
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    Ok(followups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_report_set_returns_empty_map_without_querying() {
        // Lazy pool with no server behind it: any query that were issued
        // would fail the unwrap below, so Ok proves the early return.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/nippo_test")
            .unwrap();

        let map = goals_for_daily_reports(&pool, Uuid::new_v4(), &[])
            .await
            .unwrap();
        assert!(map.is_empty());
    }
}
