//! Tagged item reference resolution.
//!
//! Followups and weekly focuses point at a good point or an improvement via
//! (item_type, item_id). Resolution dispatches on the discriminant to the
//! right table and yields a common summary projection.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::item::{ItemStatus, ItemSummary, ItemType};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    user_id: Uuid,
    daily_report_id: Uuid,
    content: String,
    status: ItemStatus,
    success_count: i32,
}

/// Resolve a tagged reference to (owner user id, summary); `None` when no row
/// exists in the referenced table.
pub async fn resolve_item(
    pool: &PgPool,
    item_type: ItemType,
    item_id: Uuid,
) -> AppResult<Option<(Uuid, ItemSummary)>> {
    let table = match item_type {
        ItemType::GoodPoint => "good_points",
        ItemType::Improvement => "improvements",
    };

    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT id, user_id, daily_report_id, content, status, success_count FROM {} WHERE id = $1",
        table
    ))
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| {
        (
            r.user_id,
            ItemSummary {
                id: r.id,
                daily_report_id: r.daily_report_id,
                content: r.content,
                status: r.status,
                success_count: r.success_count,
            },
        )
    }))
}
