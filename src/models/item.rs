//! Good points and improvements, the two item kinds a daily report can carry.
//!
//! Followups and weekly focuses point at an item with a tagged reference
//! (`ItemType` + id) instead of a typed foreign key, so both kinds share one
//! reference shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "item_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    GoodPoint,
    Improvement,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "item_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Open,
    InProgress,
    Resolved,
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Open
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GoodPoint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_report_id: Uuid,
    pub content: String,
    pub factors: Option<String>,
    pub status: ItemStatus,
    pub success_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Improvement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_report_id: Uuid,
    pub content: String,
    pub factors: Option<String>,
    pub action: Option<String>,
    pub status: ItemStatus,
    pub success_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The common projection used when a followup or weekly focus is enriched with
/// the item it references, whichever table it came from.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ItemSummary {
    pub id: Uuid,
    pub daily_report_id: Uuid,
    pub content: String,
    pub status: ItemStatus,
    pub success_count: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
    pub factors: Option<String>,
    /// Improvements only; ignored for good points.
    pub action: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub content: Option<String>,
    pub factors: Option<String>,
    pub action: Option<String>,
    pub status: Option<ItemStatus>,
    pub success_count: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ItemType::GoodPoint).unwrap(),
            serde_json::json!("good_point")
        );
        assert_eq!(
            serde_json::to_value(ItemType::Improvement).unwrap(),
            serde_json::json!("improvement")
        );
    }

    #[test]
    fn test_item_status_roundtrip() {
        let s: ItemStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(s, ItemStatus::InProgress);
    }

    #[test]
    fn test_create_item_request_rejects_empty_content() {
        let req = CreateItemRequest {
            content: "".into(),
            factors: None,
            action: None,
        };
        assert!(req.validate().is_err());
    }
}
