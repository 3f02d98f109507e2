use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::item::{ItemSummary, ItemType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyFocus {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub goal_id: Option<Uuid>,
    pub week_start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddFocusRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub goal_id: Option<Uuid>,
}

/// A focus row enriched with the referenced item. `item` is `None` when the
/// good point or improvement has been deleted since the focus was pinned.
#[derive(Debug, Serialize)]
pub struct WeeklyFocusWithItem {
    #[serde(flatten)]
    pub focus: WeeklyFocus,
    pub item: Option<ItemSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_focus_request_deserializes() {
        let json = r#"{"item_type":"improvement","item_id":"7f2c0a40-9b1d-4c94-a7d4-1a2b3c4d5e6f"}"#;
        let req: AddFocusRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.item_type, ItemType::Improvement);
        assert!(req.goal_id.is_none());
    }

    #[test]
    fn test_focus_with_missing_item_serializes_null() {
        let focus = WeeklyFocus {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            item_type: ItemType::GoodPoint,
            item_id: Uuid::new_v4(),
            goal_id: None,
            week_start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(WeeklyFocusWithItem { focus, item: None }).unwrap();
        assert!(json["item"].is_null());
        assert_eq!(json["item_type"], "good_point");
    }
}
