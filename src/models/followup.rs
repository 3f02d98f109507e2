use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::item::ItemType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "followup_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FollowupStatus {
    Pending,
    Done,
    Dropped,
}

impl Default for FollowupStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Followup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub status: FollowupStatus,
    pub memo: Option<String>,
    pub followup_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFollowupRequest {
    pub item_type: ItemType,
    pub item_id: Uuid,
    pub memo: Option<String>,
    pub followup_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFollowupRequest {
    pub status: Option<FollowupStatus>,
    pub memo: Option<String>,
    pub followup_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct FollowupQuery {
    pub item_type: ItemType,
    pub item_id: Uuid,
}
