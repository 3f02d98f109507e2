use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::goal::Goal;
use crate::models::item::{GoodPoint, Improvement};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_date: NaiveDate,
    pub events: String,
    pub learnings: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDailyReportRequest {
    pub report_date: Option<NaiveDate>,
    pub events: Option<String>,
    pub learnings: Option<String>,
    /// Goals to associate through the join table.
    pub goal_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDailyReportRequest {
    pub events: Option<String>,
    pub learnings: Option<String>,
    /// When present, replaces the full set of goal associations.
    pub goal_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DailyReportWithGoals {
    #[serde(flatten)]
    pub report: DailyReport,
    pub goals: Vec<Goal>,
}

/// Full detail view: the report plus everything hanging off it.
#[derive(Debug, Serialize)]
pub struct DailyReportDetail {
    #[serde(flatten)]
    pub report: DailyReport,
    pub goals: Vec<Goal>,
    pub good_points: Vec<GoodPoint>,
    pub improvements: Vec<Improvement>,
}
