use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A goal node. `parent_goal_id == None` marks a root; the set of goals per
/// user forms a forest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_goal_id: Option<Uuid>,
    pub goal_type: Option<String>,
    pub success_criteria: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Goal name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parent_goal_id: Option<Uuid>,
    pub goal_type: Option<String>,
    pub success_criteria: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Double Option: absent = leave parent alone, `null` = detach to root,
    /// value = re-parent.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_goal_id: Option<Option<Uuid>>,
    pub goal_type: Option<String>,
    pub success_criteria: Option<String>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateGoalRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.parent_goal_id.is_none());

        let null: UpdateGoalRequest =
            serde_json::from_str(r#"{"parent_goal_id": null}"#).unwrap();
        assert_eq!(null.parent_goal_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateGoalRequest =
            serde_json::from_str(&format!(r#"{{"parent_goal_id": "{}"}}"#, id)).unwrap();
        assert_eq!(set.parent_goal_id, Some(Some(id)));
    }

    #[test]
    fn test_create_goal_request_rejects_empty_name() {
        let req = CreateGoalRequest {
            name: "".into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            parent_goal_id: None,
            goal_type: None,
            success_criteria: None,
        };
        assert!(req.validate().is_err());
    }
}
