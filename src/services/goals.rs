//! Goal hierarchy manager.
//!
//! Goals form a forest per user: `parent_goal_id == None` is a root. Parents
//! must exist and belong to the same user, a goal with children cannot be
//! deleted, and re-parenting must not create a cycle.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::goal::{CreateGoalRequest, Goal, UpdateGoalRequest};

pub async fn create_goal(pool: &PgPool, user_id: Uuid, req: CreateGoalRequest) -> AppResult<Goal> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if req.end_date < req.start_date {
        return Err(AppError::Validation(
            "End date must not be before start date".into(),
        ));
    }

    if let Some(parent_id) = req.parent_goal_id {
        ensure_parent_exists(pool, user_id, parent_id).await?;
    }

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (id, user_id, name, description, start_date, end_date,
                           parent_goal_id, goal_type, success_criteria)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.parent_goal_id)
    .bind(&req.goal_type)
    .bind(&req.success_criteria)
    .fetch_one(pool)
    .await?;

    Ok(goal)
}

pub async fn get_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> AppResult<Goal> {
    sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))
}

pub async fn list_roots(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        r#"
        SELECT * FROM goals
        WHERE user_id = $1 AND parent_goal_id IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(goals)
}

pub async fn list_children(pool: &PgPool, user_id: Uuid, parent_id: Uuid) -> AppResult<Vec<Goal>> {
    // Surface a 404 rather than an empty list when the parent itself is gone.
    get_goal(pool, user_id, parent_id).await?;

    let goals = sqlx::query_as::<_, Goal>(
        r#"
        SELECT * FROM goals
        WHERE user_id = $1 AND parent_goal_id = $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(goals)
}

pub async fn update_goal(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    req: UpdateGoalRequest,
) -> AppResult<Goal> {
    let existing = get_goal(pool, user_id, goal_id).await?;

    let start_date = req.start_date.unwrap_or(existing.start_date);
    let end_date = req.end_date.unwrap_or(existing.end_date);
    if end_date < start_date {
        return Err(AppError::Validation(
            "End date must not be before start date".into(),
        ));
    }

    // None = keep current parent, Some(None) = detach to root,
    // Some(Some(id)) = re-parent (validated below).
    let parent_goal_id = match req.parent_goal_id {
        None => existing.parent_goal_id,
        Some(None) => None,
        Some(Some(new_parent)) => {
            if new_parent == goal_id {
                return Err(AppError::Validation(
                    "A goal cannot be its own parent".into(),
                ));
            }
            ensure_parent_exists(pool, user_id, new_parent).await?;

            if existing.parent_goal_id != Some(new_parent) {
                let edges = load_parent_edges(pool, user_id).await?;
                if creates_cycle(&edges, goal_id, new_parent) {
                    return Err(AppError::Validation(
                        "Cannot move a goal under its own descendant".into(),
                    ));
                }
            }
            Some(new_parent)
        }
    };

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            start_date = $5,
            end_date = $6,
            parent_goal_id = $7,
            goal_type = COALESCE($8, goal_type),
            success_criteria = COALESCE($9, success_criteria),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(goal_id)
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(start_date)
    .bind(end_date)
    .bind(parent_goal_id)
    .bind(&req.goal_type)
    .bind(&req.success_criteria)
    .fetch_one(pool)
    .await?;

    Ok(goal)
}

/// Delete a childless goal. The ownership check, the child check and the
/// delete run in one transaction; the RESTRICT foreign key backs it up
/// against a child inserted by a concurrent request.
pub async fn delete_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM goals WHERE id = $1 AND user_id = $2)",
    )
    .bind(goal_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let child_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM goals WHERE parent_goal_id = $1",
    )
    .bind(goal_id)
    .fetch_one(&mut *tx)
    .await?;

    deletion_decision(owned, child_count)?;

    let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
                AppError::Conflict("Goal has child goals and cannot be deleted".into())
            }
            _ => AppError::Database(e),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Goal not found".into()));
    }

    tx.commit().await?;
    Ok(())
}

/// Ownership wins over structure: a goal the caller does not own is a plain
/// not-found, and must not reveal whether it has children. Only an owned goal
/// surfaces the has-children conflict.
fn deletion_decision(owned: bool, child_count: i64) -> AppResult<()> {
    if !owned {
        return Err(AppError::NotFound("Goal not found".into()));
    }
    if child_count > 0 {
        return Err(AppError::Conflict(
            "Goal has child goals and cannot be deleted".into(),
        ));
    }
    Ok(())
}

async fn ensure_parent_exists(pool: &PgPool, user_id: Uuid, parent_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM goals WHERE id = $1 AND user_id = $2)",
    )
    .bind(parent_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    if !exists {
        return Err(AppError::Validation("Parent goal not found".into()));
    }
    Ok(())
}

async fn load_parent_edges(
    pool: &PgPool,
    user_id: Uuid,
) -> AppResult<HashMap<Uuid, Option<Uuid>>> {
    let rows = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
        "SELECT id, parent_goal_id FROM goals WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Walk the ancestor chain starting at `new_parent`; attaching `goal_id` there
/// creates a cycle iff the chain reaches `goal_id`. The visited set fails
/// closed if the stored edges are already cyclic.
fn creates_cycle(
    edges: &HashMap<Uuid, Option<Uuid>>,
    goal_id: Uuid,
    new_parent: Uuid,
) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(new_parent);

    while let Some(id) = current {
        if id == goal_id {
            return true;
        }
        if !visited.insert(id) {
            return true;
        }
        current = edges.get(&id).copied().flatten();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(Uuid, Option<Uuid>)]) -> HashMap<Uuid, Option<Uuid>> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_reparent_to_unrelated_goal_is_not_a_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let map = edges(&[(a, None), (b, None)]);
        assert!(!creates_cycle(&map, a, b));
    }

    #[test]
    fn test_reparent_under_own_child_is_a_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let map = edges(&[(a, None), (b, Some(a))]);
        assert!(creates_cycle(&map, a, b));
    }

    #[test]
    fn test_reparent_under_own_grandchild_is_a_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let map = edges(&[(a, None), (b, Some(a)), (c, Some(b))]);
        assert!(creates_cycle(&map, a, c));
    }

    #[test]
    fn test_reparent_sibling_subtree_is_allowed() {
        let root = Uuid::new_v4();
        let left = Uuid::new_v4();
        let right = Uuid::new_v4();
        let map = edges(&[(root, None), (left, Some(root)), (right, Some(root))]);
        assert!(!creates_cycle(&map, left, right));
    }

    #[test]
    fn test_delete_foreign_goal_is_not_found_even_with_children() {
        // No ownership leak: the conflict must not surface for a goal the
        // caller does not own, children or not.
        let result = deletion_decision(false, 3);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_delete_owned_goal_with_children_is_conflict() {
        let result = deletion_decision(true, 1);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_delete_owned_childless_goal_is_allowed() {
        assert!(deletion_decision(true, 0).is_ok());
    }

    #[test]
    fn test_corrupt_cyclic_edges_fail_closed() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        // b and c already point at each other; the walk must terminate.
        let map = edges(&[(a, None), (b, Some(c)), (c, Some(b))]);
        assert!(creates_cycle(&map, a, b));
    }
}
