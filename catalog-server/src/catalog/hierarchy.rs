//! Category hierarchy engine
//!
//! Structural rules over the category forest: unique slugs, acyclic
//! re-parenting, soft-or-hard retirement and tree/breadcrumb reconstruction.
//!
//! Every function takes the connection it runs on. Multi-step mutations open
//! their own transaction on it, which nests as a savepoint when the caller
//! already holds one.

use crate::db::repository::{RepoError, RepoResult, category as repo};
use shared::error::ErrorCode;
use shared::models::{
    BreadcrumbItem, Category, CategoryCreate, CategoryNode, CategoryUpdate, RetireOutcome,
};
use shared::util::slugify_or_default;
use sqlx::{Connection, SqliteConnection};
use std::collections::{HashSet, VecDeque};

use super::tree::CategoryForest;

fn category_not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

fn require_name(name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(RepoError::validation("Category name must not be empty"));
    }
    Ok(())
}

async fn ensure_unique_name(
    conn: &mut SqliteConnection,
    name: &str,
    exclude_id: Option<i64>,
) -> RepoResult<()> {
    if repo::find_active_by_name_ci(conn, name, exclude_id)
        .await?
        .is_some()
    {
        return Err(RepoError::duplicate(
            ErrorCode::CategoryNameExists,
            format!("Category '{}' already exists", name.trim()),
        ));
    }
    Ok(())
}

// =============================================================================
// Queries
// =============================================================================

pub async fn get_by_id(conn: &mut SqliteConnection, id: i64) -> RepoResult<Category> {
    repo::find_by_id(conn, id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

pub async fn get_by_slug(conn: &mut SqliteConnection, slug: &str) -> RepoResult<Category> {
    repo::find_by_slug(conn, slug).await?.ok_or_else(|| {
        RepoError::not_found(
            ErrorCode::CategoryNotFound,
            format!("Category '{slug}' not found"),
        )
    })
}

/// Flat list sorted by order, then name
pub async fn list(conn: &mut SqliteConnection, active_only: bool) -> RepoResult<Vec<Category>> {
    repo::find_all(conn, active_only).await
}

/// Full forest from one flat query plus one grouped product count
pub async fn get_tree(
    conn: &mut SqliteConnection,
    active_only: bool,
) -> RepoResult<Vec<CategoryNode>> {
    let categories = repo::find_all(conn, active_only).await?;
    let counts = repo::active_product_counts(conn).await?;
    Ok(CategoryForest::build(categories).into_nodes(&counts))
}

/// Ancestor chain ordered from the root down to `id` (inclusive)
pub async fn breadcrumb(conn: &mut SqliteConnection, id: i64) -> RepoResult<Vec<BreadcrumbItem>> {
    let mut trail = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(get_by_id(conn, id).await?);

    while let Some(category) = current {
        if !visited.insert(category.id) {
            tracing::warn!(category_id = id, "Cycle detected while building breadcrumb");
            break;
        }
        let parent_id = category.parent_id;
        trail.push(BreadcrumbItem {
            id: category.id,
            name: category.name,
            slug: category.slug,
        });
        current = match parent_id {
            Some(parent_id) => repo::find_by_id(conn, parent_id).await?,
            None => None,
        };
    }

    trail.reverse();
    Ok(trail)
}

/// Every category below `id`, breadth first. `id` itself is not included.
pub async fn descendant_ids(conn: &mut SqliteConnection, id: i64) -> RepoResult<Vec<i64>> {
    let mut seen = HashSet::from([id]);
    let mut result = Vec::new();
    let mut queue = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        for child in repo::child_ids(conn, current).await? {
            if seen.insert(child) {
                result.push(child);
                queue.push_back(child);
            }
        }
    }
    Ok(result)
}

/// Whether `candidate_parent_id` may become the parent of `category_id`.
///
/// `None` (root) is always valid; the category itself and any of its
/// descendants never are.
pub async fn is_valid_parent(
    conn: &mut SqliteConnection,
    category_id: i64,
    candidate_parent_id: Option<i64>,
) -> RepoResult<bool> {
    let Some(parent_id) = candidate_parent_id else {
        return Ok(true);
    };
    if parent_id == category_id {
        return Ok(false);
    }
    let descendants = descendant_ids(conn, category_id).await?;
    Ok(!descendants.contains(&parent_id))
}

/// Typed parent check shared by Update and Move
async fn check_parent(
    conn: &mut SqliteConnection,
    category_id: i64,
    parent_id: Option<i64>,
) -> RepoResult<()> {
    let Some(pid) = parent_id else {
        return Ok(());
    };
    if repo::find_by_id(conn, pid).await?.is_none() {
        return Err(category_not_found(pid));
    }
    if !is_valid_parent(conn, category_id, parent_id).await? {
        return Err(RepoError::InvalidMove {
            category_id,
            parent_id: pid,
        });
    }
    Ok(())
}

// =============================================================================
// Mutations
// =============================================================================

pub async fn create(conn: &mut SqliteConnection, data: CategoryCreate) -> RepoResult<Category> {
    require_name(&data.name)?;

    let mut tx = conn.begin().await?;

    if let Some(parent_id) = data.parent_id
        && repo::find_by_id(&mut tx, parent_id).await?.is_none()
    {
        return Err(category_not_found(parent_id));
    }
    ensure_unique_name(&mut tx, &data.name, None).await?;

    let base = slugify_or_default(data.slug.as_deref().unwrap_or(&data.name));
    let slug = repo::next_free_slug(&mut tx, &base, None).await?;
    let id = repo::insert(&mut tx, &data, &slug).await?;
    let category = get_by_id(&mut tx, id).await?;

    tx.commit().await?;
    tracing::info!(category_id = id, slug = %category.slug, "Category created");
    Ok(category)
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: CategoryUpdate,
) -> RepoResult<Category> {
    require_name(&data.name)?;

    let mut tx = conn.begin().await?;
    let existing = get_by_id(&mut tx, id).await?;

    // Names are unique among active rows, so reactivation checks too
    if data.is_active {
        ensure_unique_name(&mut tx, &data.name, Some(id)).await?;
    }
    if data.parent_id != existing.parent_id {
        check_parent(&mut tx, id, data.parent_id).await?;
    }

    let effective = slugify_or_default(data.slug.as_deref().unwrap_or(&data.name));
    let slug = if effective == existing.slug {
        existing.slug.clone()
    } else {
        repo::next_free_slug(&mut tx, &effective, Some(id)).await?
    };

    repo::update(&mut tx, id, &data, &slug).await?;
    let category = get_by_id(&mut tx, id).await?;

    tx.commit().await?;
    tracing::info!(category_id = id, "Category updated");
    Ok(category)
}

/// Re-parent a category.
///
/// Returns `false` without writing when the category or the new parent is
/// missing, or when the move would create a cycle.
pub async fn move_category(
    conn: &mut SqliteConnection,
    id: i64,
    new_parent_id: Option<i64>,
    sort_order: i32,
) -> RepoResult<bool> {
    let mut tx = conn.begin().await?;

    if repo::find_by_id(&mut tx, id).await?.is_none() {
        return Ok(false);
    }
    match check_parent(&mut tx, id, new_parent_id).await {
        Ok(()) => {}
        Err(RepoError::InvalidMove { .. }) | Err(RepoError::NotFound { .. }) => {
            tracing::warn!(category_id = id, parent_id = ?new_parent_id, "Rejected category move");
            return Ok(false);
        }
        Err(e) => return Err(e),
    }

    repo::set_parent(&mut tx, id, new_parent_id, sort_order).await?;
    tx.commit().await?;
    tracing::info!(category_id = id, parent_id = ?new_parent_id, "Category moved");
    Ok(true)
}

/// Single soft/hard delete path.
///
/// Active children or active products keep the row (deactivated). Otherwise
/// the row is removed; inactive children are lifted to the removed node's
/// parent. Products keep a required reference to their category, so a
/// category still referenced by inactive products is deactivated too.
/// Returns `None` when the category does not exist.
pub async fn retire(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<RetireOutcome>> {
    let mut tx = conn.begin().await?;

    let Some(category) = repo::find_by_id(&mut tx, id).await? else {
        return Ok(None);
    };

    let has_active_dependents = repo::count_active_children(&mut tx, id).await? > 0
        || repo::count_active_products(&mut tx, id).await? > 0;

    let outcome = if has_active_dependents || repo::count_products(&mut tx, id).await? > 0 {
        repo::set_active(&mut tx, id, false).await?;
        RetireOutcome::Deactivated
    } else {
        repo::reparent_children(&mut tx, id, category.parent_id).await?;
        repo::hard_delete(&mut tx, id).await?;
        RetireOutcome::Deleted
    };

    tx.commit().await?;
    tracing::info!(category_id = id, outcome = ?outcome, "Category retired");
    Ok(Some(outcome))
}

/// `false` only when the category does not exist
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    Ok(retire(conn, id).await?.is_some())
}

/// Set the active flag on every listed category; returns rows changed.
///
/// Activating a row whose name is already taken by an active category
/// fails the whole batch.
pub async fn bulk_toggle_status(
    conn: &mut SqliteConnection,
    ids: &[i64],
    is_active: bool,
) -> RepoResult<u64> {
    let mut tx = conn.begin().await?;
    let mut count = 0;
    for &id in ids {
        if is_active
            && let Some(category) = repo::find_by_id(&mut tx, id).await?
            && !category.is_active
        {
            ensure_unique_name(&mut tx, &category.name, Some(id)).await?;
        }
        if repo::set_active(&mut tx, id, is_active).await? {
            count += 1;
        }
    }
    tx.commit().await?;
    tracing::info!(count, is_active, "Bulk category status change");
    Ok(count)
}

/// Retire every listed category; returns how many existed
pub async fn bulk_delete(conn: &mut SqliteConnection, ids: &[i64]) -> RepoResult<u64> {
    let mut tx = conn.begin().await?;
    let mut count = 0;
    for &id in ids {
        if delete(&mut tx, id).await? {
            count += 1;
        }
    }
    tx.commit().await?;
    Ok(count)
}

/// Assign `sort_order = position` following `ordered_ids`
pub async fn reorder(conn: &mut SqliteConnection, ordered_ids: &[i64]) -> RepoResult<u64> {
    let mut tx = conn.begin().await?;
    let mut count = 0;
    for (position, &id) in ordered_ids.iter().enumerate() {
        let sort_order = i32::try_from(position)
            .map_err(|_| RepoError::validation("Too many categories to reorder"))?;
        if repo::set_sort_order(&mut tx, id, sort_order).await? {
            count += 1;
        }
    }
    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{insert_product, test_db};

    fn named(name: &str, parent_id: Option<i64>) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            parent_id,
            ..Default::default()
        }
    }

    fn update_of(category: &Category) -> CategoryUpdate {
        CategoryUpdate {
            name: category.name.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            slug: None,
            image_url: category.image_url.clone(),
            icon: category.icon.clone(),
            sort_order: category.sort_order,
            is_active: category.is_active,
        }
    }

    #[tokio::test]
    async fn test_create_derives_unique_slugs() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let phones = create(&mut conn, named("Phones", None)).await.unwrap();
        assert_eq!(phones.slug, "phones");

        // Same slug, different name: suffixes in order
        let hint = CategoryCreate {
            slug: Some("Phones".into()),
            ..named("Mobile phones", None)
        };
        let second = create(&mut conn, hint.clone()).await.unwrap();
        assert_eq!(second.slug, "phones-1");
        let third = create(&mut conn, CategoryCreate { name: "Handsets".into(), ..hint }).await.unwrap();
        assert_eq!(third.slug, "phones-2");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_active_name_case_insensitive() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        create(&mut conn, named("Phones", None)).await.unwrap();
        let err = create(&mut conn, named("  phones ", None)).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Duplicate { code: ErrorCode::CategoryNameExists, .. }
        ));
    }

    #[tokio::test]
    async fn test_inactive_name_can_be_reused_with_new_slug() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let first = create(&mut conn, named("Phones", None)).await.unwrap();
        bulk_toggle_status(&mut conn, &[first.id], false).await.unwrap();

        let second = create(&mut conn, named("Phones", None)).await.unwrap();
        assert_eq!(second.slug, "phones-1");
    }

    #[tokio::test]
    async fn test_bulk_activation_rejects_taken_name() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let first = create(&mut conn, named("Phones", None)).await.unwrap();
        let other = create(&mut conn, named("Tablets", None)).await.unwrap();
        bulk_toggle_status(&mut conn, &[first.id, other.id], false).await.unwrap();
        create(&mut conn, named("phones", None)).await.unwrap();

        let err = bulk_toggle_status(&mut conn, &[other.id, first.id], true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Duplicate { code: ErrorCode::CategoryNameExists, .. }
        ));

        // Whole batch rolled back
        assert!(!get_by_id(&mut conn, other.id).await.unwrap().is_active);
        let active: Vec<_> = list(&mut conn, true).await.unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_activation_of_two_same_names_fails() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let first = create(&mut conn, named("Phones", None)).await.unwrap();
        bulk_toggle_status(&mut conn, &[first.id], false).await.unwrap();
        let second = create(&mut conn, named("Phones", None)).await.unwrap();
        bulk_toggle_status(&mut conn, &[second.id], false).await.unwrap();

        assert!(bulk_toggle_status(&mut conn, &[first.id, second.id], true).await.is_err());
        assert!(list(&mut conn, true).await.unwrap().is_empty());

        // Already active rows are not re-checked
        assert_eq!(bulk_toggle_status(&mut conn, &[first.id], true).await.unwrap(), 1);
        assert_eq!(bulk_toggle_status(&mut conn, &[first.id], true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_reactivation_rejects_taken_name() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let first = create(&mut conn, named("Phones", None)).await.unwrap();
        bulk_toggle_status(&mut conn, &[first.id], false).await.unwrap();
        create(&mut conn, named("Phones", None)).await.unwrap();

        let stale = get_by_id(&mut conn, first.id).await.unwrap();
        let reactivate = CategoryUpdate {
            is_active: true,
            ..update_of(&stale)
        };
        let err = update(&mut conn, first.id, reactivate).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Duplicate { code: ErrorCode::CategoryNameExists, .. }
        ));
        assert!(!get_by_id(&mut conn, first.id).await.unwrap().is_active);

        // Staying inactive under the same name is fine
        let described = CategoryUpdate {
            description: Some("old".into()),
            ..update_of(&stale)
        };
        update(&mut conn, first.id, described).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_missing_parent_fails() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let err = create(&mut conn, named("Orphan", Some(42))).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert!(list(&mut conn, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let err = create(&mut conn, named("   ", None)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_symbol_only_name_falls_back_to_default_slug() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let c = create(&mut conn, named("***", None)).await.unwrap();
        assert_eq!(c.slug, "category");
    }

    #[tokio::test]
    async fn test_move_ancestor_under_descendant_returns_false() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let a = create(&mut conn, named("A", None)).await.unwrap();
        let b = create(&mut conn, named("B", Some(a.id))).await.unwrap();
        let c = create(&mut conn, named("C", Some(b.id))).await.unwrap();

        assert!(!move_category(&mut conn, a.id, Some(b.id), 0).await.unwrap());
        assert!(!move_category(&mut conn, a.id, Some(c.id), 0).await.unwrap());
        assert!(!move_category(&mut conn, a.id, Some(a.id), 0).await.unwrap());
        assert!(!move_category(&mut conn, a.id, Some(999), 0).await.unwrap());
        assert!(!move_category(&mut conn, 999, None, 0).await.unwrap());

        // Unchanged
        assert_eq!(get_by_id(&mut conn, a.id).await.unwrap().parent_id, None);

        // Valid move: C becomes a root
        assert!(move_category(&mut conn, c.id, None, 3).await.unwrap());
        let moved = get_by_id(&mut conn, c.id).await.unwrap();
        assert_eq!(moved.parent_id, None);
        assert_eq!(moved.sort_order, 3);
    }

    #[tokio::test]
    async fn test_update_with_cyclic_parent_is_typed_error() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let a = create(&mut conn, named("A", None)).await.unwrap();
        let b = create(&mut conn, named("B", Some(a.id))).await.unwrap();

        let mut data = update_of(&a);
        data.parent_id = Some(b.id);
        let err = update(&mut conn, a.id, data).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidMove { category_id, parent_id } if category_id == a.id && parent_id == b.id
        ));
    }

    #[tokio::test]
    async fn test_update_regenerates_slug_only_when_changed() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let a = create(&mut conn, named("Laptops", None)).await.unwrap();

        let mut data = update_of(&a);
        data.description = Some("Portable computers".into());
        let same = update(&mut conn, a.id, data).await.unwrap();
        assert_eq!(same.slug, "laptops");
        assert_eq!(same.description.as_deref(), Some("Portable computers"));

        let mut data = update_of(&same);
        data.name = "Notebooks".into();
        let renamed = update(&mut conn, a.id, data).await.unwrap();
        assert_eq!(renamed.slug, "notebooks");
    }

    #[tokio::test]
    async fn test_update_missing_category() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let data = CategoryUpdate {
            name: "X".into(),
            description: None,
            parent_id: None,
            slug: None,
            image_url: None,
            icon: None,
            sort_order: 0,
            is_active: true,
        };
        let err = update(&mut conn, 5, data).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_name_of_other_active_category() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        create(&mut conn, named("Audio", None)).await.unwrap();
        let video = create(&mut conn, named("Video", None)).await.unwrap();

        let mut data = update_of(&video);
        data.name = "AUDIO".into();
        let err = update(&mut conn, video.id, data).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_retire_with_active_child_deactivates_parent_only() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let parent = create(&mut conn, named("Parent", None)).await.unwrap();
        let child = create(&mut conn, named("Child", Some(parent.id))).await.unwrap();

        let outcome = retire(&mut conn, parent.id).await.unwrap();
        assert_eq!(outcome, Some(RetireOutcome::Deactivated));
        assert!(!get_by_id(&mut conn, parent.id).await.unwrap().is_active);
        let child = get_by_id(&mut conn, child.id).await.unwrap();
        assert!(child.is_active);
        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[tokio::test]
    async fn test_retire_leaf_deletes_row() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let leaf = create(&mut conn, named("Leaf", None)).await.unwrap();
        assert_eq!(retire(&mut conn, leaf.id).await.unwrap(), Some(RetireOutcome::Deleted));
        assert!(repo::find_by_id(&mut conn, leaf.id).await.unwrap().is_none());
        assert_eq!(retire(&mut conn, leaf.id).await.unwrap(), None);
        assert!(!delete(&mut conn, leaf.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_retire_with_active_product_deactivates() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let cat = create(&mut conn, named("Shoes", None)).await.unwrap();
        insert_product(&mut conn, cat.id, "Sneaker").await;

        assert_eq!(retire(&mut conn, cat.id).await.unwrap(), Some(RetireOutcome::Deactivated));
    }

    #[tokio::test]
    async fn test_retire_lifts_inactive_children() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let root = create(&mut conn, named("Root", None)).await.unwrap();
        let mid = create(&mut conn, named("Mid", Some(root.id))).await.unwrap();
        let leaf = create(&mut conn, named("Leaf", Some(mid.id))).await.unwrap();
        bulk_toggle_status(&mut conn, &[leaf.id], false).await.unwrap();

        assert_eq!(retire(&mut conn, mid.id).await.unwrap(), Some(RetireOutcome::Deleted));
        let leaf = get_by_id(&mut conn, leaf.id).await.unwrap();
        assert_eq!(leaf.parent_id, Some(root.id));
    }

    #[tokio::test]
    async fn test_bulk_delete_applies_rule_per_item() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let a = create(&mut conn, named("A", None)).await.unwrap();
        let b = create(&mut conn, named("B", Some(a.id))).await.unwrap();
        let c = create(&mut conn, named("C", None)).await.unwrap();

        // a has an active child at the time it is processed
        let count = bulk_delete(&mut conn, &[a.id, c.id, 404]).await.unwrap();
        assert_eq!(count, 2);
        assert!(!get_by_id(&mut conn, a.id).await.unwrap().is_active);
        assert!(get_by_id(&mut conn, b.id).await.unwrap().is_active);
        assert!(repo::find_by_id(&mut conn, c.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reorder_is_idempotent() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let one = create(&mut conn, named("One", None)).await.unwrap();
        let two = create(&mut conn, named("Two", None)).await.unwrap();
        let three = create(&mut conn, named("Three", None)).await.unwrap();
        let order = [three.id, one.id, two.id];

        assert_eq!(reorder(&mut conn, &order).await.unwrap(), 3);
        let first: Vec<_> = list(&mut conn, false).await.unwrap();
        assert_eq!(reorder(&mut conn, &order).await.unwrap(), 3);
        let second: Vec<_> = list(&mut conn, false).await.unwrap();

        assert_eq!(first, second);
        let ids: Vec<_> = second.iter().map(|c| c.id).collect();
        assert_eq!(ids, order);
        assert_eq!(second[0].sort_order, 0);
        assert_eq!(second[2].sort_order, 2);
    }

    #[tokio::test]
    async fn test_tree_and_breadcrumb() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let electronics = create(&mut conn, named("Electronics", None)).await.unwrap();
        let phones = create(&mut conn, named("Phones", Some(electronics.id))).await.unwrap();
        let android = create(&mut conn, named("Android", Some(phones.id))).await.unwrap();
        let hidden = create(&mut conn, named("Hidden", Some(electronics.id))).await.unwrap();
        bulk_toggle_status(&mut conn, &[hidden.id], false).await.unwrap();
        insert_product(&mut conn, android.id, "Pixel").await;

        let tree = get_tree(&mut conn, true).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        let android_node = &tree[0].children[0].children[0];
        assert_eq!(android_node.level, 2);
        assert_eq!(android_node.product_count, 1);

        let full = get_tree(&mut conn, false).await.unwrap();
        assert_eq!(full[0].children.len(), 2);

        let trail = breadcrumb(&mut conn, android.id).await.unwrap();
        let names: Vec<_> = trail.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Electronics", "Phones", "Android"]);
        assert_eq!(trail[1].slug, "phones");

        assert!(matches!(
            breadcrumb(&mut conn, 999).await.unwrap_err(),
            RepoError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_descendants_and_valid_parent() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();

        let a = create(&mut conn, named("A", None)).await.unwrap();
        let b = create(&mut conn, named("B", Some(a.id))).await.unwrap();
        let c = create(&mut conn, named("C", Some(b.id))).await.unwrap();
        let d = create(&mut conn, named("D", None)).await.unwrap();

        let mut ids = descendant_ids(&mut conn, a.id).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec![b.id, c.id]);

        assert!(is_valid_parent(&mut conn, a.id, None).await.unwrap());
        assert!(is_valid_parent(&mut conn, a.id, Some(d.id)).await.unwrap());
        assert!(is_valid_parent(&mut conn, c.id, Some(a.id)).await.unwrap());
        assert!(!is_valid_parent(&mut conn, a.id, Some(a.id)).await.unwrap());
        assert!(!is_valid_parent(&mut conn, a.id, Some(c.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let c = create(&mut conn, named("Garden Tools", None)).await.unwrap();
        assert_eq!(get_by_slug(&mut conn, "garden-tools").await.unwrap().id, c.id);
        assert!(get_by_slug(&mut conn, "nope").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_nested_call_rolls_back_only_savepoint() {
        let db = test_db().await;
        let mut conn = db.pool.acquire().await.unwrap();
        let mut tx = conn.begin().await.unwrap();

        create(&mut tx, named("Kept", None)).await.unwrap();
        assert!(create(&mut tx, named("kept", None)).await.is_err());
        tx.commit().await.unwrap();

        assert_eq!(list(&mut conn, false).await.unwrap().len(), 1);
    }
}
