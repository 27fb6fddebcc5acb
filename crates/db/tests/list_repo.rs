//! Integration tests for mailing list CRUD against a real database:
//! - Subscription table lifecycle
//! - Optimistic concurrency via the entity hash
//! - Permission gating of every operation
//! - Table listing with per-row permissions

use assert_matches::assert_matches;
use campaigner_core::error::CoreError;
use campaigner_core::lists::subscription_table_name;
use campaigner_core::permissions::{EntityType, PermissionContext};
use campaigner_core::table::TableParams;
use campaigner_db::error::RepoError;
use campaigner_db::models::list::{CreateList, List, UpdateList};
use campaigner_db::models::namespace::{CreateNamespace, ROOT_NAMESPACE_ID};
use campaigner_db::models::share::AssignShare;
use campaigner_db::models::user::CreateUser;
use campaigner_db::repositories::{ListRepo, NamespaceRepo, ShareRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn admin(pool: &PgPool) -> PermissionContext {
    PermissionContext::admin(create_user(pool, "admin", "admin").await)
}

fn new_list(name: &str, namespace: i64) -> CreateList {
    CreateList {
        name: name.to_string(),
        description: Some(format!("{name} subscribers")),
        default_form: None,
        public_subscribe: false,
        unsubscription_mode: 0,
        namespace,
    }
}

fn update_from(list: &List, hash: &str) -> UpdateList {
    UpdateList {
        name: list.name.clone(),
        description: list.description.clone(),
        default_form: list.default_form,
        public_subscribe: list.public_subscribe,
        unsubscription_mode: list.unsubscription_mode,
        namespace: list.namespace,
        original_hash: hash.to_string(),
    }
}

async fn share(pool: &PgPool, entity_type: EntityType, entity_id: i64, user_id: i64, role: &str) {
    let root = PermissionContext::admin(0);
    ShareRepo::assign(
        pool,
        &root,
        &AssignShare {
            entity_type_id: entity_type,
            entity_id,
            user_id,
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap();
}

async fn list_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM lists")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_creates_subscription_table(pool: PgPool) {
    let ctx = admin(&pool).await;

    let list = ListRepo::create(&pool, &ctx, &new_list("Newsletter", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    assert_eq!(list.name, "Newsletter");
    assert_eq!(list.cid.len(), 10);
    assert_eq!(list.namespace, ROOT_NAMESPACE_ID);
    assert!(ListRepo::subscription_table_exists(&pool, list.id)
        .await
        .unwrap());

    let table = format!("subscription__{}", list.id);
    let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_assigns_distinct_cids(pool: PgPool) {
    let ctx = admin(&pool).await;

    let a = ListRepo::create(&pool, &ctx, &new_list("A", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let b = ListRepo::create(&pool, &ctx, &new_list("B", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    assert_ne!(a.cid, b.cid);
    assert_ne!(a.id, b.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_rejects_invalid_unsubscription_mode(pool: PgPool) {
    let ctx = admin(&pool).await;
    let mut input = new_list("Bad mode", ROOT_NAMESPACE_ID);
    input.unsubscription_mode = 5;

    let result = ListRepo::create(&pool, &ctx, &input).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
    assert_eq!(list_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_rejects_empty_name(pool: PgPool) {
    let ctx = admin(&pool).await;

    let result = ListRepo::create(&pool, &ctx, &new_list("", ROOT_NAMESPACE_ID)).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_rejects_missing_namespace(pool: PgPool) {
    let ctx = admin(&pool).await;

    let result = ListRepo::create(&pool, &ctx, &new_list("Orphan", 9999)).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
    assert_eq!(list_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_requires_create_list_on_namespace(pool: PgPool) {
    let user_id = create_user(&pool, "alice", "user").await;
    let ctx = PermissionContext::user(user_id);

    let result = ListRepo::create(&pool, &ctx, &new_list("Denied", ROOT_NAMESPACE_ID)).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Forbidden(_))));
    assert_eq!(list_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_list_failing_after_insert_leaves_no_row(pool: PgPool) {
    let ctx = admin(&pool).await;
    let taken: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('lists', 'id'))")
        .fetch_one(&pool)
        .await
        .unwrap();
    let next_id = taken + 1;
    sqlx::query(&format!(
        "CREATE TABLE {} (id BIGINT)",
        subscription_table_name(next_id)
    ))
    .execute(&pool)
    .await
    .unwrap();

    let result = ListRepo::create(&pool, &ctx, &new_list("Clash", ROOT_NAMESPACE_ID)).await;

    assert_matches!(result, Err(RepoError::Database(_)));
    assert_eq!(list_count(&pool).await, 0);
    let cached: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM permissions WHERE entity_type = 'list' AND entity_id = $1",
    )
    .bind(next_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(cached, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn namespace_editor_can_create_list(pool: PgPool) {
    let user_id = create_user(&pool, "alice", "user").await;
    share(&pool, EntityType::Namespace, ROOT_NAMESPACE_ID, user_id, "editor").await;
    let ctx = PermissionContext::user(user_id);

    let list = ListRepo::create(&pool, &ctx, &new_list("Mine", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    // The editor role on the namespace carries over to the new list.
    let fetched = ListRepo::get_by_id(&pool, &ctx, list.id).await.unwrap();
    assert_eq!(fetched.list.name, "Mine");
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_by_id_returns_hash_of_current_row(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Hashed", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    let fetched = ListRepo::get_by_id(&pool, &ctx, list.id).await.unwrap();

    assert_eq!(fetched.list.id, list.id);
    assert_eq!(fetched.hash, list.hash().unwrap());
    assert_eq!(fetched.hash.len(), 64);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_by_id_hides_lists_without_view(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Private", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let outsider = PermissionContext::user(create_user(&pool, "bob", "user").await);

    let result = ListRepo::get_by_id(&pool, &outsider, list.id).await;

    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::NotFound { entity: "List", .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_by_id_missing_list_is_not_found(pool: PgPool) {
    let ctx = admin(&pool).await;

    let result = ListRepo::get_by_id(&pool, &ctx, 424242).await;

    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::NotFound { id: 424242, .. }))
    );
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_with_matching_hash_succeeds(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Before", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let hash = list.hash().unwrap();

    let mut input = update_from(&list, &hash);
    input.name = "After".to_string();
    input.unsubscription_mode = 4;
    input.public_subscribe = true;
    let updated = ListRepo::update_with_consistency_check(&pool, &ctx, list.id, &input)
        .await
        .unwrap();

    assert_eq!(updated.name, "After");
    assert_eq!(updated.unsubscription_mode, 4);
    assert!(updated.public_subscribe);
    assert_eq!(updated.cid, list.cid);
    assert_ne!(updated.hash().unwrap(), hash);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_with_stale_hash_is_rejected(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Original", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let stale = list.hash().unwrap();

    // First writer wins.
    let mut first = update_from(&list, &stale);
    first.description = Some("first writer".to_string());
    ListRepo::update_with_consistency_check(&pool, &ctx, list.id, &first)
        .await
        .unwrap();

    let mut second = update_from(&list, &stale);
    second.name = "Second writer".to_string();
    let result = ListRepo::update_with_consistency_check(&pool, &ctx, list.id, &second).await;

    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::Changed { entity: "List", .. }))
    );
    let stored = ListRepo::find_by_id(&pool, list.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Original");
    assert_eq!(stored.description.as_deref(), Some("first writer"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_rejects_invalid_unsubscription_mode(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Modes", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    let mut input = update_from(&list, &list.hash().unwrap());
    input.unsubscription_mode = -1;
    let result = ListRepo::update_with_consistency_check(&pool, &ctx, list.id, &input).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Validation(_))));
    let stored = ListRepo::find_by_id(&pool, list.id).await.unwrap().unwrap();
    assert_eq!(stored.unsubscription_mode, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_requires_edit(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Read only", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let viewer_id = create_user(&pool, "viewer", "user").await;
    share(&pool, EntityType::List, list.id, viewer_id, "viewer").await;
    let viewer = PermissionContext::user(viewer_id);

    let mut input = update_from(&list, &list.hash().unwrap());
    input.name = "Hijacked".to_string();
    let result = ListRepo::update_with_consistency_check(&pool, &viewer, list.id, &input).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Forbidden(_))));
    let stored = ListRepo::find_by_id(&pool, list.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Read only");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_list_requires_create_list_on_target(pool: PgPool) {
    let ctx = admin(&pool).await;
    let target = NamespaceRepo::create(
        &pool,
        &ctx,
        &CreateNamespace {
            name: "Marketing".to_string(),
            description: None,
            parent: None,
        },
    )
    .await
    .unwrap();
    let list = ListRepo::create(&pool, &ctx, &new_list("Mover", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let editor_id = create_user(&pool, "editor", "user").await;
    share(&pool, EntityType::List, list.id, editor_id, "master").await;
    let editor = PermissionContext::user(editor_id);

    let mut input = update_from(&list, &list.hash().unwrap());
    input.namespace = target.id;
    let denied = ListRepo::update_with_consistency_check(&pool, &editor, list.id, &input).await;
    assert_matches!(denied, Err(RepoError::Core(CoreError::Forbidden(_))));

    share(&pool, EntityType::Namespace, target.id, editor_id, "editor").await;
    let moved = ListRepo::update_with_consistency_check(&pool, &editor, list.id, &input)
        .await
        .unwrap();
    assert_eq!(moved.namespace, target.id);
}

// ---------------------------------------------------------------------------
// Remove
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_drops_subscription_table(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Doomed", ROOT_NAMESPACE_ID))
        .await
        .unwrap();

    ListRepo::remove(&pool, &ctx, list.id).await.unwrap();

    assert!(ListRepo::find_by_id(&pool, list.id).await.unwrap().is_none());
    assert!(!ListRepo::subscription_table_exists(&pool, list.id)
        .await
        .unwrap());

    let again = ListRepo::remove(&pool, &ctx, list.id).await;
    assert_matches!(again, Err(RepoError::Core(CoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_requires_delete(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Kept", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let editor_id = create_user(&pool, "editor", "user").await;
    share(&pool, EntityType::List, list.id, editor_id, "editor").await;

    let result = ListRepo::remove(&pool, &PermissionContext::user(editor_id), list.id).await;

    assert_matches!(result, Err(RepoError::Core(CoreError::Forbidden(_))));
    assert!(ListRepo::subscription_table_exists(&pool, list.id)
        .await
        .unwrap());
    assert!(ListRepo::find_by_id(&pool, list.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn remove_clears_shares_and_permissions(pool: PgPool) {
    let ctx = admin(&pool).await;
    let list = ListRepo::create(&pool, &ctx, &new_list("Shared", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let user_id = create_user(&pool, "carol", "user").await;
    share(&pool, EntityType::List, list.id, user_id, "viewer").await;

    ListRepo::remove(&pool, &ctx, list.id).await.unwrap();

    let leftovers: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM shares WHERE entity_type = 'list' AND entity_id = $1) \
              + (SELECT COUNT(*) FROM permissions WHERE entity_type = 'list' AND entity_id = $1)",
    )
    .bind(list.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(leftovers, 0);
}

// ---------------------------------------------------------------------------
// Table listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_table_only_shows_viewable_lists(pool: PgPool) {
    let ctx = admin(&pool).await;
    let visible = ListRepo::create(&pool, &ctx, &new_list("Visible", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    ListRepo::create(&pool, &ctx, &new_list("Hidden", ROOT_NAMESPACE_ID))
        .await
        .unwrap();
    let user_id = create_user(&pool, "dave", "user").await;
    share(&pool, EntityType::List, visible.id, user_id, "viewer").await;

    let params = TableParams {
        draw: Some(3),
        ..Default::default()
    };
    let page = ListRepo::list_table(&pool, &PermissionContext::user(user_id), &params)
        .await
        .unwrap();

    assert_eq!(page.draw, 3);
    assert_eq!(page.records_total, 1);
    assert_eq!(page.records_filtered, 1);
    assert_eq!(page.data.len(), 1);
    let row = &page.data[0];
    assert_eq!(row[0], serde_json::json!(visible.id));
    assert_eq!(row[1], "Visible");
    assert_eq!(row[3], serde_json::json!(0));
    assert_eq!(row[5], "Root");
    assert_eq!(row[6], serde_json::json!(["view", "viewSubscriptions"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_table_search_filters_rows(pool: PgPool) {
    let ctx = admin(&pool).await;
    for name in ["Weekly digest", "Product updates", "Weekly offers"] {
        ListRepo::create(&pool, &ctx, &new_list(name, ROOT_NAMESPACE_ID))
            .await
            .unwrap();
    }

    let params = TableParams {
        search: Some("weekly".to_string()),
        order_column: Some(1),
        ..Default::default()
    };
    let page = ListRepo::list_table(&pool, &ctx, &params).await.unwrap();

    assert_eq!(page.records_total, 3);
    assert_eq!(page.records_filtered, 2);
    let names: Vec<&str> = page
        .data
        .iter()
        .map(|row| row[1].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Weekly digest", "Weekly offers"]);
    // Admins hold every list operation.
    assert_eq!(page.data[0][6].as_array().unwrap().len(), 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_table_pages_results(pool: PgPool) {
    let ctx = admin(&pool).await;
    for i in 0..5 {
        ListRepo::create(&pool, &ctx, &new_list(&format!("List {i}"), ROOT_NAMESPACE_ID))
            .await
            .unwrap();
    }

    let params = TableParams {
        start: Some(3),
        length: Some(2),
        order_column: Some(1),
        ..Default::default()
    };
    let page = ListRepo::list_table(&pool, &ctx, &params).await.unwrap();

    assert_eq!(page.records_filtered, 5);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0][1], "List 3");
    assert_eq!(page.data[1][1], "List 4");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_table_pages_stably_over_duplicate_sort_keys(pool: PgPool) {
    let ctx = admin(&pool).await;
    let mut created = Vec::new();
    for _ in 0..4 {
        let list = ListRepo::create(&pool, &ctx, &new_list("Same name", ROOT_NAMESPACE_ID))
            .await
            .unwrap();
        created.push(serde_json::json!(list.id));
    }

    let mut seen = Vec::new();
    for start in 0..4 {
        let params = TableParams {
            start: Some(start),
            length: Some(1),
            order_column: Some(1),
            ..Default::default()
        };
        let page = ListRepo::list_table(&pool, &ctx, &params).await.unwrap();
        seen.push(page.data[0][0].clone());
    }

    assert_eq!(seen, created);
}
