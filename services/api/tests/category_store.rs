mod support;

use api::{
    models::CategoryKind,
    stores::{CategoryStore, LedgerStore},
};
use common::{ErrorKind, seed::DEFAULT_INCOME_CATEGORIES};
use support::{category, entry, file_pool, pool, user};
use uuid::Uuid;

#[tokio::test]
async fn create_then_get_round_trips() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let created = store
        .create(&alice, &category("Salary", CategoryKind::Income))
        .await
        .unwrap();
    let fetched = store.get_by_id(&alice, created.id).await.unwrap();

    assert_eq!(fetched.name, "Salary");
    assert_eq!(fetched.kind, CategoryKind::Income);
    assert!(!fetched.system_category);
    assert_eq!(fetched.owner_id, alice.user_id);
}

#[tokio::test]
async fn duplicate_name_and_type_is_a_conflict() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let store = CategoryStore::new(pool);

    store
        .create(&alice, &category("Salary", CategoryKind::Income))
        .await
        .unwrap();

    let err = store
        .create(&alice, &category("Salary", CategoryKind::Income))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Uniqueness is per owner and per kind.
    store
        .create(&alice, &category("Salary", CategoryKind::Expense))
        .await
        .unwrap();
    store
        .create(&bob, &category("Salary", CategoryKind::Income))
        .await
        .unwrap();
}

const WRITERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_creates_yield_one_success() {
    let (_dir, pool) = file_pool(8).await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let store = store.clone();
            let alice = alice.clone();
            tokio::spawn(async move {
                store
                    .create(&alice, &category("Rent", CategoryKind::Expense))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::Conflict, "{err}"),
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_creates_all_succeed() {
    let (_dir, pool) = file_pool(8).await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = store.clone();
            let alice = alice.clone();
            tokio::spawn(async move {
                store
                    .create(&alice, &category(&format!("Bill {i}"), CategoryKind::Expense))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let expenses = store
        .list_by_type(&alice, CategoryKind::Expense)
        .await
        .unwrap();
    assert_eq!(expenses.len(), WRITERS);
}

#[tokio::test]
async fn invalid_names_are_rejected() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let too_long = "x".repeat(101);
    for name in ["", "   ", too_long.as_str()] {
        let err = store
            .create(&alice, &category(name, CategoryKind::Income))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[tokio::test]
async fn foreign_categories_are_access_denied() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let store = CategoryStore::new(pool);

    let salary = store
        .create(&alice, &category("Salary", CategoryKind::Income))
        .await
        .unwrap();

    let err = store.get_by_id(&bob, salary.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = store
        .update(&bob, salary.id, &category("Mine", CategoryKind::Income))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = store.delete(&bob, salary.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = store.get_by_id(&bob, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Alice's row is untouched.
    let fetched = store.get_by_id(&alice, salary.id).await.unwrap();
    assert_eq!(fetched.name, "Salary");
}

#[tokio::test]
async fn listing_is_scoped_to_the_caller() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let store = CategoryStore::new(pool);

    store
        .create(&alice, &category("Rent", CategoryKind::Expense))
        .await
        .unwrap();

    let all = store.list_all(&alice).await.unwrap();
    assert_eq!(all.len(), DEFAULT_INCOME_CATEGORIES.len() + 1);
    assert!(all.iter().all(|c| c.owner_id == alice.user_id));

    let expenses = store
        .list_by_type(&alice, CategoryKind::Expense)
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].name, "Rent");

    let bob_expenses = store.list_by_type(&bob, CategoryKind::Expense).await.unwrap();
    assert!(bob_expenses.is_empty());
}

#[tokio::test]
async fn system_categories_cannot_change() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let system = store
        .list_by_type(&alice, CategoryKind::Income)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.system_category)
        .unwrap();

    let err = store
        .update(&alice, system.id, &category("Renamed", CategoryKind::Income))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let err = store.delete(&alice, system.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let fetched = store.get_by_id(&alice, system.id).await.unwrap();
    assert_eq!(fetched, system);
}

#[tokio::test]
async fn update_checks_uniqueness_excluding_itself() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool);

    let rent = store
        .create(&alice, &category("Rent", CategoryKind::Expense))
        .await
        .unwrap();
    store
        .create(&alice, &category("Food", CategoryKind::Expense))
        .await
        .unwrap();

    // Saving unchanged values is not a conflict with itself.
    let same = store
        .update(&alice, rent.id, &category("Rent", CategoryKind::Expense))
        .await
        .unwrap();
    assert_eq!(same.name, "Rent");

    let err = store
        .update(&alice, rent.id, &category("Food", CategoryKind::Expense))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let moved = store
        .update(&alice, rent.id, &category("Housing", CategoryKind::Income))
        .await
        .unwrap();
    assert_eq!(moved.name, "Housing");
    assert_eq!(moved.kind, CategoryKind::Income);
    assert_eq!(moved.created_at, rent.created_at);
}

#[tokio::test]
async fn delete_rejects_categories_in_use() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let store = CategoryStore::new(pool.clone());
    let expenses = LedgerStore::for_kind(pool, CategoryKind::Expense);

    let rent = store
        .create(&alice, &category("Rent", CategoryKind::Expense))
        .await
        .unwrap();
    let payment = expenses
        .create(&alice, &entry(rent.id, "900.00", "2024-03-01T00:00:00Z"))
        .await
        .unwrap();

    let err = store.delete(&alice, rent.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    expenses.delete(&alice, payment.id).await.unwrap();
    store.delete(&alice, rent.id).await.unwrap();

    let err = store.get_by_id(&alice, rent.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn kind_codes_match_the_mapping_table() {
    use api::models::category::KIND_MAPPING_VERSION;

    let pool = pool().await;
    let rows: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT code, label, mapping_version FROM category_kinds ORDER BY code")
            .fetch_all(&pool)
            .await
            .unwrap();

    assert_eq!(rows.len(), CategoryKind::ALL.len());
    for (code, label, version) in rows {
        let kind = CategoryKind::from_code(&code).unwrap();
        assert_eq!(kind.label(), label);
        assert_eq!(version, KIND_MAPPING_VERSION);
    }
}
