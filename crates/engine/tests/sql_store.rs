use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Context, DocumentStore, ExpenseFields, ExpenseForm, LocalIdentity, MoneyCents, NewExpense,
    SettingsPatch, SqlStore, StoreError, Tracker, UserId, View,
};
use migration::MigratorTrait;

async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

fn fields(category: &str, date: (i32, u32, u32), cents: i64) -> ExpenseFields {
    ExpenseFields {
        category: category.to_string(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        amount: MoneyCents::new(cents),
        note: String::new(),
    }
}

fn new_expense(owner: &UserId, fields: ExpenseFields) -> NewExpense {
    NewExpense {
        owner: owner.clone(),
        fields,
        created_at: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn expenses_are_scoped_to_their_owner() {
    let store = SqlStore::new(migrated_db().await);
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    store
        .create_expense(new_expense(&alice, fields("Chain kit", (2023, 11, 20), 180_000)))
        .await
        .unwrap();
    store
        .create_expense(new_expense(&alice, fields("Tires", (2024, 3, 2), 320_000)))
        .await
        .unwrap();
    store
        .create_expense(new_expense(&bob, fields("Wash", (2024, 1, 1), 20_000)))
        .await
        .unwrap();

    let feed = store.watch_expenses(&alice).await.unwrap();
    let records = feed.borrow().clone().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|e| e.owner == alice));
    assert_eq!(records[0].category, "Tires");
    assert_eq!(records[0].created_at, 1_700_000_000_000);
}

#[tokio::test]
async fn writes_refresh_open_feeds() {
    let store = SqlStore::new(migrated_db().await);
    let owner = UserId::new("alice");
    let mut feed = store.watch_expenses(&owner).await.unwrap();
    assert!(feed.borrow_and_update().as_ref().unwrap().is_empty());

    let id = store
        .create_expense(new_expense(&owner, fields("Oil change", (2024, 1, 10), 50_000)))
        .await
        .unwrap();
    assert!(feed.has_changed().unwrap());
    assert_eq!(feed.borrow_and_update().as_ref().unwrap().len(), 1);

    store
        .update_expense(&owner, &id, &fields("Oil + filter", (2024, 1, 10), 65_000))
        .await
        .unwrap();
    {
        let snapshot = feed.borrow_and_update();
        let records = snapshot.as_ref().unwrap();
        assert_eq!(records[0].category, "Oil + filter");
        assert_eq!(records[0].amount, MoneyCents::new(65_000));
        assert_eq!(records[0].owner, owner);
        assert_eq!(records[0].created_at, 1_700_000_000_000);
    }

    store.delete_expense(&owner, &id).await.unwrap();
    assert!(feed.borrow_and_update().as_ref().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_writes_publish_the_final_state() {
    let store = SqlStore::new(migrated_db().await);
    let owner = UserId::new("alice");
    let feed = store.watch_expenses(&owner).await.unwrap();

    let (a, b, c) = tokio::join!(
        store.create_expense(new_expense(&owner, fields("Oil", (2024, 1, 1), 76_09))),
        store.create_expense(new_expense(&owner, fields("Brakes", (2024, 1, 2), 92_65))),
        store.create_expense(new_expense(&owner, fields("Brakes", (2024, 1, 3), 83_76))),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let records = feed.borrow().clone().unwrap();
    assert_eq!(records.len(), 3);
    let total: MoneyCents = records.iter().map(|e| e.amount).sum();
    assert_eq!(total, MoneyCents::new(252_50));
}

#[tokio::test]
async fn foreign_and_missing_records_are_refused() {
    let store = SqlStore::new(migrated_db().await);
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    let id = store
        .create_expense(new_expense(&alice, fields("Chain kit", (2024, 2, 1), 1)))
        .await
        .unwrap();

    assert!(matches!(
        store.delete_expense(&bob, &id).await,
        Err(StoreError::PermissionDenied(_))
    ));
    assert!(matches!(
        store
            .update_expense(&bob, &id, &fields("Mine now", (2024, 2, 1), 0))
            .await,
        Err(StoreError::PermissionDenied(_))
    ));
    assert!(matches!(
        store
            .delete_expense(&alice, &engine::ExpenseId::new("missing"))
            .await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn settings_are_created_then_merged() {
    let store = SqlStore::new(migrated_db().await);
    let owner = UserId::new("alice");
    let mut feed = store.watch_settings(&owner).await.unwrap();
    assert_eq!(*feed.borrow_and_update(), Ok(None));

    store
        .merge_settings(&owner, SettingsPatch::display_name("My Bike"))
        .await
        .unwrap();
    assert_eq!(
        feed.borrow_and_update().as_ref().unwrap().as_ref().unwrap().display_name,
        "My Bike"
    );

    store
        .merge_settings(&owner, SettingsPatch::default())
        .await
        .unwrap();
    store
        .merge_settings(&owner, SettingsPatch::display_name("Tenere"))
        .await
        .unwrap();
    assert_eq!(
        feed.borrow_and_update().as_ref().unwrap().as_ref().unwrap().display_name,
        "Tenere"
    );
}

#[tokio::test]
async fn tracker_runs_on_sqlite() {
    let store = Arc::new(SqlStore::new(migrated_db().await));
    let identity = Arc::new(LocalIdentity::new(Vec::new(), None));
    identity.restore().await.unwrap();
    let context = Context::builder()
        .identity(identity)
        .store(store)
        .build()
        .unwrap();
    let mut tracker = Tracker::start(context);

    tracker.sign_in("rider@mail.com").await.unwrap();
    settle(&mut tracker).await;

    tracker.new_entry();
    let form = ExpenseForm {
        category: "Oil change".to_string(),
        date: "2024-01-10".to_string(),
        amount: "50000".to_string(),
        note: "Motul".to_string(),
    };
    tracker.submit(&form).await.unwrap();
    settle(&mut tracker).await;

    assert_eq!(tracker.view(), &View::Dashboard);
    assert_eq!(tracker.dataset().records().len(), 1);

    tracker.rename("My Bike").await.unwrap();
    settle(&mut tracker).await;
    assert_eq!(tracker.dataset().display_name(), "My Bike");
}

async fn settle(tracker: &mut Tracker) {
    while let Ok(true) =
        tokio::time::timeout(Duration::from_millis(50), tracker.process_next()).await
    {}
}
