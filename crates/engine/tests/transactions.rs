use std::collections::HashSet;

use chrono::{TimeDelta, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Amount, Engine, EngineError, ReviewCmd, RiskLevel, TransactionDraft, TransactionFilter,
    TransactionKind, TransactionStatus,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn sale(from: &str, to: &str, monetary: i64) -> TransactionDraft {
    TransactionDraft::new(from, to, TransactionKind::PhysicalSale)
        .monetary(Amount::from_major(monetary))
        .description("second-hand textbook, good condition")
}

#[tokio::test]
async fn create_transaction_starts_pending() {
    let (engine, _db) = engine_with_db().await;

    let tx = engine
        .create_transaction(
            TransactionDraft::new(" u1 ", "u2", TransactionKind::PhysicalSale)
                .monetary("120.50".parse().unwrap())
                .description("desk lamp and a kettle"),
        )
        .await
        .unwrap();

    assert_eq!(tx.from_user_id, "u1");
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.risk_level, RiskLevel::Normal);
    assert_eq!(tx.monetary_amount, Amount::from_minor(12_050));
    assert_eq!(tx.human_value_amount, Amount::ZERO);
    assert_eq!(tx.created_at, tx.updated_at);
}

#[tokio::test]
async fn invalid_drafts_are_not_stored() {
    let (engine, _db) = engine_with_db().await;

    let cases = [
        TransactionDraft::default(),
        sale("u1", "u1", 10),
        sale("u1", "u2", 0),
        TransactionDraft::new("u1", "u2", TransactionKind::FavorGift).description("carry boxes"),
        TransactionDraft::new("u1", "u2", TransactionKind::Mixed).description("half and half"),
        sale("u1", "u2", 10).human_value(Amount::from_minor(-1)),
    ];
    for draft in cases {
        let err = engine.create_transaction(draft).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    let page = engine
        .list_transactions(&TransactionFilter::default(), None, None)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn transaction_lookup_is_stable() {
    let (engine, _db) = engine_with_db().await;
    let created = engine.create_transaction(sale("u1", "u2", 30)).await.unwrap();

    let first = engine.transaction(created.id).await.unwrap();
    let second = engine.transaction(created.id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.id, created.id);
    assert_eq!(first.description, created.description);

    let err = engine.transaction(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn pages_partition_the_listing() {
    let (engine, _db) = engine_with_db().await;
    for i in 0..25 {
        engine
            .create_transaction(sale(&format!("seller{}", i % 5), &format!("buyer{i}"), 10))
            .await
            .unwrap();
    }

    let filter = TransactionFilter::default();
    let mut seen = HashSet::new();
    let mut sizes = Vec::new();
    for page in 1..=3 {
        let result = engine
            .list_transactions(&filter, Some(page), Some(10))
            .await
            .unwrap();
        assert_eq!(result.total, 25);
        assert_eq!(result.pages(), 3);
        sizes.push(result.transactions.len());
        for window in result.transactions.windows(2) {
            assert!(
                (window[0].created_at, window[0].id.to_string())
                    >= (window[1].created_at, window[1].id.to_string())
            );
        }
        seen.extend(result.transactions.into_iter().map(|tx| tx.id));
    }
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(seen.len(), 25);

    let past_end = engine
        .list_transactions(&filter, Some(4), Some(10))
        .await
        .unwrap();
    assert!(past_end.transactions.is_empty());
    assert_eq!(past_end.total, 25);
}

#[tokio::test]
async fn listing_filters_combine() {
    let (engine, _db) = engine_with_db().await;
    engine.create_transaction(sale("u1", "u2", 10)).await.unwrap();
    engine.create_transaction(sale("u3", "u1", 10)).await.unwrap();
    engine.create_transaction(sale("u3", "u4", 10)).await.unwrap();
    engine
        .create_transaction(
            TransactionDraft::new("u5", "u1", TransactionKind::LaborService)
                .human_value(Amount::from_major(50))
                .description("assembled a bookshelf"),
        )
        .await
        .unwrap();

    let by_user = TransactionFilter {
        user_id: Some("u1".to_string()),
        from_user_id: Some("nobody".to_string()),
        ..Default::default()
    };
    let page = engine.list_transactions(&by_user, None, None).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(
        page.transactions
            .iter()
            .all(|tx| tx.from_user_id == "u1" || tx.to_user_id == "u1")
    );
    assert_eq!(page.limit, 20);

    let outgoing = TransactionFilter {
        from_user_id: Some("u3".to_string()),
        kind: Some(TransactionKind::PhysicalSale),
        ..Default::default()
    };
    let page = engine.list_transactions(&outgoing, None, None).await.unwrap();
    assert_eq!(page.total, 2);

    let future = TransactionFilter {
        start: Some(Utc::now() + TimeDelta::hours(1)),
        ..Default::default()
    };
    let page = engine.list_transactions(&future, None, None).await.unwrap();
    assert_eq!(page.total, 0);

    let normal = TransactionFilter {
        risk_level: Some(RiskLevel::Normal),
        status: Some(TransactionStatus::Pending),
        ..Default::default()
    };
    let page = engine.list_transactions(&normal, None, None).await.unwrap();
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn listing_rejects_bad_paging() {
    let (engine, _db) = engine_with_db().await;
    let filter = TransactionFilter::default();

    for (page, limit) in [
        (Some(0), None),
        (None, Some(0)),
        (None, Some(101)),
        (Some(u64::MAX / 2), Some(10)),
        (Some(u64::MAX), Some(1)),
    ] {
        let err = engine
            .list_transactions(&filter, page, limit)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
    assert!(engine.list_transactions(&filter, None, Some(100)).await.is_ok());
    let far = engine
        .list_transactions(&filter, Some(1_000_000), Some(100))
        .await
        .unwrap();
    assert!(far.transactions.is_empty());

    let now = Utc::now();
    let inverted = TransactionFilter {
        start: Some(now),
        end: Some(now - TimeDelta::days(1)),
        ..Default::default()
    };
    let err = engine
        .list_transactions(&inverted, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn review_changes_tier_and_keeps_status() {
    let (engine, _db) = engine_with_db().await;
    let tx = engine.create_transaction(sale("u1", "u2", 40)).await.unwrap();

    let reviewed = engine
        .review_transaction(
            ReviewCmd::new(tx.id, RiskLevel::Review)
                .reason("  price looks off  ")
                .reviewer("admin-1"),
        )
        .await
        .unwrap();
    assert_eq!(reviewed.risk_level, RiskLevel::Review);
    assert_eq!(reviewed.status, TransactionStatus::Pending);
    assert!(reviewed.updated_at >= tx.updated_at);

    let completed = engine
        .review_transaction(
            ReviewCmd::new(tx.id, RiskLevel::Normal).status(TransactionStatus::Completed),
        )
        .await
        .unwrap();
    assert_eq!(completed.risk_level, RiskLevel::Normal);
    assert_eq!(completed.status, TransactionStatus::Completed);

    let trail = engine.transaction_reviews(tx.id).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].previous_risk_level, RiskLevel::Normal);
    assert_eq!(trail[0].risk_level, RiskLevel::Review);
    assert_eq!(trail[0].reason.as_deref(), Some("price looks off"));
    assert_eq!(trail[0].reviewer_id.as_deref(), Some("admin-1"));
    assert_eq!(trail[1].previous_status, TransactionStatus::Pending);
    assert_eq!(trail[1].status, TransactionStatus::Completed);
    assert_eq!(trail[1].reviewer_id, None);
}

#[tokio::test]
async fn review_of_unknown_transaction_fails() {
    let (engine, _db) = engine_with_db().await;
    let id = Uuid::new_v4();

    let err = engine
        .review_transaction(ReviewCmd::new(id, RiskLevel::Normal))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.transaction_reviews(id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn reference_seeding_is_idempotent() {
    let (engine, _db) = engine_with_db().await;

    engine.seed_reference_values().await.unwrap();
    engine.seed_reference_values().await.unwrap();

    let values = engine.reference_values().await.unwrap();
    assert_eq!(values.len(), engine::DEFAULT_REFERENCE_VALUES.len());
    let labels: Vec<&str> = values.iter().map(|v| v.label.as_str()).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(labels, sorted);

    let parcel = values
        .iter()
        .find(|v| v.label.starts_with("Parcel"))
        .unwrap();
    assert_eq!(parcel.default_value, Amount::from_major(10));
}

#[tokio::test]
async fn builder_requires_a_log() {
    let err = Engine::builder().build().await.unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
