//! Snapshots written to a database file survive closing and reopening it.

use std::sync::Arc;

use till_core::{
    Money, Product, SessionExpiryPolicy, SnapshotKind, TaxRate, TenderAllocation, Terminal,
};
use till_db::{Database, DbConfig, DbError, PersistenceGateway, SqliteSnapshotStore};

async fn open_gateway(path: &std::path::Path) -> (Database, PersistenceGateway) {
    let db = Database::new(DbConfig::new(path)).await.unwrap();
    let gateway = PersistenceGateway::new(Arc::new(SqliteSnapshotStore::new(db.clone())));
    (db, gateway)
}

#[tokio::test]
async fn terminal_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("till.db");

    let mut till = Terminal::new(
        TaxRate::from_percent(18),
        vec![Product::new("P", "Bread", Money::from_units(2_500), 10)],
    );
    till.open_register("amina", Money::from_units(50_000)).unwrap();
    till.add_item("P").unwrap();
    till.checkout(TenderAllocation::cash(Money::from_units(3_000)))
        .unwrap();

    {
        let (db, gateway) = open_gateway(&path).await;
        gateway.save_business(&till.business_snapshot()).await.unwrap();
        gateway
            .save_preferences(&till.preferences_snapshot())
            .await
            .unwrap();
        db.close().await;
    }

    let (_db, gateway) = open_gateway(&path).await;
    let restored = gateway.restore().await.unwrap();
    assert!(restored.warnings.is_empty());

    let (reopened, recovery) = Terminal::restore(
        TaxRate::from_percent(18),
        restored.business,
        restored.preferences,
        &SessionExpiryPolicy::default(),
        chrono::Utc::now(),
    );

    assert!(recovery.resumed.is_some());
    assert_eq!(reopened.stock().on_hand("P"), Some(9));
    assert_eq!(reopened.sales().len(), 1);
    assert_eq!(
        reopened.current_session().unwrap().balance.units(),
        52_950
    );
}

#[tokio::test]
async fn corrupt_row_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (db, gateway) = open_gateway(&dir.path().join("till.db")).await;

    db.snapshots()
        .upsert(SnapshotKind::Preferences, "not json")
        .await
        .unwrap();

    let restored = gateway.restore().await.unwrap();
    assert!(!restored.preferences.dark_mode);
    assert!(matches!(
        restored.warnings.as_slice(),
        [DbError::Corrupt {
            kind: SnapshotKind::Preferences,
            ..
        }]
    ));
}
