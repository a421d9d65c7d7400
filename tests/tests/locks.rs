use std::time::Duration;
use tests::prelude::*;

fn fast_polling() -> Config {
    Config::default()
        .lock_poll_interval(Duration::from_millis(5))
        .lock_poll_max_interval(Duration::from_millis(20))
}

async fn lock_times_out_while_held(test: &mut DbTest) {
    let a = test.setup_db(collections![notes()]).await;
    let b = test.db_with_config(collections![notes()], fast_polling());
    b.connect().await.unwrap();

    assert!(a.lock("jobs", None).await.unwrap());
    assert!(a.is_locked("jobs").await.unwrap());
    assert!(b.is_locked("jobs").await.unwrap());

    assert!(!b.lock("jobs", Some(Duration::from_millis(50))).await.unwrap());

    assert!(a.unlock("jobs").await.unwrap());
    assert!(!a.unlock("jobs").await.unwrap());
    assert!(!b.is_locked("jobs").await.unwrap());

    assert!(b.lock("jobs", Some(Duration::ZERO)).await.unwrap());
}

async fn waiter_acquires_once_released(test: &mut DbTest) {
    let a = test.setup_db(collections![notes()]).await;
    let b = test.db_with_config(collections![notes()], fast_polling());
    b.connect().await.unwrap();

    assert!(a.lock("jobs", None).await.unwrap());

    let waiter = {
        let b = b.clone();
        tokio::spawn(async move { b.lock("jobs", Some(Duration::from_secs(10))).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    a.unlock("jobs").await.unwrap();
    assert!(waiter.await.unwrap().unwrap());

    // Now held by `b`
    assert!(!a.lock("jobs", Some(Duration::ZERO)).await.unwrap());
}

async fn expired_locks_are_taken_over(test: &mut DbTest) {
    let a = test.db_with_config(
        collections![notes()],
        Config::default().lock_ttl(Duration::from_millis(100)),
    );
    a.connect().await.unwrap();
    let b = test.setup_db(collections![notes()]).await;

    assert!(a.lock("jobs", None).await.unwrap());
    assert!(!b.lock("jobs", Some(Duration::ZERO)).await.unwrap());

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert!(!a.is_locked("jobs").await.unwrap());
    assert!(b.lock("jobs", Some(Duration::ZERO)).await.unwrap());
    assert!(!a.lock("jobs", Some(Duration::ZERO)).await.unwrap());
}

async fn locks_are_reentrant_per_handle(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    assert!(db.lock("jobs", None).await.unwrap());
    assert!(db.lock("jobs", Some(Duration::ZERO)).await.unwrap());
    assert!(db.clone().lock("jobs", Some(Duration::ZERO)).await.unwrap());

    // One unlock releases it
    assert!(db.unlock("jobs").await.unwrap());
    assert!(!db.is_locked("jobs").await.unwrap());
}

async fn list_and_unlock_all(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    assert!(db.list_locks().await.unwrap().is_empty());

    for name in ["reports", "jobs", "cleanup"] {
        assert!(db.lock(name, None).await.unwrap());
    }
    assert_eq!(db.list_locks().await.unwrap(), ["cleanup", "jobs", "reports"]);

    assert_eq!(db.unlock_all().await.unwrap(), 3);
    assert!(db.list_locks().await.unwrap().is_empty());
    assert_eq!(db.unlock_all().await.unwrap(), 0);

    // Options are not locks
    db.set_option("jobs", &1).await.unwrap();
    assert!(db.list_locks().await.unwrap().is_empty());
    assert_eq!(db.get_option::<i64>("jobs").await.unwrap(), Some(1));
}

async fn invalid_lock_names(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    let err = db.lock("__sync__", None).await.unwrap_err();
    assert!(err.is_invalid_option_key(), "{err}");
    assert!(db.unlock("__sync__").await.unwrap_err().is_invalid_option_key());

    assert!(db.lock("", None).await.is_err());

    let unconnected = test.db(collections![notes()]);
    assert!(unconnected.lock("jobs", None).await.unwrap_err().is_not_connected());
}

tests!(
    lock_times_out_while_held,
    waiter_acquires_once_released,
    expired_locks_are_taken_over,
    locks_are_reentrant_per_handle,
    list_and_unlock_all,
    invalid_lock_names,
);
