use serde_json::json;
use tests::prelude::*;

async fn set_get_and_delete(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    assert_eq!(db.get_option::<String>("theme").await.unwrap(), None);

    db.set_option("theme", "dark").await.unwrap();
    assert_eq!(
        db.get_option::<String>("theme").await.unwrap().as_deref(),
        Some("dark")
    );

    // Replaces the previous value
    let settings = json!({ "columns": 3, "tags": ["a", "b"], "compact": true });
    db.set_option("theme", &settings).await.unwrap();
    assert_eq!(
        db.get_option::<serde_json::Value>("theme").await.unwrap(),
        Some(settings)
    );

    assert!(db.delete_option("theme").await.unwrap());
    assert!(!db.delete_option("theme").await.unwrap());
    assert_eq!(db.get_option::<serde_json::Value>("theme").await.unwrap(), None);
}

async fn options_are_shared_between_handles(test: &mut DbTest) {
    let a = test.setup_db(collections![notes()]).await;
    let b = test.setup_db(collections![notes()]).await;

    a.set_option("counter", &41).await.unwrap();
    b.set_option("counter", &42).await.unwrap();
    assert_eq!(a.get_option::<i64>("counter").await.unwrap(), Some(42));
}

async fn values_of_the_wrong_shape(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    db.set_option("limit", "ten").await.unwrap();
    let err = db.get_option::<i64>("limit").await.unwrap_err();
    assert!(err.to_string().contains("malformed option `limit`"), "{err}");
}

async fn engine_keys_are_reserved(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    for key in ["_schema_fingerprint", "_collections", "_lock:jobs", "_mine"] {
        let err = db.set_option(key, &1).await.unwrap_err();
        assert!(err.is_invalid_option_key(), "{key}: {err}");
        assert!(db.get_option::<i64>(key).await.unwrap_err().is_invalid_option_key());
        assert!(db.delete_option(key).await.unwrap_err().is_invalid_option_key());
    }

    assert!(db.set_option("", &1).await.is_err());

    // Bookkeeping survived
    db.close().await.unwrap();
    assert!(!db.connect().await.unwrap().synced);
}

tests!(
    set_get_and_delete,
    options_are_shared_between_handles,
    values_of_the_wrong_shape,
    engine_keys_are_reserved,
);
