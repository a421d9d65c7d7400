use tests::prelude::*;

fn tags() -> Collection {
    Collection::new("tags", "tags").field(Field::text("label").required())
}

/// Creates `tags`, then adds a column to `notes`.
fn extended() -> strata::schema::app::Schema {
    collections![notes().field(Field::integer("priority")), tags()]
}

async fn table_exists(db: &Db, table: &str) -> bool {
    db.query(&format!("SELECT COUNT(*) FROM \"{table}\""), &[])
        .await
        .is_ok()
}

async fn failed_migration_leaves_the_old_schema(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    db.insert(Insert::new("notes").value(record!("body" => "before")))
        .await
        .unwrap();
    db.close().await.unwrap();

    test.fail_on("ALTER TABLE \"notes\" ADD COLUMN");

    let db = test.db(extended());
    let err = db.connect().await.unwrap_err();
    assert_eq!(db.state(), State::Disconnected);

    assert!(err.is_sync_failed(), "{err}");
    assert!(err.failed_sql().unwrap().contains("ADD COLUMN"), "{err}");
    assert!(!err.possibly_partially_migrated(), "{err}");
    assert!(!err.requires_manual_intervention());

    if test.capability().transactions {
        assert!(err.partial_migration().is_none());
        assert!(!test.sql_starting_with("ROLLBACK").is_empty());
    } else {
        let partial = err.partial_migration().unwrap();
        assert_eq!(partial.applied, 1);
        assert_eq!(partial.total, 2);
        assert!(partial.compensated);
        assert!(partial.dangling_foreign_keys.is_empty());
        let undone = test.sql_starting_with("DROP TABLE");
        assert_eq!(undone.len(), 1, "{undone:?}");
        assert!(undone[0].contains("\"tags\""));
    }

    // The stored fingerprint still describes the old schema
    let old = test.db(collections![notes()]);
    assert!(!old.connect().await.unwrap().synced);
    assert!(!table_exists(&old, "tags").await);
    let rows = old.query("SELECT * FROM \"notes\"", &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].contains("priority"));
}

async fn retry_after_a_failed_migration(test: &mut DbTest) {
    test.setup_db(collections![notes()]).await;

    test.fail_on("ALTER TABLE \"notes\" ADD COLUMN");
    let db = test.db(extended());
    assert!(db.connect().await.is_err());

    let report = db.connect().await.unwrap();
    assert!(report.synced);
    assert_eq!(db.state(), State::Connected);

    db.insert(Insert::new("tags").value(record!("label" => "x")))
        .await
        .unwrap();
    db.insert(Insert::new("notes").value(record!("body" => "y", "priority" => 2)))
        .await
        .unwrap();
}

async fn foreign_keys_to_tables_never_created(test: &mut DbTest) {
    // Each references the other, so `a` is created first
    let a = Collection::new("a", "a")
        .field(Field::integer("b_id"))
        .foreign_key(ForeignKey::new("b_id", "b"));
    let b = Collection::new("b", "b")
        .field(Field::integer("a_id"))
        .foreign_key(ForeignKey::new("a_id", "a"));
    let schema = || collections![a.clone(), b.clone()];

    test.fail_on("CREATE TABLE \"b\"");

    let db = test.db(schema());
    let err = db.connect().await.unwrap_err();
    assert!(err.is_sync_failed(), "{err}");

    if test.capability().transactions {
        assert!(!err.requires_manual_intervention());
        assert!(!err.possibly_partially_migrated());
    } else {
        assert!(err.requires_manual_intervention(), "{err}");
        assert!(err.possibly_partially_migrated());

        let partial = err.partial_migration().unwrap();
        assert_eq!(partial.applied, 1);
        assert!(!partial.compensated);
        assert_eq!(partial.dangling_foreign_keys, ["a"]);

        // Nothing was undone
        assert!(test.sql_starting_with("DROP").is_empty());
    }

    // The next attempt creates what is missing
    let report = db.connect().await.unwrap();
    assert!(report.synced);

    let a_id = db
        .insert(Insert::new("a").value(record!()))
        .await
        .unwrap()
        .ids()[0];
    db.insert(Insert::new("b").value(record!("a_id" => a_id)))
        .await
        .unwrap();
}

async fn sync_lock_is_released_after_a_failure(test: &mut DbTest) {
    test.setup_db(collections![notes()]).await;

    test.fail_on("ALTER TABLE \"notes\" ADD COLUMN");
    assert!(test.db(extended()).connect().await.is_err());

    let db = test.setup_db(collections![notes()]).await;
    let rows = db
        .query(
            "SELECT COUNT(*) AS \"n\" FROM \"Options\" WHERE \"key\" LIKE ?",
            &[Value::from("_lock:%")],
        )
        .await
        .unwrap();
    assert_eq!(rows[0].get("n"), Some(&Value::I64(0)));
}

tests!(
    failed_migration_leaves_the_old_schema,
    retry_after_a_failed_migration,
    foreign_keys_to_tables_never_created,
    sync_lock_is_released_after_a_failure,
);
