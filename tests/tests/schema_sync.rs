use tests::prelude::*;

fn posts() -> Collection {
    Collection::new("posts", "posts")
        .field(Field::text("title").required())
        .field(Field::text("slug").unique())
}

fn comments(on_delete: ForeignKeyAction) -> Collection {
    Collection::new("comments", "comments")
        .field(Field::integer("post_id"))
        .field(Field::text("body"))
        .foreign_key(ForeignKey::new("post_id", "posts").on_delete(on_delete))
}

async fn table_exists(db: &Db, table: &str) -> bool {
    db.query(&format!("SELECT COUNT(*) FROM \"{table}\""), &[])
        .await
        .is_ok()
}

async fn insert_one(db: &Db, collection: &str, record: Record) -> i64 {
    let outcome = db
        .insert(Insert::new(collection).value(record))
        .await
        .unwrap();
    assert!(outcome.is_complete(), "{:?}", outcome.errors);
    outcome.ids()[0]
}

async fn creates_tables_and_constraints(test: &mut DbTest) {
    let db = test
        .setup_db(collections![posts(), comments(ForeignKeyAction::NoAction)])
        .await;

    let post = insert_one(&db, "posts", record!("title" => "hello", "slug" => "hello")).await;
    insert_one(&db, "comments", record!("post_id" => post, "body" => "first")).await;

    let err = db
        .insert(Insert::new("posts").value(record!("title" => "again", "slug" => "hello")))
        .await
        .unwrap_err();
    assert!(err.is_execution_failed(), "{err}");

    let err = db
        .insert(Insert::new("comments").value(record!("post_id" => post + 100, "body" => "lost")))
        .await
        .unwrap_err();
    assert!(err.is_execution_failed(), "{err}");

    assert_eq!(db.count("posts", Condition::field("slug").eq("hello")).await.unwrap(), 1);
    assert_eq!(db.count("comments", Filter::new()).await.unwrap(), 1);
}

async fn unchanged_schema_skips_migration(test: &mut DbTest) {
    let schema = || collections![posts(), comments(ForeignKeyAction::NoAction)];
    test.setup_db(schema()).await;

    test.clear_ops();

    let db = test.db(schema());
    let report = db.connect().await.unwrap();
    assert!(!report.synced);
    assert!(!report.created_options_table);

    assert!(test.sql_starting_with("CREATE").is_empty());
    assert!(test.sql_starting_with("ALTER").is_empty());
    assert!(test.sql_starting_with("DROP").is_empty());
}

async fn malformed_fingerprint_resynchronizes(test: &mut DbTest) {
    let schema = || collections![posts(), comments(ForeignKeyAction::NoAction)];
    let db = test.setup_db(schema()).await;
    db.exec(
        "UPDATE \"Options\" SET \"value\" = 'not json' WHERE \"key\" = '_schema_fingerprint'",
        &[],
    )
    .await
    .unwrap();
    db.close().await.unwrap();

    test.clear_ops();

    let db = test.db(schema());
    assert!(db.connect().await.unwrap().synced);
    assert!(test.sql_starting_with("CREATE").is_empty());
    assert!(test.sql_starting_with("DROP").is_empty());
    db.close().await.unwrap();

    let db = test.db(schema());
    assert!(!db.connect().await.unwrap().synced);
}

async fn added_fields_backfill_existing_rows(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    insert_one(&db, "notes", record!("body" => "old")).await;
    db.close().await.unwrap();

    let notes = notes()
        .field(Field::integer("priority").not_null())
        .field(Field::text("status").required().default("open"))
        .field(Field::boolean("pinned"));
    let db = test.db(collections![notes]);
    assert!(db.connect().await.unwrap().synced);

    let rows = db.select(Select::new("notes")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("body"), Some(&Value::from("old")));
    assert_eq!(rows[0].get("priority"), Some(&Value::I64(0)));
    assert_eq!(rows[0].get("status"), Some(&Value::from("open")));
    assert_eq!(rows[0].get("pinned"), Some(&Value::Null));
}

async fn renamed_collection_keeps_its_rows(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    insert_one(&db, "notes", record!("body" => "kept")).await;
    db.close().await.unwrap();

    let renamed = Collection::new("notes", "memos").field(Field::text("body"));
    let db = test.db(collections![renamed]);
    assert!(db.connect().await.unwrap().synced);

    let rows = db.select(Select::new("notes")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("body"), Some(&Value::from("kept")));

    assert!(table_exists(&db, "memos").await);
    assert!(!table_exists(&db, "notes").await);

    // The registry now points at the new name
    db.close().await.unwrap();
    test.clear_ops();
    let db = test
        .setup_db(collections![Collection::new("notes", "memos").field(Field::text("body"))])
        .await;
    assert!(test.sql_starting_with("ALTER").is_empty());
    assert_eq!(db.count("notes", Filter::new()).await.unwrap(), 1);
}

async fn renamed_field_keeps_its_values(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    insert_one(&db, "notes", record!("body" => "moved")).await;
    db.close().await.unwrap();

    let notes = Collection::new("notes", "notes").field(Field::text("content").renamed_from("body"));
    let db = test.db(collections![notes]);
    db.connect().await.unwrap();

    let rows = db.select(Select::new("notes")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("content"), Some(&Value::from("moved")));
    assert!(!rows[0].contains("body"));
}

async fn removed_collections_are_dropped(test: &mut DbTest) {
    let db = test.setup_db(collections![notes(), posts()]).await;
    insert_one(&db, "posts", record!("title" => "gone")).await;
    db.close().await.unwrap();

    let db = test.setup_db(collections![notes()]).await;
    assert!(!table_exists(&db, "posts").await);
    assert!(table_exists(&db, "notes").await);
}

async fn unrelated_tables_can_be_preserved(test: &mut DbTest) {
    let db = test.setup_db(collections![notes(), posts()]).await;
    insert_one(&db, "posts", record!("title" => "stays")).await;
    db.close().await.unwrap();

    let db = test.db_with_config(
        collections![notes()],
        Config::default().preserve_unrelated_tables(true),
    );
    db.connect().await.unwrap();

    let rows = db.query("SELECT \"title\" FROM \"posts\"", &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
}

async fn preserved_columns_survive_constraint_changes(test: &mut DbTest) {
    let unconstrained = Collection::new("comments", "comments")
        .field(Field::integer("post_id"))
        .field(Field::text("legacy"));
    let db = test.setup_db(collections![posts(), unconstrained]).await;
    let post = insert_one(&db, "posts", record!("title" => "a")).await;
    insert_one(&db, "comments", record!("post_id" => post, "legacy" => "keep")).await;
    db.close().await.unwrap();

    // Adding the foreign key rebuilds the table on SQLite
    let db = test.db_with_config(
        collections![posts(), comments(ForeignKeyAction::NoAction)],
        Config::default().preserve_unrelated_tables(true),
    );
    assert!(db.connect().await.unwrap().synced);

    let rows = db
        .query("SELECT \"post_id\", \"legacy\" FROM \"comments\"", &[])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("legacy"), Some(&Value::from("keep")));
    assert_eq!(rows[0].get("post_id"), Some(&Value::I64(post)));

    let err = db
        .insert(Insert::new("comments").value(record!("post_id" => post + 100)))
        .await
        .unwrap_err();
    assert!(err.is_execution_failed(), "{err}");
}

async fn indices_and_foreign_keys_change_independently(test: &mut DbTest) {
    let indexed = comments(ForeignKeyAction::NoAction).index(Index::new(["post_id", "body"]));
    let db = test.setup_db(collections![posts(), indexed]).await;
    let post = insert_one(&db, "posts", record!("title" => "a")).await;
    insert_one(&db, "comments", record!("post_id" => post, "body" => "x")).await;
    db.close().await.unwrap();

    // Dropping the index leaves the foreign key in place
    let db = test
        .setup_db(collections![posts(), comments(ForeignKeyAction::NoAction)])
        .await;
    let err = db
        .insert(Insert::new("comments").value(record!("post_id" => post + 100)))
        .await
        .unwrap_err();
    assert!(err.is_execution_failed(), "{err}");
    db.close().await.unwrap();

    // Dropping the foreign key keeps the rows
    let unconstrained = Collection::new("comments", "comments")
        .field(Field::integer("post_id"))
        .field(Field::text("body"))
        .index(Index::new(["post_id"]));
    let db = test.setup_db(collections![posts(), unconstrained]).await;
    insert_one(&db, "comments", record!("post_id" => post + 100)).await;
    assert_eq!(db.count("comments", Filter::new()).await.unwrap(), 2);
}

async fn cascading_deletes(test: &mut DbTest) {
    let db = test
        .setup_db(collections![posts(), comments(ForeignKeyAction::Cascade)])
        .await;

    let post = insert_one(&db, "posts", record!("title" => "a")).await;
    let other = insert_one(&db, "posts", record!("title" => "b")).await;
    for post_id in [post, post, other] {
        insert_one(&db, "comments", record!("post_id" => post_id)).await;
    }

    let deleted = db
        .delete(Delete::new("posts").filter(Condition::field("id").eq(post)))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let rows = db.select(Select::new("comments")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("post_id"), Some(&Value::I64(other)));
}

async fn restricted_deletes(test: &mut DbTest) {
    let db = test
        .setup_db(collections![posts(), comments(ForeignKeyAction::NoAction)])
        .await;

    let post = insert_one(&db, "posts", record!("title" => "a")).await;
    insert_one(&db, "comments", record!("post_id" => post)).await;

    let err = db
        .delete(Delete::new("posts").filter(Condition::field("id").eq(post)))
        .await
        .unwrap_err();
    assert!(err.is_execution_failed(), "{err}");
    assert_eq!(db.count("posts", Filter::new()).await.unwrap(), 1);
}

async fn invalid_schemas_are_rejected_before_connecting(_test: &mut DbTest) {
    let err = strata::schema::app::Schema::builder()
        .collection(comments(ForeignKeyAction::NoAction))
        .build()
        .unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
}

tests!(
    creates_tables_and_constraints,
    unchanged_schema_skips_migration,
    malformed_fingerprint_resynchronizes,
    added_fields_backfill_existing_rows,
    renamed_collection_keeps_its_rows,
    renamed_field_keeps_its_values,
    removed_collections_are_dropped,
    unrelated_tables_can_be_preserved,
    preserved_columns_survive_constraint_changes,
    indices_and_foreign_keys_change_independently,
    cascading_deletes,
    restricted_deletes,
    invalid_schemas_are_rejected_before_connecting,
);
