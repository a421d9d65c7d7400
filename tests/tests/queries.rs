use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use strata::AutoStrategy;
use tests::prelude::*;

fn items() -> Collection {
    Collection::new("items", "items")
        .field(Field::text("name").required())
        .field(Field::integer("qty"))
        .field(Field::number("price"))
        .field(Field::boolean("active").default(true))
}

async fn seed_items(db: &Db) {
    let rows = [
        ("apple", Some(3), 0.5, true),
        ("banana", Some(12), 0.25, true),
        ("cherry", Some(40), 4.0, false),
        ("date", None, 2.5, true),
        ("elderberry", Some(7), 9.75, false),
    ];

    let outcome = db
        .insert(Insert::new("items").values(rows.into_iter().map(|(name, qty, price, active)| {
            let mut record = record!("name" => name, "price" => price, "active" => active);
            if let Some(qty) = qty {
                record.insert("qty", qty);
            }
            record
        })))
        .await
        .unwrap();
    assert!(outcome.is_complete(), "{:?}", outcome.errors);
}

async fn names(db: &Db, select: Select) -> Vec<String> {
    db.select(select.fields(["name"]).order_by(OrderBy::asc("name")))
        .await
        .unwrap()
        .iter()
        .map(|record| record.get("name").and_then(Value::as_str).unwrap().to_string())
        .collect()
}

async fn insert_select_update_delete(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    let outcome = db
        .insert(Insert::new("notes").values([
            record!("body" => "one"),
            record!("body" => "two"),
            record!("body" => "three"),
        ]))
        .await
        .unwrap();
    let ids = outcome.ids();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(outcome.inserted[1].get("body"), Some(&Value::from("two")));

    let rows = db
        .select(Select::new("notes").order_by(OrderBy::asc("id")))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("id"), Some(&Value::I64(ids[0])));
    assert_eq!(rows[2].get("body"), Some(&Value::from("three")));

    let updated = db
        .update(
            Update::new("notes")
                .filter(Condition::field("id").eq(ids[1]))
                .set("body", "deux"),
        )
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let rows = db
        .select(Select::new("notes").filter(Condition::field("id").eq(ids[1])))
        .await
        .unwrap();
    assert_eq!(rows[0].get("body"), Some(&Value::from("deux")));

    let deleted = db
        .delete(Delete::new("notes").filter(Condition::field("body").ne("deux")))
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(db.count("notes", Filter::new()).await.unwrap(), 1);

    // No filter touches every record
    assert_eq!(db.update(Update::new("notes").set("body", "all")).await.unwrap(), 1);
    assert_eq!(db.delete(Delete::new("notes")).await.unwrap(), 1);
}

async fn comparison_filters(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;
    seed_items(&db).await;

    let select = || Select::new("items");

    assert_eq!(names(&db, select().filter(Condition::field("qty").eq(12))).await, ["banana"]);
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").ne(12))).await,
        ["apple", "cherry", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").lt(7))).await,
        ["apple"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").le(7))).await,
        ["apple", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("price").gt(2.5))).await,
        ["cherry", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("price").ge(2))).await,
        ["cherry", "date", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").between(5, 12))).await,
        ["banana", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").not_between(5, 12))).await,
        ["apple", "cherry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("active").eq(false))).await,
        ["cherry", "elderberry"]
    );
}

async fn list_pattern_and_null_filters(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;
    seed_items(&db).await;

    let select = || Select::new("items");

    assert_eq!(
        names(&db, select().filter(Condition::field("name").in_list(["date", "fig", "apple"]))).await,
        ["apple", "date"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("qty").not_in_list([3, 40]))).await,
        ["banana", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("name").like("%rr%"))).await,
        ["cherry", "elderberry"]
    );
    assert_eq!(
        names(&db, select().filter(Condition::field("name").not_like("%a%"))).await,
        ["cherry", "elderberry"]
    );
    assert_eq!(names(&db, select().filter(Condition::field("qty").is_null())).await, ["date"]);
    assert_eq!(
        db.count("items", Condition::field("qty").is_not_null()).await.unwrap(),
        4
    );
}

async fn combined_filters(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;
    seed_items(&db).await;

    // Conditions of one select are AND-ed
    let select = Select::new("items")
        .filter(Condition::field("active").eq(true))
        .filter(Condition::field("price").lt(1));
    assert_eq!(names(&db, select).await, ["apple", "banana"]);

    let select = Select::new("items").filter(Condition::or([
        vec![Condition::field("qty").gt(20)],
        vec![
            Condition::field("active").eq(true),
            Condition::field("price").gt(1),
        ],
    ]));
    assert_eq!(names(&db, select).await, ["cherry", "date"]);

    let select = Select::new("items")
        .filter(Condition::raw("\"qty\" * \"price\" > ?", [15.0]))
        .filter(Condition::field("name").ne("cherry"));
    assert_eq!(names(&db, select).await, ["elderberry"]);
}

async fn ordering_and_paging(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;
    seed_items(&db).await;

    let rows = db
        .select(
            Select::new("items")
                .fields(["name", "price"])
                .order_by(OrderBy::desc("price"))
                .limit(2)
                .offset(1),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(&Value::from("cherry")));
    assert_eq!(rows[1].get("price"), Some(&Value::F64(2.5)));
    assert!(!rows[0].contains("qty"));

    let rows = db
        .select(
            Select::new("items")
                .filter(Condition::field("qty").is_not_null())
                .order_by(OrderBy::asc("active"))
                .order_by(OrderBy::desc("qty")),
        )
        .await
        .unwrap();
    let order: Vec<_> = rows
        .iter()
        .map(|row| row.get("name").and_then(Value::as_str).unwrap())
        .collect();
    assert_eq!(order, ["cherry", "elderberry", "banana", "apple"]);
}

async fn defaults_and_automatic_values(test: &mut DbTest) {
    let stamped = Collection::new("events", "events")
        .field(Field::text("kind").required())
        .field(Field::integer("attempts").default(0))
        .field(Field::date_time("created_at").auto(AutoStrategy::Now))
        .field(Field::date_time("touched_at").auto(AutoStrategy::NowOnUpdate));
    let db = test.setup_db(collections![stamped]).await;

    let before = Utc::now() - chrono::Duration::seconds(1);
    let outcome = db
        .insert(Insert::new("events").value(record!("kind" => "signup")))
        .await
        .unwrap();
    let inserted = &outcome.inserted[0];
    assert_eq!(inserted.get("attempts"), Some(&Value::I64(0)));

    let rows = db.select(Select::new("events")).await.unwrap();
    let Some(Value::DateTime(created_at)) = rows[0].get("created_at") else {
        panic!("created_at not set: {:?}", rows[0]);
    };
    assert!(*created_at >= before);
    assert!(matches!(rows[0].get("touched_at"), Some(Value::DateTime(_))));

    db.update(Update::new("events").set("attempts", 1))
        .await
        .unwrap();
    let rows = db.select(Select::new("events")).await.unwrap();
    assert_eq!(rows[0].get("attempts"), Some(&Value::I64(1)));
    assert_eq!(rows[0].get("created_at"), Some(&Value::DateTime(*created_at)));
}

async fn invalid_rows_are_reported_per_row(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;

    let outcome = db
        .insert(Insert::new("items").values([
            record!("name" => "ok", "qty" => 1),
            record!("qty" => 2),
            record!("name" => "extra", "colour" => "red"),
            record!("name" => "typed", "qty" => "many", "price" => "cheap"),
            record!("name" => "also ok"),
        ]))
        .await
        .unwrap();

    assert!(!outcome.is_complete());
    assert_eq!(outcome.inserted.len(), 2);
    assert_eq!(outcome.errors.keys().copied().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(outcome.errors[&1].get("name").unwrap(), ["is required"]);
    assert_eq!(outcome.errors[&2].get("colour").unwrap(), ["unknown field"]);

    let mut fields: Vec<_> = outcome.errors[&3].fields().collect();
    fields.sort();
    assert_eq!(fields, ["price", "qty"]);

    assert_eq!(db.count("items", Filter::new()).await.unwrap(), 2);
    let rows = db
        .select(Select::new("items").filter(Condition::field("name").eq("also ok")))
        .await
        .unwrap();
    assert_eq!(rows[0].get("active"), Some(&Value::Bool(true)));
}

async fn invalid_requests(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;
    seed_items(&db).await;
    test.clear_ops();

    let err = db
        .update(Update::new("items").set("qty", "many"))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");
    assert!(err.validation_errors().unwrap().get("qty").is_some());

    let err = db
        .update(Update::new("items").set("name", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err.validation_errors().unwrap().get("name").unwrap(), ["is required"]);

    let err = db
        .select(Select::new("items").fields(["name", "colour"]))
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = db
        .select(Select::new("items").filter(Condition::field("name").gt("b")))
        .await
        .unwrap_err();
    assert!(err.is_invalid_condition(), "{err}");
    assert_eq!(err.condition_error().unwrap().field(), "name");

    let err = db
        .count("items", Condition::field("name").is_null())
        .await
        .unwrap_err();
    assert!(err.is_invalid_condition(), "{err}");

    let err = db
        .delete(Delete::new("items").filter(Condition::field("qty").in_list(Vec::<i64>::new())))
        .await
        .unwrap_err();
    assert!(err.is_invalid_condition(), "{err}");

    let err = db
        .select(Select::new("items").filter(Condition::raw("\"qty\" > ?", Vec::<i64>::new())))
        .await
        .unwrap_err();
    assert!(err.is_invalid_condition(), "{err}");

    let err = db.select(Select::new("missing")).await.unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");

    // Rejected before any SQL was sent
    assert!(test.ops().is_empty());
    assert_eq!(db.count("items", Filter::new()).await.unwrap(), 5);
}

async fn populate_foreign_keys(test: &mut DbTest) {
    let authors = Collection::new("authors", "authors").field(Field::text("name").required());
    let books = Collection::new("books", "books")
        .field(Field::text("title"))
        .field(Field::integer("author_id"))
        .foreign_key(ForeignKey::new("author_id", "authors"));
    let db = test.setup_db(collections![authors, books]).await;

    let ids = db
        .insert(Insert::new("authors").values([record!("name" => "Le Guin"), record!("name" => "Lem")]))
        .await
        .unwrap()
        .ids();
    db.insert(Insert::new("books").values([
        record!("title" => "The Dispossessed", "author_id" => ids[0]),
        record!("title" => "Solaris", "author_id" => ids[1]),
        record!("title" => "Anonymous"),
    ]))
    .await
    .unwrap();

    let rows = db
        .select(Select::new("books").order_by(OrderBy::asc("id")).populate())
        .await
        .unwrap();
    assert_eq!(
        rows[0].get("author_id"),
        Some(&Value::Json(json!({ "id": ids[0], "name": "Le Guin" })))
    );
    assert_eq!(
        rows[1].get("author_id"),
        Some(&Value::Json(json!({ "id": ids[1], "name": "Lem" })))
    );
    assert_eq!(rows[2].get("author_id"), Some(&Value::Null));

    // Without populate the key is returned as stored
    let rows = db
        .select(Select::new("books").filter(Condition::field("title").eq("Solaris")))
        .await
        .unwrap();
    assert_eq!(rows[0].get("author_id"), Some(&Value::I64(ids[1])));
}

async fn datetime_json_and_array_fields(test: &mut DbTest) {
    let entries = Collection::new("entries", "entries")
        .field(Field::date_time("at"))
        .field(Field::json("meta"))
        .field(Field::array("tags", ScalarKind::Text));
    let db = test.setup_db(collections![entries]).await;

    let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();
    let tags = |tags: &[&str]| Value::List(tags.iter().map(|tag| Value::from(*tag)).collect());

    db.insert(Insert::new("entries").values([
        record!("at" => day(1), "meta" => json!({ "n": 1 }), "tags" => tags(&["a", "b"])),
        record!("at" => "2024-03-02T12:00:00Z", "meta" => json!([1, 2]), "tags" => tags(&["b"])),
        record!("at" => day(3), "tags" => tags(&[])),
    ]))
    .await
    .unwrap();

    let rows = db
        .select(Select::new("entries").order_by(OrderBy::asc("at")))
        .await
        .unwrap();
    assert_eq!(rows[1].get("at"), Some(&Value::DateTime(day(2))));
    assert_eq!(rows[0].get("meta"), Some(&Value::Json(json!({ "n": 1 }))));
    assert_eq!(rows[1].get("meta"), Some(&Value::Json(json!([1, 2]))));
    assert_eq!(rows[2].get("meta"), Some(&Value::Null));
    assert_eq!(rows[0].get("tags"), Some(&tags(&["a", "b"])));
    assert_eq!(rows[2].get("tags"), Some(&tags(&[])));

    let count = |condition| db.count("entries", condition);
    assert_eq!(count(Condition::field("at").gt(day(1))).await.unwrap(), 2);
    assert_eq!(
        count(Condition::field("at").between(day(1), "2024-03-02T12:00:00Z")).await.unwrap(),
        2
    );
    assert_eq!(count(Condition::field("tags").includes("b")).await.unwrap(), 2);
    assert_eq!(count(Condition::field("tags").excludes("a")).await.unwrap(), 2);
    assert_eq!(
        count(Condition::field("tags").includes_any(["a", "z"])).await.unwrap(),
        1
    );
    assert_eq!(
        count(Condition::field("tags").excludes_any(["a", "b"])).await.unwrap(),
        1
    );

    let outcome = db
        .insert(Insert::new("entries").value(record!("at" => "yesterday", "tags" => tags(&["x"]))))
        .await
        .unwrap();
    assert!(outcome.errors[&0].get("at").is_some());

    let err = db
        .count("entries", Condition::field("tags").eq("a"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_condition(), "{err}");
}

async fn query_strings(test: &mut DbTest) {
    let db = test.setup_db(collections![items()]).await;

    let insert = Insert::from_query_string(
        "items",
        r#"values=[{"name":"apple","qty":3},{"name":"fig","qty":9,"active":false}]"#,
    )
    .unwrap();
    assert!(db.insert(insert).await.unwrap().is_complete());

    let select = Select::from_query_string(
        "items",
        "?fields=name%2Cqty&where=%5B%7B%22field%22%3A%22qty%22%2C%22op%22%3A%22gt%22%2C%22value%22%3A1%7D%5D&orderBy=-qty&limit=1",
    )
    .unwrap();
    let rows = db.select(select.clone()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("fig")));

    // Encoding is canonical and decodes to the same request
    let encoded = select.to_query_string();
    assert_eq!(Select::from_query_string("items", &encoded).unwrap(), select);
    assert_eq!(strata::query_string::normalize(&encoded).unwrap(), encoded);

    let update = Update::from_query_string(
        "items",
        r#"where=[{"field":"name","op":"eq","value":"apple"}]&set={"qty":4}"#,
    )
    .unwrap();
    assert_eq!(db.update(update).await.unwrap(), 1);

    let delete = Delete::from_query_string(
        "items",
        r#"where=[{"field":"qty","op":"in","value":[4,5]}]"#,
    )
    .unwrap();
    assert_eq!(db.delete(delete).await.unwrap(), 1);

    assert!(Select::from_query_string("items", "set=%7B%22qty%22%3A1%7D").is_err());
    assert!(Select::from_query_string("items", "colour=red").is_err());
}

tests!(
    insert_select_update_delete,
    comparison_filters,
    list_pattern_and_null_filters,
    combined_filters,
    ordering_and_paging,
    defaults_and_automatic_values,
    invalid_rows_are_reported_per_row,
    invalid_requests,
    populate_foreign_keys,
    datetime_json_and_array_fields,
    query_strings,
);
