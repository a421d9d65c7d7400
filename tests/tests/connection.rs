use tests::prelude::*;

async fn connect_reports_fresh_database(test: &mut DbTest) {
    let db = test.db(collections![notes()]);
    assert_eq!(db.state(), State::Disconnected);

    let report = db.connect().await.unwrap();
    assert_eq!(
        report,
        SyncReport {
            created_options_table: true,
            synced: true,
        }
    );
    assert_eq!(db.state(), State::Connected);

    let other = test.db(collections![notes()]);
    let report = other.connect().await.unwrap();
    assert_eq!(report, SyncReport::default());
}

async fn state_transitions(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    let err = db.connect().await.unwrap_err();
    assert!(err.is_connection_state(), "{err}");
    assert_eq!(db.state(), State::Connected);

    db.close().await.unwrap();
    assert_eq!(db.state(), State::Disconnected);

    let err = db.close().await.unwrap_err();
    assert!(err.is_already_closed(), "{err}");

    let err = db.select(Select::new("notes")).await.unwrap_err();
    assert!(err.is_not_connected(), "{err}");

    let err = db.exec("DELETE FROM \"notes\"", &[]).await.unwrap_err();
    assert!(err.is_not_connected(), "{err}");

    // Reconnecting finds the schema in place
    let report = db.connect().await.unwrap();
    assert!(!report.synced);
    assert_eq!(db.state(), State::Connected);
}

async fn clones_share_the_connection(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    let clone = db.clone();

    clone
        .insert(Insert::new("notes").value(record!("body" => "shared")))
        .await
        .unwrap();
    assert_eq!(db.count("notes", Condition::field("body").eq("shared")).await.unwrap(), 1);

    db.close().await.unwrap();
    assert_eq!(clone.state(), State::Disconnected);
}

async fn raw_statements(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;
    assert_eq!(db.transactions_supported(), test.capability().transactions);

    let inserted = db
        .exec(
            "INSERT INTO \"notes\" (\"body\") VALUES (?), (?)",
            &[Value::from("first"), Value::from("it's ?")],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let rows = db
        .query(
            "SELECT \"body\" FROM \"notes\" WHERE \"body\" <> '?' AND \"body\" LIKE ? ORDER BY \"body\"",
            &[Value::from("%?%")],
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("body"), Some(&Value::from("it's ?")));

    let err = db
        .exec("DELETE FROM \"notes\" WHERE \"body\" = ?", &[])
        .await
        .unwrap_err();
    assert!(!err.is_execution_failed());
}

async fn execution_errors_carry_the_statement(test: &mut DbTest) {
    let db = test.setup_db(collections![notes()]).await;

    let err = db
        .exec("INSERT INTO \"missing\" (\"body\") VALUES (?)", &[Value::from("x")])
        .await
        .unwrap_err();

    assert!(err.is_execution_failed(), "{err}");
    assert!(err.failed_sql().unwrap().contains("\"missing\""));
    assert!(err.to_string().contains("with params ['x']"), "{err}");
}

async fn connect_fails_while_the_database_is_unreachable(test: &mut DbTest) {
    let db = test.db(collections![notes()]);

    // The first statement of the sequence
    test.fail_on(if test.capability().transactions {
        "BEGIN"
    } else {
        "SELECT COUNT(*)"
    });

    assert!(db.connect().await.is_err());
    assert_eq!(db.state(), State::Disconnected);

    db.connect().await.unwrap();
    assert_eq!(db.state(), State::Connected);
}

tests!(
    connect_reports_fresh_database,
    state_transitions,
    clones_share_the_connection,
    raw_statements,
    execution_errors_carry_the_statement,
    connect_fails_while_the_database_is_unreachable,
);
