use tests::prelude::*;
use tokio::task::JoinSet;

/// Connects `n` fresh handles at once and returns them with their reports.
async fn connect_all(
    test: &DbTest,
    n: usize,
    schema: impl Fn() -> strata::schema::app::Schema,
) -> Vec<(Db, SyncReport)> {
    let mut tasks = JoinSet::new();

    for _ in 0..n {
        let db = test.db(schema());
        tasks.spawn(async move {
            let report = db.connect().await;
            (db, report)
        });
    }

    let mut connected = vec![];
    while let Some(joined) = tasks.join_next().await {
        let (db, report) = joined.unwrap();
        connected.push((db, report.unwrap()));
    }
    connected
}

async fn concurrent_connects_migrate_once(test: &mut DbTest) {
    let n = test.max_connections();
    let connected = connect_all(test, n, || collections![notes()]).await;
    assert_eq!(connected.len(), n);

    let created = connected
        .iter()
        .filter(|(_, report)| report.created_options_table)
        .count();
    let synced: Vec<_> = connected
        .iter()
        .filter(|(_, report)| report.synced)
        .collect();

    assert_eq!(synced.len(), 1);
    if test.capability().transactions {
        assert_eq!(created, 1);
        assert!(synced[0].1.created_options_table);
    } else {
        // Without transactions several handles may race to create the table
        assert!(created >= 1);
    }

    assert_eq!(test.sql_starting_with("CREATE TABLE \"notes\"").len(), 1);

    for (db, _) in &connected {
        assert_eq!(db.state(), State::Connected);
    }

    let (first, _) = &connected[0];
    let (last, _) = &connected[n - 1];
    first
        .insert(Insert::new("notes").value(record!("body" => "seen")))
        .await
        .unwrap();
    assert_eq!(last.count("notes", Filter::new()).await.unwrap(), 1);
}

async fn concurrent_connects_after_a_schema_change(test: &mut DbTest) {
    test.setup_db(collections![notes()]).await;
    test.clear_ops();

    let n = test.max_connections().min(20);
    let connected = connect_all(test, n, || {
        collections![notes().field(Field::integer("priority").default(1))]
    })
    .await;

    let synced = connected.iter().filter(|(_, report)| report.synced).count();
    assert_eq!(synced, 1);
    assert!(connected
        .iter()
        .all(|(_, report)| !report.created_options_table));
    assert_eq!(test.sql_starting_with("ALTER TABLE \"notes\" ADD COLUMN").len(), 1);
}

tests!(
    concurrent_connects_migrate_once,
    concurrent_connects_after_a_schema_change,
);
