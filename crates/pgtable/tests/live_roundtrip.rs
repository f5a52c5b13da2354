//! Round trips against a live Postgres. Skipped unless `DATABASE_URL` is set.

use pgtable::{
    ConnectConfig, Database, OpKind, Predicate, RowAssignment, SortOptions, TableError,
};
use std::time::Duration;

async fn try_connect() -> Option<(tokio_postgres::Client, String)> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some((client, database_url))
}

/// Create `table` with `columns`, replacing any leftover from an earlier run.
async fn create_table(client: &tokio_postgres::Client, table: &str, columns: &str) {
    client
        .batch_execute(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns})"
        ))
        .await
        .unwrap();
}

fn table_name(base: &str) -> String {
    format!("pgtable_it_{base}_{}", std::process::id())
}

#[tokio::test]
async fn users_scenario_round_trips() {
    let Some((client, url)) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let users = table_name("users");
    create_table(
        &client,
        &users,
        "id integer PRIMARY KEY, name varchar(45), active bit(1)",
    )
    .await;

    let db = Database::connect(&ConnectConfig::from_url(&url)).await.unwrap();
    assert!(db.is_healthy());
    assert!(db.has_table(&users));

    let row = RowAssignment::from_pairs([("id", "1"), ("name", "Ann"), ("active", "yes")]);
    assert_eq!(db.insert(&users, &row).await.unwrap(), 1);
    let row = RowAssignment::from_pairs([("id", "2"), ("name", "Bob"), ("active", "TRUE")]);
    db.insert(&users, &row).await.unwrap();

    let rows = db
        .search(&users, &Predicate::all_and([("id", "1")]), &["*"])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "1");
    assert_eq!(rows[0]["name"], "Ann");
    assert_eq!(rows[0]["active"], "0");

    // LIKE on text columns
    let rows = db
        .search(&users, &Predicate::all_and([("name", "B%")]), &["id"])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "2");

    db.update(
        &users,
        &RowAssignment::from_pairs([("name", "")]),
        &Predicate::all_and([("id", "1")]),
    )
    .await
    .unwrap();
    let rows = db
        .search(&users, &Predicate::all_and([("id", "1")]), &["name"])
        .await
        .unwrap();
    assert_eq!(rows[0]["name"], "");

    let rows = db
        .search_sorted(&users, &Predicate::none(), &SortOptions::by("id").descending().limit(1))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "2");

    let deleted = db
        .delete_where_greater_than(&users, &Predicate::all_and([("id", "1")]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(db.delete(&users, &Predicate::none()).await.unwrap(), 1);
    let rows = db.search(&users, &Predicate::none(), &["*"]).await.unwrap();
    assert!(rows.is_empty());
    assert!(db.all_errors().is_empty());

    db.close().await;
    client
        .batch_execute(&format!("DROP TABLE {users}"))
        .await
        .unwrap();
}

#[tokio::test]
async fn byte_search_and_bad_values() {
    let Some((client, url)) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let assets = table_name("assets");
    create_table(
        &client,
        &assets,
        "id integer, title text, payload bytea, score double precision, ratio real, created date, flag boolean",
    )
    .await;

    let db = Database::connect(&ConnectConfig::from_url(&url)).await.unwrap();

    let row = RowAssignment::from_pairs([
        ("id", "7"),
        ("score", "2.5"),
        ("ratio", "0.5"),
        ("created", "2024-01-02"),
        ("flag", "1"),
    ])
    .set_bytes("payload", vec![0xde, 0xad]);
    db.insert(&assets, &row).await.unwrap();

    let rows = db
        .search_bytes(&assets, &Predicate::all_and([("id", "7")]), &["*"])
        .await
        .unwrap();
    let row = &rows[0];
    assert_eq!(row["id"], 7i32.to_le_bytes());
    assert_eq!(row["title"], Vec::<u8>::new());
    assert_eq!(row["payload"], vec![0xde, 0xad]);
    assert_eq!(row["score"], 2.5f64.to_le_bytes());
    assert_eq!(row["ratio"], 0.5f32.to_le_bytes());
    assert_eq!(row["created"].len(), 20);
    assert_eq!(row["flag"], vec![1]);

    let err = db
        .insert(&assets, &RowAssignment::from_pairs([("id", "seven")]))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::Insert(_)));
    assert_eq!(db.all_errors()[0].op, OpKind::Insert);

    db.close().await;
    client
        .batch_execute(&format!("DROP TABLE {assets}"))
        .await
        .unwrap();
}

#[tokio::test]
async fn refused_connection_is_an_error() {
    let config = ConnectConfig::new()
        .host("127.0.0.1")
        .port(1)
        .connect_timeout(Duration::from_secs(2));

    // No Database is returned, so there is no error log to consult.
    match Database::connect(&config).await {
        Err(TableError::Connect(_)) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("connected to port 1"),
    }
}

#[tokio::test]
async fn numeric_time_and_array_columns_round_trip() {
    let Some((client, url)) = try_connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let prices = table_name("prices");
    create_table(
        &client,
        &prices,
        "id integer, name varchar(20), price numeric(10,2), starts time, tags text[]",
    )
    .await;

    let db = Database::connect(&ConnectConfig::from_url(&url)).await.unwrap();
    assert!(db.is_healthy());

    for (id, price, starts) in [("1", "1.50", "09:00"), ("2", "12.25", "17:30")] {
        let row = RowAssignment::from_pairs([
            ("id", id),
            ("name", "tea"),
            ("price", price),
            ("starts", starts),
            ("tags", "{hot,green}"),
        ]);
        assert_eq!(db.insert(&prices, &row).await.unwrap(), 1);
    }

    let rows = db
        .search(&prices, &Predicate::all_and([("id", "1")]), &["*"])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["price"], "1.50");
    assert_eq!(rows[0]["starts"], "09:00:00");
    assert_eq!(rows[0]["tags"], "{hot,green}");

    let rows = db
        .search(&prices, &Predicate::all_and([("price", "12.25")]), &["id"])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "2");

    // Sorts numerically, not by the text rendering.
    let rows = db
        .search_sorted(&prices, &Predicate::none(), &SortOptions::by("price").descending())
        .await
        .unwrap();
    assert_eq!(rows[0]["price"], "12.25");

    let rows = db
        .search_bytes(&prices, &Predicate::all_and([("id", "1")]), &["*"])
        .await
        .unwrap();
    assert_eq!(rows[0]["id"], 1i32.to_le_bytes());
    assert!(!rows[0].contains_key("price"));
    assert!(!rows[0].contains_key("starts"));

    db.update(
        &prices,
        &RowAssignment::from_pairs([("price", "2"), ("starts", "")]),
        &Predicate::all_and([("price", "1.50")]),
    )
    .await
    .unwrap();
    let rows = db
        .search(&prices, &Predicate::all_and([("id", "1")]), &["price", "starts"])
        .await
        .unwrap();
    assert_eq!(rows[0]["price"], "2.00");
    assert_eq!(rows[0]["starts"], "");

    let deleted = db
        .delete_where_greater_than(&prices, &Predicate::all_and([("price", "10")]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    let deleted = db
        .delete(&prices, &Predicate::all_and([("price", "2.00")]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert!(db.all_errors().is_empty());

    db.close().await;
    client
        .batch_execute(&format!("DROP TABLE {prices}"))
        .await
        .unwrap();
}
