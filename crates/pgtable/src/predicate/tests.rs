use super::*;
use crate::catalog::SchemaCatalog;
use crate::driver::ColumnDescription;
use crate::error::TableError;

fn users() -> SchemaCatalog {
    SchemaCatalog::from_tables([(
        "users",
        vec![
            ColumnDescription::new("id", "integer"),
            ColumnDescription::new("name", "character varying(45)"),
            ColumnDescription::new("active", "bit(1)"),
            ColumnDescription::new("Nick", "text"),
        ],
    )])
}

fn text(s: &str) -> BoundValue {
    BoundValue::Text(s.to_string())
}

#[test]
fn empty_predicate_renders_nothing() {
    let catalog = users();
    let table = catalog.table("users").unwrap();

    for p in [Predicate::none(), Predicate::all_and(Vec::<(&str, &str)>::new())] {
        let sql = build_where(table, &p).unwrap();
        assert!(sql.is_empty());
        assert_eq!(sql.param_count(), 0);
    }
    assert!(build_where_greater_than(table, &Predicate::none()).unwrap().is_empty());
}

#[test]
fn all_and_uses_like_only_for_strings() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::all_and([("id", "1"), ("name", "A%"), ("active", "true")]);

    let sql = build_where(table, &p).unwrap();
    let text_sql = sql.to_sql();

    assert_eq!(text_sql, " WHERE id = $1 AND name LIKE $2 AND active = $3");
    assert_eq!(text_sql.matches(" AND ").count(), 2);
    assert_eq!(sql.params(), &[text("1"), text("A%"), BoundValue::Int(1)]);
}

#[test]
fn all_or_ignores_stored_combinators() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::all_or([("id", "1"), ("id", "2"), ("id", "3")]);

    let sql = build_where(table, &p).unwrap();
    assert_eq!(sql.to_sql(), " WHERE id = $1 OR id = $2 OR id = $3");
}

#[test]
fn mixed_joiner_comes_from_the_following_condition() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::mixed([
        // The first flag is never read.
        ("id", "1", Combinator::Or),
        ("name", "Ann", Combinator::And),
        ("active", "0", Combinator::Or),
    ]);

    let sql = build_where(table, &p).unwrap();
    assert_eq!(
        sql.to_sql(),
        " WHERE id = $1 AND name LIKE $2 OR active = $3"
    );

    let flipped = Predicate::mixed([
        ("id", "1", Combinator::And),
        ("name", "Ann", Combinator::And),
        ("active", "0", Combinator::Or),
    ]);
    assert_eq!(build_where(table, &flipped).unwrap().to_sql(), sql.to_sql());
}

#[test]
fn builder_chain_is_mixed() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::new().and("Nick", "x").or("id", "2");

    assert_eq!(p.mode(), PredicateMode::Mixed);
    assert_eq!(
        build_where(table, &p).unwrap().to_sql(),
        r#" WHERE "Nick" LIKE $1 OR id = $2"#
    );
}

#[test]
fn unknown_column_fails() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::all_and([("id", "1"), ("nmae", "x")]);

    let err = build_where(table, &p).unwrap_err();
    assert!(matches!(err, TableError::UnknownColumn { ref column, .. } if column == "nmae"));

    let err = build_where_greater_than(table, &p).unwrap_err();
    assert!(err.is_unknown_name());
}

#[test]
fn greater_than_binds_raw_strings() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::all_and([("id", "10"), ("active", "true")]);

    let sql = build_where_greater_than(table, &p).unwrap();
    assert_eq!(sql.to_sql(), " WHERE id > $1 AND active > $2");
    assert_eq!(sql.params(), &[text("10"), text("true")]);
}

#[test]
fn values_never_reach_sql_text() {
    let catalog = users();
    let table = catalog.table("users").unwrap();
    let p = Predicate::all_and([("name", "x'; DROP TABLE users; --")]);

    let sql = build_where(table, &p).unwrap();
    assert!(!sql.to_sql().contains("DROP"));
}

#[test]
fn all_and_variant_overrides_or_joiners() {
    let catalog = users();
    let table = catalog.table("users").unwrap();

    let any = Predicate::all_or([("id", "1"), ("name", "Ann")]);
    assert_eq!(
        build_where_all_and(table, &any).unwrap().to_sql(),
        " WHERE id = $1 AND name LIKE $2"
    );

    let mixed = Predicate::new().and("id", "1").or("active", "1");
    assert_eq!(
        build_where_all_and(table, &mixed).unwrap().to_sql(),
        " WHERE id = $1 AND active = $2"
    );
    assert_eq!(
        build_where(table, &mixed).unwrap().to_sql(),
        " WHERE id = $1 OR active = $2"
    );
}

#[test]
fn server_converted_columns_compare_through_casts() {
    let catalog = SchemaCatalog::from_tables([(
        "prices",
        vec![
            ColumnDescription::new("id", "integer"),
            ColumnDescription::new("price", "numeric(10,2)"),
            ColumnDescription::new("tags", "text[]"),
        ],
    )]);
    let table = catalog.table("prices").unwrap();

    let p = Predicate::all_and([("price", "1.50"), ("tags", "%red%")]);
    let sql = build_where(table, &p).unwrap();
    assert_eq!(
        sql.to_sql(),
        " WHERE price = CAST($1::text AS numeric(10,2)) AND tags::text LIKE $2"
    );
    assert_eq!(sql.params(), &[text("1.50"), text("%red%")]);

    let gt = Predicate::all_and([("price", "1")]);
    assert_eq!(
        build_where_greater_than(table, &gt).unwrap().to_sql(),
        " WHERE price > CAST($1::text AS numeric(10,2))"
    );
}
