use super::*;
use crate::value::BoundValue;

fn text(s: &str) -> BoundValue {
    BoundValue::Text(s.to_string())
}

#[test]
fn builds_placeholders_in_order() {
    let mut q = Sql::new("SELECT * FROM users WHERE a = ");
    q.push_bind(BoundValue::Int(1)).push(" AND b = ").push_bind(text("x"));

    assert_eq!(q.to_sql(), "SELECT * FROM users WHERE a = $1 AND b = $2");
    assert_eq!(q.params(), &[BoundValue::Int(1), text("x")]);
}

#[test]
fn composed_fragments_continue_numbering() {
    let mut set = Sql::new("UPDATE users SET name = ");
    set.push_bind(text("Ann"));

    let mut w = Sql::empty();
    w.push(" WHERE id = ").push_bind(text("1"));
    set.push_sql(w);

    assert_eq!(set.to_sql(), "UPDATE users SET name = $1 WHERE id = $2");
    assert_eq!(set.params(), &[text("Ann"), text("1")]);
}

#[test]
fn fragment_starting_with_param_keeps_position() {
    let mut w = Sql::empty();
    w.push_bind(text("a")).push(" OR x = ").push_bind(text("b"));

    let mut q = Sql::new("SELECT 1 WHERE y = ");
    q.push_sql(w);

    assert_eq!(q.to_sql(), "SELECT 1 WHERE y = $1 OR x = $2");
    assert_eq!(q.param_count(), 2);
}

#[test]
fn idents_are_quoted_when_needed() {
    let mut q = Sql::new("SELECT ");
    q.push_ident_list(["id", "FirstName"]).push(" FROM ").push_ident("users");
    assert_eq!(q.to_sql(), r#"SELECT id, "FirstName" FROM users"#);
}

#[test]
fn column_binds_cast_through_text_when_asked() {
    let mut q = Sql::new("INSERT INTO prices (id, price) VALUES (");
    q.push_column_bind(text("1"), None)
        .push(", ")
        .push_column_bind(text("1.50"), Some("numeric(10,2)"))
        .push(")");

    assert_eq!(
        q.to_sql(),
        "INSERT INTO prices (id, price) VALUES ($1, CAST($2::text AS numeric(10,2)))"
    );
    assert_eq!(q.params(), &[text("1"), text("1.50")]);
}

#[test]
fn limit_appends_with_param() {
    let mut q = Sql::new("SELECT * FROM users");
    q.limit(10);
    assert_eq!(q.to_sql(), "SELECT * FROM users LIMIT $1");
    assert_eq!(q.params(), &[BoundValue::Int(10)]);
}

#[test]
fn many_params_render_multi_digit_placeholders() {
    let mut q = Sql::empty();
    for i in 0..12 {
        if i > 0 {
            q.push(",");
        }
        q.push_bind(BoundValue::Int(i));
    }
    assert!(q.to_sql().ends_with("$11,$12"));
}

#[test]
fn empty_builder_is_empty() {
    assert!(Sql::empty().is_empty());
    assert!(Sql::new("").is_empty());
    assert!(!Sql::new("x").is_empty());
}

#[test]
fn truncation_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("hello", 10), "hello");
    assert_eq!(truncate_sql_bytes("hello", 3), "hel");
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
}
