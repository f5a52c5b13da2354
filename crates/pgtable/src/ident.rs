//! SQL identifier rendering.
//!
//! Table and column names only reach SQL text after they were found in the
//! [`SchemaCatalog`](crate::SchemaCatalog), so they are real catalog names.
//! Rendering still quotes anything that would not survive as a bare identifier:
//!
//! - Bare names must match `[a-z_][a-z0-9_$]*` (Postgres folds unquoted names to lower case)
//!   and must not be a reserved keyword
//! - Everything else is written as `"name"` with `"` escaped as `""`

// Reserved in Postgres; these cannot be column or table names unquoted.
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant", "group",
    "having", "ilike", "in", "initially", "inner", "intersect", "into", "is", "isnull",
    "join", "lateral", "leading", "left", "like", "limit", "localtime", "localtimestamp",
    "natural", "not", "notnull", "null", "offset", "on", "only", "or", "order", "outer",
    "overlaps", "placing", "primary", "references", "returning", "right", "select",
    "session_user", "similar", "some", "symmetric", "system_user", "table", "tablesample",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic",
    "verbose", "when", "where", "window", "with",
];

/// Whether `name` can be written without quotes.
pub fn is_bare(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_lowercase() || c.is_ascii_digit())
        && !RESERVED.contains(&name)
}

/// Append `name` to `out`, quoting it when needed.
pub fn write_ident(out: &mut String, name: &str) {
    if is_bare(name) {
        out.push_str(name);
        return;
    }
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

/// Render `name` as a SQL identifier.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_ident(&mut out, name);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_names_stay_bare() {
        assert_eq!(quote_ident("users"), "users");
        assert_eq!(quote_ident("_private"), "_private");
        assert_eq!(quote_ident("col$1"), "col$1");
    }

    #[test]
    fn mixed_case_and_symbols_are_quoted() {
        assert_eq!(quote_ident("UserTable"), r#""UserTable""#);
        assert_eq!(quote_ident("first name"), r#""first name""#);
        assert_eq!(quote_ident("1st"), r#""1st""#);
    }

    #[test]
    fn reserved_words_are_quoted() {
        assert_eq!(quote_ident("order"), r#""order""#);
        assert_eq!(quote_ident("user"), r#""user""#);
        assert_eq!(quote_ident("orders"), "orders");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
        assert_eq!(
            quote_ident("x; DROP TABLE users; --"),
            r#""x; DROP TABLE users; --""#
        );
    }
}
