//! Statement text and parameter assembly.
//!
//! [`Sql`] stores SQL pieces and bound values separately. Placeholder numbers
//! (`$1, $2, ...`) are assigned only when the text is rendered, from the order
//! in which values were pushed, so text order and bind order cannot drift apart
//! and no counter is shared between calls.
//!
//! # Example
//!
//! ```
//! use pgtable::{BoundValue, Sql};
//!
//! let mut q = Sql::new("SELECT * FROM users WHERE id = ");
//! q.push_bind(BoundValue::Text("1".into()));
//! assert_eq!(q.to_sql(), "SELECT * FROM users WHERE id = $1");
//! ```

mod builder;

#[cfg(test)]
mod tests;

pub use builder::Sql;

/// Truncate `sql` to at most `max_bytes` bytes on a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
