//! Constructors for each supported query operation.

use super::tree::{ArgValue, QueryTree};
use std::collections::BTreeMap;

/// Attribute map accepted by the `Set*Attrs` operations.
pub type Attrs = BTreeMap<String, ArgValue>;

pub fn bitmap(row_id: u64, frame: &str) -> QueryTree {
    QueryTree::new("Bitmap")
        .with_arg("rowID", row_id)
        .with_arg("frame", frame)
}

pub fn count(child: QueryTree) -> QueryTree {
    QueryTree::new("Count").with_child(child)
}

pub fn column(id: u64) -> QueryTree {
    QueryTree::new("Column").with_arg("id", id)
}

pub fn set_bit(id: u64, frame: &str, column_id: u64) -> QueryTree {
    QueryTree::new("SetBit")
        .with_arg("id", id)
        .with_arg("frame", frame)
        .with_arg("columnID", column_id)
}

pub fn clear_bit(id: u64, frame: &str, column_id: u64) -> QueryTree {
    QueryTree::new("ClearBit")
        .with_arg("id", id)
        .with_arg("frame", frame)
        .with_arg("columnID", column_id)
}

/// `SetRowAttrs`. The caller's map is copied; `id` and `frame` override any
/// attributes of the same name.
pub fn set_row_attrs(id: u64, frame: &str, attrs: &Attrs) -> QueryTree {
    QueryTree::new("SetRowAttrs")
        .with_args(attrs.clone())
        .with_arg("id", id)
        .with_arg("frame", frame)
}

/// `SetColumnAttrs`. The caller's map is copied; `id` overrides an attribute
/// of the same name.
pub fn set_column_attrs(id: u64, attrs: &Attrs) -> QueryTree {
    QueryTree::new("SetColumnAttrs")
        .with_args(attrs.clone())
        .with_arg("id", id)
}

/// `TopN` over `frame`, optionally restricted to the bitmap produced by `src`.
///
/// Empty `ids`, a missing `field` and empty `filters` are left out of the
/// rendered query.
pub fn top_n(
    frame: &str,
    n: u64,
    src: Option<QueryTree>,
    ids: &[u64],
    field: Option<&str>,
    filters: Vec<ArgValue>,
) -> QueryTree {
    let mut call = QueryTree::new("TopN")
        .with_arg("frame", frame)
        .with_arg("n", n);
    if let Some(src) = src {
        call = call.with_child(src);
    }
    if !ids.is_empty() {
        call = call.with_arg("ids", ids.to_vec());
    }
    if let Some(field) = field {
        call = call.with_arg("field", field);
    }
    if !filters.is_empty() {
        call = call.with_arg("filters", ArgValue::Filters(filters));
    }
    call
}

pub fn difference(bitmaps: Vec<QueryTree>) -> QueryTree {
    QueryTree::new("Difference").with_children(bitmaps)
}

pub fn intersect(bitmaps: Vec<QueryTree>) -> QueryTree {
    QueryTree::new("Intersect").with_children(bitmaps)
}

pub fn union(bitmaps: Vec<QueryTree>) -> QueryTree {
    QueryTree::new("Union").with_children(bitmaps)
}
