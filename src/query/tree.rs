//! Query tree representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of a single keyword argument.
///
/// Serialized with the variant name as key (`{"uint": 5}`), so that signed,
/// unsigned and list kinds survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgValue {
    Int(i64),
    Uint(u64),
    Str(String),
    /// A list of row or column ids.
    Ids(Vec<u64>),
    /// A flat list of filter values (TopN `filters`).
    Filters(Vec<ArgValue>),
}

impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::Int(v)
    }
}

impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::Uint(v)
    }
}

impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}

impl From<Vec<u64>> for ArgValue {
    fn from(v: Vec<u64>) -> Self {
        ArgValue::Ids(v)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Uint(v) => write!(f, "{}", v),
            ArgValue::Str(s) => write_quoted(f, s),
            ArgValue::Ids(ids) => write_list(f, ids),
            ArgValue::Filters(values) => write_list(f, values),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

/// An n-ary query operation: a name, keyword arguments and child operations.
///
/// Arguments are kept sorted by key, so rendering a tree with [`Display`]
/// is deterministic:
///
/// ```
/// use bitmap_bench::query::{bitmap, intersect};
///
/// let q = intersect(vec![bitmap(1, "f"), bitmap(2, "f")]);
/// assert_eq!(
///     q.to_string(),
///     r#"Intersect(Bitmap(frame="f", rowID=1), Bitmap(frame="f", rowID=2))"#
/// );
/// ```
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTree {
    name: String,
    args: BTreeMap<String, ArgValue>,
    children: Vec<QueryTree>,
}

impl QueryTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    // === Builder methods ===

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_args(mut self, args: BTreeMap<String, ArgValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_child(mut self, child: QueryTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<QueryTree>) -> Self {
        self.children = children;
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &BTreeMap<String, ArgValue> {
        &self.args
    }

    pub fn arg(&self, key: &str) -> Option<&ArgValue> {
        self.args.get(key)
    }

    pub fn children(&self) -> &[QueryTree] {
        &self.children
    }

    /// Overwrite (or insert) one argument in place.
    ///
    /// Used by runners that reuse a template tree across iterations instead
    /// of rebuilding it.
    pub fn set_arg(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.args.insert(key.into(), value.into());
    }

    pub fn children_mut(&mut self) -> &mut [QueryTree] {
        &mut self.children
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(QueryTree::depth).max().unwrap_or(0)
    }

    /// Total number of nodes, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(QueryTree::node_count).sum::<usize>()
    }
}

impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        f.write_str("(")?;
        let mut first = true;
        for child in &self.children {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}", child)?;
        }
        for (key, value) in &self.args {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={}", key, value)?;
        }
        f.write_str(")")
    }
}
