//! Query trees and the constructors used to assemble them.

mod builders;
mod tree;

pub use builders::{
    bitmap, clear_bit, column, count, difference, intersect, set_bit, set_column_attrs,
    set_row_attrs, top_n, union, Attrs,
};
pub use tree::{ArgValue, QueryTree};
