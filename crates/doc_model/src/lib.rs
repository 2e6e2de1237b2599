//! Document Model - the mutable document tree the formatting core operates on
//!
//! This crate provides node storage with stable ids and parent
//! back-references, inline style maps, the host selection (ranges of
//! boundary points) and the table-cell selection set.

mod error;
mod node;
mod node_id;
mod selection;
mod style;
mod table;
mod tree;

pub use error::*;
pub use node::*;
pub use node_id::*;
pub use selection::*;
pub use style::*;
pub use table::*;
pub use tree::*;
