//! The data model shared by the scanner and parser passes: attributes, the
//! node arena and the scoped symbol tables.

mod attribute;
mod table;
mod tree;

pub use attribute::Attribute;
pub use table::{SymbolTable, TableArena, TableId, Tag, TagKind, MAX_PRIORITY, MIN_PRIORITY,
    STANDARD_PRIORITIES};
pub use tree::{Location, Node, NodeArena, NodeId, Siblings};
