//! Catalog core
//!
//! - [`hierarchy`] - category forest rules (slugs, moves, retirement, tree)
//! - [`images`] - principal-image and ordering rules per image group
//! - [`tree`] - arena used to rebuild the nested forest in memory

pub mod hierarchy;
pub mod images;
pub mod tree;

pub use tree::CategoryForest;
