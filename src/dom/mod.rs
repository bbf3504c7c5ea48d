//! Host document model: an owned tree of elements standing in for the page.

mod document;
mod node;
mod selector;

pub use document::{Document, MutationRecord, ROOT_TAG};
pub use node::{Node, NodeKind};
pub use selector::Selector;
