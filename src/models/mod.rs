//! Domain models for the project graph.
//!
//! # Core Concepts
//!
//! - [`Node`]: a member of the group tree. Either a group (folder-like
//!   container that owns its children) or a file reference (leaf).
//! - [`Target`]: a build unit outside the tree. It *references* file nodes
//!   through ordered build-phase lists but never owns them.
//! - [`FileType`]: the classifier that decides which build phase a file
//!   naturally belongs to.
//!
//! Ownership (group → child) and membership (target → file) are two separate
//! relations: the former lives in [`Group::children`] and [`Node::parent`],
//! the latter in [`Target::sources`] and [`Target::resources`].

mod file_type;
mod node;
mod target;

pub use file_type::*;
pub use node::*;
pub use target::*;
