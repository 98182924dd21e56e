//! Path-addressable editor for native application project manifests.
//!
//! A project is a tree of groups and file references plus a set of build
//! targets that reference files from their build phases. [`graph`] holds the
//! tree and every edit on it, [`report`] renders it, and [`db`] loads and
//! saves it.

pub mod config;
pub mod db;
pub mod disk;
pub mod error;
pub mod graph;
pub mod models;
pub mod report;

pub use error::{ProjectError, Result};
