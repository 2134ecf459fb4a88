//! Standard listener implementations.

pub mod action;

pub use action::{Action, RepositoryActionListener, fetch_collection, fetch_one, forward};
