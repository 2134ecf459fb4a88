//! # baseapi-std
//!
//! Standard implementations for the baseapi REST controller scaffolding.
//!
//! This crate provides:
//! - **Dispatch**: [`DispatchBus`], the per-controller registry of hooks
//! - **Listeners**: [`RepositoryActionListener`], which turns positional
//!   repository calls into single documents, collections, or pass-through values
//! - **Repositories**: [`MethodTable`], a repository built from named operations
//! - **Collaborators**: [`DataStores`], [`JsonForms`], [`RouteTable`]
//! - **Testing**: in-memory stores and spy hooks in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use baseapi_core;

// Modules
pub mod bus;
pub mod forms;
pub mod listeners;
pub mod methods;
pub mod routing;
pub mod stores;
pub mod testing;

pub use bus::{DispatchBus, ListenerId};
pub use forms::JsonForms;
pub use listeners::{Action, RepositoryActionListener};
pub use methods::MethodTable;
pub use routing::RouteTable;
pub use stores::DataStores;
