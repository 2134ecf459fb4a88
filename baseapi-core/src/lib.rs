//! # baseapi-core
//!
//! Core traits for the baseapi REST controller scaffolding.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! persistence adapters, form adapters, and anything else that plugs into a
//! resource controller without needing the `baseapi-std` implementations.
//!
//! # Layers
//!
//! ## Layer 1: Hooks ([`Hook`])
//!
//! The dispatch kernel. A hook receives a mutable event and answers `Next` or
//! `Stop`. Events that carry a result (see [`Message::is_handled`]) also stop
//! propagation as soon as a hook marks them handled.
//!
//! ## Layer 2: Events ([`ProcessEvent`])
//!
//! The single-use carrier passed through the hooks of a controller: the
//! resolved repository, an optional method name with positional arguments,
//! and the result slot.
//!
//! ## Layer 3: Collaborators
//!
//! The narrow interfaces a controller consumes:
//!
//! - [`Repository`] - named, positional query methods returning an [`Output`]
//! - [`Manager`] / [`ManagerRegistry`] - persistence and repository lookup
//! - [`FormFactory`] - binding request data onto a document and validating it
//! - [`UrlGenerator`] - absolute URLs for the `Location` header
//!
//! # Error Types
//!
//! - [`ApiError`] - everything a controller operation can fail with
//! - [`RepositoryError`] - failures reported by a repository or manager
//! - [`StoreError`] - data store / repository lookup failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod document;
mod error;
mod event;
mod form;
mod hook;
mod message;
mod persistence;
mod repository;
mod request;
mod routing;

// Re-exports
pub use document::Document;
pub use error::{
    ApiError, BoxError, CONNECTION_FAILURE, FormError, QUERY_FAILURE, RepositoryError, RoutingError,
    StoreError,
};
pub use event::{HookPoint, Payload, ProcessEvent};
pub use form::{Form, FormErrors, FormFactory};
pub use hook::{BoxFuture, DynHook, Hook, HookResult};
pub use message::Message;
pub use persistence::{DynManager, Manager, ManagerHandle, ManagerRegistry};
pub use repository::{Cursor, DynRepository, Output, Repository, RepositoryHandle};
pub use request::Request;
pub use routing::UrlGenerator;

/// Positional repository arguments.
pub use serde_json::Value;
