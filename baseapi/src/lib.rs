//! # baseapi - Generic REST Resource Controllers
//!
//! `baseapi` gives resource controllers ("products", "categories", ...) CRUD
//! and pagination behavior by delegating to a repository, without
//! per-resource boilerplate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use baseapi::prelude::*;
//!
//! let mut products = ResourceController::<Product>::builder("ProductController")
//!     .default_repository("Product")
//!     .default_data_store("doctrine_mongodb")
//!     .data_stores(stores)
//!     .forms(forms)
//!     .urls(routes)
//!     .build()?;
//!
//! let page = products.get_paginated(&request, Target::default()).await?;
//! let count = products.invoke("count", vec![]).await?;
//! ```
//!
//! ## Layers
//!
//! - [`baseapi_core`]: kernel traits (`Hook`, `Repository`, `Manager`, ...)
//!   and the error taxonomy
//! - [`baseapi_std`]: the dispatch bus, repository listeners, and standard
//!   collaborators
//! - this crate: [`ResourceController`], responses, and request helpers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod config;
pub mod controller;
pub mod form;
pub mod pagination;
pub mod view;

pub use baseapi_core::{
    ApiError, BoxError, CONNECTION_FAILURE, Cursor, Document, DynHook, DynRepository, Form,
    FormError, FormErrors, FormFactory, Hook, HookPoint, HookResult, Manager, ManagerHandle,
    ManagerRegistry, Message, Output, Payload, ProcessEvent, QUERY_FAILURE, Repository,
    RepositoryError, RepositoryHandle, Request, RoutingError, StoreError, UrlGenerator, Value,
};
pub use baseapi_std::{
    Action, DataStores, DispatchBus, JsonForms, ListenerId, MethodTable, RepositoryActionListener,
    RouteTable,
};

pub use config::ControllerConfig;
pub use controller::{BuildError, ControllerBuilder, ResourceController, Target};
pub use form::{ErrorEntry, ErrorMap, flatten_errors, guess_form_type};
pub use pagination::Pagination;
#[cfg(feature = "axum")]
pub use view::ApiResponseError;
pub use view::View;

/// Standard listener implementations.
pub mod listeners {
    pub use baseapi_std::listeners::{
        Action, RepositoryActionListener, fetch_collection, fetch_one, forward,
    };
}

/// Testing utilities.
pub mod testing {
    pub use baseapi_std::testing::{
        MemoryDocument, MemoryRepository, MemoryStore, ResultHook, SpyHook,
    };
}

/// Prelude module - common imports for baseapi.
///
/// # Usage
///
/// ```rust,ignore
/// use baseapi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ApiError, ControllerConfig, DataStores, Document, FormErrors, Hook, HookPoint, HookResult,
        JsonForms, Payload, ProcessEvent, Repository, Request, ResourceController, RouteTable,
        Target, Value, View,
    };
}
