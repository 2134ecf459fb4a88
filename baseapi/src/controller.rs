//! # Resource controller
//!
//! [`ResourceController`] gives a resource CRUD and pagination behavior by
//! delegating to a repository. Every read goes through its [`DispatchBus`]:
//! a transient [`RepositoryActionListener`] is bound for the duration of one
//! dispatch, so listeners registered earlier through [`bus_mut`] can answer
//! first and short-circuit the repository.
//!
//! [`bus_mut`]: ResourceController::bus_mut

use crate::{
    config::ControllerConfig,
    form::{ErrorMap, flatten_errors, guess_form_type},
    pagination::Pagination,
    view::View,
};
use baseapi_core::{
    ApiError, Document, FormFactory, HookPoint, ManagerHandle, ManagerRegistry, Payload,
    ProcessEvent, RepositoryError, RepositoryHandle, Request, StoreError, UrlGenerator, Value,
};
use baseapi_std::{DispatchBus, RepositoryActionListener};
use serde::Serialize;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Repository method used to look documents up by identifier.
pub const FIND_ONE_BY_ID: &str = "findOneById";

/// Repository method used for paginated collections.
pub const FIND_PAGINATED: &str = "findPaginated";

/// Which repository of which data store an operation runs against.
///
/// Unset parts fall back to the controller's [`ControllerConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target<'a> {
    /// Repository name.
    pub repository: Option<&'a str>,
    /// Data store name.
    pub data_store: Option<&'a str>,
}

impl<'a> Target<'a> {
    /// Both parts given.
    pub fn new(repository: &'a str, data_store: &'a str) -> Self {
        Self {
            repository: Some(repository),
            data_store: Some(data_store),
        }
    }

    /// Only the repository given.
    pub fn repository(repository: &'a str) -> Self {
        Self {
            repository: Some(repository),
            data_store: None,
        }
    }

    /// Only the data store given.
    pub fn data_store(data_store: &'a str) -> Self {
        Self {
            repository: None,
            data_store: Some(data_store),
        }
    }
}

/// Error returned by [`ControllerBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A required collaborator was never supplied.
    #[error("controller `{controller}` is missing its {collaborator}")]
    MissingCollaborator {
        /// The controller being built.
        controller: String,
        /// Which collaborator is missing.
        collaborator: &'static str,
    },
}

/// Builder for [`ResourceController`].
///
/// # Example
///
/// ```rust,ignore
/// let controller = ResourceController::<Product>::builder("ProductController")
///     .default_repository("Product")
///     .default_data_store("doctrine_mongodb")
///     .data_stores(DataStores::new().register("doctrine_mongodb", store))
///     .forms(JsonForms::new().register_unchecked("ProductType"))
///     .urls(RouteTable::new("https://api.example.com").route("get_product", "/products/{id}"))
///     .build()?;
/// ```
pub struct ControllerBuilder<D: Document> {
    name: String,
    config: ControllerConfig,
    stores: Option<Arc<dyn ManagerRegistry<D>>>,
    forms: Option<Arc<dyn FormFactory<D>>>,
    urls: Option<Arc<dyn UrlGenerator>>,
}

impl<D: Document> ControllerBuilder<D> {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: ControllerConfig::default(),
            stores: None,
            forms: None,
            urls: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default repository.
    pub fn default_repository(mut self, repository: impl Into<String>) -> Self {
        self.config.default_repository = Some(repository.into());
        self
    }

    /// Set the default data store.
    pub fn default_data_store(mut self, data_store: impl Into<String>) -> Self {
        self.config.default_data_store = Some(data_store.into());
        self
    }

    /// Set the data store registry.
    pub fn data_stores(self, stores: impl ManagerRegistry<D>) -> Self {
        self.shared_data_stores(Arc::new(stores))
    }

    /// Set an already shared data store registry.
    pub fn shared_data_stores(mut self, stores: Arc<dyn ManagerRegistry<D>>) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Set the form factory.
    pub fn forms(mut self, forms: impl FormFactory<D>) -> Self {
        self.forms = Some(Arc::new(forms));
        self
    }

    /// Set the URL generator.
    pub fn urls(mut self, urls: impl UrlGenerator) -> Self {
        self.urls = Some(Arc::new(urls));
        self
    }

    /// Build the controller.
    ///
    /// Registers the catch-all call listener on [`HookPoint::Call`].
    pub fn build(self) -> Result<ResourceController<D>, BuildError> {
        let missing = |collaborator| BuildError::MissingCollaborator {
            controller: self.name.clone(),
            collaborator,
        };
        let stores = self.stores.clone().ok_or_else(|| missing("data store registry"))?;
        let forms = self.forms.clone().ok_or_else(|| missing("form factory"))?;
        let urls = self.urls.clone().ok_or_else(|| missing("URL generator"))?;

        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Call, RepositoryActionListener::call());

        Ok(ResourceController {
            name: self.name,
            config: self.config,
            bus,
            stores,
            forms,
            urls,
        })
    }
}

/// Generic CRUD behavior for one document type.
///
/// One instance serves one request: bus mutation needs `&mut self`.
pub struct ResourceController<D: Document> {
    name: String,
    config: ControllerConfig,
    bus: DispatchBus<ProcessEvent<D>>,
    stores: Arc<dyn ManagerRegistry<D>>,
    forms: Arc<dyn FormFactory<D>>,
    urls: Arc<dyn UrlGenerator>,
}

impl<D: Document> ResourceController<D> {
    /// Start building a controller named `name` (used in error messages).
    pub fn builder(name: impl Into<String>) -> ControllerBuilder<D> {
        ControllerBuilder::new(name)
    }

    /// Controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured defaults.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The dispatch bus.
    pub fn bus(&self) -> &DispatchBus<ProcessEvent<D>> {
        &self.bus
    }

    /// The dispatch bus, for registering custom listeners.
    pub fn bus_mut(&mut self) -> &mut DispatchBus<ProcessEvent<D>> {
        &mut self.bus
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// The manager of `data_store`, or of the default data store.
    pub fn manager(&self, data_store: Option<&str>) -> Result<ManagerHandle<D>, ApiError> {
        let data_store = data_store
            .or(self.config.default_data_store.as_deref())
            .ok_or(StoreError::NoDataStore)?;
        Ok(self.stores.manager(data_store)?)
    }

    /// The repository `target` points at.
    pub fn repository(&self, target: Target<'_>) -> Result<RepositoryHandle<D>, ApiError> {
        let name = target
            .repository
            .or(self.config.default_repository.as_deref())
            .ok_or(StoreError::NoRepository)?;
        Ok(self.manager(target.data_store)?.repository(name)?)
    }

    /// Bind `listener` on `point`, dispatch one event, and unbind it again.
    async fn dispatch_bound(
        &mut self,
        point: HookPoint,
        listener: RepositoryActionListener,
        target: Target<'_>,
    ) -> Result<ProcessEvent<D>, ApiError> {
        let mut event = ProcessEvent::new(self.repository(target)?);
        let id = self.bus.add_listener(point, listener);
        let outcome = self.bus.dispatch(point, &mut event).await;
        self.bus.remove_listener(point, id);
        outcome?;
        Ok(event)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// A single document from the default repository.
    pub async fn get_one(&mut self, method: &str, arguments: Vec<Value>) -> Result<D, ApiError> {
        self.get_one_in(method, arguments, Target::default()).await
    }

    /// A single document from `target`.
    ///
    /// Fails with [`ApiError::NotFound`] when nothing handled the lookup.
    pub async fn get_one_in(
        &mut self,
        method: &str,
        arguments: Vec<Value>,
        target: Target<'_>,
    ) -> Result<D, ApiError> {
        debug!(controller = %self.name, method, "get one");
        let listener = RepositoryActionListener::find_one(method, arguments);
        let event = self.dispatch_bound(HookPoint::Get, listener, target).await?;
        match event.into_result() {
            Some(Payload::Document(document)) => Ok(document),
            Some(Payload::Collection(documents)) => {
                documents.into_iter().next().ok_or(ApiError::NotFound)
            }
            Some(Payload::Value(_)) => Err(ApiError::UnexpectedOutput(method.to_owned())),
            Some(Payload::Empty) | None => Err(ApiError::NotFound),
        }
    }

    /// A collection from the default repository.
    pub async fn get_collection(
        &mut self,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Vec<D>, ApiError> {
        self.get_collection_in(method, arguments, Target::default()).await
    }

    /// A collection from `target`.
    ///
    /// Fails with [`ApiError::NotFound`] when nothing handled the lookup.
    pub async fn get_collection_in(
        &mut self,
        method: &str,
        arguments: Vec<Value>,
        target: Target<'_>,
    ) -> Result<Vec<D>, ApiError> {
        debug!(controller = %self.name, method, "get collection");
        let listener = RepositoryActionListener::find_collection(method, arguments);
        let event = self.dispatch_bound(HookPoint::Get, listener, target).await?;
        match event.into_result() {
            Some(Payload::Collection(documents)) => Ok(documents),
            Some(Payload::Document(document)) => Ok(vec![document]),
            Some(Payload::Value(_)) => Err(ApiError::UnexpectedOutput(method.to_owned())),
            Some(Payload::Empty) | None => Err(ApiError::NotFound),
        }
    }

    /// The `skip`/`limit` query parameters of `request`.
    pub fn pagination(&self, request: &Request) -> Pagination {
        Pagination::from_request(request)
    }

    /// One page of documents as a 200 view, read with `findPaginated(skip, limit)`.
    pub async fn get_paginated(
        &mut self,
        request: &Request,
        target: Target<'_>,
    ) -> Result<View, ApiError>
    where
        D: Serialize,
    {
        let arguments = self.pagination(request).into_arguments();
        let documents = self.get_collection_in(FIND_PAGINATED, arguments, target).await?;
        View::ok(&documents)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Bind `request` onto a new `document`, persist it, and point at it.
    ///
    /// Returns 201 with a `Location` generated from `location_route`, or 400
    /// with the flattened validation errors.
    pub async fn create(
        &self,
        request: &Request,
        document: D,
        location_route: &str,
    ) -> Result<View, ApiError> {
        self.create_in(request, document, None, location_route, Target::default())
            .await
    }

    /// [`create`](Self::create) with an explicit form type and target.
    pub async fn create_in(
        &self,
        request: &Request,
        document: D,
        form_type: Option<&str>,
        location_route: &str,
        target: Target<'_>,
    ) -> Result<View, ApiError> {
        debug!(controller = %self.name, "create");
        match self.process_form(request, document, form_type, target).await? {
            Ok(document) => {
                let id = document.id().ok_or(ApiError::MissingIdentifier)?;
                Ok(View::created(self.urls.generate(location_route, &id)?))
            }
            Err(errors) => Ok(View::errors(errors)),
        }
    }

    /// Bind `request` onto the document with identifier `id` and persist it.
    ///
    /// Returns 204, 400 with the flattened validation errors, or
    /// [`ApiError::ResourceAbsent`] when `id` does not exist.
    pub async fn edit(
        &mut self,
        request: &Request,
        id: &str,
        form_type: Option<&str>,
        target: Target<'_>,
    ) -> Result<View, ApiError> {
        debug!(controller = %self.name, id, "edit");
        let document = self.existing(id, target).await?;
        match self.process_form(request, document, form_type, target).await? {
            Ok(_) => Ok(View::no_content()),
            Err(errors) => Ok(View::errors(errors)),
        }
    }

    /// Remove the document with identifier `id`.
    ///
    /// Returns 204, or [`ApiError::ResourceAbsent`] when `id` does not exist.
    pub async fn delete(&mut self, id: &str, target: Target<'_>) -> Result<View, ApiError> {
        debug!(controller = %self.name, id, "delete");
        let document = self.existing(id, target).await?;
        let manager = self.manager(target.data_store)?;
        manager.remove_dyn(&document).await.map_err(backend)?;
        manager.flush_dyn().await.map_err(backend)?;
        Ok(View::no_content())
    }

    async fn existing(&mut self, id: &str, target: Target<'_>) -> Result<D, ApiError> {
        let arguments = vec![Value::from(id)];
        match self.get_one_in(FIND_ONE_BY_ID, arguments, target).await {
            Err(ApiError::NotFound) => Err(ApiError::ResourceAbsent(id.to_owned())),
            other => other,
        }
    }

    /// Run the form step: bind, validate, then persist and flush once.
    ///
    /// The inner `Err` holds the flattened validation errors; nothing is
    /// written in that case.
    pub async fn process_form(
        &self,
        request: &Request,
        document: D,
        form_type: Option<&str>,
        target: Target<'_>,
    ) -> Result<Result<D, ErrorMap>, ApiError> {
        let form_type = form_type.map_or_else(guess_form_type::<D>, str::to_owned);
        let form = self.forms.create_form(&form_type, document, request)?;
        if !form.is_valid() {
            warn!(controller = %self.name, form_type = %form_type, "validation failed");
            return Ok(Err(flatten_errors(form.errors())));
        }

        let manager = self.manager(target.data_store)?;
        let mut document = form.into_document();
        manager.persist_dyn(&mut document).await.map_err(backend)?;
        manager.flush_dyn().await.map_err(backend)?;
        Ok(Ok(document))
    }

    // ------------------------------------------------------------------
    // Forwarding
    // ------------------------------------------------------------------

    /// Forward a write method to `target` and return what it produced.
    ///
    /// Fails with [`ApiError::MissingRepositoryMethod`] when nothing handled it.
    pub async fn post_update(
        &mut self,
        method: &str,
        arguments: Vec<Value>,
        target: Target<'_>,
    ) -> Result<Payload<D>, ApiError> {
        debug!(controller = %self.name, method, "post update");
        let listener = RepositoryActionListener::forward(method, arguments);
        let event = self.dispatch_bound(HookPoint::Mutate, listener, target).await?;
        event
            .into_result()
            .ok_or_else(|| self.missing_method(method))
    }

    /// Call a method this controller does not define on the default repository.
    ///
    /// Fails with [`ApiError::MissingRepositoryMethod`] naming this controller
    /// when no listener claimed the call.
    pub async fn invoke(&self, method: &str, arguments: Vec<Value>) -> Result<Payload<D>, ApiError> {
        debug!(controller = %self.name, method, "invoke");
        let repository = self.repository(Target::default())?;
        let mut event = ProcessEvent::with_call(repository, method, arguments);
        self.bus.dispatch(HookPoint::Call, &mut event).await?;
        if !event.is_handled() {
            return Err(self.missing_method(method));
        }
        event.into_result().ok_or_else(|| self.missing_method(method))
    }

    fn missing_method(&self, method: &str) -> ApiError {
        ApiError::MissingRepositoryMethod {
            target: self.name.clone(),
            method: method.to_owned(),
        }
    }
}

impl<D: Document> fmt::Debug for ResourceController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceController")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn backend(err: RepositoryError) -> ApiError {
    error!(error = %err, "data store failure");
    ApiError::from(err)
}
