//! The event carried through a controller's dispatch bus.

use crate::{
    document::Document,
    error::ApiError,
    message::Message,
    repository::{Output, RepositoryHandle},
};
use serde_json::Value;
use std::fmt;

/// Named extension points on a controller's dispatch bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Reads: single documents and collections.
    Get,
    /// Write forwarding.
    Mutate,
    /// Catch-all forwarding of methods the controller does not define.
    Call,
}

impl HookPoint {
    /// The hook's name.
    pub const fn as_str(self) -> &'static str {
        match self {
            HookPoint::Get => "api.get",
            HookPoint::Mutate => "api.process",
            HookPoint::Call => "api.use_repository",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized repository result.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<D> {
    /// The call produced nothing.
    Empty,
    /// A single document.
    Document(D),
    /// An ordered collection of documents.
    Collection(Vec<D>),
    /// A non-document value.
    Value(Value),
}

impl<D> Payload<D> {
    /// The document, if this is [`Payload::Document`].
    pub fn into_document(self) -> Option<D> {
        match self {
            Payload::Document(document) => Some(document),
            _ => None,
        }
    }

    /// The collection, if this is [`Payload::Collection`].
    pub fn into_collection(self) -> Option<Vec<D>> {
        match self {
            Payload::Collection(documents) => Some(documents),
            _ => None,
        }
    }

    /// The value, if this is [`Payload::Value`].
    pub fn into_value(self) -> Option<Value> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<D: Send + 'static> From<Output<D>> for Payload<D> {
    fn from(output: Output<D>) -> Self {
        match output {
            Output::Empty => Payload::Empty,
            Output::One(document) => Payload::Document(document),
            Output::Many(cursor) => Payload::Collection(cursor.to_vec()),
            Output::Value(value) => Payload::Value(value),
        }
    }
}

/// A single-use carrier for one repository operation.
///
/// Holds the resolved repository, optionally the method name and arguments
/// supplied by the caller, and the result slot. Readers must check
/// [`is_handled`](Self::is_handled) before trusting [`result`](Self::result).
pub struct ProcessEvent<D: Document> {
    repository: RepositoryHandle<D>,
    method: Option<String>,
    arguments: Vec<Value>,
    result: Option<Payload<D>>,
    handled: bool,
}

impl<D: Document> ProcessEvent<D> {
    /// An event for listeners that already know which method to call.
    pub fn new(repository: RepositoryHandle<D>) -> Self {
        Self {
            repository,
            method: None,
            arguments: Vec::new(),
            result: None,
            handled: false,
        }
    }

    /// An event carrying the method to call and its arguments.
    pub fn with_call(
        repository: RepositoryHandle<D>,
        method: impl Into<String>,
        arguments: Vec<Value>,
    ) -> Self {
        Self {
            method: Some(method.into()),
            arguments,
            ..Self::new(repository)
        }
    }

    /// The repository this event operates on.
    pub fn repository(&self) -> &RepositoryHandle<D> {
        &self.repository
    }

    /// The requested method, for call-forwarding events.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// The positional arguments for the requested method.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Store the result and mark the event handled.
    pub fn set_result(&mut self, payload: Payload<D>) {
        self.result = Some(payload);
        self.handled = true;
    }

    /// The stored result, if any.
    pub fn result(&self) -> Option<&Payload<D>> {
        self.result.as_ref()
    }

    /// Consume the event, returning the stored result.
    pub fn into_result(self) -> Option<Payload<D>> {
        self.result
    }

    /// Whether a result has been stored.
    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

impl<D: Document> Message for ProcessEvent<D> {
    type Error = ApiError;

    fn is_handled(&self) -> bool {
        self.handled
    }
}

impl<D: Document> fmt::Debug for ProcessEvent<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessEvent")
            .field("repository", &self.repository.name())
            .field("method", &self.method)
            .field("arguments", &self.arguments)
            .field("handled", &self.handled)
            .finish_non_exhaustive()
    }
}
