//! Repository action listener.
//!
//! Binds a repository method and its positional arguments, and runs them
//! against the repository carried by a [`ProcessEvent`]. The bound
//! [`Action`] decides how the output is shaped:
//!
//! - [`Action::FindOne`] - one document, `NotFound` when empty
//! - [`Action::FindCollection`] - a `Vec` of documents, `NotFound` when empty
//! - [`Action::Forward`] / [`Action::Call`] - whatever the method returned
//!
//! The typed functions [`fetch_one`], [`fetch_collection`], and [`forward`]
//! do the work; the listener only moves their results onto the event.

use baseapi_core::{
    ApiError, Document, DynRepository, Hook, HookResult, Output, Payload, ProcessEvent,
    RepositoryError, Value,
};

/// How a [`RepositoryActionListener`] shapes the repository output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A single document.
    FindOne,
    /// A collection of documents.
    FindCollection,
    /// Pass-through of the bound method.
    Forward,
    /// Pass-through of the method named by the event.
    Call,
}

/// Runs one repository method against the repository of a [`ProcessEvent`].
///
/// A fresh listener is created for every controller operation.
#[derive(Debug, Clone)]
pub struct RepositoryActionListener {
    method: String,
    arguments: Vec<Value>,
    action: Action,
}

impl RepositoryActionListener {
    /// Expect a single document from `method`.
    pub fn find_one(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self::bound(Action::FindOne, method, arguments)
    }

    /// Expect a collection of documents from `method`.
    pub fn find_collection(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self::bound(Action::FindCollection, method, arguments)
    }

    /// Pass through whatever `method` returns.
    pub fn forward(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self::bound(Action::Forward, method, arguments)
    }

    /// Pass through whatever the method named by each event returns.
    pub fn call() -> Self {
        Self::bound(Action::Call, String::new(), Vec::new())
    }

    fn bound(action: Action, method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            arguments,
            action,
        }
    }

    /// The bound method (empty for [`Action::Call`]).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The bound arguments.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// The bound action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Store the single document returned by the bound method.
    pub async fn on_find_one<D: Document>(&self, event: &mut ProcessEvent<D>) -> Result<(), ApiError> {
        let repository = event.repository().clone();
        let document = fetch_one(repository.as_ref(), &self.method, &self.arguments).await?;
        event.set_result(Payload::Document(document));
        Ok(())
    }

    /// Store the documents returned by the bound method as a collection.
    pub async fn on_find_collection<D: Document>(
        &self,
        event: &mut ProcessEvent<D>,
    ) -> Result<(), ApiError> {
        let repository = event.repository().clone();
        let documents = fetch_collection(repository.as_ref(), &self.method, &self.arguments).await?;
        event.set_result(Payload::Collection(documents));
        Ok(())
    }

    /// Store whatever the bound method returns.
    pub async fn on_forward<D: Document>(&self, event: &mut ProcessEvent<D>) -> Result<(), ApiError> {
        let repository = event.repository().clone();
        if let Some(payload) = forward(repository.as_ref(), &self.method, &self.arguments).await? {
            event.set_result(payload);
        }
        Ok(())
    }

    /// Store whatever the method named by the event returns.
    ///
    /// Events without a method, and methods the repository doesn't know,
    /// are left unhandled.
    pub async fn on_call<D: Document>(&self, event: &mut ProcessEvent<D>) -> Result<(), ApiError> {
        let Some(method) = event.method().map(str::to_owned) else {
            return Ok(());
        };
        let arguments = event.arguments().to_vec();
        let repository = event.repository().clone();

        if let Some(payload) = forward(repository.as_ref(), &method, &arguments).await? {
            event.set_result(payload);
        }
        Ok(())
    }
}

impl<D: Document> Hook<ProcessEvent<D>> for RepositoryActionListener {
    async fn on_event(&self, event: &mut ProcessEvent<D>) -> Result<HookResult, ApiError> {
        match self.action {
            Action::FindOne => self.on_find_one(event).await?,
            Action::FindCollection => self.on_find_collection(event).await?,
            Action::Forward => self.on_forward(event).await?,
            Action::Call => self.on_call(event).await?,
        }
        Ok(HookResult::Next)
    }
}

/// Call `method` and expect a single document.
///
/// A cursor yields its first document. Empty output is [`ApiError::NotFound`].
pub async fn fetch_one<D: Document>(
    repository: &dyn DynRepository<D>,
    method: &str,
    arguments: &[Value],
) -> Result<D, ApiError> {
    match execute(repository, method, arguments).await? {
        Output::One(document) => Ok(document),
        Output::Many(mut cursor) => cursor.next().ok_or(ApiError::NotFound),
        Output::Empty => Err(ApiError::NotFound),
        Output::Value(value) if is_empty(&value) => Err(ApiError::NotFound),
        Output::Value(_) => Err(ApiError::UnexpectedOutput(method.to_owned())),
    }
}

/// Call `method` and normalize its output into an ordered collection.
///
/// A single document becomes a one-element collection. An empty collection
/// is [`ApiError::NotFound`].
pub async fn fetch_collection<D: Document>(
    repository: &dyn DynRepository<D>,
    method: &str,
    arguments: &[Value],
) -> Result<Vec<D>, ApiError> {
    let documents = match execute(repository, method, arguments).await? {
        Output::One(document) => vec![document],
        Output::Many(cursor) => cursor.to_vec(),
        Output::Empty => Vec::new(),
        Output::Value(value) if is_empty(&value) => Vec::new(),
        Output::Value(_) => return Err(ApiError::UnexpectedOutput(method.to_owned())),
    };

    if documents.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(documents)
}

/// Call `method` and return its normalized output, empty or not.
///
/// Returns `Ok(None)` if the repository has no such method.
pub async fn forward<D: Document>(
    repository: &dyn DynRepository<D>,
    method: &str,
    arguments: &[Value],
) -> Result<Option<Payload<D>>, ApiError> {
    match repository.call_dyn(method, arguments).await {
        Ok(output) => Ok(Some(Payload::from(output))),
        Err(RepositoryError::UnknownMethod { .. }) => {
            tracing::debug!(repository = repository.name(), method, "method not claimed");
            Ok(None)
        }
        Err(err) => Err(generalize(repository, method, err)),
    }
}

async fn execute<D: Document>(
    repository: &dyn DynRepository<D>,
    method: &str,
    arguments: &[Value],
) -> Result<Output<D>, ApiError> {
    repository
        .call_dyn(method, arguments)
        .await
        .map_err(|err| generalize(repository, method, err))
}

// Storage errors never reach clients; log them and keep the generic message.
fn generalize<D: Document>(
    repository: &dyn DynRepository<D>,
    method: &str,
    err: RepositoryError,
) -> ApiError {
    if !matches!(err, RepositoryError::UnknownMethod { .. }) {
        tracing::error!(repository = repository.name(), method, error = %err, "repository call failed");
    }
    ApiError::from(err)
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baseapi_core::{Cursor, Repository, RepositoryHandle};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(u32);

    impl Document for Item {
        const KIND: &'static str = "Item";

        fn id(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    // Answers every method with the shape named by the method itself.
    struct Shapes;

    impl Repository<Item> for Shapes {
        fn name(&self) -> &str {
            "Item"
        }

        async fn call(&self, method: &str, arguments: &[Value]) -> Result<Output<Item>, RepositoryError> {
            match method {
                "one" => Ok(Output::One(Item(arguments[0].as_u64().unwrap_or(0) as u32))),
                "none" => Ok(Output::Empty),
                "array" => Ok(Output::many(vec![Item(1), Item(2)])),
                "cursor" => Ok(Output::Many(Cursor::new((1..=3).map(Item)))),
                "nothing" => Ok(Output::Many(Cursor::empty())),
                "count" => Ok(Output::Value(Value::from(0))),
                "report" => Ok(Output::Value(serde_json::json!({ "updated": 2 }))),
                "broken" => Err(RepositoryError::Query("syntax error".into())),
                "offline" => Err(RepositoryError::Connection("refused".into())),
                other => Err(RepositoryError::unknown_method("Item", other)),
            }
        }
    }

    fn shapes() -> RepositoryHandle<Item> {
        Arc::new(Shapes)
    }

    #[tokio::test]
    async fn test_find_one_stores_document() {
        let listener = RepositoryActionListener::find_one("one", vec![Value::from(7)]);
        let mut event = ProcessEvent::new(shapes());

        listener.on_find_one(&mut event).await.unwrap();
        assert!(event.is_handled());
        assert_eq!(event.into_result(), Some(Payload::Document(Item(7))));
    }

    #[tokio::test]
    async fn test_find_one_empty_is_not_found() {
        for method in ["none", "nothing", "count"] {
            let listener = RepositoryActionListener::find_one(method, vec![]);
            let mut event = ProcessEvent::new(shapes());

            let err = listener.on_find_one(&mut event).await.unwrap_err();
            assert!(matches!(err, ApiError::NotFound), "{method}");
            assert!(!event.is_handled());
        }
    }

    #[tokio::test]
    async fn test_find_one_takes_first_of_cursor() {
        let document = fetch_one(shapes().as_ref(), "cursor", &[]).await.unwrap();
        assert_eq!(document, Item(1));
    }

    #[tokio::test]
    async fn test_find_collection_normalizes_shapes() {
        let repository = shapes();
        assert_eq!(
            fetch_collection(repository.as_ref(), "array", &[]).await.unwrap(),
            vec![Item(1), Item(2)]
        );
        assert_eq!(
            fetch_collection(repository.as_ref(), "cursor", &[]).await.unwrap(),
            vec![Item(1), Item(2), Item(3)]
        );
        assert_eq!(
            fetch_collection(repository.as_ref(), "one", &[Value::from(4)])
                .await
                .unwrap(),
            vec![Item(4)]
        );
    }

    #[tokio::test]
    async fn test_find_collection_empty_is_not_found() {
        for method in ["nothing", "none"] {
            let listener = RepositoryActionListener::find_collection(method, vec![]);
            let mut event = ProcessEvent::new(shapes());

            let err = listener.on_find_collection(&mut event).await.unwrap_err();
            assert!(matches!(err, ApiError::NotFound), "{method}");
            assert!(event.result().is_none());
        }
    }

    #[tokio::test]
    async fn test_scalar_in_find_path_is_unexpected() {
        let err = fetch_collection(shapes().as_ref(), "report", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedOutput(method) if method == "report"));
    }

    #[tokio::test]
    async fn test_backend_errors_are_generalized() {
        let err = fetch_one(shapes().as_ref(), "broken", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), baseapi_core::QUERY_FAILURE);

        let err = fetch_collection(shapes().as_ref(), "offline", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), baseapi_core::CONNECTION_FAILURE);
    }

    #[tokio::test]
    async fn test_call_reads_method_from_event() {
        let listener = RepositoryActionListener::call();
        let mut event = ProcessEvent::with_call(shapes(), "count", vec![]);

        let result = listener.on_event(&mut event).await.unwrap();
        assert_eq!(result, HookResult::Next);
        assert!(event.is_handled());
        // no emptiness check on pass-through
        assert_eq!(event.into_result(), Some(Payload::Value(Value::from(0))));
    }

    #[tokio::test]
    async fn test_call_leaves_unknown_method_unhandled() {
        let listener = RepositoryActionListener::call();
        let mut event = ProcessEvent::with_call(shapes(), "frobnicate", vec![]);

        listener.on_event(&mut event).await.unwrap();
        assert!(!event.is_handled());

        let mut event = ProcessEvent::new(shapes());
        listener.on_event(&mut event).await.unwrap();
        assert!(!event.is_handled());
    }

    #[tokio::test]
    async fn test_forward_uses_bound_method() {
        let listener = RepositoryActionListener::forward("report", vec![]);
        let mut event = ProcessEvent::with_call(shapes(), "ignored", vec![]);

        listener.on_event(&mut event).await.unwrap();
        assert_eq!(
            event.into_result(),
            Some(Payload::Value(serde_json::json!({ "updated": 2 })))
        );
    }

    #[test]
    fn test_emptiness() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&Value::from(0)));
        assert!(is_empty(&Value::from("0")));
        assert!(is_empty(&serde_json::json!([])));
        assert!(!is_empty(&Value::from(3)));
        assert!(!is_empty(&Value::from("abc")));
    }
}
