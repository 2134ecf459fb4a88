//! Message trait for event types.

/// A marker trait for events dispatched through hooks.
///
/// Every message names the error its hooks may fail with, so a dispatch can
/// return typed errors instead of boxed ones.
///
/// # Example
///
/// ```rust,ignore
/// struct Ping { seen: bool }
///
/// impl Message for Ping {
///     type Error = std::io::Error;
///
///     fn is_handled(&self) -> bool {
///         self.seen
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + 'static` and name its hook error",
    note = "Events dispatched through hooks must implement `Message`."
)]
pub trait Message: Send + 'static {
    /// The error hooks return while processing this message.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether a hook already produced the result for this message.
    ///
    /// Dispatchers stop invoking hooks once this returns `true`.
    fn is_handled(&self) -> bool {
        false
    }
}
