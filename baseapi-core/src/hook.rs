//! # Hooks
//!
//! The lowest-level unit of event processing: something that is handed an
//! event, may act on it, and decides whether the dispatch continues.
//!
//! Unlike read-only observers, hooks receive the event mutably so they can
//! store a result on it (see [`ProcessEvent::set_result`]).
//!
//! [`ProcessEvent::set_result`]: crate::ProcessEvent::set_result

use crate::message::Message;
use std::{future::Future, pin::Pin};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of hook execution indicating whether to continue or stop propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookResult {
    /// Continue with the next hook.
    Next,
    /// Stop propagation to subsequent hooks.
    Stop,
}

/// A unit of event processing.
///
/// # Static vs Dynamic Dispatch
///
/// This trait uses `impl Future` returns for static dispatch. Registries that
/// hold heterogeneous hooks use [`DynHook`], which every `Hook` implements.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Hook<{E}>`",
    label = "missing `Hook` implementation",
    note = "Hooks must implement `on_event` for the specific event type `{E}`."
)]
pub trait Hook<E: Message>: Send + Sync + 'static {
    /// Called when an event is dispatched.
    fn on_event(
        &self,
        event: &mut E,
    ) -> impl Future<Output = Result<HookResult, E::Error>> + Send;
}

/// Dynamic object-safe version of [`Hook`].
pub trait DynHook<E: Message>: Send + Sync + 'static {
    /// Called when an event is dispatched (dynamic dispatch version).
    fn on_event_dyn<'a>(&'a self, event: &'a mut E) -> BoxFuture<'a, Result<HookResult, E::Error>>;
}

// Any type implementing Hook implements DynHook automatically.
impl<E: Message, T: Hook<E>> DynHook<E> for T {
    fn on_event_dyn<'a>(&'a self, event: &'a mut E) -> BoxFuture<'a, Result<HookResult, E::Error>> {
        Box::pin(self.on_event(event))
    }
}
