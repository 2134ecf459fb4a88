//! Dispatch bus for per-controller hook registration.
//!
//! Hooks are registered under a [`HookPoint`] and invoked in registration
//! order. A dispatch ends as soon as one hook returns [`HookResult::Stop`],
//! marks the event handled, or fails.

use baseapi_core::{DynHook, Hook, HookPoint, HookResult, Message};
use std::{collections::HashMap, sync::Arc};

/// Identifies one registration on a [`DispatchBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Binding<E: Message> {
    id: ListenerId,
    hook: Arc<dyn DynHook<E>>,
}

/// A registry of hooks keyed by [`HookPoint`].
///
/// One bus belongs to one controller instance. Registration and removal take
/// `&mut self`, so a bus can't be shared between overlapping operations.
///
/// # Example
/// ```ignore
/// let mut bus = DispatchBus::new();
/// let id = bus.add_listener(HookPoint::Get, listener);
/// bus.dispatch(HookPoint::Get, &mut event).await?;
/// bus.remove_listener(HookPoint::Get, id);
/// ```
pub struct DispatchBus<E: Message> {
    bindings: HashMap<HookPoint, Vec<Binding<E>>>,
    next_id: u64,
}

impl<E: Message> DispatchBus<E> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            next_id: 0,
        }
    }

    /// Append `hook` to the hooks of `point`.
    pub fn add_listener<H: Hook<E>>(&mut self, point: HookPoint, hook: H) -> ListenerId {
        self.add_shared(point, Arc::new(hook))
    }

    /// Append an already shared hook to the hooks of `point`.
    pub fn add_shared(&mut self, point: HookPoint, hook: Arc<dyn DynHook<E>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.bindings
            .entry(point)
            .or_default()
            .push(Binding { id, hook });
        tracing::trace!(hook = %point, id = id.0, "listener added");
        id
    }

    /// Remove the registration `id` from `point`.
    ///
    /// Returns `false` if it was not registered there.
    pub fn remove_listener(&mut self, point: HookPoint, id: ListenerId) -> bool {
        let Some(bindings) = self.bindings.get_mut(&point) else {
            return false;
        };
        let before = bindings.len();
        bindings.retain(|binding| binding.id != id);
        let removed = bindings.len() != before;
        if bindings.is_empty() {
            self.bindings.remove(&point);
        }
        tracing::trace!(hook = %point, id = id.0, removed, "listener removed");
        removed
    }

    /// Whether any hook is registered on `point`.
    pub fn has_listeners(&self, point: HookPoint) -> bool {
        self.listener_count(point) > 0
    }

    /// Number of hooks registered on `point`.
    pub fn listener_count(&self, point: HookPoint) -> usize {
        self.bindings.get(&point).map_or(0, Vec::len)
    }

    /// Invoke the hooks of `point` in registration order.
    ///
    /// Returns [`HookResult::Stop`] if a hook stopped the dispatch or handled
    /// the event, [`HookResult::Next`] if every hook ran (or none exist).
    pub async fn dispatch(&self, point: HookPoint, event: &mut E) -> Result<HookResult, E::Error> {
        let Some(bindings) = self.bindings.get(&point) else {
            tracing::debug!(hook = %point, "no listeners");
            return Ok(HookResult::Next);
        };

        for (position, binding) in bindings.iter().enumerate() {
            let result = binding.hook.on_event_dyn(event).await?;
            if result == HookResult::Stop || event.is_handled() {
                tracing::debug!(hook = %point, invoked = position + 1, "dispatch stopped");
                return Ok(HookResult::Stop);
            }
        }

        tracing::debug!(hook = %point, invoked = bindings.len(), "dispatch completed");
        Ok(HookResult::Next)
    }
}

impl<E: Message> Default for DispatchBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug, thiserror::Error)]
    #[error("hook failed")]
    struct Failed;

    #[derive(Default)]
    struct Probe {
        handled: bool,
    }

    impl Message for Probe {
        type Error = Failed;

        fn is_handled(&self) -> bool {
            self.handled
        }
    }

    struct Recording {
        id: usize,
        order: Arc<Mutex<Vec<usize>>>,
        result: HookResult,
    }

    impl Hook<Probe> for Recording {
        async fn on_event(&self, _event: &mut Probe) -> Result<HookResult, Failed> {
            self.order.lock().unwrap().push(self.id);
            Ok(self.result)
        }
    }

    struct Handles;

    impl Hook<Probe> for Handles {
        async fn on_event(&self, event: &mut Probe) -> Result<HookResult, Failed> {
            event.handled = true;
            Ok(HookResult::Next)
        }
    }

    struct Fails(Arc<AtomicUsize>);

    impl Hook<Probe> for Fails {
        async fn on_event(&self, _event: &mut Probe) -> Result<HookResult, Failed> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(Failed)
        }
    }

    fn recording(id: usize, order: &Arc<Mutex<Vec<usize>>>, result: HookResult) -> Recording {
        Recording {
            id,
            order: order.clone(),
            result,
        }
    }

    #[tokio::test]
    async fn test_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Get, recording(1, &order, HookResult::Next));
        bus.add_listener(HookPoint::Get, recording(2, &order, HookResult::Next));
        bus.add_listener(HookPoint::Get, recording(3, &order, HookResult::Next));

        let result = bus
            .dispatch(HookPoint::Get, &mut Probe::default())
            .await
            .unwrap();
        assert_eq!(result, HookResult::Next);
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stop_result_short_circuits() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Get, recording(1, &order, HookResult::Stop));
        bus.add_listener(HookPoint::Get, recording(2, &order, HookResult::Next));

        let result = bus
            .dispatch(HookPoint::Get, &mut Probe::default())
            .await
            .unwrap();
        assert_eq!(result, HookResult::Stop);
        assert_eq!(*order.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_handled_event_short_circuits() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Get, Handles);
        bus.add_listener(HookPoint::Get, recording(2, &order, HookResult::Next));

        let mut probe = Probe::default();
        bus.dispatch(HookPoint::Get, &mut probe).await.unwrap();
        assert!(probe.handled);
        assert!(order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hook_points_are_isolated() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Mutate, recording(1, &order, HookResult::Next));

        assert!(!bus.has_listeners(HookPoint::Get));
        assert!(bus.has_listeners(HookPoint::Mutate));

        let result = bus
            .dispatch(HookPoint::Get, &mut Probe::default())
            .await
            .unwrap();
        assert_eq!(result, HookResult::Next);
        assert!(order.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removed_listener_is_not_invoked() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        let first = bus.add_listener(HookPoint::Get, recording(1, &order, HookResult::Next));
        bus.add_listener(HookPoint::Get, recording(2, &order, HookResult::Next));

        assert!(bus.remove_listener(HookPoint::Get, first));
        assert!(!bus.remove_listener(HookPoint::Get, first));
        assert_eq!(bus.listener_count(HookPoint::Get), 1);

        bus.dispatch(HookPoint::Get, &mut Probe::default())
            .await
            .unwrap();
        assert_eq!(*order.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_error_aborts_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = DispatchBus::new();
        bus.add_listener(HookPoint::Call, Fails(calls.clone()));
        bus.add_listener(HookPoint::Call, recording(2, &order, HookResult::Next));

        let result = bus.dispatch(HookPoint::Call, &mut Probe::default()).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(order.lock().unwrap().is_empty());
    }

    #[test]
    fn test_last_removal_clears_point() {
        let mut bus = DispatchBus::<Probe>::new();
        let id = bus.add_listener(HookPoint::Get, Handles);
        assert!(bus.has_listeners(HookPoint::Get));
        bus.remove_listener(HookPoint::Get, id);
        assert!(!bus.has_listeners(HookPoint::Get));
    }
}
