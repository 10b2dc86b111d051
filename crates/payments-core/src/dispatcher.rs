//! # Event Dispatcher
//!
//! Synchronous publish/subscribe hub gateways use to tell the application
//! about billing lifecycle transitions.
//!
//! ```text
//!  Gateway::trigger_*()
//!        │
//!        ▼
//!  Dispatcher::publish(gateway, &event)
//!        │   event.name()
//!        ▼
//!  listeners[name][0] ──► listeners[name][1] ──► ... (registration order)
//! ```
//!
//! Listeners run on the caller's thread and finish before `publish`
//! returns. The first listener error stops dispatch and is returned to the
//! publisher. Publishing a name nobody listens to is a no-op.

use crate::error::PaymentResult;
use crate::event::{Event, EventName};
use crate::gateway::Gateway;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// A registered event listener
pub type Listener = Arc<dyn Fn(&dyn Gateway, &Event) -> PaymentResult<()> + Send + Sync>;

/// Named-event registry, usually shared between gateways through an `Arc`
#[derive(Default)]
pub struct Dispatcher {
    listeners: RwLock<HashMap<EventName, Vec<Listener>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `name`. Duplicates are kept and called twice.
    ///
    /// A custom name spelling a well-known event registers under that event.
    pub fn listen<F>(&self, name: EventName, listener: F)
    where
        F: Fn(&dyn Gateway, &Event) -> PaymentResult<()> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(listener));
    }

    /// Register one shared listener under several names
    pub fn listen_many<F>(&self, names: &[EventName], listener: F)
    where
        F: Fn(&dyn Gateway, &Event) -> PaymentResult<()> + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        for name in names {
            self.register(name.clone(), Arc::clone(&listener));
        }
    }

    fn register(&self, name: EventName, listener: Listener) {
        let name = name.canonical();
        debug!("Registering listener for {}", name);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .push(listener);
    }

    /// Number of listeners registered for `name`
    pub fn listener_count(&self, name: &EventName) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name.clone().canonical())
            .map_or(0, Vec::len)
    }

    /// Invoke every listener registered for the event's name, in order.
    ///
    /// Listeners registered while dispatch is running are picked up by the
    /// next publish, not this one.
    pub fn publish(&self, gateway: &dyn Gateway, event: &Event) -> PaymentResult<()> {
        let name = event.name();

        // Snapshot so listeners can register without deadlocking
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .cloned()
            .unwrap_or_default();

        debug!(
            "Publishing {} from {} to {} listener(s)",
            name,
            gateway.name(),
            listeners.len()
        );

        for (position, listener) in listeners.iter().enumerate() {
            if let Err(err) = listener(gateway, event) {
                warn!(
                    "Listener #{} for {} failed, skipping {} remaining: {}",
                    position,
                    name,
                    listeners.len() - position - 1,
                    err
                );
                return Err(err);
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("Dispatcher").field("listeners", &counts).finish()
    }
}
