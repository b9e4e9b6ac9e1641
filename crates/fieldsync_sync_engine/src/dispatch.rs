//! Typed commands and events between callers and sync engines.
//!
//! Callers send [`SyncCommand`]s and watch [`SyncEvent`]s; they never call
//! engines directly. Every outcome, including an unknown module or a busy
//! lock, is reported as an event.

use crate::state::{PullReport, PushReport, SyncDirection, SyncEngine};
use crate::transport::RemoteDocumentClient;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A request to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Run one sync of a module.
    RequestSync {
        /// Module name.
        module: String,
        /// Sync direction.
        direction: SyncDirection,
    },
}

impl SyncCommand {
    /// Creates a push request.
    pub fn push(module: impl Into<String>) -> Self {
        Self::RequestSync {
            module: module.into(),
            direction: SyncDirection::Push,
        }
    }

    /// Creates a pull request.
    pub fn pull(module: impl Into<String>) -> Self {
        Self::RequestSync {
            module: module.into(),
            direction: SyncDirection::Pull,
        }
    }
}

/// What a completed sync did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A push finished.
    Pushed(PushReport),
    /// A pull finished.
    Pulled(PullReport),
}

/// Progress notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A sync began.
    Started {
        /// Module name.
        module: String,
        /// Sync direction.
        direction: SyncDirection,
    },
    /// A sync succeeded.
    Completed {
        /// Module name.
        module: String,
        /// What happened.
        outcome: SyncOutcome,
    },
    /// A sync failed.
    Failed {
        /// Module name.
        module: String,
        /// Sync direction.
        direction: SyncDirection,
        /// Message for the user.
        message: String,
    },
}

impl SyncEvent {
    /// Returns the module the event is about.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            SyncEvent::Started { module, .. }
            | SyncEvent::Completed { module, .. }
            | SyncEvent::Failed { module, .. } => module,
        }
    }

    /// Returns true for a terminal event.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SyncEvent::Started { .. })
    }
}

/// Routes commands to engines by module name.
pub struct SyncDispatcher<C: RemoteDocumentClient> {
    engines: BTreeMap<String, SyncEngine<C>>,
    events: broadcast::Sender<SyncEvent>,
}

impl<C: RemoteDocumentClient> SyncDispatcher<C> {
    /// Creates a dispatcher with no engines.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a dispatcher whose event channel buffers `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            engines: BTreeMap::new(),
            events,
        }
    }

    /// Adds an engine, replacing any engine of the same module.
    pub fn register(&mut self, engine: SyncEngine<C>) {
        self.engines.insert(engine.module().to_string(), engine);
    }

    /// Returns the engine of a module.
    #[must_use]
    pub fn engine(&self, module: &str) -> Option<&SyncEngine<C>> {
        self.engines.get(module)
    }

    /// Returns the registered module names.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    /// Subscribes to events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Runs a command and returns its terminal event.
    ///
    /// The same events are broadcast to subscribers.
    pub async fn dispatch(&self, command: SyncCommand) -> SyncEvent {
        let SyncCommand::RequestSync { module, direction } = command;

        let Some(engine) = self.engines.get(&module) else {
            tracing::warn!(%module, "sync requested for unknown module");
            return self.emit(SyncEvent::Failed {
                message: format!("Unknown module '{module}'."),
                module,
                direction,
            });
        };

        self.emit(SyncEvent::Started {
            module: module.clone(),
            direction,
        });

        let result = match direction {
            SyncDirection::Push => engine.push().await.map(SyncOutcome::Pushed),
            SyncDirection::Pull => engine.pull().await.map(SyncOutcome::Pulled),
        };

        match result {
            Ok(outcome) => self.emit(SyncEvent::Completed { module, outcome }),
            Err(err) => self.emit(SyncEvent::Failed {
                module,
                direction,
                message: err.user_message(),
            }),
        }
    }

    fn emit(&self, event: SyncEvent) -> SyncEvent {
        // No subscribers is fine
        let _ = self.events.send(event.clone());
        event
    }
}

impl<C: RemoteDocumentClient> Default for SyncDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryRemote;

    #[tokio::test]
    async fn unknown_module_fails_without_started() {
        let dispatcher: SyncDispatcher<MemoryRemote> = SyncDispatcher::new();
        let mut events = dispatcher.subscribe();

        let event = dispatcher.dispatch(SyncCommand::push("nope")).await;
        assert!(matches!(&event, SyncEvent::Failed { message, .. } if message.contains("nope")));
        assert!(event.is_terminal());
        assert_eq!(events.recv().await.unwrap(), event);
    }

    #[test]
    fn command_constructors() {
        assert_eq!(
            SyncCommand::pull("sales"),
            SyncCommand::RequestSync {
                module: "sales".into(),
                direction: SyncDirection::Pull,
            }
        );
    }
}
