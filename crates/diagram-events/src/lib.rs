use crossbeam_channel::{Receiver, Sender, unbounded};
use diagram_core::{GraphDocument, LayoutDirection};
use serde::{Deserialize, Serialize};

/// Which editor form is open, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FormState {
    #[default]
    Closed,
    AddNode,
    EditNode {
        id: String,
    },
    EditEdge {
        id: String,
    },
}

/// Signals the synchronization controller sends to the view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewEvent {
    /// Fresh projection of the whole graph.
    Render { graph: GraphDocument },
    /// Rescale and recenter the viewport around every node.
    FitView { padding: f64 },
    /// User-facing message, e.g. a rejected import.
    Alert { message: String },
    LayoutApplied {
        node_count: usize,
        direction: LayoutDirection,
    },
    FormChanged { form: FormState },
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<ViewEvent>,
    rx: Receiver<ViewEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn receiver(&self) -> Receiver<ViewEvent> {
        self.rx.clone()
    }

    pub fn publish(&self, event: ViewEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("View event dropped: no receiver");
        }
    }

    /// Drain every pending event without blocking.
    pub fn drain(&self) -> Vec<ViewEvent> {
        self.rx.try_iter().collect()
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &ViewEvent);
}
