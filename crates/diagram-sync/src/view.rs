use diagram_core::{Graph, LayoutDirection};
use diagram_events::{EventBus, FormState, ViewEvent};

/// Outbound boundary to whatever renders the diagram.
pub trait ViewAdapter {
    fn render(&mut self, graph: &Graph);
    fn fit_view(&mut self, padding: f64);
    fn alert(&mut self, message: &str);

    fn layout_applied(&mut self, _node_count: usize, _direction: LayoutDirection) {}
    fn form_changed(&mut self, _form: &FormState) {}
}

/// Publishes every signal as a [`ViewEvent`].
pub struct EventBusView {
    bus: EventBus,
}

impl EventBusView {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl ViewAdapter for EventBusView {
    fn render(&mut self, graph: &Graph) {
        self.bus.publish(ViewEvent::Render {
            graph: graph.to_document(),
        });
    }

    fn fit_view(&mut self, padding: f64) {
        self.bus.publish(ViewEvent::FitView { padding });
    }

    fn alert(&mut self, message: &str) {
        self.bus.publish(ViewEvent::Alert {
            message: message.to_string(),
        });
    }

    fn layout_applied(&mut self, node_count: usize, direction: LayoutDirection) {
        self.bus.publish(ViewEvent::LayoutApplied {
            node_count,
            direction,
        });
    }

    fn form_changed(&mut self, form: &FormState) {
        self.bus.publish(ViewEvent::FormChanged { form: form.clone() });
    }
}

/// Headless view; discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ViewAdapter for NullView {
    fn render(&mut self, _graph: &Graph) {}
    fn fit_view(&mut self, _padding: f64) {}
    fn alert(&mut self, _message: &str) {}
}
