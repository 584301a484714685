use diagram_core::{DiagramError, Graph, normalize_edges, normalize_nodes};
use diagram_storage::DiagramStore;

/// Reads and normalizes the persisted diagram without writing anything back.
/// `None` when nothing usable is saved.
pub fn load_saved_graph(store: &DiagramStore) -> Option<Graph> {
    let doc = store.load()?;
    let graph = Graph::from_parts(normalize_nodes(&doc.nodes), normalize_edges(&doc.edges));
    (!graph.is_empty()).then_some(graph)
}

/// Pretty-printed export of the persisted diagram, as saved.
pub fn export_saved(store: &DiagramStore) -> Result<Option<String>, DiagramError> {
    load_saved_graph(store)
        .map(|graph| serde_json::to_string_pretty(&graph.to_document()))
        .transpose()
        .map_err(DiagramError::from)
}
