use serde_json::Value;

const SAMPLE_JSON: &str = include_str!("../assets/sample.json");

/// The bundled starter diagram, used on first launch and for "Reset".
pub fn sample_document() -> Value {
    match serde_json::from_str(SAMPLE_JSON) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("Bundled sample is not valid JSON: {}", err);
            serde_json::json!({ "nodes": [], "edges": [] })
        }
    }
}
