//! Shape normalization for externally supplied graph data.
//!
//! Input goes through two stages. `classify_*` inspects the raw JSON and
//! reports how much of it needs defaulting; `normalize_*` coerces every record
//! into a well-formed [`Node`] or [`Edge`]. Neither stage fails: a value that
//! is not an array normalizes to an empty list.

use crate::Position;
use crate::model::{Edge, EdgeStyle, MarkerEnd, Node, NodeData, DEFAULT_NODE_TYPE};
use serde_json::{Map, Value};
use std::collections::HashSet;

const NODE_KEYS: &[&str] = &["id", "position", "data", "label", "desc", "type"];
const EDGE_KEYS: &[&str] = &[
    "id", "source", "target", "label", "animated", "markerEnd", "style",
];
const TRANSIENT_DATA_KEYS: &[&str] = &["onDelete", "label", "desc"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// Array whose records carry every required field.
    WellFormed,
    /// Array where `defaulted` records need at least one default applied.
    PartiallyFormed { defaulted: usize },
    /// Not an array.
    Invalid,
}

/// Default position for the node at `index` when the input has none.
pub fn grid_fallback(index: usize) -> Position {
    Position::new(
        100.0 + index as f64 * 180.0,
        100.0 + (index / 4) as f64 * 120.0,
    )
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_position(value: Option<&Value>) -> Option<Position> {
    let obj = value?.as_object()?;
    let x = obj.get("x")?.as_f64()?;
    let y = obj.get("y")?.as_f64()?;
    Some(Position::new(x, y))
}

fn field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    field(record, "id").and_then(scalar_string)
}

fn nested_or_flat(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get("data")
        .and_then(Value::as_object)
        .and_then(|data| field(data, key))
        .or_else(|| field(record, key))
        .and_then(scalar_string)
}

fn node_needs_defaults(record: &Map<String, Value>) -> bool {
    record_id(record).is_none()
        || parse_position(record.get("position")).is_none()
        || nested_or_flat(record, "label").is_none()
        || field(record, "type").is_none()
}

fn edge_needs_defaults(record: &Map<String, Value>) -> bool {
    record_id(record).is_none()
        || field(record, "source").and_then(scalar_string).is_none()
        || field(record, "target").and_then(scalar_string).is_none()
        || !record.get("animated").is_some_and(Value::is_boolean)
}

fn classify(raw: &Value, needs_defaults: fn(&Map<String, Value>) -> bool) -> InputShape {
    let Some(items) = raw.as_array() else {
        return InputShape::Invalid;
    };
    let empty = Map::new();
    let defaulted = items
        .iter()
        .filter(|item| needs_defaults(item.as_object().unwrap_or(&empty)))
        .count();
    if defaulted == 0 {
        InputShape::WellFormed
    } else {
        InputShape::PartiallyFormed { defaulted }
    }
}

pub fn classify_nodes(raw: &Value) -> InputShape {
    classify(raw, node_needs_defaults)
}

pub fn classify_edges(raw: &Value) -> InputShape {
    classify(raw, edge_needs_defaults)
}

fn extra_fields(record: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn coerce_node(index: usize, record: &Map<String, Value>) -> Node {
    let id = record_id(record).unwrap_or_else(|| format!("n_missing_{index}"));
    let position = parse_position(record.get("position")).unwrap_or_else(|| grid_fallback(index));
    let label = nested_or_flat(record, "label").unwrap_or_else(|| id.clone());
    let desc = nested_or_flat(record, "desc").unwrap_or_default();
    let data_extra = record
        .get("data")
        .and_then(Value::as_object)
        .map(|data| extra_fields(data, TRANSIENT_DATA_KEYS))
        .unwrap_or_default();
    let node_type = field(record, "type")
        .and_then(scalar_string)
        .unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string());

    Node {
        id,
        position,
        data: NodeData {
            label,
            desc,
            on_delete: None,
            extra: data_extra,
        },
        node_type,
        extra: extra_fields(record, NODE_KEYS),
    }
}

fn coerce_edge(index: usize, record: &Map<String, Value>) -> Edge {
    let id = record_id(record).unwrap_or_else(|| format!("e_missing_{index}"));
    let endpoint = |key: &str| {
        field(record, key)
            .and_then(scalar_string)
            .unwrap_or_default()
    };

    Edge {
        id,
        source: endpoint("source"),
        target: endpoint("target"),
        label: record
            .get("label")
            .and_then(Value::as_str)
            .map(str::to_string),
        animated: record
            .get("animated")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        // Marker and style are always reset; an incoming stroke color is dropped.
        marker_end: MarkerEnd::default(),
        style: EdgeStyle::default(),
        extra: extra_fields(record, EDGE_KEYS),
    }
}

fn coerce<T>(raw: &Value, coerce_one: fn(usize, &Map<String, Value>) -> T) -> Vec<T> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    let empty = Map::new();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| coerce_one(i, item.as_object().unwrap_or(&empty)))
        .collect()
}

/// Keeps the first record for every id; later records with the same id are
/// dropped.
fn dedupe_by_id<T>(items: Vec<T>, id_of: fn(&T) -> &str, kind: &str) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(id_of(&item).to_string()) {
            kept.push(item);
        } else {
            tracing::debug!("Dropping {} with duplicate id {}", kind, id_of(&item));
        }
    }
    kept
}

pub fn normalize_nodes(raw: &Value) -> Vec<Node> {
    let shape = classify_nodes(raw);
    if shape != InputShape::WellFormed {
        tracing::debug!("Normalizing node input: {:?}", shape);
    }
    dedupe_by_id(coerce(raw, coerce_node), |n| n.id.as_str(), "node")
}

pub fn normalize_edges(raw: &Value) -> Vec<Edge> {
    let shape = classify_edges(raw);
    if shape != InputShape::WellFormed {
        tracing::debug!("Normalizing edge input: {:?}", shape);
    }
    dedupe_by_id(coerce(raw, coerce_edge), |e| e.id.as_str(), "edge")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IMPORTED_EDGE_STROKE;
    use serde_json::json;

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let nodes = normalize_nodes(&json!([
            {"id": "a", "label": "first"},
            {"id": "a", "label": "second"},
            {"id": "b"},
            {"id": "n_missing_4"},
            {}
        ]));
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "n_missing_4"]);
        assert_eq!(nodes[0].data.label, "first");

        let edges = normalize_edges(&json!([
            {"id": "e", "source": "a", "target": "b"},
            {"id": "e", "source": "b", "target": "a"}
        ]));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, "a");
    }

    #[test]
    fn test_non_array_input_normalizes_to_empty() {
        for raw in [json!(null), json!({}), json!("nodes"), json!(42), json!([])] {
            assert!(normalize_nodes(&raw).is_empty());
            assert!(normalize_edges(&raw).is_empty());
        }
        assert_eq!(classify_nodes(&json!({"a": 1})), InputShape::Invalid);
        assert_eq!(classify_edges(&json!([])), InputShape::WellFormed);
    }

    #[test]
    fn test_missing_ids_and_positions_follow_grid() {
        let raw = json!([{}, {}, {}, {}, {}]);
        let nodes = normalize_nodes(&raw);

        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["n_missing_0", "n_missing_1", "n_missing_2", "n_missing_3", "n_missing_4"]
        );
        assert_eq!(nodes[0].position, Position::new(100.0, 100.0));
        assert_eq!(nodes[3].position, Position::new(640.0, 100.0));
        assert_eq!(nodes[4].position, Position::new(820.0, 220.0));
        assert_eq!(nodes[2].data.label, "n_missing_2");
        assert_eq!(nodes[2].node_type, "custom");
        assert_eq!(
            classify_nodes(&raw),
            InputShape::PartiallyFormed { defaulted: 5 }
        );
    }

    #[test]
    fn test_label_prefers_nested_then_flat_then_id() {
        let raw = json!([
            {"id": "a", "data": {"label": "Nested", "desc": "d"}, "label": "Flat"},
            {"id": "b", "label": "Flat", "desc": "flat desc"},
            {"id": 7}
        ]);
        let nodes = normalize_nodes(&raw);

        assert_eq!(nodes[0].data.label, "Nested");
        assert_eq!(nodes[0].data.desc, "d");
        assert_eq!(nodes[1].data.label, "Flat");
        assert_eq!(nodes[1].data.desc, "flat desc");
        assert_eq!(nodes[2].id, "7");
        assert_eq!(nodes[2].data.label, "7");
        assert_eq!(nodes[2].data.desc, "");
    }

    #[test]
    fn test_existing_position_and_extras_are_kept() {
        let raw = json!([{
            "id": "a",
            "position": {"x": 3.5, "y": -2},
            "type": "custom",
            "data": {"label": "A", "color": "red", "onDelete": "fn"},
            "selected": true
        }]);
        let nodes = normalize_nodes(&raw);

        assert_eq!(nodes[0].position, Position::new(3.5, -2.0));
        assert_eq!(nodes[0].data.extra.get("color"), Some(&json!("red")));
        assert!(nodes[0].data.extra.get("onDelete").is_none());
        assert_eq!(nodes[0].extra.get("selected"), Some(&json!(true)));
        assert_eq!(classify_nodes(&raw), InputShape::WellFormed);
    }

    #[test]
    fn test_malformed_position_falls_back_to_grid() {
        let raw = json!([{"id": "a"}, {"id": "b", "position": {"x": "left"}}]);
        let nodes = normalize_nodes(&raw);
        assert_eq!(nodes[1].position, grid_fallback(1));
    }

    #[test]
    fn test_edge_defaults_and_stroke_is_discarded() {
        let raw = json!([
            {"source": "a", "target": "b", "animated": false, "style": {"stroke": "#ff0000", "strokeWidth": 9}},
            {"id": "keep", "source": "b", "target": "c", "animated": "yes", "label": "calls", "markerEnd": {"type": "arrow"}}
        ]);
        let edges = normalize_edges(&raw);

        assert_eq!(edges[0].id, "e_missing_0");
        assert!(!edges[0].animated);
        assert_eq!(edges[0].style.stroke, IMPORTED_EDGE_STROKE);
        assert_eq!(edges[0].style.stroke_width, 2.0);

        assert_eq!(edges[1].id, "keep");
        assert!(edges[1].animated);
        assert_eq!(edges[1].label.as_deref(), Some("calls"));
        assert_eq!(edges[1].marker_end.kind, "arrowclosed");
    }

    #[test]
    fn test_non_object_records_are_defaulted() {
        let nodes = normalize_nodes(&json!([1, "x", null]));
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].id, "n_missing_1");

        let edges = normalize_edges(&json!([true]));
        assert_eq!(edges[0].id, "e_missing_0");
        assert_eq!(edges[0].source, "");
    }
}
