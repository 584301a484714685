use super::*;
use diagram_core::{DeleteHook, Edge, Node, NodeData, Position};
use serde_json::json;

fn sample_doc() -> GraphDocument {
    let mut data = NodeData::new("A", "first");
    data.on_delete = Some(DeleteHook::new(|_| {}));
    GraphDocument {
        nodes: vec![
            Node::new("a", Position::new(20.0, 20.0), data),
            Node::new("b", Position::new(260.0, 20.0), NodeData::new("B", "")),
        ],
        edges: vec![Edge::new("e1", "a", "b")],
    }
}

#[test]
fn test_sqlite_save_and_load() -> Result<(), StorageError> {
    let store = DiagramStore::new(SqliteStore::new_in_memory()?);
    store.save(&sample_doc())?;

    let loaded = store.load().expect("saved document");
    assert!(loaded.is_array_shaped());
    assert_eq!(loaded.nodes.as_array().map(Vec::len), Some(2));
    assert_eq!(loaded.nodes[0]["data"]["label"], "A");
    assert_eq!(loaded.edges[0]["source"], "a");
    Ok(())
}

#[test]
fn test_delete_hook_never_reaches_storage() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    let store = DiagramStore::new(backend.clone());
    store.save(&sample_doc())?;

    let raw = backend.raw(STORAGE_KEY).expect("raw entry");
    assert!(!raw.contains("onDelete"));
    assert!(!raw.contains("on_delete"));
    Ok(())
}

#[test]
fn test_corrupt_entry_loads_as_none() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    backend.set(STORAGE_KEY, "{not json")?;
    let store = DiagramStore::new(backend.clone());
    assert!(store.load().is_none());

    backend.set(STORAGE_KEY, "[1, 2, 3]")?;
    assert!(store.load().is_none());
    Ok(())
}

#[test]
fn test_partial_document_loads_with_null_fields() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    backend.set(STORAGE_KEY, &json!({"nodes": [{"id": "a"}]}).to_string())?;
    let store = DiagramStore::new(backend);

    let loaded = store.load().expect("document");
    assert!(loaded.nodes.is_array());
    assert!(loaded.edges.is_null());
    assert!(!loaded.is_array_shaped());
    Ok(())
}

#[test]
fn test_clear_removes_entry() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    let store = DiagramStore::new(backend.clone());
    store.save(&sample_doc())?;
    assert_eq!(backend.len(), 1);

    store.clear()?;
    assert!(backend.is_empty());
    assert!(store.load().is_none());
    Ok(())
}

#[test]
fn test_keys_are_isolated() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    let current = DiagramStore::new(backend.clone());
    let legacy = DiagramStore::with_key(backend.clone(), "dynamic-diagram-flow-v0");

    current.save(&sample_doc())?;
    assert!(legacy.load().is_none());
    legacy.clear()?;
    assert!(current.load().is_some());
    Ok(())
}

#[test]
fn test_sqlite_file_survives_reopen() -> Result<(), StorageError> {
    let dir = tempfile::tempdir().map_err(|e| StorageError::Other(e.to_string()))?;
    let path = dir.path().join("diagram.db");

    {
        let store = DiagramStore::new(SqliteStore::open(&path)?);
        store.save(&sample_doc())?;
    }

    let reopened = SqliteStore::open(&path)?;
    assert_eq!(reopened.schema_version()?, schema::SCHEMA_VERSION);
    assert_eq!(reopened.keys()?, vec![STORAGE_KEY.to_string()]);

    let store = DiagramStore::new(reopened);
    let loaded = store.load().expect("document after reopen");
    assert_eq!(loaded.nodes[1]["id"], "b");
    Ok(())
}

#[test]
fn test_sqlite_overwrites_on_save() -> Result<(), StorageError> {
    let sqlite = SqliteStore::new_in_memory()?;
    sqlite.set("k", "one")?;
    sqlite.set("k", "two")?;
    assert_eq!(sqlite.get("k")?, Some("two".to_string()));

    sqlite.remove("k")?;
    assert_eq!(sqlite.get("k")?, None);
    Ok(())
}

#[test]
fn test_save_graph_matches_document() -> Result<(), StorageError> {
    let backend = MemoryStore::new();
    let store = DiagramStore::new(backend.clone());
    let graph = Graph::from(sample_doc());
    store.save_graph(&graph)?;

    let saved: GraphDocument =
        serde_json::from_str(&backend.raw(STORAGE_KEY).expect("entry"))?;
    assert_eq!(saved.nodes.len(), 2);
    assert_eq!(saved.nodes[0].data.on_delete, None);
    assert_eq!(saved.edges, graph.edges());
    Ok(())
}
