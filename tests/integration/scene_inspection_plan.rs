//! Functional tests for offline scene inspection.
//!
//! These tests exercise the guarantees a caller relies on when reading a
//! saved scene without the editor:
//! - Every entity is reported once, under the handle the document gave it.
//! - Components only attach through an explicit ownership reference.
//! - Damaged or unrecognised blocks are skipped and counted, never fatal.
//! - Partial vectors keep defaults for the axes they omit.

use bridge_scene::{SceneParser, Vec3};
use bridge_test_utils::{SceneDocBuilder, SAMPLE_SCENE};
use std::collections::HashSet;

/// Tenet: handles identify entities; names do not.
#[test]
fn test_entities_keyed_by_handle_not_name() {
    let doc = SceneDocBuilder::new()
        .entity(10, "Tree")
        .entity(11, "Tree")
        .entity(12, "Tree")
        .build();
    let graph = SceneParser::new().parse(&doc);

    let handles: HashSet<i64> = graph.entities.iter().map(|e| e.handle).collect();
    assert_eq!(handles.len(), 3);
    assert_eq!(graph.find_by_name("Tree").len(), 3);
}

/// Tenet: an empty document is an empty scene, not an error.
#[test]
fn test_empty_document_is_empty_scene() {
    let graph = SceneParser::new().parse("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n");
    assert!(graph.is_empty());
    assert_eq!(graph.counts.entities, 0);
    assert_eq!(graph.counts.skipped, 0);
}

/// Tenet: ownership is explicit. A transform that names no owner is counted
/// but never attached to whichever entity happens to precede it.
#[test]
fn test_ownerless_transform_never_attaches() {
    let graph = SceneParser::new().parse(SAMPLE_SCENE);

    assert_eq!(graph.counts.transforms, 4);
    assert!(graph
        .entities
        .iter()
        .filter_map(|e| e.transform.as_ref())
        .all(|t| t.handle != 402));
}

/// Tenet: a vector missing an axis keeps the default for that axis only.
#[test]
fn test_partial_vector_keeps_axis_default() {
    let doc = SceneDocBuilder::new()
        .entity(1, "Box")
        .raw("--- !u!4 &2\nTransform:\n  m_GameObject: {fileID: 1}\n  m_LocalPosition: {x: 4, y: 5}\n  m_LocalScale: {x: 3}\n")
        .build();
    let graph = SceneParser::new().parse(&doc);
    let transform = graph.entity(1).and_then(|e| e.transform.as_ref()).unwrap();

    assert_eq!(transform.position, Vec3 { x: 4.0, y: 5.0, z: 0.0 });
    assert_eq!(transform.scale, Vec3 { x: 3.0, y: 1.0, z: 1.0 });
}

/// Tenet: damaged input degrades, it does not abort.
#[test]
fn test_damaged_blocks_are_counted() {
    let doc = SceneDocBuilder::new()
        .entity(1, "Survivor")
        .raw("--- !u!1\nGameObject:\n  m_Name: NoHandle\n")
        .raw("--- !u!999 &5\nMystery:\n  m_Thing: 1\n")
        .build();
    let graph = SceneParser::new().parse(&doc);

    assert_eq!(graph.entities.len(), 1);
    assert_eq!(graph.counts.skipped, 2);
}
