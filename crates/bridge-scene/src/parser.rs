//! Scene document parser
//!
//! `parse` is total: every segment either becomes a record or bumps the
//! skipped count. Nothing is raised for malformed input.

use crate::block::Block;
use crate::document::split_segments;
use crate::error::{SceneError, SceneResult};
use crate::graph::SceneGraph;
use crate::records::Record;
use std::collections::HashSet;
use std::path::Path;

/// Parser for Unity scene and prefab documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneParser;

impl SceneParser {
    /// Create new scene parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Supported file extensions (without dot)
    #[must_use]
    pub fn extensions(&self) -> &[&str] {
        &["unity", "prefab"]
    }

    /// Check if this parser can handle the given path
    #[must_use]
    pub fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }

    /// Parse document text into a linked scene graph
    #[must_use]
    pub fn parse(&self, text: &str) -> SceneGraph {
        let mut entities = Vec::new();
        let mut transforms = Vec::new();
        let mut behaviors = Vec::new();
        let mut seen_entities = HashSet::new();
        let mut skipped = 0usize;

        for segment in split_segments(text) {
            let Some(record) = Block::from_segment(&segment).and_then(|b| Record::from_block(&b))
            else {
                skipped += 1;
                continue;
            };
            match record {
                Record::Entity(entity) => {
                    if seen_entities.insert(entity.handle) {
                        entities.push(entity);
                    } else {
                        tracing::debug!(handle = entity.handle, "duplicate entity handle");
                        skipped += 1;
                    }
                }
                Record::Transform(transform) => transforms.push(transform),
                Record::Behavior(behavior) => behaviors.push(behavior),
            }
        }

        let graph = SceneGraph::link(entities, transforms, behaviors, skipped);
        tracing::debug!(
            entities = graph.counts.entities,
            transforms = graph.counts.transforms,
            behaviors = graph.counts.behaviors,
            skipped = graph.counts.skipped,
            "parsed scene document"
        );
        graph
    }

    /// Read and parse a scene file
    ///
    /// # Errors
    /// - `SceneError::UnsupportedExtension` if the path is not a scene/prefab
    /// - `SceneError::Io` if the file cannot be read
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> SceneResult<SceneGraph> {
        let path = path.as_ref();
        if !self.can_parse(path) {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string();
            return Err(SceneError::UnsupportedExtension(ext));
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SceneError::io_error(path, e))?;
        Ok(self.parse(&String::from_utf8_lossy(&bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_extensions() {
        let parser = SceneParser::new();
        assert!(parser.can_parse(Path::new("Assets/Scenes/Main.unity")));
        assert!(parser.can_parse(Path::new("Enemy.prefab")));
        assert!(!parser.can_parse(Path::new("Player.cs")));
        assert!(!parser.can_parse(Path::new("Main")));
    }

    #[test]
    fn parse_never_fails_on_garbage() {
        let parser = SceneParser::new();
        let graph = parser.parse("::: not a scene :::\n--- !u!\n\u{0}\n--- &&&\n");
        assert!(graph.is_empty());
        assert_eq!(graph.counts.skipped, 2);
    }

    #[test]
    fn duplicate_entity_handle_is_skipped() {
        let doc = "--- !u!1 &1\nGameObject:\n  m_Name: A\n--- !u!1 &1\nGameObject:\n  m_Name: B\n";
        let graph = SceneParser::new().parse(doc);
        assert_eq!(graph.entities.len(), 1);
        assert_eq!(graph.entities[0].name, "A");
        assert_eq!(graph.counts.entities, 1);
        assert_eq!(graph.counts.skipped, 1);
    }

    #[tokio::test]
    async fn parse_file_rejects_other_extensions() {
        let err = SceneParser::new().parse_file("notes.txt").await.unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedExtension(ext) if ext == "txt"));
    }

    #[tokio::test]
    async fn parse_file_missing() {
        let err = SceneParser::new()
            .parse_file("/definitely/not/here.unity")
            .await
            .unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }
}
