//! Block classification
//!
//! A block is classified only when its numeric tag and its type label agree.
//! A tag alone is not enough: a mangled label under a known tag stays
//! `Unknown` and is skipped.

use crate::document::{parse_header, scan_body, Segment};
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::Serialize;

/// Block classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Scene object (`GameObject`)
    Entity,
    /// Spatial node (`Transform`, `RectTransform`)
    Transform,
    /// Script component (`MonoBehaviour`)
    Behavior,
    /// Camera component
    Camera,
    /// Light component
    Light,
    /// Any renderer component
    Renderer,
    /// Anything the rule table does not recognise
    Unknown,
}

impl BlockKind {
    /// True for kinds that attach to an entity as a behavior
    #[inline]
    #[must_use]
    pub fn is_component(self) -> bool {
        matches!(self, Self::Behavior | Self::Camera | Self::Light | Self::Renderer)
    }
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct ClassifyRule {
    /// Numeric class tag from the header
    pub tag: u32,
    /// Type label the body must open with
    pub label: &'static str,
    /// Resulting kind
    pub kind: BlockKind,
}

/// Ordered classification table
pub const CLASSIFY_RULES: &[ClassifyRule] = &[
    ClassifyRule { tag: 1, label: "GameObject", kind: BlockKind::Entity },
    ClassifyRule { tag: 4, label: "Transform", kind: BlockKind::Transform },
    ClassifyRule { tag: 224, label: "RectTransform", kind: BlockKind::Transform },
    ClassifyRule { tag: 114, label: "MonoBehaviour", kind: BlockKind::Behavior },
    ClassifyRule { tag: 20, label: "Camera", kind: BlockKind::Camera },
    ClassifyRule { tag: 108, label: "Light", kind: BlockKind::Light },
    ClassifyRule { tag: 23, label: "MeshRenderer", kind: BlockKind::Renderer },
    ClassifyRule { tag: 137, label: "SkinnedMeshRenderer", kind: BlockKind::Renderer },
    ClassifyRule { tag: 212, label: "SpriteRenderer", kind: BlockKind::Renderer },
    ClassifyRule { tag: 120, label: "LineRenderer", kind: BlockKind::Renderer },
];

/// Classify a tag/label pair
#[must_use]
pub fn classify(tag: Option<u32>, label: Option<&str>) -> BlockKind {
    let (Some(tag), Some(label)) = (tag, label) else {
        return BlockKind::Unknown;
    };
    CLASSIFY_RULES
        .iter()
        .find(|rule| rule.tag == tag && rule.label == label)
        .map_or(BlockKind::Unknown, |rule| rule.kind)
}

/// One classified record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Identity assigned by the document
    pub handle: i64,
    /// Numeric class tag
    pub tag: u32,
    /// Type label (`GameObject`, `MeshRenderer`, ...)
    pub type_name: String,
    /// Classification
    pub kind: BlockKind,
    /// Prefab-stripped placeholder
    pub stripped: bool,
    /// Raw fields in document order
    pub fields: IndexMap<String, FieldValue>,
}

impl Block {
    /// Build a block from a segment
    ///
    /// Returns `None` when the header carries no handle or the block does not
    /// classify; the caller only counts these.
    #[must_use]
    pub fn from_segment(segment: &Segment<'_>) -> Option<Self> {
        let header = parse_header(segment.header);
        let handle = header.handle?;
        let body = scan_body(&segment.lines);
        let kind = classify(header.tag, body.label.as_deref());
        if kind == BlockKind::Unknown {
            tracing::debug!(
                handle,
                tag = ?header.tag,
                label = ?body.label,
                "skipping unclassified block"
            );
            return None;
        }
        Some(Self {
            handle,
            tag: header.tag.unwrap_or_default(),
            type_name: body.label.unwrap_or_default(),
            kind,
            stripped: header.stripped,
            fields: body.fields,
        })
    }

    /// Field lookup
    #[inline]
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }
}
