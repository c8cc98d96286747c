//! Typed scene records and the field rule table
//!
//! Records are built from classified blocks by running every matching
//! `(kind, key) → setter` rule. New fields or block kinds are added to
//! [`FIELD_RULES`] only; the linking pass never looks at raw fields.

use crate::block::{Block, BlockKind};
use crate::value::{FieldValue, VectorParts};
use indexmap::IndexMap;
use serde::Serialize;

/// Name given to entities whose block carries no usable `m_Name`
pub const UNNAMED_ENTITY: &str = "Unnamed";

/// Three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    /// x
    pub x: f64,
    /// y
    pub y: f64,
    /// z
    pub z: f64,
}

impl Vec3 {
    /// All zeros
    pub const ZERO: Self = Self::splat(0.0);
    /// All ones
    pub const ONE: Self = Self::splat(1.0);

    /// Same value in every component
    #[inline]
    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Overlay the supplied components; missing ones keep `self`
    #[must_use]
    pub fn overlay(self, parts: &VectorParts) -> Self {
        Self {
            x: parts.x.unwrap_or(self.x),
            y: parts.y.unwrap_or(self.y),
            z: parts.z.unwrap_or(self.z),
        }
    }
}

/// Quaternion rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quat {
    /// x
    pub x: f64,
    /// y
    pub y: f64,
    /// z
    pub z: f64,
    /// w
    pub w: f64,
}

impl Quat {
    /// No rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Overlay the supplied components; missing ones keep `self`
    #[must_use]
    pub fn overlay(self, parts: &VectorParts) -> Self {
        Self {
            x: parts.x.unwrap_or(self.x),
            y: parts.y.unwrap_or(self.y),
            z: parts.z.unwrap_or(self.z),
            w: parts.w.unwrap_or(self.w),
        }
    }
}

/// Spatial node of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transform {
    /// Transform handle
    pub handle: i64,
    /// Owning entity (`m_GameObject`)
    pub owner: Option<i64>,
    /// Local position
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
    /// Parent transform handle (`m_Father`)
    pub parent: Option<i64>,
    /// Child transform handles in document order (`m_Children`)
    pub children: Vec<i64>,
}

impl Transform {
    fn new(handle: i64) -> Self {
        Self {
            handle,
            owner: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// What a behavior block was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// User script (`MonoBehaviour`)
    Script,
    /// Camera
    Camera,
    /// Light
    Light,
    /// Any renderer
    Renderer,
}

impl BehaviorKind {
    fn from_block(kind: BlockKind) -> Option<Self> {
        match kind {
            BlockKind::Behavior => Some(Self::Script),
            BlockKind::Camera => Some(Self::Camera),
            BlockKind::Light => Some(Self::Light),
            BlockKind::Renderer => Some(Self::Renderer),
            _ => None,
        }
    }
}

/// Component attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Behavior {
    /// Behavior handle
    pub handle: i64,
    /// Owning entity (`m_GameObject`)
    pub owner: Option<i64>,
    /// Classification
    pub kind: BehaviorKind,
    /// Type label from the block (`MonoBehaviour`, `Light`, ...)
    pub type_name: String,
    /// `m_Enabled`, true when absent
    pub enabled: bool,
    /// Script asset GUID for `MonoBehaviour` blocks
    pub script_guid: Option<String>,
    /// Fields no rule consumed, in document order
    pub extra_properties: IndexMap<String, FieldValue>,
}

/// Entity fields before linking
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Entity handle
    pub handle: i64,
    /// `m_Name`
    pub name: String,
    /// `m_IsActive`
    pub active: bool,
    /// `m_Layer`
    pub layer: u32,
    /// `m_TagString`
    pub tag: String,
}

/// Typed record built from one block
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Scene object
    Entity(EntityRecord),
    /// Spatial node
    Transform(Transform),
    /// Attached component
    Behavior(Behavior),
}

type Setter = fn(&mut Record, &FieldValue);

/// One row of the field table
#[derive(Clone, Copy)]
pub struct FieldRule {
    /// Block kinds the rule applies to
    pub kinds: &'static [BlockKind],
    /// Raw field key
    pub key: &'static str,
    apply: Setter,
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("kinds", &self.kinds)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

const ENTITY: &[BlockKind] = &[BlockKind::Entity];
const TRANSFORM: &[BlockKind] = &[BlockKind::Transform];
const COMPONENTS: &[BlockKind] = &[
    BlockKind::Behavior,
    BlockKind::Camera,
    BlockKind::Light,
    BlockKind::Renderer,
];
const SCRIPT: &[BlockKind] = &[BlockKind::Behavior];

/// Field extraction table
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule { kinds: ENTITY, key: "m_Name", apply: set_entity_name },
    FieldRule { kinds: ENTITY, key: "m_IsActive", apply: set_entity_active },
    FieldRule { kinds: ENTITY, key: "m_Layer", apply: set_entity_layer },
    FieldRule { kinds: ENTITY, key: "m_TagString", apply: set_entity_tag },
    FieldRule { kinds: TRANSFORM, key: "m_GameObject", apply: set_transform_owner },
    FieldRule { kinds: TRANSFORM, key: "m_LocalPosition", apply: set_position },
    FieldRule { kinds: TRANSFORM, key: "m_LocalRotation", apply: set_rotation },
    FieldRule { kinds: TRANSFORM, key: "m_LocalScale", apply: set_scale },
    FieldRule { kinds: TRANSFORM, key: "m_Father", apply: set_parent },
    FieldRule { kinds: TRANSFORM, key: "m_Children", apply: set_children },
    FieldRule { kinds: COMPONENTS, key: "m_GameObject", apply: set_behavior_owner },
    FieldRule { kinds: COMPONENTS, key: "m_Enabled", apply: set_behavior_enabled },
    FieldRule { kinds: SCRIPT, key: "m_Script", apply: set_script_guid },
];

/// Bookkeeping keys left out of `extra_properties`
const IGNORED_KEYS: &[&str] = &[
    "m_ObjectHideFlags",
    "m_CorrespondingSourceObject",
    "m_PrefabInstance",
    "m_PrefabAsset",
    "m_PrefabParentObject",
    "m_PrefabInternal",
    "m_EditorHideFlags",
    "m_EditorClassIdentifier",
];

fn find_rule(kind: BlockKind, key: &str) -> Option<&'static FieldRule> {
    FIELD_RULES
        .iter()
        .find(|rule| rule.key == key && rule.kinds.contains(&kind))
}

impl Record {
    /// Build a typed record from a classified block
    #[must_use]
    pub fn from_block(block: &Block) -> Option<Self> {
        let mut record = match block.kind {
            BlockKind::Entity => Self::Entity(EntityRecord {
                handle: block.handle,
                name: UNNAMED_ENTITY.to_string(),
                active: true,
                layer: 0,
                tag: "Untagged".to_string(),
            }),
            BlockKind::Transform => Self::Transform(Transform::new(block.handle)),
            kind => Self::Behavior(Behavior {
                handle: block.handle,
                owner: None,
                kind: BehaviorKind::from_block(kind)?,
                type_name: block.type_name.clone(),
                enabled: true,
                script_guid: None,
                extra_properties: IndexMap::new(),
            }),
        };

        for (key, value) in &block.fields {
            match find_rule(block.kind, key) {
                Some(rule) => (rule.apply)(&mut record, value),
                None => {
                    if let Self::Behavior(b) = &mut record {
                        if !IGNORED_KEYS.contains(&key.as_str()) {
                            b.extra_properties.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }
        Some(record)
    }
}

fn set_entity_name(record: &mut Record, value: &FieldValue) {
    if let (Record::Entity(e), Some(name)) = (record, value.as_text()) {
        if !name.trim().is_empty() {
            e.name = name;
        }
    }
}

fn set_entity_active(record: &mut Record, value: &FieldValue) {
    if let (Record::Entity(e), Some(active)) = (record, value.as_bool()) {
        e.active = active;
    }
}

fn set_entity_layer(record: &mut Record, value: &FieldValue) {
    if let (Record::Entity(e), Some(layer)) = (record, value.as_f64()) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let layer = layer.max(0.0) as u32;
        e.layer = layer;
    }
}

fn set_entity_tag(record: &mut Record, value: &FieldValue) {
    if let (Record::Entity(e), Some(tag)) = (record, value.as_text()) {
        e.tag = tag;
    }
}

fn set_transform_owner(record: &mut Record, value: &FieldValue) {
    if let Record::Transform(t) = record {
        t.owner = value.as_handle();
    }
}

fn set_position(record: &mut Record, value: &FieldValue) {
    if let (Record::Transform(t), Some(parts)) = (record, value.as_vector()) {
        t.position = Vec3::ZERO.overlay(parts);
    }
}

fn set_rotation(record: &mut Record, value: &FieldValue) {
    if let (Record::Transform(t), Some(parts)) = (record, value.as_vector()) {
        t.rotation = Quat::IDENTITY.overlay(parts);
    }
}

fn set_scale(record: &mut Record, value: &FieldValue) {
    if let (Record::Transform(t), Some(parts)) = (record, value.as_vector()) {
        t.scale = Vec3::ONE.overlay(parts);
    }
}

fn set_parent(record: &mut Record, value: &FieldValue) {
    if let Record::Transform(t) = record {
        t.parent = value.as_handle();
    }
}

fn set_children(record: &mut Record, value: &FieldValue) {
    if let (Record::Transform(t), FieldValue::List(items)) = (record, value) {
        t.children = items.iter().filter_map(FieldValue::as_handle).collect();
    }
}

fn set_behavior_owner(record: &mut Record, value: &FieldValue) {
    if let Record::Behavior(b) = record {
        b.owner = value.as_handle();
    }
}

fn set_behavior_enabled(record: &mut Record, value: &FieldValue) {
    if let (Record::Behavior(b), Some(enabled)) = (record, value.as_bool()) {
        b.enabled = enabled;
    }
}

fn set_script_guid(record: &mut Record, value: &FieldValue) {
    if let (Record::Behavior(b), FieldValue::Reference(r)) = (record, value) {
        b.script_guid.clone_from(&r.guid);
    }
}
