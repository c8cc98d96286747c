//! Linked scene graph
//!
//! Transforms and behaviors point at their owning entity (`m_GameObject`);
//! entities never point at them. Linking therefore builds owner-keyed maps
//! and joins them onto entities by handle.

use crate::records::{Behavior, EntityRecord, Transform};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Entity with its transform and behaviors attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Entity handle, unique within the graph
    pub handle: i64,
    /// Display name; not unique
    pub name: String,
    /// `m_IsActive`
    pub active: bool,
    /// Layer index
    pub layer: u32,
    /// Tag string
    pub tag: String,
    /// Attached transform, if one claims this entity
    pub transform: Option<Transform>,
    /// Attached behaviors in document order
    pub behaviors: Vec<Behavior>,
}

/// Aggregate counts over successfully classified records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneCounts {
    /// Entities kept
    pub entities: usize,
    /// Transforms classified
    pub transforms: usize,
    /// Behaviors classified (scripts, cameras, lights, renderers)
    pub behaviors: usize,
    /// Segments dropped: no handle, unclassified, or duplicate entity handle
    pub skipped: usize,
}

/// Node of the entity hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Entity handle
    pub handle: i64,
    /// Entity name
    pub name: String,
    /// Entity active flag
    pub active: bool,
    /// Child entities
    pub children: Vec<HierarchyNode>,
}

/// Parsed scene: ordered entities plus counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneGraph {
    /// Entities in document order
    pub entities: Vec<Entity>,
    /// Aggregate counts
    pub counts: SceneCounts,
}

impl SceneGraph {
    /// Link classified records into a graph
    ///
    /// Counts are taken from the inputs before linking. A later transform
    /// claiming an already-claimed entity replaces the earlier one.
    #[must_use]
    pub fn link(
        entities: Vec<EntityRecord>,
        transforms: Vec<Transform>,
        behaviors: Vec<Behavior>,
        skipped: usize,
    ) -> Self {
        let counts = SceneCounts {
            entities: entities.len(),
            transforms: transforms.len(),
            behaviors: behaviors.len(),
            skipped,
        };

        let mut transform_by_owner: HashMap<i64, Transform> = HashMap::new();
        for transform in transforms {
            let Some(owner) = transform.owner else {
                tracing::debug!(handle = transform.handle, "transform has no owner");
                continue;
            };
            if let Some(previous) = transform_by_owner.insert(owner, transform) {
                tracing::debug!(
                    owner,
                    replaced = previous.handle,
                    "entity claimed by more than one transform"
                );
            }
        }

        let mut behaviors_by_owner: HashMap<i64, Vec<Behavior>> = HashMap::new();
        for behavior in behaviors {
            if let Some(owner) = behavior.owner {
                behaviors_by_owner.entry(owner).or_default().push(behavior);
            }
        }

        let entities = entities
            .into_iter()
            .map(|record| Entity {
                transform: transform_by_owner.remove(&record.handle),
                behaviors: behaviors_by_owner.remove(&record.handle).unwrap_or_default(),
                handle: record.handle,
                name: record.name,
                active: record.active,
                layer: record.layer,
                tag: record.tag,
            })
            .collect();

        Self { entities, counts }
    }

    /// True if the graph holds no entities
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity by handle
    #[must_use]
    pub fn entity(&self, handle: i64) -> Option<&Entity> {
        self.entities.iter().find(|e| e.handle == handle)
    }

    /// All entities with the given name, in document order
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.name == name).collect()
    }

    /// Parent entity handle, resolved through the transform chain
    #[must_use]
    pub fn parent_of(&self, handle: i64) -> Option<i64> {
        Links::new(&self.entities).parent_of(handle)
    }

    /// Entities without a resolvable parent, in document order
    #[must_use]
    pub fn roots(&self) -> Vec<&Entity> {
        Links::new(&self.entities).roots()
    }

    /// Child entities of `handle`
    ///
    /// Ordered by the parent's `m_Children` list; children that name this
    /// parent but are missing from that list follow in document order.
    #[must_use]
    pub fn children_of(&self, handle: i64) -> Vec<&Entity> {
        Links::new(&self.entities).children_of(handle)
    }

    /// Full hierarchy as a forest of nodes
    ///
    /// Parent cycles in malformed documents are cut at the first revisit.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<HierarchyNode> {
        Links::new(&self.entities).hierarchy()
    }

    /// Indented text outline of the hierarchy with behavior type names
    #[must_use]
    pub fn outline(&self) -> String {
        let links = Links::new(&self.entities);
        let mut out = String::new();
        for node in links.hierarchy() {
            links.write_node(&mut out, &node, 0);
        }
        out
    }
}

/// Handle lookups over one entity list, built once per traversal
///
/// The first entity with a given handle wins, as in [`SceneGraph::entity`].
struct Links<'a> {
    entities: &'a [Entity],
    by_handle: HashMap<i64, usize>,
    owner_of_transform: HashMap<i64, i64>,
    parent: HashMap<i64, i64>,
    children: HashMap<i64, Vec<usize>>,
}

impl<'a> Links<'a> {
    fn new(entities: &'a [Entity]) -> Self {
        let mut by_handle = HashMap::with_capacity(entities.len());
        let mut owner_of_transform = HashMap::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            by_handle.entry(entity.handle).or_insert(index);
            if let Some(transform) = &entity.transform {
                owner_of_transform
                    .entry(transform.handle)
                    .or_insert(entity.handle);
            }
        }

        let mut parent = HashMap::new();
        let mut children: HashMap<i64, Vec<usize>> = HashMap::new();
        for (index, entity) in entities.iter().enumerate() {
            if by_handle.get(&entity.handle) != Some(&index) {
                continue;
            }
            let Some(parent_handle) = entity
                .transform
                .as_ref()
                .and_then(|t| t.parent)
                .and_then(|t| owner_of_transform.get(&t).copied())
            else {
                continue;
            };
            parent.insert(entity.handle, parent_handle);
            children.entry(parent_handle).or_default().push(index);
        }

        Self {
            entities,
            by_handle,
            owner_of_transform,
            parent,
            children,
        }
    }

    fn entity(&self, handle: i64) -> Option<&'a Entity> {
        self.by_handle.get(&handle).map(|&i| &self.entities[i])
    }

    fn parent_of(&self, handle: i64) -> Option<i64> {
        self.parent.get(&handle).copied()
    }

    fn roots(&self) -> Vec<&'a Entity> {
        self.entities
            .iter()
            .filter(|e| !self.parent.contains_key(&e.handle))
            .collect()
    }

    fn children_of(&self, handle: i64) -> Vec<&'a Entity> {
        let Some(parent) = self.entity(handle) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if let Some(transform) = &parent.transform {
            for child_transform in &transform.children {
                let Some(&child) = self.owner_of_transform.get(child_transform) else {
                    continue;
                };
                if self.parent_of(child) == Some(handle) && seen.insert(child) {
                    out.extend(self.entity(child));
                }
            }
        }
        for &index in self.children.get(&handle).map(Vec::as_slice).unwrap_or_default() {
            let entity = &self.entities[index];
            if seen.insert(entity.handle) {
                out.push(entity);
            }
        }
        out
    }

    fn hierarchy(&self) -> Vec<HierarchyNode> {
        let mut visited = HashSet::new();
        self.roots()
            .into_iter()
            .filter_map(|root| self.node(root, &mut visited))
            .collect()
    }

    fn node(&self, entity: &Entity, visited: &mut HashSet<i64>) -> Option<HierarchyNode> {
        if !visited.insert(entity.handle) {
            return None;
        }
        let children = self
            .children_of(entity.handle)
            .into_iter()
            .filter_map(|child| self.node(child, visited))
            .collect();
        Some(HierarchyNode {
            handle: entity.handle,
            name: entity.name.clone(),
            active: entity.active,
            children,
        })
    }

    fn write_node(&self, out: &mut String, node: &HierarchyNode, depth: usize) {
        let behaviors = self
            .entity(node.handle)
            .map(|e| {
                e.behaviors
                    .iter()
                    .map(|b| b.type_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let _ = write!(out, "{}- {} (&{})", "  ".repeat(depth), node.name, node.handle);
        if !node.active {
            out.push_str(" [inactive]");
        }
        if !behaviors.is_empty() {
            let _ = write!(out, " [{behaviors}]");
        }
        out.push('\n');
        for child in &node.children {
            self.write_node(out, child, depth + 1);
        }
    }
}
