//! Scene inspection for Unity projects
//!
//! Recovers a typed object graph from the editor's saved scene documents
//! without the editor running.
//!
//! # Pipeline
//!
//! ```text
//! text → split_segments → Block (classified) → Record (field rules) → SceneGraph (linked)
//! ```
//!
//! - **Segmentation**: split on `--- !u!<tag> &<handle>` markers
//! - **Classification**: tag and type label must agree ([`CLASSIFY_RULES`])
//! - **Extraction**: per-line `key:` matching driven by [`FIELD_RULES`]
//! - **Linking**: transforms and behaviors join their owning entity by handle
//!
//! # Example
//!
//! ```rust
//! use bridge_scene::SceneParser;
//!
//! let doc = "--- !u!1 &1\nGameObject:\n  m_Name: Light\n";
//! let graph = SceneParser::new().parse(doc);
//! assert_eq!(graph.entities[0].name, "Light");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod block;
pub mod document;
pub mod error;
pub mod graph;
pub mod parser;
pub mod records;
pub mod value;

pub use block::{Block, BlockKind, CLASSIFY_RULES};
pub use error::{SceneError, SceneResult};
pub use graph::{Entity, HierarchyNode, SceneCounts, SceneGraph};
pub use parser::SceneParser;
pub use records::{Behavior, BehaviorKind, Quat, Transform, Vec3, FIELD_RULES, UNNAMED_ENTITY};
pub use value::{FieldValue, ObjectRef, VectorParts};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
