//! Tool surface
//!
//! Every bridge capability is reachable as a named tool taking a JSON
//! argument object. [`Bridge::handle`] turns any request into a
//! [`ToolResponse`]; errors and editor outcomes are folded into its status
//! rather than escaping to the caller.

use crate::authoring;
use crate::config::BridgeConfig;
use crate::context::ProjectContext;
use crate::error::{BridgeError, BridgeResult};
use crate::project;
use bridge_channel::{Command, CommandOutcome, CommandTransport, FileChannel, Payload};
use bridge_scene::{SceneGraph, SceneParser};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Raw request as it arrives on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    /// Echoed back in the response
    #[serde(default)]
    pub id: Option<Value>,
    /// Tool name
    pub tool: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Decode into a typed request
    ///
    /// # Errors
    /// `BridgeError::InvalidArgument` for unknown tools or bad arguments.
    pub fn into_request(self) -> BridgeResult<ToolRequest> {
        let mut object = self.arguments;
        object.insert("tool".to_string(), Value::String(self.tool));
        serde_json::from_value(Value::Object(object))
            .map_err(|e| BridgeError::InvalidArgument(e.to_string()))
    }
}

/// How `inspect_scene` renders a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneFormat {
    /// Full entity graph as JSON
    #[default]
    Graph,
    /// Indented text outline
    Outline,
    /// Counts and root names
    Summary,
}

/// Typed tool request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolRequest {
    /// Root, name and editor version
    ProjectInfo,
    /// Scene documents under `Assets/`
    ListScenes,
    /// Scripts under `Assets/`
    ListScripts,
    /// Read one script
    ReadScript {
        /// Project-relative path
        path: String,
    },
    /// Create a script from the `MonoBehaviour` template
    CreateScript {
        /// Class name, sanitized before use
        name: String,
        /// Folder under `Assets/`
        #[serde(default)]
        folder: Option<String>,
    },
    /// Make the editor reimport assets
    ForceRefresh {
        /// Recorded in the trigger file
        #[serde(default = "default_reason")]
        reason: String,
    },
    /// Parse a scene document
    InspectScene {
        /// Project-relative path
        path: String,
        /// Rendering
        #[serde(default)]
        format: SceneFormat,
    },
    /// Entities with a given name in a scene document
    FindEntities {
        /// Project-relative path
        path: String,
        /// Exact entity name
        name: String,
    },
    /// Arbitrary channel command
    SendCommand {
        /// Verb
        verb: String,
        /// Positional arguments
        #[serde(default)]
        args: Vec<String>,
    },
    /// Spawn an object in the open scene
    CreateGameobject {
        /// Object name
        name: String,
        /// Primitive shape, if any
        #[serde(default)]
        primitive: Option<String>,
    },
    /// Remove an object from the open scene
    DeleteGameobject {
        /// Object name
        name: String,
    },
    /// Move, rotate or scale an object
    SetTransform {
        /// Object name
        name: String,
        /// Local position
        position: [f64; 3],
        /// Euler rotation
        #[serde(default)]
        rotation: Option<[f64; 3]>,
        /// Local scale
        #[serde(default)]
        scale: Option<[f64; 3]>,
    },
    /// Attach a component by type name
    AddComponent {
        /// Object name
        name: String,
        /// Component type
        component: String,
    },
    /// Live hierarchy of the open scene
    GetHierarchy,
    /// Enter play mode
    Play,
    /// Leave play mode
    Stop,
}

fn default_reason() -> String {
    "Manual refresh".to_string()
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Request completed
    Success,
    /// Request understood but refused, or the editor reported failure
    Failure,
    /// Editor did not answer in time
    Timeout,
    /// Environment failure (IO, configuration)
    Error,
}

/// Structured response for every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    /// Request id, when the call carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Outcome class
    pub status: ResponseStatus,
    /// Human-readable summary
    pub message: String,
    /// Tool-specific payload
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl ToolResponse {
    /// Successful response
    #[must_use]
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            id: None,
            status: ResponseStatus::Success,
            message: message.into(),
            data,
        }
    }

    /// Failure response without data
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            id: None,
            status: ResponseStatus::Failure,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Map an error; caller mistakes are failures, the rest are errors
    #[must_use]
    pub fn from_error(error: &BridgeError) -> Self {
        let status = if error.is_caller_error() {
            ResponseStatus::Failure
        } else {
            ResponseStatus::Error
        };
        Self {
            id: None,
            status,
            message: error.to_string(),
            data: Value::Null,
        }
    }

    /// Map an editor outcome
    #[must_use]
    pub fn from_outcome(verb: &str, outcome: CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Success { payload } => {
                let data = match payload {
                    Payload::Json(value) => value,
                    Payload::Text(text) => Value::String(text),
                };
                Self::success(format!("{verb} completed"), data)
            }
            CommandOutcome::Failure { reason } => Self::failure(reason),
            CommandOutcome::Timeout { attempts, waited } => {
                let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
                Self {
                    id: None,
                    status: ResponseStatus::Timeout,
                    message: format!(
                        "no response from editor for {verb} after {waited_ms} ms; is the editor running?"
                    ),
                    data: json!({ "attempts": attempts, "waited_ms": waited_ms }),
                }
            }
        }
    }

    /// Attach a request id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }

    /// True for [`ResponseStatus::Success`]
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Bridge to one project and its editor
pub struct Bridge {
    context: ProjectContext,
    config: BridgeConfig,
    transport: Arc<dyn CommandTransport>,
    parser: SceneParser,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("context", &self.context)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Bridge talking to the editor through the configured channel directory
    #[must_use]
    pub fn new(context: ProjectContext, config: BridgeConfig) -> Self {
        let channel = FileChannel::new(config.channel_config(&context));
        Self {
            context,
            config,
            transport: Arc::new(channel),
            parser: SceneParser::new(),
        }
    }

    /// Replace the transport
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn CommandTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Project context
    #[inline]
    #[must_use]
    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Decode and handle a wire call; the id is echoed
    pub async fn handle_call(&self, call: ToolCall) -> ToolResponse {
        let id = call.id.clone();
        let response = match call.into_request() {
            Ok(request) => self.handle(request).await,
            Err(e) => ToolResponse::from_error(&e),
        };
        response.with_id(id)
    }

    /// Handle a request; never fails
    pub async fn handle(&self, request: ToolRequest) -> ToolResponse {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "tool request failed");
                ToolResponse::from_error(&e)
            }
        }
    }

    /// Handle a request, propagating errors
    ///
    /// # Errors
    /// Whatever the underlying operation reports.
    pub async fn dispatch(&self, request: ToolRequest) -> BridgeResult<ToolResponse> {
        let ctx = &self.context;
        match request {
            ToolRequest::ProjectInfo => {
                let info = project::project_info(ctx);
                Ok(ToolResponse::success(
                    format!("{} ({})", info.project_name, info.unity_version),
                    serde_json::to_value(info)?,
                ))
            }
            ToolRequest::ListScenes => {
                let scenes = project::list_scenes(ctx);
                Ok(ToolResponse::success(
                    format!("found {} scenes", scenes.len()),
                    serde_json::to_value(scenes)?,
                ))
            }
            ToolRequest::ListScripts => {
                let scripts = project::list_scripts(ctx);
                Ok(ToolResponse::success(
                    format!("found {} scripts", scripts.len()),
                    serde_json::to_value(scripts)?,
                ))
            }
            ToolRequest::ReadScript { path } => {
                let source = project::read_script(ctx, &path).await?;
                Ok(ToolResponse::success(path, Value::String(source)))
            }
            ToolRequest::CreateScript { name, folder } => {
                let folder = folder.as_deref().unwrap_or(&self.config.script_folder);
                let report =
                    authoring::create_script(ctx, &name, folder, self.config.refresh_settle())
                        .await?;
                Ok(ToolResponse::success(
                    format!("created {}", report.script_path),
                    serde_json::to_value(report)?,
                ))
            }
            ToolRequest::ForceRefresh { reason } => {
                let report =
                    authoring::force_refresh(ctx, &reason, self.config.refresh_settle()).await?;
                Ok(ToolResponse::success(
                    "refresh forced",
                    serde_json::to_value(report)?,
                ))
            }
            ToolRequest::InspectScene { path, format } => {
                let graph = self.load_scene(&path).await?;
                inspect(&path, &graph, format)
            }
            ToolRequest::FindEntities { path, name } => {
                let graph = self.load_scene(&path).await?;
                let found = graph.find_by_name(&name);
                Ok(ToolResponse::success(
                    format!("found {} entities named {name}", found.len()),
                    serde_json::to_value(found)?,
                ))
            }
            ToolRequest::SendCommand { verb, args } => {
                self.run(Command::new(verb).args(args)).await
            }
            ToolRequest::CreateGameobject { name, primitive } => {
                self.run(Command::create_gameobject(&name, primitive.as_deref()))
                    .await
            }
            ToolRequest::DeleteGameobject { name } => {
                self.run(Command::delete_gameobject(&name)).await
            }
            ToolRequest::SetTransform {
                name,
                position,
                rotation,
                scale,
            } => {
                self.run(Command::set_transform(&name, position, rotation, scale))
                    .await
            }
            ToolRequest::AddComponent { name, component } => {
                self.run(Command::add_component(&name, &component)).await
            }
            ToolRequest::GetHierarchy => {
                self.run(Command::new(bridge_channel::verbs::GET_HIERARCHY))
                    .await
            }
            ToolRequest::Play => self.run(Command::new(bridge_channel::verbs::PLAY)).await,
            ToolRequest::Stop => self.run(Command::new(bridge_channel::verbs::STOP)).await,
        }
    }

    /// Send one command through the transport
    ///
    /// # Errors
    /// `BridgeError::Channel` for invalid commands or IO failures.
    pub async fn send(&self, command: &Command) -> BridgeResult<CommandOutcome> {
        tracing::debug!(command = %command, "sending command");
        let outcome = self.transport.send(command).await?;
        tracing::debug!(verb = command.verb(), success = outcome.is_success(), "command finished");
        Ok(outcome)
    }

    /// Load and parse a scene document by project-relative path
    ///
    /// # Errors
    /// - `BridgeError::InvalidArgument` for escaping paths or non-scene files
    /// - `BridgeError::NotFound` if the document does not exist
    /// - `BridgeError::Scene` if it cannot be read
    pub async fn load_scene(&self, relative: &str) -> BridgeResult<SceneGraph> {
        let path = self.context.resolve(relative)?;
        if !self.parser.can_parse(&path) {
            return Err(BridgeError::InvalidArgument(format!(
                "not a scene document: {relative}"
            )));
        }
        if !path.is_file() {
            return Err(BridgeError::NotFound {
                kind: "Scene",
                path: relative.to_string(),
            });
        }
        Ok(self.parser.parse_file(&path).await?)
    }

    async fn run(&self, command: Command) -> BridgeResult<ToolResponse> {
        let outcome = self.send(&command).await?;
        Ok(ToolResponse::from_outcome(command.verb(), outcome))
    }
}

fn inspect(path: &str, graph: &SceneGraph, format: SceneFormat) -> BridgeResult<ToolResponse> {
    let counts = graph.counts;
    let message = format!(
        "{path}: {} entities, {} transforms, {} behaviors, {} skipped",
        counts.entities, counts.transforms, counts.behaviors, counts.skipped
    );
    let data = match format {
        SceneFormat::Graph => serde_json::to_value(graph)?,
        SceneFormat::Outline => Value::String(graph.outline()),
        SceneFormat::Summary => json!({
            "counts": counts,
            "roots": graph.roots().iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        }),
    };
    Ok(ToolResponse::success(message, data))
}
