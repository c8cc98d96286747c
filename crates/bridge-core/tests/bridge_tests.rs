//! End-to-end tool handling against a temporary project

use async_trait::async_trait;
use bridge_channel::{ChannelResult, Command, CommandOutcome, CommandTransport, Payload, COMMAND_FILE, RESULT_FILE};
use bridge_core::{Bridge, BridgeConfig, ProjectContext, ResponseStatus, ToolCall, ToolRequest};
use bridge_test_utils::{EditorStub, TempProject, SAMPLE_SCENE};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records commands and answers every one with a fixed outcome
struct RecordingTransport {
    sent: Mutex<Vec<String>>,
    reply: CommandOutcome,
}

impl RecordingTransport {
    fn new(reply: CommandOutcome) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandTransport for RecordingTransport {
    async fn send(&self, command: &Command) -> ChannelResult<CommandOutcome> {
        command.validate()?;
        self.sent.lock().unwrap().push(command.to_line());
        Ok(self.reply.clone())
    }
}

fn setup() -> (TempProject, Bridge) {
    let project = TempProject::new("2022.3.21f1").unwrap();
    project.write("Assets/Scenes/Sample.unity", SAMPLE_SCENE).unwrap();
    project.write("Assets/Scripts/Player.cs", "public class Player {}").unwrap();
    let context = ProjectContext::open(project.root()).unwrap();
    let config = BridgeConfig::new()
        .with_poll_interval_ms(20)
        .with_refresh_settle_ms(5);
    let bridge = Bridge::new(context, config);
    (project, bridge)
}

fn tool(value: serde_json::Value) -> ToolRequest {
    serde_json::from_value::<ToolCall>(value).unwrap().into_request().unwrap()
}

#[tokio::test]
async fn test_project_info_and_listings() {
    let (_project, bridge) = setup();

    let info = bridge.handle(ToolRequest::ProjectInfo).await;
    assert_eq!(info.status, ResponseStatus::Success);
    assert_eq!(info.data["unity_version"], "2022.3.21f1");

    let scenes = bridge.handle(ToolRequest::ListScenes).await;
    assert_eq!(scenes.data[0]["path"], "Assets/Scenes/Sample.unity");
    assert_eq!(scenes.data[0]["name"], "Sample");

    let scripts = bridge.handle(ToolRequest::ListScripts).await;
    assert_eq!(scripts.data[0]["folder"], "Scripts");
}

#[tokio::test]
async fn test_read_missing_script_is_failure() {
    let (_project, bridge) = setup();
    let response = bridge
        .handle(tool(json!({"tool": "read_script", "arguments": {"path": "Assets/Scripts/Ghost.cs"}})))
        .await;
    assert_eq!(response.status, ResponseStatus::Failure);
    assert_eq!(response.message, "Script not found: Assets/Scripts/Ghost.cs");
}

#[tokio::test]
async fn test_create_script_then_list() {
    let (project, bridge) = setup();
    let response = bridge
        .handle(tool(json!({"tool": "create_script", "arguments": {"name": "Door Opener"}})))
        .await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.data["script_path"], "Assets/Scripts/DoorOpener.cs");
    assert_eq!(response.data["auto_refresh"], "forced");
    assert!(project.root().join("Assets/Scripts/DoorOpener.cs").is_file());

    let again = bridge
        .handle(tool(json!({"tool": "create_script", "arguments": {"name": "DoorOpener"}})))
        .await;
    assert_eq!(again.status, ResponseStatus::Failure);
    assert_eq!(again.message, "Script already exists: Assets/Scripts/DoorOpener.cs");
}

#[tokio::test]
async fn test_inspect_scene_formats() {
    let (_project, bridge) = setup();

    let summary = bridge
        .handle(tool(json!({"tool": "inspect_scene", "arguments": {"path": "Assets/Scenes/Sample.unity", "format": "summary"}})))
        .await;
    assert_eq!(summary.status, ResponseStatus::Success);
    assert_eq!(summary.data["counts"]["entities"], 5);
    assert_eq!(summary.data["roots"], json!(["Main Camera", "Player", "Enemy", "Enemy"]));

    let outline = bridge
        .handle(tool(json!({"tool": "inspect_scene", "arguments": {"path": "Assets/Scenes/Sample.unity", "format": "outline"}})))
        .await;
    let text = outline.data.as_str().unwrap();
    assert!(text.contains("  - Weapon (&300) [inactive] [MeshRenderer]"));

    let graph = bridge
        .handle(tool(json!({"tool": "inspect_scene", "arguments": {"path": "Assets/Scenes/Sample.unity"}})))
        .await;
    assert_eq!(graph.data["entities"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_inspect_rejects_bad_paths() {
    let (_project, bridge) = setup();

    let missing = bridge
        .handle(tool(json!({"tool": "inspect_scene", "arguments": {"path": "Assets/Scenes/Nope.unity"}})))
        .await;
    assert_eq!(missing.status, ResponseStatus::Failure);
    assert_eq!(missing.message, "Scene not found: Assets/Scenes/Nope.unity");

    let wrong_kind = bridge
        .handle(tool(json!({"tool": "inspect_scene", "arguments": {"path": "Assets/Scripts/Player.cs"}})))
        .await;
    assert_eq!(wrong_kind.status, ResponseStatus::Failure);
}

#[tokio::test]
async fn test_find_entities_keeps_duplicates() {
    let (_project, bridge) = setup();
    let response = bridge
        .handle(tool(json!({"tool": "find_entities", "arguments": {"path": "Assets/Scenes/Sample.unity", "name": "Enemy"}})))
        .await;
    let handles: Vec<_> = response
        .data
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["handle"].as_i64().unwrap())
        .collect();
    assert_eq!(handles, [400, 401]);
}

#[tokio::test]
async fn test_typed_commands_reach_transport() {
    let (_project, bridge) = setup();
    let transport = RecordingTransport::new(CommandOutcome::Success {
        payload: Payload::Text("OK".to_string()),
    });
    let bridge = bridge.with_transport(transport.clone());

    let response = bridge
        .handle(tool(json!({"tool": "set_transform", "arguments": {"name": "Cube", "position": [1, 2, 3], "scale": [2, 2, 2]}})))
        .await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.data, json!("OK"));
    bridge.handle(ToolRequest::Play).await;

    assert_eq!(
        transport.sent(),
        ["set_transform|Cube|1|2|3|0|0|0|2|2|2", "play"]
    );
}

#[tokio::test]
async fn test_invalid_command_argument_is_failure() {
    let (_project, bridge) = setup();
    let transport = RecordingTransport::new(CommandOutcome::Failure {
        reason: "Failed".to_string(),
    });
    let bridge = bridge.with_transport(transport.clone());

    let response = bridge
        .handle(tool(json!({"tool": "create_gameobject", "arguments": {"name": "a|b"}})))
        .await;
    assert_eq!(response.status, ResponseStatus::Failure);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_file_channel_round_trip_through_bridge() {
    let (project, bridge) = setup();
    let channel_dir = project.root().join("Temp/UnityBridge");
    std::fs::create_dir_all(&channel_dir).unwrap();
    let editor = EditorStub::spawn(
        channel_dir.join(COMMAND_FILE),
        channel_dir.join(RESULT_FILE),
        |line| match line {
            "get_hierarchy" => Some(r#"{"roots":["Main Camera"]}"#.to_string()),
            _ => Some("GameObject not found".to_string()),
        },
    );

    let hierarchy = bridge.handle(ToolRequest::GetHierarchy).await;
    assert_eq!(hierarchy.status, ResponseStatus::Success);
    assert_eq!(hierarchy.data, json!({"roots": ["Main Camera"]}));

    let delete = bridge
        .handle(tool(json!({"tool": "delete_gameobject", "arguments": {"name": "Ghost"}})))
        .await;
    assert_eq!(delete.status, ResponseStatus::Failure);
    assert_eq!(delete.message, "GameObject not found");

    assert_eq!(editor.received(), ["get_hierarchy", "delete_gameobject|Ghost"]);
}

#[tokio::test]
async fn test_no_editor_times_out() {
    let (_project, bridge) = setup();
    let response = bridge.handle(ToolRequest::Stop).await;
    assert_eq!(response.status, ResponseStatus::Timeout);
    assert_eq!(response.data["attempts"], 10);
    assert!(response.data["waited_ms"].as_u64().unwrap() >= 200);
}

#[tokio::test]
async fn test_handle_call_echoes_id() {
    let (_project, bridge) = setup();
    let call: ToolCall = serde_json::from_value(json!({"id": 7, "tool": "warp_drive"})).unwrap();
    let response = bridge.handle_call(call).await;
    assert_eq!(response.id, Some(json!(7)));
    assert_eq!(response.status, ResponseStatus::Failure);
}
