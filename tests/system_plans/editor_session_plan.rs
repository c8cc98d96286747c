//! System plan: a scripted editing session.
//!
//! A client connected over the tool surface:
//! 1. asks what project it is looking at,
//! 2. adds a script and forces a reimport,
//! 3. inspects the main scene offline,
//! 4. drives the live editor to spawn and move an object.

use bridge_channel::{COMMAND_FILE, RESULT_FILE};
use bridge_core::{Bridge, BridgeConfig, ProjectContext, ResponseStatus, ToolCall};
use bridge_test_utils::{EditorStub, TempProject, SAMPLE_SCENE};
use serde_json::json;

async fn call(bridge: &Bridge, value: serde_json::Value) -> bridge_core::ToolResponse {
    let call: ToolCall = serde_json::from_value(value).unwrap();
    bridge.handle_call(call).await
}

#[tokio::test]
async fn test_scripted_session() {
    let project = TempProject::new("2021.3.5f1").unwrap();
    project.write("Assets/Scenes/Main.unity", SAMPLE_SCENE).unwrap();
    project
        .write("unity-bridge.toml", "poll_interval_ms = 20\nrefresh_settle_ms = 5\n")
        .unwrap();

    let context = ProjectContext::discover(project.root().join("Assets/Scenes")).unwrap();
    let config = BridgeConfig::load(&context).unwrap();
    let channel_dir = config.channel_config(&context).dir;
    std::fs::create_dir_all(&channel_dir).unwrap();
    let bridge = Bridge::new(context, config);

    let editor = EditorStub::spawn(
        channel_dir.join(COMMAND_FILE),
        channel_dir.join(RESULT_FILE),
        |line| Some(if line.starts_with("create_gameobject") { "Created" } else { "OK" }.to_string()),
    );

    let info = call(&bridge, json!({"id": 1, "tool": "project_info"})).await;
    assert_eq!(info.data["unity_version"], "2021.3.5f1");

    let script = call(&bridge, json!({"id": 2, "tool": "create_script", "arguments": {"name": "Spinner", "folder": "Gameplay"}})).await;
    assert_eq!(script.status, ResponseStatus::Success);
    assert_eq!(script.data["script_path"], "Assets/Gameplay/Spinner.cs");

    let scene = call(&bridge, json!({"id": 3, "tool": "inspect_scene", "arguments": {"path": "Assets/Scenes/Main.unity", "format": "summary"}})).await;
    assert_eq!(scene.data["counts"]["behaviors"], 4);

    let spawn = call(&bridge, json!({"id": 4, "tool": "create_gameobject", "arguments": {"name": "Spinner", "primitive": "Cube"}})).await;
    assert_eq!(spawn.status, ResponseStatus::Success);
    assert_eq!(spawn.data, json!("Created"));

    let moved = call(&bridge, json!({"id": 5, "tool": "set_transform", "arguments": {"name": "Spinner", "position": [0, 1.5, 0]}})).await;
    assert_eq!(moved.id, Some(json!(5)));
    assert_eq!(moved.status, ResponseStatus::Success);

    assert_eq!(
        editor.received(),
        ["create_gameobject|Spinner|Cube", "set_transform|Spinner|0|1.5|0"]
    );
}
