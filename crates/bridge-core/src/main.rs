use anyhow::Context as _;
use bridge_core::{
    Bridge, BridgeConfig, ProjectContext, SceneFormat, ToolCall, ToolRequest, ToolResponse,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "UNITY_BRIDGE_LOG";

fn cli() -> Command {
    Command::new("unity-bridge")
        .version(bridge_core::VERSION)
        .about("Inspect a Unity project and drive a running editor")
        .subcommand_required(true)
        .arg(
            Arg::new("project")
                .long("project")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Project root, or any directory inside it (default: current directory)"),
        )
        .arg(
            Arg::new("channel-dir")
                .long("channel-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Command channel directory"),
        )
        .arg(
            Arg::new("poll-interval-ms")
                .long("poll-interval-ms")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Sleep between result checks"),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .global(true)
                .value_parser(value_parser!(u32))
                .help("Result checks before timing out"),
        )
        .subcommand(Command::new("info").about("Show project root, name and editor version"))
        .subcommand(Command::new("scenes").about("List scene documents"))
        .subcommand(Command::new("scripts").about("List scripts"))
        .subcommand(
            Command::new("read-script")
                .about("Print a script")
                .arg(Arg::new("path").required(true).help("Project-relative path")),
        )
        .subcommand(
            Command::new("create-script")
                .about("Create a MonoBehaviour script and refresh the editor")
                .arg(Arg::new("name").required(true).help("Class name"))
                .arg(
                    Arg::new("folder")
                        .long("folder")
                        .help("Folder under Assets/"),
                ),
        )
        .subcommand(
            Command::new("refresh")
                .about("Force the editor to reimport assets")
                .arg(
                    Arg::new("reason")
                        .long("reason")
                        .default_value("Manual refresh"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Parse a scene document")
                .arg(Arg::new("path").required(true).help("Project-relative path"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("outline")
                        .value_parser(["graph", "outline", "summary"]),
                ),
        )
        .subcommand(
            Command::new("send")
                .about("Send a raw command to the editor")
                .arg(Arg::new("verb").required(true))
                .arg(Arg::new("args").num_args(0..).action(ArgAction::Append)),
        )
        .subcommand(
            Command::new("serve").about("Answer JSON-lines tool calls on stdin/stdout"),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_bridge(matches: &ArgMatches) -> anyhow::Result<Bridge> {
    let start = match matches.get_one::<PathBuf>("project") {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    let context = ProjectContext::discover(&start)?;
    let mut config = BridgeConfig::load(&context)?;
    if let Some(dir) = matches.get_one::<PathBuf>("channel-dir") {
        config = config.with_channel_dir(dir.clone());
    }
    if let Some(ms) = matches.get_one::<u64>("poll-interval-ms") {
        config = config.with_poll_interval_ms(*ms);
    }
    if let Some(attempts) = matches.get_one::<u32>("max-attempts") {
        config = config.with_max_attempts(*attempts);
    }
    tracing::debug!(root = %context.root().display(), "project opened");
    Ok(Bridge::new(context, config))
}

fn request_for(name: &str, args: &ArgMatches) -> Option<ToolRequest> {
    let string = |id: &str| args.get_one::<String>(id).cloned();
    let request = match name {
        "info" => ToolRequest::ProjectInfo,
        "scenes" => ToolRequest::ListScenes,
        "scripts" => ToolRequest::ListScripts,
        "read-script" => ToolRequest::ReadScript {
            path: string("path")?,
        },
        "create-script" => ToolRequest::CreateScript {
            name: string("name")?,
            folder: string("folder"),
        },
        "refresh" => ToolRequest::ForceRefresh {
            reason: string("reason")?,
        },
        "inspect" => ToolRequest::InspectScene {
            path: string("path")?,
            format: match string("format")?.as_str() {
                "graph" => SceneFormat::Graph,
                "summary" => SceneFormat::Summary,
                _ => SceneFormat::Outline,
            },
        },
        "send" => ToolRequest::SendCommand {
            verb: string("verb")?,
            args: args
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        },
        _ => return None,
    };
    Some(request)
}

fn print_response(response: &ToolResponse) -> anyhow::Result<()> {
    match &response.data {
        serde_json::Value::String(text) if response.is_success() => println!("{text}"),
        _ => println!("{}", serde_json::to_string_pretty(response)?),
    }
    Ok(())
}

async fn serve(bridge: &Bridge) -> anyhow::Result<()> {
    tracing::info!(server = bridge_core::SERVER_NAME, "serving tool calls on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<ToolCall>(&line) {
            Ok(call) => bridge.handle_call(call).await,
            Err(e) => ToolResponse::from_error(&bridge_core::BridgeError::InvalidArgument(
                format!("malformed request: {e}"),
            )),
        };
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }
    tracing::info!("stdin closed, exiting");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let matches = cli().get_matches();
    let leaf = matches.subcommand().map_or(&matches, |(_, args)| args);
    let bridge = open_bridge(leaf)?;

    match matches.subcommand() {
        Some(("serve", _)) => serve(&bridge).await,
        Some((name, args)) => {
            let request = request_for(name, args)
                .with_context(|| format!("unsupported subcommand: {name}"))?;
            let response = bridge.handle(request).await;
            print_response(&response)?;
            if !response.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        None => Ok(()),
    }
}
