//! Command channel to a running editor
//!
//! The editor cannot be called directly. Its automation hooks poll a shared
//! directory for a command file and answer with a result file; this crate is
//! the other end of that mailbox.
//!
//! # Round trip
//!
//! ```text
//! Command → validate → delete stale result → write command.txt
//!         → poll result.txt (check, sleep, … ×N) → claim + delete → decode
//!         → Success(payload) | Failure(sentinel) | Timeout
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use bridge_channel::{ChannelConfig, Command, FileChannel};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = FileChannel::new(ChannelConfig::new("MyGame/Temp/UnityBridge"));
//! let outcome = channel.send(&Command::create_gameobject("Crate", Some("Cube"))).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod channel;
pub mod command;
pub mod error;
pub mod outcome;
pub mod sentinel;

pub use channel::{ChannelConfig, CommandTransport, FileChannel, COMMAND_FILE, RESULT_FILE};
pub use command::{verbs, Command, DELIMITER};
pub use error::{ChannelError, ChannelResult};
pub use outcome::{decode_result, CommandOutcome, Payload};
pub use sentinel::{default_sentinels, Sentinel, SentinelTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
