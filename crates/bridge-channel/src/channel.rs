//! File mailbox shared with the editor
//!
//! One command file and one result file in a shared directory. The editor
//! polls for the command; we poll for the result.
//!
//! # Ordering
//!
//! 1. Delete any stale result *before* writing the command
//! 2. Write the command (temp file + rename)
//! 3. Poll: check, then sleep, up to the ceiling
//! 4. Claim the result by renaming it, read it, delete it
//!
//! The editor is expected to write the result with a temp file and rename.
//! For writers that do not, a result is only claimed once it is non-empty
//! and its size holds steady across a short settle window; an editor that
//! answers with an empty file is treated as not having answered.
//!
//! Only one command may be outstanding per directory. A second concurrent
//! sender can consume the other's result; there is no correlation id in the
//! wire format to prevent that.

use crate::command::Command;
use crate::error::{ChannelError, ChannelResult};
use crate::outcome::{decode_result, CommandOutcome};
use crate::sentinel::{default_sentinels, SentinelTable};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default command file name
pub const COMMAND_FILE: &str = "command.txt";
/// Default result file name
pub const RESULT_FILE: &str = "result.txt";

/// Wait between the two size checks taken before a claim
const SETTLE: Duration = Duration::from_millis(10);

/// Anything that can carry a command to the editor and bring back an outcome
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Issue one command and wait for its outcome
    ///
    /// # Errors
    /// Invalid commands and IO failures. Editor-side failure and timeout are
    /// outcomes, not errors.
    async fn send(&self, command: &Command) -> ChannelResult<CommandOutcome>;
}

/// Channel location and polling cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Shared directory
    pub dir: PathBuf,
    /// Command file name inside `dir`
    pub command_file: String,
    /// Result file name inside `dir`
    pub result_file: String,
    /// Sleep between result checks
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    /// Number of sleeps before declaring a timeout
    pub max_attempts: u32,
}

impl ChannelConfig {
    /// Default cadence (500 ms × 10) in `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// With poll interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// With maximum attempts
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Full path of the command artifact
    #[must_use]
    pub fn command_path(&self) -> PathBuf {
        self.dir.join(&self.command_file)
    }

    /// Full path of the result artifact
    #[must_use]
    pub fn result_path(&self) -> PathBuf {
        self.dir.join(&self.result_file)
    }

    /// Minimum time spent polling before a timeout
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Temp/UnityBridge"),
            command_file: COMMAND_FILE.to_string(),
            result_file: RESULT_FILE.to_string(),
            poll_interval: Duration::from_millis(500),
            max_attempts: 10,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let ms = d.as_millis() as u64;
        s.serialize_u64(ms)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Filesystem-backed command channel
#[derive(Debug, Clone)]
pub struct FileChannel {
    config: ChannelConfig,
    sentinels: SentinelTable,
}

impl FileChannel {
    /// Create channel with the default sentinel table
    #[inline]
    #[must_use]
    pub fn new(config: ChannelConfig) -> Self {
        Self::with_sentinels(config, default_sentinels())
    }

    /// Create channel with a custom sentinel table
    #[inline]
    #[must_use]
    pub fn with_sentinels(config: ChannelConfig, sentinels: SentinelTable) -> Self {
        Self { config, sentinels }
    }

    /// Channel configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Issue a command and wait for its outcome
    ///
    /// # Errors
    /// - `ChannelError::EmptyVerb` / `InvalidVerb` / `InvalidArgument` before any file is touched
    /// - `ChannelError::Io` if the directory, stale-result delete, command
    ///   write or result read fails
    pub async fn send(&self, command: &Command) -> ChannelResult<CommandOutcome> {
        command.validate()?;
        let dir = &self.config.dir;
        let command_path = self.config.command_path();
        let result_path = self.config.result_path();

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ChannelError::io_error("create channel dir", dir, e))?;

        remove_if_present(&result_path)
            .await
            .map_err(|e| ChannelError::io_error("delete stale result", &result_path, e))?;

        write_atomically(&command_path, &command.to_line()).await?;
        tracing::info!(command = %command, dir = %dir.display(), "command issued");

        let started = Instant::now();
        let mut attempts = 0u32;
        loop {
            if let Some(raw) = self.claim_result(&result_path).await? {
                let outcome = decode_result(command.verb(), &raw, &self.sentinels);
                tracing::info!(
                    verb = command.verb(),
                    attempts,
                    success = outcome.is_success(),
                    "command answered"
                );
                return Ok(outcome);
            }
            if attempts >= self.config.max_attempts {
                break;
            }
            attempts += 1;
            tracing::debug!(verb = command.verb(), attempt = attempts, "waiting for result");
            tokio::time::sleep(self.config.poll_interval).await;
        }

        let waited = started.elapsed();
        tracing::warn!(
            verb = command.verb(),
            attempts,
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "command timed out"
        );
        Ok(CommandOutcome::Timeout { attempts, waited })
    }

    /// Take ownership of the result file if it exists
    ///
    /// The rename is the claim: once it succeeds no other poll can see the
    /// file under its well-known name. Empty or still-growing files are left
    /// for the next poll.
    async fn claim_result(&self, result_path: &Path) -> ChannelResult<Option<String>> {
        let Some(size) = result_size(result_path).await? else {
            return Ok(None);
        };
        if size == 0 {
            return Ok(None);
        }
        tokio::time::sleep(SETTLE).await;
        if result_size(result_path).await? != Some(size) {
            tracing::debug!(path = %result_path.display(), "result still being written");
            return Ok(None);
        }

        let claimed = claimed_path(result_path);
        match tokio::fs::rename(result_path, &claimed).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ChannelError::io_error("claim result", result_path, e)),
        }

        let bytes = tokio::fs::read(&claimed)
            .await
            .map_err(|e| ChannelError::io_error("read result", &claimed, e))?;
        if let Err(e) = tokio::fs::remove_file(&claimed).await {
            tracing::warn!(path = %claimed.display(), error = %e, "could not delete claimed result");
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[async_trait]
impl CommandTransport for FileChannel {
    async fn send(&self, command: &Command) -> ChannelResult<CommandOutcome> {
        FileChannel::send(self, command).await
    }
}

fn claimed_path(result_path: &Path) -> PathBuf {
    let mut name = result_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".claimed-{}", std::process::id()));
    result_path.with_file_name(name)
}

async fn result_size(path: &Path) -> ChannelResult<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ChannelError::io_error("stat result", path, e)),
    }
}

async fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Write via a sibling temp file so the editor never reads a partial line
async fn write_atomically(path: &Path, contents: &str) -> ChannelResult<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| ChannelError::io_error("write command", &tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| ChannelError::io_error("publish command", path, e))
}
