//! Commands and their single-line wire format
//!
//! `verb|arg1|arg2` with no trailing newline. The vocabulary never puts the
//! delimiter inside an argument; [`Command::validate`] enforces that before
//! anything is written.

use crate::error::{ChannelError, ChannelResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Argument delimiter
pub const DELIMITER: char = '|';

/// Verbs understood by the editor-side hooks
pub mod verbs {
    /// Create an empty or primitive object: `name [primitive]`
    pub const CREATE_GAMEOBJECT: &str = "create_gameobject";
    /// Delete an object by name: `name`
    pub const DELETE_GAMEOBJECT: &str = "delete_gameobject";
    /// Set local position, optionally rotation and scale
    pub const SET_TRANSFORM: &str = "set_transform";
    /// Add a component by type name: `name type`
    pub const ADD_COMPONENT: &str = "add_component";
    /// Dump the live hierarchy
    pub const GET_HIERARCHY: &str = "get_hierarchy";
    /// Names of the selected objects
    pub const GET_SELECTION: &str = "get_selection";
    /// Enter play mode
    pub const PLAY: &str = "play";
    /// Leave play mode
    pub const STOP: &str = "stop";
    /// Reimport and recompile
    pub const REFRESH: &str = "refresh";
    /// Invoke a menu item by path: `menu path`
    pub const EXECUTE_MENU: &str = "execute_menu";
}

/// Command verb plus ordered arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    verb: String,
    args: Vec<String>,
}

impl Command {
    /// Create command without arguments
    #[inline]
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command verb
    #[inline]
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Command arguments
    #[inline]
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Check the command can be written as one unambiguous line
    ///
    /// # Errors
    /// - `ChannelError::EmptyVerb` for a blank verb
    /// - `ChannelError::InvalidVerb` if the verb contains the delimiter or a
    ///   line break
    /// - `ChannelError::InvalidArgument` for the first such argument
    pub fn validate(&self) -> ChannelResult<()> {
        if self.verb.trim().is_empty() {
            return Err(ChannelError::EmptyVerb);
        }
        let bad = |s: &str| s.contains([DELIMITER, '\n', '\r']);
        if bad(&self.verb) {
            return Err(ChannelError::InvalidVerb {
                verb: self.verb.clone(),
            });
        }
        if let Some((index, argument)) = self.args.iter().enumerate().find(|(_, a)| bad(a)) {
            return Err(ChannelError::InvalidArgument {
                verb: self.verb.clone(),
                index,
                argument: argument.clone(),
            });
        }
        Ok(())
    }

    /// Wire line: `verb` or `verb|arg|...`
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut line = self.verb.clone();
        for arg in &self.args {
            line.push(DELIMITER);
            line.push_str(arg);
        }
        line
    }

    /// Parse a wire line back into a command
    ///
    /// Trailing line breaks are ignored. Returns `None` for a blank line.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let mut parts = line.split(DELIMITER);
        let verb = parts.next()?.to_string();
        Some(Self {
            verb,
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Typed constructors for the known vocabulary
impl Command {
    /// `create_gameobject|name[|primitive]`
    #[must_use]
    pub fn create_gameobject(name: &str, primitive: Option<&str>) -> Self {
        let cmd = Self::new(verbs::CREATE_GAMEOBJECT).arg(name);
        match primitive {
            Some(p) => cmd.arg(p),
            None => cmd,
        }
    }

    /// `delete_gameobject|name`
    #[must_use]
    pub fn delete_gameobject(name: &str) -> Self {
        Self::new(verbs::DELETE_GAMEOBJECT).arg(name)
    }

    /// `set_transform|name|px|py|pz[|rx|ry|rz[|sx|sy|sz]]`
    ///
    /// A scale without a rotation is sent with a zero rotation so argument
    /// positions stay fixed.
    #[must_use]
    pub fn set_transform(
        name: &str,
        position: [f64; 3],
        rotation: Option<[f64; 3]>,
        scale: Option<[f64; 3]>,
    ) -> Self {
        let mut cmd = Self::new(verbs::SET_TRANSFORM)
            .arg(name)
            .args(position.iter().map(f64::to_string));
        if rotation.is_some() || scale.is_some() {
            cmd = cmd.args(rotation.unwrap_or([0.0; 3]).iter().map(f64::to_string));
        }
        if let Some(scale) = scale {
            cmd = cmd.args(scale.iter().map(f64::to_string));
        }
        cmd
    }

    /// `add_component|name|type`
    #[must_use]
    pub fn add_component(name: &str, component: &str) -> Self {
        Self::new(verbs::ADD_COMPONENT).arg(name).arg(component)
    }

    /// `execute_menu|path`
    #[must_use]
    pub fn execute_menu(path: &str) -> Self {
        Self::new(verbs::EXECUTE_MENU).arg(path)
    }
}
