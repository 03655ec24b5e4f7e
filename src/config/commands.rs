//! Setup command configuration
//!
//! A `setup` entry is either one shell string or a table of named commands
//! that run in declaration order.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};

/// One configured command, before template expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Table key for named commands (`install` in `[setup] install = "..."`)
    pub name: Option<String>,
    /// Command template, may contain `{{ branch }}` and friends
    pub template: String,
}

impl Command {
    pub fn new(name: Option<String>, template: String) -> Self {
        Self { name, template }
    }
}

/// Configuration for commands - canonical representation
///
/// Deserializes from two TOML formats:
/// - Single string: `setup = "npm ci"`
/// - Named table: `[setup]` followed by `install = "npm ci"`
///
/// Named commands keep TOML insertion order (`preserve_order` on toml plus
/// IndexMap), so the file controls execution order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandConfig {
    commands: Vec<Command>,
}

impl CommandConfig {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'de> Deserialize<'de> for CommandConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum CommandConfigToml {
            Single(String),
            Named(IndexMap<String, String>),
        }

        let commands = match CommandConfigToml::deserialize(deserializer)? {
            CommandConfigToml::Single(cmd) => vec![Command::new(None, cmd)],
            CommandConfigToml::Named(map) => map
                .into_iter()
                .map(|(name, template)| Command::new(Some(name), template))
                .collect(),
        };
        Ok(CommandConfig { commands })
    }
}

impl Serialize for CommandConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if let [only] = self.commands.as_slice()
            && only.name.is_none()
        {
            return only.template.serialize(serializer);
        }

        let mut map = serializer.serialize_map(Some(self.commands.len()))?;
        for (i, cmd) in self.commands.iter().enumerate() {
            let key = cmd.name.clone().unwrap_or_else(|| (i + 1).to_string());
            map.serialize_entry(&key, &cmd.template)?;
        }
        map.end()
    }
}
