//! Runtime configuration.
//!
//! Settings are read from `<config dir>/terminal-ai/config.json` when present
//! and then patched from `TERMINAL_AI_*` environment variables. Every field has
//! a default, so a missing file (or a partial one) is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a session and its responder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub router: RouterConfig,
    pub responder: ResponderConfig,
}

/// How the child shell is spawned, drained and torn down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell binary, spawned without arguments.
    pub program: String,
    /// Size of a single read from the child's output pipe.
    pub read_chunk_size: usize,
    /// How long `stop` waits after each escalation step (EOF, SIGTERM).
    pub stop_grace_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "/bin/bash".to_string(),
            read_chunk_size: 256,
            stop_grace_ms: 500,
        }
    }
}

impl ShellConfig {
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

/// Routing between the shell and the responder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Inputs starting with this token go to the responder. Empty disables it.
    pub marker: String,
    /// Prefix put in front of every responder reply.
    pub reply_tag: String,
    /// Upper bound on a single responder call.
    pub responder_timeout_ms: u64,
    /// Ask the responder about the last input when the shell's output pipe
    /// fails with a hard I/O error.
    pub degraded_fallback: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            marker: "/help".to_string(),
            reply_tag: "AI: ".to_string(),
            responder_timeout_ms: 30_000,
            degraded_fallback: true,
        }
    }
}

impl RouterConfig {
    pub fn responder_timeout(&self) -> Duration {
        Duration::from_millis(self.responder_timeout_ms)
    }
}

/// Connection settings for the OpenAI-compatible responder backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        // Local Ollama server; the key is required by the client but unused.
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: "ollama".to_string(),
            model: "deepseek-coder:6.7b".to_string(),
            temperature: 0.0,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Patch settings from `TERMINAL_AI_*` variables resolved through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(program) = lookup("TERMINAL_AI_SHELL") {
            self.shell.program = program;
        }
        if let Some(marker) = lookup("TERMINAL_AI_MARKER") {
            self.router.marker = marker;
        }
        if let Some(base_url) = lookup("TERMINAL_AI_BASE_URL") {
            self.responder.base_url = base_url;
        }
        if let Some(api_key) = lookup("TERMINAL_AI_API_KEY") {
            self.responder.api_key = api_key;
        }
        if let Some(model) = lookup("TERMINAL_AI_MODEL") {
            self.responder.model = model;
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("terminal-ai").join("config.json"))
}
