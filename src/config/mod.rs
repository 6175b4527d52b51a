use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::AnalysisSettings;
use crate::youtube::DEFAULT_MAX_COMMENTS;

pub const YOUTUBE_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Per-service configuration block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub base_url: Option<String>,
}

/// `[analysis]` block: model choice and collection defaults.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct AnalysisConfig {
    pub extraction_model: Option<String>,
    pub ideas_model: Option<String>,
    pub max_comments: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Top-level yca config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct YcaConfig {
    pub youtube: Option<ServiceConfig>,
    pub openai: Option<ServiceConfig>,
    pub analysis: Option<AnalysisConfig>,
}

impl YcaConfig {
    /// Load config from ~/.yca/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(YcaConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: YcaConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Get service config by name.
    pub fn service_config(&self, service: &str) -> Option<&ServiceConfig> {
        match service {
            "youtube" => self.youtube.as_ref(),
            "openai" => self.openai.as_ref(),
            _ => None,
        }
    }

    /// Model settings with config overrides applied over the defaults.
    pub fn analysis_settings(&self) -> AnalysisSettings {
        let mut settings = AnalysisSettings::default();
        if let Some(ref a) = self.analysis {
            if let Some(ref m) = a.extraction_model {
                settings.extraction_model = m.clone();
            }
            if let Some(ref m) = a.ideas_model {
                settings.ideas_model = m.clone();
            }
        }
        settings
    }

    pub fn default_max_comments(&self) -> usize {
        self.analysis
            .as_ref()
            .and_then(|a| a.max_comments)
            .unwrap_or(DEFAULT_MAX_COMMENTS)
    }

    /// Upstream request timeout; `None` means wait indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.analysis
            .as_ref()
            .and_then(|a| a.timeout_secs)
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }

    /// Display config with secrets redacted.
    pub fn display_redacted(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref yt) = self.youtube {
            lines.push("[youtube]".to_string());
            display_service_config(&mut lines, yt);
        }
        if let Some(ref oa) = self.openai {
            lines.push("[openai]".to_string());
            display_service_config(&mut lines, oa);
        }
        if let Some(ref a) = self.analysis {
            lines.push("[analysis]".to_string());
            if let Some(ref m) = a.extraction_model {
                lines.push(format!("  extraction_model = \"{m}\""));
            }
            if let Some(ref m) = a.ideas_model {
                lines.push(format!("  ideas_model = \"{m}\""));
            }
            if let Some(n) = a.max_comments {
                lines.push(format!("  max_comments = {n}"));
            }
            if let Some(t) = a.timeout_secs {
                lines.push(format!("  timeout_secs = {t}"));
            }
        }
        if lines.is_empty() {
            lines.push("(nothing configured)".to_string());
        }
        lines.join("\n")
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

fn display_service_config(lines: &mut Vec<String>, sc: &ServiceConfig) {
    if let Some(ref key) = sc.api_key {
        lines.push(format!("  api_key = \"{}\"", redact(key)));
    }
    if let Some(ref cmd) = sc.api_key_command {
        lines.push(format!("  api_key_command = \"{}\"", cmd));
    }
    if let Some(ref url) = sc.base_url {
        lines.push(format!("  base_url = \"{}\"", url));
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Resolve a credential through the chain: CLI flag > env var > config key > config command.
pub fn resolve_credential(
    cli_flag: Option<&str>,
    env_var_name: &str,
    config: Option<&ServiceConfig>,
) -> Result<String> {
    // 1. CLI flag
    if let Some(key) = non_empty(cli_flag) {
        return Ok(key.to_string());
    }

    // 2. Environment variable
    if let Ok(val) = std::env::var(env_var_name) {
        if !val.is_empty() {
            return Ok(val);
        }
    }

    if let Some(sc) = config {
        // 3. Config file api_key
        if let Some(key) = non_empty(sc.api_key.as_deref()) {
            return Ok(key.to_string());
        }

        // 4. External command
        if let Some(cmd) = non_empty(sc.api_key_command.as_deref()) {
            let output = std::process::Command::new("sh")
                .arg("-c")
                .arg(cmd)
                .output()
                .with_context(|| format!("Failed to run api_key_command: {cmd}"))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!(
                    "api_key_command failed (exit {}): {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                );
            }

            let secret = String::from_utf8(output.stdout)
                .context("api_key_command output is not valid UTF-8")?
                .trim()
                .to_string();

            if !secret.is_empty() {
                return Ok(secret);
            }
        }
    }

    bail!(
        "No API key found. Provide via flag, {} env var, or ~/.yca/config.toml",
        env_var_name
    );
}

/// Whether some credential source is configured, without running any command.
pub fn credential_configured(env_var_name: &str, config: Option<&ServiceConfig>) -> bool {
    let env_set = std::env::var(env_var_name).is_ok_and(|v| !v.is_empty());
    env_set
        || config.is_some_and(|sc| {
            non_empty(sc.api_key.as_deref()).is_some()
                || non_empty(sc.api_key_command.as_deref()).is_some()
        })
}

/// Path to the config file: ~/.yca/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".yca").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.yca/config.toml
# Credential resolution order: CLI flag > env var > api_key > api_key_command

[youtube]
# api_key = "your-youtube-data-api-key"
# api_key_command = "your-secrets-manager-command-here"

[openai]
# api_key = "your-openai-api-key"
# api_key_command = "your-secrets-manager-command-here"
# base_url = "https://api.openai.com/v1"

[analysis]
# extraction_model = "gpt-3.5-turbo-16k"
# ideas_model = "gpt-3.5-turbo"
# max_comments = 500
# timeout_secs = 120
"#
}

/// Create the config file at `path` if it doesn't already exist.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_template())?;
    Ok(true)
}
