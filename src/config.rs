use std::fs;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::VertecError;

/// Configuration resolved from environment, stored file and prompts
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

/// On-disk form of the configuration, written back after a run that prompted
/// for values so the next run does not have to ask again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Synchronous operator input. The console implementation is used by the
/// binary; tests substitute a scripted one.
pub trait Prompt {
    /// Whether prompting is possible at all (stdin is a terminal).
    fn is_interactive(&self) -> bool;
    /// Read a plain line of input.
    fn line(&mut self, message: &str) -> Result<String>;
    /// Read a secret without echoing it.
    fn password(&mut self, message: &str) -> Result<String>;
}

/// Console-backed prompt for interactive runs
pub struct ConsolePrompt;

impl Prompt for ConsolePrompt {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn line(&mut self, message: &str) -> Result<String> {
        // Prompts go to stderr so stdout stays clean for the JSON output
        eprint!("{message}");
        std::io::stderr().flush()?;
        let mut buf = String::new();
        std::io::stdin().read_line(&mut buf)?;
        Ok(buf.trim().to_string())
    }

    fn password(&mut self, message: &str) -> Result<String> {
        Ok(rpassword::prompt_password(message)?)
    }
}

/// Load configuration from `.env`, environment, the persisted file and, as a
/// last resort, interactive prompts. Newly prompted values are written back
/// to the config file.
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let path = config_file_path()?;
    let stored = read_stored(&path);

    let (config, updated) = resolve(
        &stored,
        &|key| std::env::var(key).ok().filter(|v| !v.is_empty()),
        &mut ConsolePrompt,
    )?;

    if let Some(updated) = updated {
        write_stored(&path, &updated)
            .with_context(|| format!("failed to persist configuration to {}", path.display()))?;
        log::info!("persisted configuration to {}", path.display());
    }

    Ok(config)
}

/// Resolve the three configuration fields, each one falling back from the
/// environment to the stored file to a prompt. Returns the resolved config
/// and, when anything was prompted, the stored record to write back.
pub fn resolve(
    stored: &StoredConfig,
    env: &dyn Fn(&str) -> Option<String>,
    prompt: &mut dyn Prompt,
) -> Result<(Config, Option<StoredConfig>)> {
    let mut updated = stored.clone();
    let mut prompted = false;

    let (base_url, asked) = resolve_field(
        "url",
        "VERTEC_URL",
        env,
        stored.base_url.as_deref(),
        prompt,
        |p| p.line("Vertec url (format: 'https://...'): "),
    )?;
    if asked {
        updated.base_url = Some(base_url.clone());
        prompted = true;
    }

    let (username, asked) = resolve_field(
        "username",
        "VERTEC_USERNAME",
        env,
        stored.username.as_deref(),
        prompt,
        |p| p.line("Vertec username: "),
    )?;
    if asked {
        updated.username = Some(username.clone());
        prompted = true;
    }

    let password_prompt = format!("Vertec password for '{username}': ");
    let (password, asked) = resolve_field(
        "password",
        "VERTEC_PASSWORD",
        env,
        stored.password.as_deref(),
        prompt,
        |p| p.password(&password_prompt),
    )?;
    if asked {
        updated.password = Some(password.clone());
        prompted = true;
    }

    let config = Config {
        base_url,
        username,
        password,
    };

    Ok((config, prompted.then_some(updated)))
}

/// Resolve a single field. The boolean in the result marks a freshly
/// prompted value that should be persisted.
fn resolve_field(
    field: &'static str,
    env_var: &'static str,
    env: &dyn Fn(&str) -> Option<String>,
    stored: Option<&str>,
    prompt: &mut dyn Prompt,
    ask: impl FnOnce(&mut dyn Prompt) -> Result<String>,
) -> Result<(String, bool)> {
    if let Some(value) = env(env_var) {
        return Ok((value, false));
    }
    if let Some(value) = stored.filter(|v| !v.is_empty()) {
        return Ok((value.to_string(), false));
    }
    if !prompt.is_interactive() {
        return Err(VertecError::ConfigurationMissing { field, env_var }.into());
    }
    let value = ask(prompt)?;
    if value.is_empty() {
        return Err(VertecError::ConfigurationMissing { field, env_var }.into());
    }
    Ok((value, true))
}

/// Path of the persisted configuration file:
/// `<config_dir>/vertec-timesheets/config.json`
pub fn config_file_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine the user configuration directory")?;
    Ok(dir.join("vertec-timesheets").join("config.json"))
}

/// Read the stored configuration; a missing or unreadable file simply means
/// there is nothing persisted yet.
pub fn read_stored(path: &Path) -> StoredConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config file {}: {e}", path.display());
            StoredConfig::default()
        }),
        Err(_) => StoredConfig::default(),
    }
}

/// Write the stored configuration, creating the parent directory and
/// restricting the file to the owner since it may contain the password.
pub fn write_stored(path: &Path, stored: &StoredConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(stored)?;
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
