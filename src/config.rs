use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::editor::DEFAULT_DEBOUNCE;
use crate::remote::DEFAULT_REMOTE_URL;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub memory: bool,
    pub offline: bool,
    pub verbose: bool,
    pub store_dir: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub debounce_ms: Option<u64>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            memory: self.memory || other.memory,
            offline: self.offline || other.offline,
            verbose: self.verbose || other.verbose,
            store_dir: other.store_dir.clone().or_else(|| self.store_dir.clone()),
            remote_url: other.remote_url.clone().or_else(|| self.remote_url.clone()),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
        }
    }

    pub fn remote_url(&self) -> &str {
        self.remote_url.as_deref().unwrap_or(DEFAULT_REMOTE_URL)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map_or(DEFAULT_DEBOUNCE, Duration::from_millis)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("markpad").join("config");
        }
    }

    PathBuf::from(".markpadrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markpadrc")
}

const VALUE_FLAGS: [&str; 3] = ["--store-dir", "--remote-url", "--debounce-ms"];

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Split a config line into tokens. A line starting with a value flag keeps
/// the rest of the line as one value, so paths may contain spaces.
fn line_tokens(line: &str) -> Vec<String> {
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));
    if VALUE_FLAGS.contains(&head) && !rest.is_empty() {
        vec![head.to_string(), rest.to_string()]
    } else {
        line.split_whitespace().map(ToOwned::to_owned).collect()
    }
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# markpad defaults (saved with --save)".to_string());
    if flags.memory {
        lines.push("--memory".to_string());
    }
    if flags.offline {
        lines.push("--offline".to_string());
    }
    if flags.verbose {
        lines.push("--verbose".to_string());
    }
    if let Some(dir) = &flags.store_dir {
        lines.push(format!("--store-dir {}", dir.display()));
    }
    if let Some(url) = &flags.remote_url {
        lines.push(format!("--remote-url {url}"));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from raw tokens, ignoring anything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--memory" => flags.memory = true,
            "--offline" => flags.offline = true,
            "--verbose" | "-v" => flags.verbose = true,
            name if VALUE_FLAGS.contains(&name) => {
                let value = if let Some(value) = inline {
                    Some(value)
                } else {
                    let next = tokens.get(i + 1).map(String::as_str);
                    if next.is_some() {
                        i += 1;
                    }
                    next
                };
                if let Some(value) = value {
                    apply_value(&mut flags, name, value);
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--store-dir" => flags.store_dir = Some(PathBuf::from(value)),
        "--remote-url" => flags.remote_url = Some(value.to_string()),
        "--debounce-ms" => {
            if let Ok(ms) = value.parse() {
                flags.debounce_ms = Some(ms);
            }
        }
        _ => {}
    }
}
