use std::path::PathBuf;
use serde::Deserialize;

/// All configuration for the dinner client.
///
/// Precedence (lowest to highest): defaults → config file → env var → CLI arg.
/// CLI arg merging is done by the caller after `Config::load()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Backend
    pub api_url: String,
    pub timeout_secs: u64,

    // Session
    pub token_path: PathBuf,

    // Logging
    pub log_level: String,
    pub utc: bool,
}

/// Config file layout (~/.dinner/config.toml). All fields optional; they
/// layer on top of compiled-in defaults.
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    token_path: Option<PathBuf>,
    log_level: Option<String>,
    utc: Option<bool>,
}

impl Config {
    /// Config directory: ~/.dinner/
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dinner")
    }

    /// Config file path: ~/.dinner/config.toml
    pub fn file_path() -> PathBuf {
        Self::dir().join("config.toml")
    }

    /// Load config: defaults → config file → env vars.
    /// CLI args should be merged by the caller afterward.
    pub fn load() -> Self {
        let mut config = Self::defaults();

        // Layer 2: config file
        if let Ok(contents) = std::fs::read_to_string(Self::file_path()) {
            config.apply_toml(&contents);
        }

        // Layer 3: environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    // --- Private helpers ---

    fn defaults() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
            token_path: Self::dir().join("token"),
            log_level: "warn".to_string(),
            utc: false,
        }
    }

    /// A file that fails to parse is ignored as a whole.
    fn apply_toml(&mut self, contents: &str) {
        if let Ok(file) = toml::from_str::<FileConfig>(contents) {
            self.apply_file(file);
        }
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.api_url { self.api_url = v; }
        if let Some(v) = file.timeout_secs { self.timeout_secs = v; }
        if let Some(v) = file.token_path { self.token_path = v; }
        if let Some(v) = file.log_level { self.log_level = v; }
        if let Some(v) = file.utc { self.utc = v; }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("DINNER_API_URL") { self.api_url = v; }
        if let Some(v) = var("DINNER_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() { self.timeout_secs = secs; }
        }
        if let Some(v) = var("DINNER_TOKEN_PATH") { self.token_path = PathBuf::from(v); }
        if let Some(v) = var("DINNER_LOG_LEVEL") { self.log_level = v; }
        if let Some(v) = var("DINNER_UTC") {
            self.utc = v == "1" || v.eq_ignore_ascii_case("true");
        }
    }
}
