use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure for the decision gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub groq: GroqConfig,
    pub trigger: TriggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: i32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// When the client stops asking and requests the final synthesis. The
/// source variants disagreed on the rule, so all three live here; unset
/// fields are simply inactive. First match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Reserved input that force-terminates the Q&A phase.
    pub sentinel: Option<String>,
    /// Number of user turns after which the Q&A phase ends on its own.
    pub max_user_turns: Option<usize>,
    /// Case-insensitive substring that ends the Q&A phase. Off by default.
    pub keyword: Option<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            sentinel: Some("777".to_string()),
            max_user_turns: Some(7),
            keyword: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// ALWAYS returns a valid config - never fails.
    pub fn load() -> Self {
        if dotenvy::dotenv().is_ok() {
            tracing::info!("Loaded .env from current directory");
        }

        let config_path =
            env::var("CROSSROADS_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("CROSSROADS_BIND") {
            self.server.bind = bind;
        }

        if let Ok(api_key) = env::var("GROQ_API_KEY") {
            self.groq.api_key = api_key;
        }
        if let Ok(model) = env::var("CROSSROADS_MODEL") {
            self.groq.model = model;
        }
        if let Ok(temperature) = env::var("CROSSROADS_TEMPERATURE") {
            if let Ok(t) = temperature.parse() {
                self.groq.temperature = t;
            }
        }
        if let Ok(max_tokens) = env::var("CROSSROADS_MAX_TOKENS") {
            if let Ok(m) = max_tokens.parse() {
                self.groq.max_tokens = m;
            }
        }

        if let Ok(sentinel) = env::var("CROSSROADS_SENTINEL") {
            self.trigger.sentinel = (!sentinel.is_empty()).then_some(sentinel);
        }
        if let Ok(turns) = env::var("CROSSROADS_MAX_USER_TURNS") {
            if let Ok(n) = turns.parse() {
                self.trigger.max_user_turns = Some(n);
            }
        }
        if let Ok(keyword) = env::var("CROSSROADS_KEYWORD") {
            self.trigger.keyword = (!keyword.is_empty()).then_some(keyword);
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.groq.api_key.is_empty() {
            return Err("GROQ_API_KEY is not set; upstream calls will fail".to_string());
        }
        if self.trigger.sentinel.is_none()
            && self.trigger.max_user_turns.is_none()
            && self.trigger.keyword.is_none()
        {
            return Err("no chat->result trigger configured; sessions can never conclude".to_string());
        }
        Ok(())
    }
}
