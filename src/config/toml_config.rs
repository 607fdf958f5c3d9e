use crate::core::controller::ResetPolicy;
use crate::domain::model::Credential;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::ConfigError;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub post: PostConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterMode {
    #[default]
    Combined,
    Split,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub mode: RosterMode,
    pub game: Option<String>,
    #[serde(default = "default_team_a_resource")]
    pub team_a_resource: String,
    #[serde(default = "default_team_b_resource")]
    pub team_b_resource: String,
}

fn default_team_a_resource() -> String {
    "teamA".to_string()
}

fn default_team_b_resource() -> String {
    "teamB".to_string()
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            mode: RosterMode::default(),
            game: None,
            team_a_resource: default_team_a_resource(),
            team_b_resource: default_team_b_resource(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostConfig {
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub format: LogFormat,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl TallyConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses the configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Replaces `${VAR}` placeholders such as `${FOOTY_API_TOKEN}` with environment
    /// values. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        placeholder_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// The bearer token. A missing, blank or unresolved token is fatal at
    /// startup.
    pub fn credential(&self) -> Result<Credential, ConfigError> {
        let missing = |hint: &str| ConfigError::MissingCredential {
            hint: hint.to_string(),
        };
        let token = self
            .api
            .token
            .as_deref()
            .map(str::trim)
            .ok_or_else(|| missing("api.token"))?;

        if let Some(caps) = placeholder_pattern().captures(token) {
            return Err(missing(&caps[1]));
        }
        if token.is_empty() {
            return Err(missing("api.token"));
        }
        Ok(Credential::new(token))
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.post.reset_policy
    }
}

impl ConfigProvider for TallyConfig {
    fn base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TallyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        if self.roster.mode == RosterMode::Split {
            validate_non_empty_string("roster.team_a_resource", &self.roster.team_a_resource)?;
            validate_non_empty_string("roster.team_b_resource", &self.roster.team_b_resource)?;
        }

        if let Some(game) = &self.roster.game {
            validate_non_empty_string("roster.game", game)?;
        }

        self.credential()?;
        Ok(())
    }
}
