use crate::core::session::SessionState;
use thiserror::Error;

/// Failure while fetching a roster. Causes are kept as text so the error can be
/// cloned into several observers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Roster request failed: {message}")]
    Network { message: String },

    #[error("Roster endpoint {url} answered with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Roster payload could not be decoded: {message}")]
    Decode { message: String },
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Network {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Decode {
            message: e.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Score request failed: {message}")]
    Network { message: String },

    #[error("Score endpoint {url} answered with status {status}")]
    BadStatus { url: String, status: u16 },
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        SubmitError::Network {
            message: e.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session is {state:?}, expected {expected:?}")]
    NotReady {
        state: SessionState,
        expected: SessionState,
    },

    #[error("No game date loaded; cannot post")]
    NoGame,

    #[error("Session controller has stopped")]
    Closed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing API credential (set {hint})")]
    MissingCredential { hint: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not read configuration: {message}")]
    Read { message: String },

    #[error("Could not parse configuration: {message}")]
    Parse { message: String },

    #[error("Logger initialization failed: {message}")]
    Logger { message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TallyError {
    /// Only a missing credential stops the app at startup; everything else is
    /// left to the presentation layer.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TallyError::Config(ConfigError::MissingCredential { .. }))
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TallyError::Load(LoadError::Network { .. })
            | TallyError::Submit(SubmitError::Network { .. }) => {
                "Check the network connection and try again"
            }
            TallyError::Load(LoadError::BadStatus { .. })
            | TallyError::Submit(SubmitError::BadStatus { .. }) => {
                "Check the API token and that the game exists on the server"
            }
            TallyError::Load(LoadError::Decode { .. }) => {
                "The server returned an unexpected roster format"
            }
            TallyError::Session(SessionError::Closed) => "Start a new session",
            TallyError::Session(SessionError::NoGame) => {
                "Reload a roster that names the game date"
            }
            TallyError::Session(_) => "Wait for the roster to finish loading",
            TallyError::Config(ConfigError::MissingCredential { .. }) => {
                "Provide the API token through the environment"
            }
            TallyError::Config(_) => "Fix the configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
