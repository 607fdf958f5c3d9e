pub mod toml_config;

pub use toml_config::{
    ApiConfig, LogFormat, LoggingConfig, PostConfig, RosterConfig, RosterMode, TallyConfig,
};
