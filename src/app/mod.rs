// Application wiring: turns a validated configuration into a ready-to-spawn session.

use crate::adapters::http::ApiClient;
use crate::adapters::roster_client::{ConfiguredRosterSource, HttpRosterClient, SplitRosterClient};
use crate::adapters::score_poster::HttpScorePoster;
use crate::config::{RosterMode, TallyConfig};
use crate::core::controller::SessionController;
use crate::core::submitter::ScoreSubmitter;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub type ConfiguredController = SessionController<ConfiguredRosterSource, HttpScorePoster>;

/// Startup path. A missing credential surfaces here as a fatal
/// `ConfigError::MissingCredential`.
pub fn controller_from_config(config: &TallyConfig) -> Result<ConfiguredController> {
    config.validate()?;
    let credential = config.credential()?;
    let api = ApiClient::from_config(config)?;

    let source = match config.roster.mode {
        RosterMode::Combined => ConfiguredRosterSource::Combined(HttpRosterClient::new(api.clone())),
        RosterMode::Split => ConfiguredRosterSource::Split(SplitRosterClient::new(
            api.clone(),
            &config.roster.team_a_resource,
            &config.roster.team_b_resource,
        )),
    };
    tracing::debug!(
        "Configured {:?} roster source against {}",
        config.roster.mode,
        config.api.base_url
    );

    let submitter = ScoreSubmitter::new(HttpScorePoster::new(api));
    let mut controller = SessionController::new(source, submitter, credential)
        .with_reset_policy(config.reset_policy());
    if let Some(game) = &config.roster.game {
        controller = controller.with_game(game.clone());
    }
    Ok(controller)
}
