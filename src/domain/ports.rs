use crate::domain::model::{Credential, Player, RosterLoadResult};
use crate::utils::error::{LoadError, SubmitError};
use async_trait::async_trait;
use std::time::Duration;

/// Where rosters come from. `game` of `None` means the most recent game.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn load(
        &self,
        credential: &Credential,
        game: Option<&str>,
    ) -> Result<RosterLoadResult, LoadError>;
}

/// Remote side of a post: one team-score update and one goal update per player.
#[async_trait]
pub trait ScorePosting: Send + Sync {
    async fn post_team_scores(
        &self,
        credential: &Credential,
        game_date: &str,
        score_a: u32,
        score_b: u32,
    ) -> Result<(), SubmitError>;

    async fn post_player_goals(
        &self,
        credential: &Credential,
        player: &Player,
        goals: u32,
    ) -> Result<(), SubmitError>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}
