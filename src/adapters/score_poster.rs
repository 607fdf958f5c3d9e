use crate::adapters::http::{check_status, ApiClient};
use crate::adapters::wire::{PlayerGoalsBody, TeamScoresBody};
use crate::domain::model::{Credential, Player};
use crate::domain::ports::ScorePosting;
use crate::utils::error::SubmitError;
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct HttpScorePoster {
    api: ApiClient,
}

impl HttpScorePoster {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    async fn put<T: Serialize>(
        &self,
        segments: &[&str],
        credential: &Credential,
        body: &T,
    ) -> Result<(), SubmitError> {
        let url = self.api.endpoint(segments);
        let response = self
            .api
            .put_json(url.clone(), credential, body)
            .send()
            .await?;
        check_status(&response).map_err(|status| SubmitError::BadStatus {
            url: url.to_string(),
            status,
        })
    }
}

#[async_trait]
impl ScorePosting for HttpScorePoster {
    async fn post_team_scores(
        &self,
        credential: &Credential,
        game_date: &str,
        score_a: u32,
        score_b: u32,
    ) -> Result<(), SubmitError> {
        let body = TeamScoresBody {
            score_team_a: score_a,
            score_team_b: score_b,
        };
        self.put(&["games", "updatescore", game_date], credential, &body)
            .await
    }

    /// The server adds `goals` to the player's running total.
    async fn post_player_goals(
        &self,
        credential: &Credential,
        player: &Player,
        goals: u32,
    ) -> Result<(), SubmitError> {
        self.put(
            &["players", "goals", player.name.as_str()],
            credential,
            &PlayerGoalsBody { goals },
        )
        .await
    }
}
