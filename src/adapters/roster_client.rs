use crate::adapters::http::{check_status, ApiClient};
use crate::adapters::wire::{CombinedPayload, TeamPart, TeamPayload};
use crate::domain::model::{Credential, GameMeta, RosterLoadResult, Team};
use crate::domain::ports::RosterSource;
use crate::utils::error::LoadError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub const MOST_RECENT_GAME: &str = "most_recent_game";

async fn fetch_payload<T: DeserializeOwned>(
    api: &ApiClient,
    credential: &Credential,
    resource: &str,
) -> Result<T, LoadError> {
    let url = api.endpoint(&["games", resource]);
    let response = api.get(url.clone(), credential).send().await?;
    check_status(&response).map_err(|status| LoadError::BadStatus {
        url: url.to_string(),
        status,
    })?;

    let body = response.text().await?;
    let payload = serde_json::from_str(&body)?;
    Ok(payload)
}

/// Loads both teams and the game metadata from one combined endpoint.
#[derive(Debug, Clone)]
pub struct HttpRosterClient {
    api: ApiClient,
}

impl HttpRosterClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RosterSource for HttpRosterClient {
    async fn load(
        &self,
        credential: &Credential,
        game: Option<&str>,
    ) -> Result<RosterLoadResult, LoadError> {
        let resource = game.unwrap_or(MOST_RECENT_GAME);
        tracing::info!("📡 Loading roster for game '{}'", resource);

        let loaded: RosterLoadResult =
            fetch_payload::<CombinedPayload>(&self.api, credential, resource)
                .await?
                .into();
        tracing::info!(
            "📡 Loaded game {}: {} vs {} players",
            loaded.meta.date,
            loaded.roster_a.len(),
            loaded.roster_b.len()
        );
        Ok(loaded)
    }
}

/// Legacy loader: one endpoint per team, fetched concurrently.
///
/// Both requests are awaited before returning. A team whose request fails gets
/// an empty roster; the load only fails when both requests fail. Endpoints may
/// answer with bare sheet rows, in which case no game date is known and the
/// session will refuse to post.
#[derive(Debug, Clone)]
pub struct SplitRosterClient {
    api: ApiClient,
    team_a_resource: String,
    team_b_resource: String,
}

impl SplitRosterClient {
    pub fn new(api: ApiClient, team_a_resource: &str, team_b_resource: &str) -> Self {
        Self {
            api,
            team_a_resource: team_a_resource.to_string(),
            team_b_resource: team_b_resource.to_string(),
        }
    }
}

#[async_trait]
impl RosterSource for SplitRosterClient {
    async fn load(
        &self,
        credential: &Credential,
        game: Option<&str>,
    ) -> Result<RosterLoadResult, LoadError> {
        if let Some(game) = game {
            tracing::warn!(
                "Split roster endpoints always serve the current game; ignoring '{}'",
                game
            );
        }

        let (team_a, team_b) = tokio::join!(
            fetch_payload::<TeamPayload>(&self.api, credential, &self.team_a_resource),
            fetch_payload::<TeamPayload>(&self.api, credential, &self.team_b_resource),
        );

        let (team_a, team_b) = match (team_a, team_b) {
            (Err(a), Err(b)) => {
                tracing::error!("❌ Both roster requests failed: {} / {}", a, b);
                return Err(a);
            }
            (a, b) => (settle_part(Team::A, a), settle_part(Team::B, b)),
        };

        let date = team_a.date.or(team_b.date).unwrap_or_else(|| {
            tracing::warn!("⚠️ Split roster carried no game date; posting will be refused");
            String::new()
        });

        Ok(RosterLoadResult {
            roster_a: team_a.roster,
            roster_b: team_b.roster,
            meta: GameMeta {
                date,
                colour_a: team_a.colour,
                colour_b: team_b.colour,
            },
        })
    }
}

fn settle_part(team: Team, result: Result<TeamPayload, LoadError>) -> TeamPart {
    match result {
        Ok(payload) => payload.into_part(team),
        Err(e) => {
            tracing::warn!("⚠️ Team {:?} roster unavailable, continuing empty: {}", team, e);
            TeamPart::default()
        }
    }
}

/// Roster source chosen by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredRosterSource {
    Combined(HttpRosterClient),
    Split(SplitRosterClient),
}

#[async_trait]
impl RosterSource for ConfiguredRosterSource {
    async fn load(
        &self,
        credential: &Credential,
        game: Option<&str>,
    ) -> Result<RosterLoadResult, LoadError> {
        match self {
            ConfiguredRosterSource::Combined(client) => client.load(credential, game).await,
            ConfiguredRosterSource::Split(client) => client.load(credential, game).await,
        }
    }
}
