use crate::domain::model::{Credential, Player, RosterLoadResult};
use crate::domain::ports::{RosterSource, ScorePosting};
use crate::utils::error::{LoadError, SubmitError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Roster source that answers from memory. Used to drive sessions without a
/// server.
#[derive(Clone)]
pub struct InMemoryRosterSource {
    response: Result<RosterLoadResult, LoadError>,
    requests: Arc<Mutex<Vec<Option<String>>>>,
}

impl InMemoryRosterSource {
    pub fn new(loaded: RosterLoadResult) -> Self {
        Self {
            response: Ok(loaded),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: LoadError) -> Self {
        Self {
            response: Err(error),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Game ids requested so far, `None` for "most recent".
    pub async fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl RosterSource for InMemoryRosterSource {
    async fn load(
        &self,
        _credential: &Credential,
        game: Option<&str>,
    ) -> Result<RosterLoadResult, LoadError> {
        self.requests.lock().await.push(game.map(str::to_string));
        self.response.clone()
    }
}

#[derive(Default)]
struct Recorded {
    team_scores: Vec<(String, u32, u32)>,
    player_goals: Vec<(String, u32)>,
    attempts: usize,
}

/// Score poster that records accepted updates instead of sending them.
/// Individual players or the team update can be made to fail.
#[derive(Clone, Default)]
pub struct RecordingScorePoster {
    recorded: Arc<Mutex<Recorded>>,
    failing_players: HashSet<String>,
    fail_team_scores: bool,
}

impl RecordingScorePoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_player(mut self, name: &str) -> Self {
        self.failing_players.insert(name.to_string());
        self
    }

    pub fn failing_team_scores(mut self) -> Self {
        self.fail_team_scores = true;
        self
    }

    /// Accepted `(game_date, score_a, score_b)` updates.
    pub async fn team_scores(&self) -> Vec<(String, u32, u32)> {
        self.recorded.lock().await.team_scores.clone()
    }

    /// Accepted `(player, goals)` updates, in arrival order.
    pub async fn player_goals(&self) -> Vec<(String, u32)> {
        self.recorded.lock().await.player_goals.clone()
    }

    /// Every request received, failed ones included.
    pub async fn attempts(&self) -> usize {
        self.recorded.lock().await.attempts
    }

    fn rejected(path: String) -> SubmitError {
        SubmitError::BadStatus {
            url: format!("memory://{}", path),
            status: 503,
        }
    }
}

#[async_trait]
impl ScorePosting for RecordingScorePoster {
    async fn post_team_scores(
        &self,
        _credential: &Credential,
        game_date: &str,
        score_a: u32,
        score_b: u32,
    ) -> Result<(), SubmitError> {
        let mut recorded = self.recorded.lock().await;
        recorded.attempts += 1;
        if self.fail_team_scores {
            return Err(Self::rejected(format!("games/updatescore/{}", game_date)));
        }
        recorded
            .team_scores
            .push((game_date.to_string(), score_a, score_b));
        Ok(())
    }

    async fn post_player_goals(
        &self,
        _credential: &Credential,
        player: &Player,
        goals: u32,
    ) -> Result<(), SubmitError> {
        let mut recorded = self.recorded.lock().await;
        recorded.attempts += 1;
        if self.failing_players.contains(&player.name) {
            return Err(Self::rejected(format!("players/goals/{}", player.name)));
        }
        recorded.player_goals.push((player.name.clone(), goals));
        Ok(())
    }
}
