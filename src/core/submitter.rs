use crate::core::session::PostRequest;
use crate::domain::model::{Credential, Player, Roster};
use crate::domain::ports::ScorePosting;
use crate::utils::error::SubmitError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Outcome of one post, gathered after every request finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcome {
    pub team_scores: Result<(), SubmitError>,
    pub player_goals: Vec<(String, Result<(), SubmitError>)>,
}

impl PostOutcome {
    pub fn is_success(&self) -> bool {
        self.team_scores.is_ok() && self.player_goals.iter().all(|(_, result)| result.is_ok())
    }

    pub fn failures(&self) -> Vec<String> {
        let mut failures = Vec::new();
        if let Err(e) = &self.team_scores {
            failures.push(format!("team scores: {}", e));
        }
        for (name, result) in &self.player_goals {
            if let Err(e) = result {
                failures.push(format!("player {}: {}", name, e));
            }
        }
        failures
    }
}

/// Requests already on their way. Dropping this does not cancel them.
pub struct PendingPost {
    team_scores: JoinHandle<Result<(), SubmitError>>,
    player_goals: Vec<(String, JoinHandle<Result<(), SubmitError>>)>,
}

impl PendingPost {
    pub fn player_count(&self) -> usize {
        self.player_goals.len()
    }

    pub async fn settle(self) -> PostOutcome {
        let team_scores = join_result(self.team_scores).await;
        let mut player_goals = Vec::with_capacity(self.player_goals.len());
        for (name, handle) in self.player_goals {
            player_goals.push((name, join_result(handle).await));
        }
        let outcome = PostOutcome {
            team_scores,
            player_goals,
        };

        if outcome.is_success() {
            tracing::info!(
                "📤 Post settled: team scores and {} player totals updated",
                outcome.player_goals.len()
            );
        } else {
            for failure in outcome.failures() {
                tracing::warn!("📤 Post request failed: {}", failure);
            }
        }
        outcome
    }
}

async fn join_result(handle: JoinHandle<Result<(), SubmitError>>) -> Result<(), SubmitError> {
    handle.await.unwrap_or_else(|e| {
        Err(SubmitError::Network {
            message: format!("submit task aborted: {}", e),
        })
    })
}

/// Fans a post out into independent requests: one for the team scores, one per
/// player. Each request runs in its own task so a slow or failing player never
/// holds back the others. Nothing is retried.
pub struct ScoreSubmitter<P: ScorePosting> {
    poster: Arc<P>,
}

impl<P: ScorePosting> Clone for ScoreSubmitter<P> {
    fn clone(&self) -> Self {
        Self {
            poster: Arc::clone(&self.poster),
        }
    }
}

impl<P: ScorePosting + 'static> ScoreSubmitter<P> {
    pub fn new(poster: P) -> Self {
        Self {
            poster: Arc::new(poster),
        }
    }

    pub fn poster(&self) -> &P {
        &self.poster
    }

    pub fn submit_team_scores(
        &self,
        credential: &Credential,
        score_a: u32,
        score_b: u32,
        game_date: &str,
    ) -> JoinHandle<Result<(), SubmitError>> {
        let poster = Arc::clone(&self.poster);
        let credential = credential.clone();
        let game_date = game_date.to_string();
        tracing::debug!(
            "📤 Submitting team scores {}-{} for game {}",
            score_a,
            score_b,
            game_date
        );
        tokio::spawn(async move {
            poster
                .post_team_scores(&credential, &game_date, score_a, score_b)
                .await
        })
    }

    /// One request per player, rosters and tallies zipped positionally.
    pub fn submit_player_scores(
        &self,
        credential: &Credential,
        roster_a: &Roster,
        tally_a: &[u32],
        roster_b: &Roster,
        tally_b: &[u32],
    ) -> Vec<(String, JoinHandle<Result<(), SubmitError>>)> {
        let goals = roster_a
            .players()
            .iter()
            .zip(tally_a.iter().copied())
            .chain(roster_b.players().iter().zip(tally_b.iter().copied()));
        self.spawn_player_goals(credential, goals)
    }

    fn spawn_player_goals<'a>(
        &self,
        credential: &Credential,
        goals: impl Iterator<Item = (&'a Player, u32)>,
    ) -> Vec<(String, JoinHandle<Result<(), SubmitError>>)> {
        goals
            .map(|(player, goals)| {
                let poster = Arc::clone(&self.poster);
                let credential = credential.clone();
                let player = player.clone();
                let name = player.name.clone();
                let handle = tokio::spawn(async move {
                    poster.post_player_goals(&credential, &player, goals).await
                });
                (name, handle)
            })
            .collect()
    }

    /// Issues every request of a post exactly once and returns immediately.
    pub fn submit(&self, credential: &Credential, request: &PostRequest) -> PendingPost {
        let team_scores = self.submit_team_scores(
            credential,
            request.score_a,
            request.score_b,
            &request.game_date,
        );
        let player_goals = self.spawn_player_goals(
            credential,
            request.goals.iter().map(|(player, goals)| (player, *goals)),
        );
        tracing::info!(
            "📤 Issued post for game {}: 1 team update, {} player updates",
            request.game_date,
            player_goals.len()
        );
        PendingPost {
            team_scores,
            player_goals,
        }
    }
}
