use crate::core::ledger::ScoreLedger;
use crate::domain::model::{GameMeta, Player, RosterLoadResult, Team};
use crate::utils::error::{LoadError, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Loading,
    Ready,
    Posting,
    Posted,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Posted | SessionState::Failed)
    }
}

/// What a post sends: everything read from the ledger at the moment the user
/// pressed post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub game_date: String,
    pub score_a: u32,
    pub score_b: u32,
    pub goals: Vec<(Player, u32)>,
}

/// Read-only copy of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub ledger: ScoreLedger,
    pub meta: Option<GameMeta>,
    pub last_error: Option<String>,
}

/// One game being scored. Owns the ledger, the game metadata and the lifecycle.
///
/// Transitions: `Loading -> Ready` on a successful load, `Loading -> Failed` on a
/// failed one, `Ready -> Posting` when a post starts, then `Posted` (ledger
/// reset) or `Failed` (ledger kept). Ready sessions may reload, which replaces
/// the rosters wholesale.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    ledger: ScoreLedger,
    meta: Option<GameMeta>,
    last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Loading,
            ledger: ScoreLedger::new(),
            meta: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn meta(&self) -> Option<&GameMeta> {
        self.meta.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            ledger: self.ledger.clone(),
            meta: self.meta.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Takes over a loaded roster. Allowed while loading, or while ready for a
    /// reload.
    pub fn adopt(&mut self, loaded: RosterLoadResult) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Loading | SessionState::Ready) {
            return Err(self.not_ready(SessionState::Loading));
        }

        for (team, roster) in [(Team::A, &loaded.roster_a), (Team::B, &loaded.roster_b)] {
            let duplicates = roster.duplicate_names();
            if !duplicates.is_empty() {
                tracing::warn!(
                    "⚠️ Team {:?} has duplicate player names {:?}; their goals share one total",
                    team,
                    duplicates
                );
            }
        }

        tracing::info!(
            "✅ Roster adopted for game {}: {} vs {} players",
            loaded.meta.date,
            loaded.roster_a.len(),
            loaded.roster_b.len()
        );
        self.ledger.load_roster(loaded.roster_a, loaded.roster_b);
        self.meta = Some(loaded.meta);
        self.last_error = None;
        self.state = SessionState::Ready;
        Ok(())
    }

    pub fn fail_load(&mut self, error: &LoadError) {
        tracing::error!("❌ Roster load failed: {}", error);
        self.last_error = Some(error.to_string());
        if self.state == SessionState::Loading {
            self.state = SessionState::Failed;
        }
    }

    pub fn increment(&mut self, team: Team, index: usize) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.ledger.increment(team, index);
        Ok(())
    }

    pub fn decrement(&mut self, team: Team, index: usize) -> Result<bool, SessionError> {
        self.ensure_ready()?;
        Ok(self.ledger.decrement(team, index))
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_ready()?;
        self.ledger.reset();
        Ok(())
    }

    /// Moves to `Posting` and captures the final tallies. The game date comes
    /// from the loaded metadata, never from the local clock; without one the
    /// post is refused and the session stays Ready.
    pub fn begin_post(&mut self) -> Result<PostRequest, SessionError> {
        self.ensure_ready()?;
        let game_date = match &self.meta {
            Some(meta) if !meta.date.trim().is_empty() => meta.date.clone(),
            _ => return Err(SessionError::NoGame),
        };

        let goals = Team::ALL
            .iter()
            .flat_map(|team| self.ledger.sheet(*team).entries())
            .map(|(player, goals)| (player.clone(), goals))
            .collect();

        let request = PostRequest {
            game_date,
            score_a: self.ledger.aggregate(Team::A),
            score_b: self.ledger.aggregate(Team::B),
            goals,
        };
        self.state = SessionState::Posting;
        Ok(request)
    }

    /// Submissions were issued (or all succeeded): reset and close the session.
    pub fn complete_post(&mut self) -> Result<(), SessionError> {
        self.ensure_state(SessionState::Posting)?;
        self.ledger.reset();
        self.state = SessionState::Posted;
        tracing::info!("🏁 Scores posted, ledger reset");
        Ok(())
    }

    /// Keeps the tallies so the failed post can be inspected.
    pub fn fail_post(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_state(SessionState::Posting)?;
        let reason = reason.into();
        tracing::error!("❌ Post failed, tallies kept: {}", reason);
        self.last_error = Some(reason);
        self.state = SessionState::Failed;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), SessionError> {
        self.ensure_state(SessionState::Ready)
    }

    fn ensure_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.not_ready(expected))
        }
    }

    fn not_ready(&self, expected: SessionState) -> SessionError {
        SessionError::NotReady {
            state: self.state,
            expected,
        }
    }
}
