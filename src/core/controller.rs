use crate::core::session::{Session, SessionSnapshot, SessionState};
use crate::core::submitter::{PostOutcome, ScoreSubmitter};
use crate::domain::model::{Credential, RosterLoadResult, Team};
use crate::domain::ports::{RosterSource, ScorePosting};
use crate::utils::error::{LoadError, SessionError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_BUFFER: usize = 64;

/// When the ledger is cleared after a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetPolicy {
    /// Reset as soon as the requests are issued, whatever their outcome.
    #[default]
    #[serde(rename = "immediate")]
    Immediate,
    /// Wait for every request; reset only if all succeeded, otherwise fail the
    /// session and keep the tallies.
    #[serde(rename = "confirm")]
    ConfirmBeforeReset,
}

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

enum Command {
    Loaded {
        generation: u64,
        result: Result<RosterLoadResult, LoadError>,
    },
    Reload { game: Option<String>, reply: Reply<()> },
    Increment { team: Team, index: usize, reply: Reply<()> },
    Decrement { team: Team, index: usize, reply: Reply<bool> },
    Reset { reply: Reply<()> },
    Snapshot { reply: Reply<SessionSnapshot> },
    Post { reply: Reply<PostReceipt> },
    PostSettled(PostOutcome),
}

/// Resolves once every request of a post has finished.
pub struct PostReceipt {
    outcome: oneshot::Receiver<PostOutcome>,
}

impl PostReceipt {
    pub async fn outcome(self) -> Result<PostOutcome, SessionError> {
        self.outcome.await.map_err(|_| SessionError::Closed)
    }
}

/// Builds and starts a session.
///
/// The session lives in a single task. User intents and network completions
/// both arrive as commands on one queue and are applied in order, so the
/// session is never touched from two places at once.
pub struct SessionController<R: RosterSource, P: ScorePosting> {
    source: R,
    submitter: ScoreSubmitter<P>,
    credential: Credential,
    game: Option<String>,
    policy: ResetPolicy,
}

impl<R, P> SessionController<R, P>
where
    R: RosterSource + 'static,
    P: ScorePosting + 'static,
{
    pub fn new(source: R, submitter: ScoreSubmitter<P>, credential: Credential) -> Self {
        Self {
            source,
            submitter,
            credential,
            game: None,
            policy: ResetPolicy::default(),
        }
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starts the roster load and the session task. Must run inside a tokio
    /// runtime. The task stops once every handle is dropped.
    pub fn spawn(self) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(SessionState::Loading);

        let mut actor = SessionActor {
            session: Session::new(),
            source: Arc::new(self.source),
            submitter: self.submitter,
            credential: self.credential,
            policy: self.policy,
            commands: commands_tx.downgrade(),
            state: state_tx,
            load_generation: 0,
        };
        actor.spawn_load(self.game);
        tokio::spawn(actor.run(commands_rx));

        SessionHandle {
            commands: commands_tx,
            state: state_rx,
        }
    }
}

struct SessionActor<R: RosterSource, P: ScorePosting> {
    session: Session,
    source: Arc<R>,
    submitter: ScoreSubmitter<P>,
    credential: Credential,
    policy: ResetPolicy,
    commands: mpsc::WeakSender<Command>,
    state: watch::Sender<SessionState>,
    /// Bumped per load; only the newest load may touch the session.
    load_generation: u64,
}

impl<R, P> SessionActor<R, P>
where
    R: RosterSource + 'static,
    P: ScorePosting + 'static,
{
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
            self.publish();
        }
        tracing::debug!("Session task stopped in state {:?}", self.session.state());
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Loaded { generation, .. } if generation != self.load_generation => {
                tracing::debug!(
                    "Dropping superseded roster load {} (current {})",
                    generation,
                    self.load_generation
                );
            }
            Command::Loaded {
                result: Ok(loaded), ..
            } => {
                if let Err(e) = self.session.adopt(loaded) {
                    tracing::warn!("Discarding roster that arrived late: {}", e);
                }
            }
            Command::Loaded { result: Err(e), .. } => self.session.fail_load(&e),
            Command::Reload { game, reply } => {
                let result = match self.session.state() {
                    SessionState::Ready => {
                        self.spawn_load(game);
                        Ok(())
                    }
                    state => Err(SessionError::NotReady {
                        state,
                        expected: SessionState::Ready,
                    }),
                };
                self.publish();
                let _ = reply.send(result);
            }
            Command::Increment { team, index, reply } => {
                let result = self.session.increment(team, index);
                self.publish();
                let _ = reply.send(result);
            }
            Command::Decrement { team, index, reply } => {
                let result = self.session.decrement(team, index);
                self.publish();
                let _ = reply.send(result);
            }
            Command::Reset { reply } => {
                let result = self.session.reset();
                self.publish();
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(Ok(self.session.snapshot()));
            }
            Command::Post { reply } => {
                let result = self.post();
                self.publish();
                let _ = reply.send(result);
            }
            Command::PostSettled(outcome) => {
                let result = if outcome.is_success() {
                    self.session.complete_post()
                } else {
                    self.session.fail_post(outcome.failures().join("; "))
                };
                if let Err(e) = result {
                    tracing::warn!("Post outcome arrived in unexpected state: {}", e);
                }
            }
        }
    }

    /// Watchers must see the new state before the reply reaches the caller.
    fn publish(&self) {
        let current = self.session.state();
        self.state.send_if_modified(|state| {
            let changed = *state != current;
            *state = current;
            changed
        });
    }

    fn spawn_load(&mut self, game: Option<String>) {
        self.load_generation += 1;
        let generation = self.load_generation;
        let source = Arc::clone(&self.source);
        let credential = self.credential.clone();
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let result = source.load(&credential, game.as_deref()).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::Loaded { generation, result }).await;
            }
        });
    }

    fn post(&mut self) -> Result<PostReceipt, SessionError> {
        let request = self.session.begin_post()?;
        let pending = self.submitter.submit(&self.credential, &request);

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let confirm = self.policy == ResetPolicy::ConfirmBeforeReset;
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let outcome = pending.settle().await;
            if confirm {
                if let Some(commands) = commands.upgrade() {
                    let _ = commands.send(Command::PostSettled(outcome.clone())).await;
                }
            }
            let _ = outcome_tx.send(outcome);
        });

        if !confirm {
            self.session.complete_post()?;
        }
        Ok(PostReceipt {
            outcome: outcome_rx,
        })
    }
}

/// Cheap to clone; every clone talks to the same session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionState>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)?
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Waits until the session is neither loading nor posting.
    pub async fn wait_until_settled(&self) -> Result<SessionState, SessionError> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| !matches!(s, SessionState::Loading | SessionState::Posting))
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(*settled)
    }

    pub async fn increment(&self, team: Team, index: usize) -> Result<(), SessionError> {
        self.request(|reply| Command::Increment { team, index, reply })
            .await
    }

    pub async fn decrement(&self, team: Team, index: usize) -> Result<bool, SessionError> {
        self.request(|reply| Command::Decrement { team, index, reply })
            .await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Fetches the roster again and replaces it wholesale once it arrives.
    pub async fn reload(&self, game: Option<String>) -> Result<(), SessionError> {
        self.request(|reply| Command::Reload { game, reply }).await
    }

    /// Issues the post. The returned receipt may be dropped; the requests keep
    /// running either way.
    pub async fn post(&self) -> Result<PostReceipt, SessionError> {
        self.request(|reply| Command::Post { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryRosterSource, RecordingScorePoster};
    use crate::domain::model::{GameMeta, Roster};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Each game's load completes only when its gate is released.
    struct GatedRosterSource {
        gates: Mutex<HashMap<Option<String>, oneshot::Receiver<RosterLoadResult>>>,
    }

    impl GatedRosterSource {
        fn new() -> Self {
            Self {
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, game: Option<&str>) -> oneshot::Sender<RosterLoadResult> {
            let (tx, rx) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .insert(game.map(str::to_string), rx);
            tx
        }
    }

    #[async_trait]
    impl RosterSource for GatedRosterSource {
        async fn load(
            &self,
            _credential: &Credential,
            game: Option<&str>,
        ) -> Result<RosterLoadResult, LoadError> {
            let gate = self.gates.lock().unwrap().remove(&game.map(str::to_string));
            match gate {
                Some(gate) => gate.await.map_err(|_| LoadError::Network {
                    message: "gate dropped".to_string(),
                }),
                None => Err(LoadError::Network {
                    message: format!("no gate for {:?}", game),
                }),
            }
        }
    }

    fn loaded() -> RosterLoadResult {
        RosterLoadResult {
            roster_a: Roster::from_names(["Rik", "Joe"]),
            roster_b: Roster::from_names(["Darren"]),
            meta: GameMeta {
                date: "2023-10-04".to_string(),
                colour_a: "ff0000".to_string(),
                colour_b: "0000ff".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_load_failure_fails_session() {
        let source = InMemoryRosterSource::failing(LoadError::Network {
            message: "connection refused".to_string(),
        });
        let submitter = ScoreSubmitter::new(RecordingScorePoster::new());
        let handle = SessionController::new(source, submitter, Credential::new("t")).spawn();

        assert_eq!(handle.wait_until_settled().await.unwrap(), SessionState::Failed);
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.last_error.unwrap().contains("connection refused"));
        assert!(handle.increment(Team::A, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_explicit_game_is_requested() {
        let source = InMemoryRosterSource::new(loaded());
        let submitter = ScoreSubmitter::new(RecordingScorePoster::new());
        let handle = SessionController::new(source.clone(), submitter, Credential::new("t"))
            .with_game("2023-10-04")
            .spawn();

        handle.wait_until_settled().await.unwrap();
        handle.reload(None).await.unwrap();

        let requests = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let requests = source.requests().await;
                if requests.len() == 2 {
                    return requests;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(requests, vec![Some("2023-10-04".to_string()), None]);
    }

    #[tokio::test]
    async fn test_superseded_reload_is_dropped() {
        let source = GatedRosterSource::new();
        source.gate(None).send(loaded()).unwrap();
        let old_gate = source.gate(Some("old"));
        let new_gate = source.gate(Some("new"));

        let submitter = ScoreSubmitter::new(RecordingScorePoster::new());
        let handle = SessionController::new(source, submitter, Credential::new("t")).spawn();
        assert_eq!(handle.wait_until_settled().await.unwrap(), SessionState::Ready);

        handle.reload(Some("old".to_string())).await.unwrap();
        handle.reload(Some("new".to_string())).await.unwrap();

        let mut newest = loaded();
        newest.roster_a = Roster::from_names(["Pete", "Cal", "Oli"]);
        new_gate.send(newest).unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let snapshot = handle.snapshot().await.unwrap();
                if snapshot.ledger.roster(Team::A).len() == 3 {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        handle.increment(Team::A, 2).await.unwrap();

        let mut stale = loaded();
        stale.roster_a = Roster::from_names(["Stale"]);
        old_gate.send(stale).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(
            snapshot.ledger.roster(Team::A),
            &Roster::from_names(["Pete", "Cal", "Oli"])
        );
        assert_eq!(snapshot.ledger.tally(Team::A), &[0, 0, 1]);
        assert_eq!(snapshot.state, SessionState::Ready);
    }

    #[tokio::test]
    async fn test_out_of_range_index_closes_session() {
        let submitter = ScoreSubmitter::new(RecordingScorePoster::new());
        let handle = SessionController::new(
            InMemoryRosterSource::new(loaded()),
            submitter,
            Credential::new("t"),
        )
        .spawn();
        assert_eq!(handle.wait_until_settled().await.unwrap(), SessionState::Ready);

        assert_eq!(
            handle.increment(Team::B, 5).await.unwrap_err(),
            SessionError::Closed
        );
        assert_eq!(handle.snapshot().await.unwrap_err(), SessionError::Closed);
    }

    #[tokio::test]
    async fn test_confirm_policy_keeps_tallies_on_failure() {
        let poster = RecordingScorePoster::new().failing_player("Joe");
        let submitter = ScoreSubmitter::new(poster);
        let handle = SessionController::new(
            InMemoryRosterSource::new(loaded()),
            submitter,
            Credential::new("t"),
        )
        .with_reset_policy(ResetPolicy::ConfirmBeforeReset)
        .spawn();

        handle.wait_until_settled().await.unwrap();
        handle.increment(Team::A, 1).await.unwrap();
        let receipt = handle.post().await.unwrap();

        let outcome = receipt.outcome().await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(handle.wait_until_settled().await.unwrap(), SessionState::Failed);

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.ledger.tally(Team::A), &[0, 1]);
        assert!(snapshot.last_error.unwrap().contains("Joe"));
    }

    #[tokio::test]
    async fn test_confirm_policy_resets_on_success() {
        let submitter = ScoreSubmitter::new(RecordingScorePoster::new());
        let handle = SessionController::new(
            InMemoryRosterSource::new(loaded()),
            submitter,
            Credential::new("t"),
        )
        .with_reset_policy(ResetPolicy::ConfirmBeforeReset)
        .spawn();

        handle.wait_until_settled().await.unwrap();
        handle.increment(Team::B, 0).await.unwrap();
        handle.post().await.unwrap().outcome().await.unwrap();

        assert_eq!(handle.wait_until_settled().await.unwrap(), SessionState::Posted);
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.ledger.aggregate(Team::B), 0);
    }
}
