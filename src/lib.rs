pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::http::ApiClient;
pub use adapters::memory::{InMemoryRosterSource, RecordingScorePoster};
pub use adapters::roster_client::{HttpRosterClient, SplitRosterClient};
pub use adapters::score_poster::HttpScorePoster;
pub use app::controller_from_config;
pub use config::TallyConfig;
pub use crate::core::controller::{PostReceipt, ResetPolicy, SessionController, SessionHandle};
pub use crate::core::ledger::ScoreLedger;
pub use crate::core::session::{Session, SessionSnapshot, SessionState};
pub use crate::core::submitter::{PostOutcome, ScoreSubmitter};
pub use domain::model::{Credential, GameMeta, Player, Roster, RosterLoadResult, Team};
pub use utils::error::{LoadError, Result, SessionError, SubmitError, TallyError};
