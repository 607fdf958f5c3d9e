pub mod controller;
pub mod ledger;
pub mod session;
pub mod submitter;

pub use crate::domain::model::{Credential, GameMeta, Player, Roster, RosterLoadResult, Team};
pub use crate::domain::ports::{ConfigProvider, RosterSource, ScorePosting};
pub use crate::utils::error::Result;
