//! Participants and the roster.
//!
//! A single [`ParticipantState`] type covers every participant variant;
//! behaviour differences (cooperation-aware prompts, traitor context) are
//! capability flags on the record rather than separate types.

mod roster;
mod state;

pub use roster::Roster;
pub use state::{ParticipantId, ParticipantState, ParticipantStats, Role, RoleStatus};
