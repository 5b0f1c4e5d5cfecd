//! Game engine
//!
//! Pure and deterministic given a seed:
//! - Seeded RNG only
//! - No real clock; time arrives as timer tickets
//! - No rendering; tokens are driven through platform handles

pub mod judge;
pub mod placement;
pub mod scheduler;
pub mod session;
pub mod token;

pub use judge::{JudgePhase, SequenceJudge, Verdict};
pub use placement::{PlacementField, PlacementRound, overlaps};
pub use scheduler::{RoundScheduler, SchedulerPhase, TickOutcome, TickRequest, TickTicket};
pub use session::GameSession;
pub use token::{Identified, Positionable, Revealable, Token, TokenId};
