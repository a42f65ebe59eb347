// ABOUTME: Rollout supervision: phases, readiness rules, and the watch-and-rollback driver.
// ABOUTME: The transition function is pure; the supervisor performs the resulting actions.

mod error;
mod phase;
mod readiness;
mod state;
mod supervisor;

pub use error::{RolloutError, RolloutErrorKind};
pub use phase::{Action, Event, Phase, transition};
pub use readiness::{
    FATAL_WAIT_REASONS, FailureCause, MAX_RESTARTS, Readiness, assess, detect_failure, is_ready,
};
pub use state::{RollbackSkipped, RolloutState};
pub use supervisor::{
    DEFAULT_POLL_INTERVAL, DEFAULT_WATCH_TIMEOUT, Supervisor, UpdateRequest, WatchOptions,
};
