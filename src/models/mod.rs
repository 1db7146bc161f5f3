pub mod entry;
pub mod ledger;
pub mod outcome;
pub mod retention;

pub use entry::{Entry, EntryId};
pub use ledger::{Counters, HandledSet, SideStats};
pub use outcome::{ErrorReason, Outcome, PurgeAction, SkipReason};
pub use retention::RetentionCutoff;
