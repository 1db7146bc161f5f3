pub mod action_resolver;
pub mod audit_writer;
pub mod classifier;
pub mod confirmation;

pub use action_resolver::{PurgeActionResolver, ResolvedAction};
pub use audit_writer::AuditWriter;
pub use classifier::{Classification, EntryClassifier};
pub use confirmation::ConfirmationHandler;
