// Recipient Grouping
//
// Merges classified records into notification groups keyed by
// (recipients, urgency) so that nobody receives two mails for the same
// category out of one batch.

pub mod engine;
pub mod identity;

pub use engine::{GroupKey, GroupingEngine, GroupingOutcome, RecipientGroup, SkippedRecord};
pub use identity::{
    AliasDirectoryResolver, IdentityResolver, Recipients, SubstringResolver, merge_identities,
    normalize_identity,
};
