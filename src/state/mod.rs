// State-change detection: attribute keys, snapshot diffing and audit persistence

mod attribute;
mod diff;
mod processor;

pub use attribute::{AttributeKey, GENERAL_LOCATION, UNKNOWN_TYPE};
pub use diff::{diff, value_string, DiffPolicy, StateDiffEngine, ValueComparison, ABSENT_VALUE};
pub use processor::{ProcessOutcome, StateChangeProcessor};
