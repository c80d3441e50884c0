//! Overflow policies for the async writer queue
//!
//! Decide what happens when a producer enqueues into a queue that already
//! holds `capacity` records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy for handling a full queue in an [`AsyncWriter`](crate::AsyncWriter)
///
/// Every policy except `Block` keeps producers non-blocking. Records that
/// survive are always delivered in enqueue order. The default never drops;
/// loss happens only under an explicitly chosen drop policy.
///
/// # Example
///
/// ```
/// use rust_log_dispatcher::OverflowPolicy;
///
/// assert_eq!(OverflowPolicy::default(), OverflowPolicy::Unbounded);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Never drop; the queue grows without limit
    ///
    /// Memory use is unbounded under sustained overload.
    #[default]
    Unbounded,

    /// Evict the oldest queued record to make room for the new one
    DropOldest,

    /// Discard the incoming record
    DropNewest,

    /// Block the producer until the consumer frees space
    ///
    /// Gives up the non-blocking producer guarantee in exchange for no loss.
    Block,
}

impl OverflowPolicy {
    /// Whether the queue capacity is enforced at all.
    pub fn is_bounded(&self) -> bool {
        !matches!(self, OverflowPolicy::Unbounded)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Unbounded => write!(f, "Unbounded"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::Block => write!(f, "Block"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when records are dropped due to queue overflow.
/// The parameter is the total count of dropped records so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
