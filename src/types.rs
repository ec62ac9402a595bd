//! Shared types used across the codebase

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Item operations exposed by the router
/// Used for route naming and request logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    List,
    Create,
    Get,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list_items",
            Operation::Create => "create_item",
            Operation::Get => "get_item",
            Operation::Update => "update_item",
            Operation::Delete => "delete_item",
        }
    }

    /// Whether the operation writes to the store
    pub fn is_mutation(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Delete)
    }
}

/// Current UTC time at microsecond precision (the finest both stores keep)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for a mutation of a record last touched at `previous`.
/// Always strictly later than `previous`, even when the clock has not advanced.
pub fn refreshed_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refreshed_after_is_strictly_later() {
        let future = now() + Duration::seconds(60);
        let refreshed = refreshed_after(future);
        assert!(refreshed > future);
        assert_eq!(refreshed - future, Duration::microseconds(1));
    }

    #[test]
    fn refreshed_after_uses_clock_when_it_moved() {
        let past = now() - Duration::seconds(60);
        let refreshed = refreshed_after(past);
        assert!(refreshed - past >= Duration::seconds(60));
    }

    #[test]
    fn now_has_microsecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn mutations_are_flagged() {
        assert!(!Operation::List.is_mutation());
        assert!(!Operation::Get.is_mutation());
        assert!(Operation::Create.is_mutation());
        assert!(Operation::Update.is_mutation());
        assert!(Operation::Delete.is_mutation());
    }
}
