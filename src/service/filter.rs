use crate::models::filter_spec::FilterSpec;
use crate::models::log_record::{History, HistoryEntry};

/// Derive the visible subset of `history`.
///
/// Each constraint is an independent predicate, so the result does not depend
/// on the order they are checked in. Surviving entries keep their
/// newest-first order. A `from` later than `to` simply matches nothing.
pub fn apply_filter(history: &History, spec: &FilterSpec) -> History {
    if spec.is_unconstrained() {
        return history.clone();
    }

    history
        .iter()
        .filter(|entry| entry_matches(entry, spec))
        .cloned()
        .collect()
}

fn entry_matches(entry: &HistoryEntry, spec: &FilterSpec) -> bool {
    if let Some(level) = spec.level {
        if entry.level() != level {
            return false;
        }
    }

    if !spec.has_time_bound() {
        return true;
    }

    // An unparsable timestamp never falls inside a time window
    let Some(instant) = entry.record.instant() else {
        return false;
    };

    if let Some(from) = spec.from {
        if instant < from {
            return false;
        }
    }

    if let Some(to) = spec.to {
        if instant > to {
            return false;
        }
    }

    true
}
