use crate::models::error::{LogViewError, Result};
use crate::models::log_record::Severity;
use crate::utils::time::parse_instant;
use chrono::{DateTime, NaiveDate, Utc};

/// Operator-chosen view constraints. `None` leaves that dimension open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub level: Option<Severity>,
    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub to: Option<DateTime<Utc>>,
}

impl FilterSpec {
    pub fn is_unconstrained(&self) -> bool {
        self.level.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn has_time_bound(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Build a spec from raw query or CLI values.
    ///
    /// Blank values and the level `all` mean no constraint. Time-of-day
    /// bounds resolve against `today`.
    pub fn from_params(
        level: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self> {
        let level = match non_blank(level) {
            Some(lvl) if lvl.eq_ignore_ascii_case("all") => None,
            Some(lvl) => Some(lvl.parse::<Severity>()?),
            None => None,
        };

        Ok(Self {
            level,
            from: parse_bound("from", from, today)?,
            to: parse_bound("to", to, today)?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, value: Option<&str>, today: NaiveDate) -> Result<Option<DateTime<Utc>>> {
    match non_blank(value) {
        Some(raw) => parse_instant(raw, today).map(Some).ok_or_else(|| {
            LogViewError::InvalidFilter(format!(
                "'{}' bound '{}' is neither an RFC 3339 instant nor HH:MM[:SS]",
                name, raw
            ))
        }),
        None => Ok(None),
    }
}
