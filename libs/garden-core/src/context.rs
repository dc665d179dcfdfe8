//! Explicit clock and calendar context for a derivation pass

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

use crate::date_utils::local_date;

/// "Now" and the local calendar used by a derivation pass
///
/// Derivations never read the system clock themselves; the caller decides
/// what "now" and "today" mean and passes it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationContext {
    /// Evaluation instant
    pub now: DateTime<Utc>,
    /// Offset used to resolve local calendar days
    pub offset: FixedOffset,
}

impl DerivationContext {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Context evaluated in UTC
    #[must_use]
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    /// Context for the system clock and local offset
    #[must_use]
    pub fn local() -> Self {
        let now = Local::now();
        Self::new(now.with_timezone(&Utc), now.offset().fix())
    }

    /// Current local calendar day
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        local_date(self.now, self.offset)
    }

    /// Local calendar day of `instant`
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        local_date(instant, self.offset)
    }
}
