//!  Delulu Booking Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Calendar Navigator
//!
//! Pages a date-picker forward until the header of the wanted month is
//! rendered. The search is a linear scan bounded by a step cap:
//!
//! ```text
//! for step in 0..cap:
//!     header present?  -> Found { advances: step }
//!     otherwise        -> click "next month"
//! -> Exhausted { advances: cap }
//! ```
//!
//! The widget only ever moves forward, so a month before the current view is
//! unreachable and burns the whole budget.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use delulu_page_driver::PageDriver;
use tracing::{Instrument, Span};

use crate::config::SearchConfig;
use crate::errors::BookingError;
use crate::search_params::TargetDate;
use crate::selectors;

pub const DEFAULT_MAX_MONTH_NAVIGATION: u32 = 24;

/// A month of the proleptic Gregorian calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// The month `n` steps later
    pub fn plus_months(self, n: u32) -> Self {
        let ordinal = self.ordinal() + i64::from(n);
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(d: NaiveDate) -> Self {
        Self {
            year: d.year(),
            month: d.month(),
        }
    }
}

/// Number of forward steps from `current` to `target`, `None` if `target`
/// lies in the past of `current`.
pub fn month_distance(current: YearMonth, target: YearMonth) -> Option<u32> {
    u32::try_from(target.ordinal() - current.ordinal()).ok()
}

/// Whether [`CalendarNavigator::navigate_to_month`] finds `target` when the
/// widget opens on `current` with a budget of `cap` steps.
///
/// The last header check happens before the `cap`-th advance, so a month exactly
/// `cap` steps away is out of reach.
pub fn is_reachable(current: YearMonth, target: YearMonth, cap: u32) -> bool {
    month_distance(current, target).is_some_and(|d| d < cap)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Found { advances: u32 },
    /// The cap ran out. Soft failure: the caller decides what to do next.
    Exhausted { advances: u32 },
}

impl NavigationOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn advances(&self) -> u32 {
        match *self {
            Self::Found { advances } | Self::Exhausted { advances } => advances,
        }
    }
}

pub struct CalendarNavigator<'a, D: PageDriver> {
    driver: &'a D,
    max_steps: u32,
    timeout: Duration,
    span: Span,
}

impl<'a, D: PageDriver> CalendarNavigator<'a, D> {
    pub fn new(driver: &'a D, config: &SearchConfig) -> Self {
        Self {
            driver,
            max_steps: config.max_month_navigation,
            timeout: config.wait_timeout(),
            span: tracing::info_span!("calendar"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Advance the open calendar until `target`'s month header is shown.
    ///
    /// A missing calendar container is a hard error. Running out of steps is
    /// not: it is logged and reported as [`NavigationOutcome::Exhausted`].
    pub async fn navigate_to_month(
        &self,
        target: &TargetDate,
    ) -> Result<NavigationOutcome, BookingError> {
        let month_year = target.month_label();
        async {
            tracing::info!("Navigating to {}", month_year);

            let calendar = self
                .driver
                .wait_until_present(&selectors::CALENDAR, self.timeout)
                .await
                .inspect_err(|e| {
                    tracing::error!("Error navigating to month {}: {}", month_year, e)
                })?;
            let header = selectors::month_header(&month_year);

            for step in 0..self.max_steps {
                let shown = !self.driver.find_all_in(&calendar, &header).await?.is_empty();
                if shown {
                    tracing::info!("Found {} in the calendar", month_year);
                    return Ok(NavigationOutcome::Found { advances: step });
                }
                self.driver
                    .advance_calendar_month(&calendar, &selectors::NEXT_MONTH_BUTTON)
                    .await
                    .inspect_err(|e| {
                        tracing::error!("Error navigating to month {}: {}", month_year, e)
                    })?;
                tracing::debug!("Clicked next month, looking for {}", month_year);
            }

            tracing::warn!(
                "Could not find {} after {} attempts",
                month_year,
                self.max_steps
            );
            Ok::<_, BookingError>(NavigationOutcome::Exhausted {
                advances: self.max_steps,
            })
        }
        .instrument(self.span.clone())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn distance_crosses_year_boundary() {
        assert_eq!(month_distance(ym(2026, 11), ym(2027, 2)), Some(3));
        assert_eq!(month_distance(ym(2026, 11), ym(2026, 11)), Some(0));
        assert_eq!(month_distance(ym(2026, 11), ym(2026, 10)), None);
    }

    #[test]
    fn reachability_is_strictly_below_cap() {
        let now = ym(2026, 10);
        assert!(is_reachable(now, now, 1));
        assert!(is_reachable(now, ym(2028, 9), 24));
        assert!(!is_reachable(now, ym(2028, 10), 24));
        assert!(!is_reachable(now, ym(2026, 9), 24));
    }

    #[test]
    fn plus_months_wraps() {
        assert_eq!(ym(2026, 12).plus_months(1), ym(2027, 1));
        assert_eq!(ym(2026, 1).plus_months(25), ym(2028, 2));
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(YearMonth::new(2026, 0).is_none());
        assert!(YearMonth::new(2026, 13).is_none());
    }

    #[test]
    fn outcome_accessors() {
        assert!(NavigationOutcome::Found { advances: 0 }.is_found());
        assert_eq!(NavigationOutcome::Exhausted { advances: 24 }.advances(), 24);
    }
}
