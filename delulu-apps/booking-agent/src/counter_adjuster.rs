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

//! # Occupancy Counters
//!
//! The adults / children widgets only expose "-" and "+" buttons around a
//! read-only input. Setting a count is done in two phases:
//!
//! 1. reset: click "-" while the live input value is above the baseline,
//!    re-reading it after every click;
//! 2. raise: click "+" `target - baseline` times without reading back.
//!
//! The reset never clicks "+". If the widget sits below the baseline (a UI
//! floor), or a click has not moved it by the end of the wait timeout, the
//! reset stops with a warning.

use std::cmp::Ordering;
use std::time::Duration;

use delulu_page_driver::{DriverError, PageDriver};
use tokio::time::{self, Instant};
use tracing::{Instrument, Span};

use crate::config::SearchConfig;
use crate::errors::{BookingError, ValidationError};
use crate::search_params::MAX_CHILD_AGE;
use crate::selectors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
}

/// The clicks that move a counter from `current` to `target`,
/// assuming every click moves it by exactly one.
pub fn steps_to_converge(current: u32, target: u32) -> Vec<CounterAction> {
    match current.cmp(&target) {
        Ordering::Greater => vec![CounterAction::Decrement; (current - target) as usize],
        Ordering::Less => vec![CounterAction::Increment; (target - current) as usize],
        Ordering::Equal => Vec::new(),
    }
}

/// Force a child age into `0..=17`. Returns the age and whether it changed.
pub fn clamp_child_age(age: i32) -> (i32, bool) {
    let clamped = age.clamp(0, MAX_CHILD_AGE);
    (clamped, clamped != age)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    Reached,
    /// The widget already read below the target; nothing was clicked past that point
    BelowTarget { current: u32 },
    /// A "-" click left the value unchanged for the whole wait timeout
    Stuck { current: u32 },
}

impl AdjustOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached)
    }
}

struct CounterButtons<E> {
    minus: E,
    plus: E,
}

pub struct CounterAdjuster<'a, D: PageDriver> {
    driver: &'a D,
    timeout: Duration,
    span: Span,
}

impl<'a, D: PageDriver> CounterAdjuster<'a, D> {
    pub fn new(driver: &'a D, config: &SearchConfig) -> Self {
        Self {
            driver,
            timeout: config.wait_timeout(),
            span: tracing::info_span!("occupancy"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn open_occupancy_menu(&self) -> Result<(), BookingError> {
        let toggle = self
            .driver
            .wait_until_clickable(&selectors::OCCUPANCY_CONFIG, self.timeout)
            .await
            .inspect_err(|e| tracing::error!("Failed to open occupancy menu: {}", e))?;
        self.driver.click(&toggle).await?;
        tracing::info!("Occupancy menu opened");
        Ok(())
    }

    /// Live value of the counter input `counter_id`
    pub async fn read_value(&self, counter_id: &str) -> Result<u32, BookingError> {
        let input = self.driver.find(&selectors::counter_input(counter_id)).await?;
        let raw = self.driver.read_attribute(&input, "value").await?;
        let parsed: Option<u32> = raw.as_deref().and_then(|v| v.trim().parse().ok());
        match parsed {
            Some(value) => Ok(value),
            None => Err(BookingError::CounterValue {
                counter: counter_id.to_string(),
                value: raw,
            }),
        }
    }

    async fn counter_buttons(
        &self,
        counter_id: &str,
    ) -> Result<CounterButtons<D::Element>, BookingError> {
        let root = self.driver.find(&selectors::counter_root(counter_id)).await?;
        let mut buttons = self
            .driver
            .find_all_in(&root, &selectors::COUNTER_BUTTON)
            .await?
            .into_iter();
        match (buttons.next(), buttons.next()) {
            (Some(minus), Some(plus)) => Ok(CounterButtons { minus, plus }),
            _ => Err(DriverError::not_found(format_args!(
                "-/+ buttons of counter `{}`",
                counter_id
            ))
            .into()),
        }
    }

    /// Click "-" until the live value of `counter_id` equals `target`.
    /// Never clicks "+".
    pub async fn adjust_to(
        &self,
        counter_id: &str,
        target: u32,
    ) -> Result<AdjustOutcome, BookingError> {
        async {
            let buttons = self.counter_buttons(counter_id).await?;
            self.reset_with(&buttons.minus, counter_id, target).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Click "+" of `counter_id` exactly `n` times
    pub async fn increment_by(&self, counter_id: &str, n: u32) -> Result<(), BookingError> {
        async {
            let buttons = self.counter_buttons(counter_id).await?;
            self.click_times(&buttons.plus, n).await
        }
        .instrument(self.span.clone())
        .await
    }

    async fn reset_with(
        &self,
        minus: &D::Element,
        counter_id: &str,
        target: u32,
    ) -> Result<AdjustOutcome, BookingError> {
        let mut current = self.read_value(counter_id).await?;
        loop {
            match current.cmp(&target) {
                Ordering::Equal => return Ok(AdjustOutcome::Reached),
                Ordering::Less => {
                    tracing::warn!("Current value {} is less than target {}", current, target);
                    return Ok(AdjustOutcome::BelowTarget { current });
                }
                Ordering::Greater => {
                    self.driver.click(minus).await?;
                    let after = self.read_value_below(counter_id, current).await?;
                    if after >= current {
                        tracing::warn!(
                            "Counter `{}` did not go below {} (target {})",
                            counter_id,
                            after,
                            target
                        );
                        return Ok(AdjustOutcome::Stuck { current: after });
                    }
                    current = after;
                }
            }
        }
    }

    /// Re-read `counter_id` until it drops below `before` or the wait timeout
    /// elapses. The widget may render the new value a moment after the click.
    async fn read_value_below(
        &self,
        counter_id: &str,
        before: u32,
    ) -> Result<u32, BookingError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let value = self.read_value(counter_id).await?;
            let now = Instant::now();
            if value < before || now >= deadline {
                return Ok(value);
            }
            time::sleep(self.driver.poll_interval().min(deadline - now)).await;
        }
    }

    async fn click_times(&self, button: &D::Element, n: u32) -> Result<(), BookingError> {
        for _ in 0..n {
            self.driver.click(button).await?;
        }
        Ok(())
    }

    /// Reset adults to 1 then raise to `num_adults`. Zero is raised to 1.
    pub async fn set_adults(&self, num_adults: u32) -> Result<AdjustOutcome, BookingError> {
        let num_adults = if num_adults < 1 {
            tracing::warn!("Number of adults must be at least 1, setting to 1");
            1
        } else {
            num_adults
        };

        async {
            tracing::info!("Setting number of adults to {}", num_adults);
            self.open_occupancy_menu().await?;

            let buttons = self.counter_buttons(selectors::ADULTS_INPUT_ID).await?;
            let outcome = self
                .reset_with(&buttons.minus, selectors::ADULTS_INPUT_ID, 1)
                .await?;
            self.click_times(&buttons.plus, num_adults - 1).await?;

            tracing::info!("Set adults to {}", num_adults);
            Ok::<_, BookingError>(outcome)
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to set number of adults: {}", e))
    }

    /// Set the children count and every child's age.
    ///
    /// A count that disagrees with `ages` is rejected before any click.
    /// Out-of-range ages are clamped, see [`clamp_child_age`].
    pub async fn set_children(
        &self,
        num_children: u32,
        ages: &[i32],
    ) -> Result<AdjustOutcome, BookingError> {
        if num_children as usize != ages.len() {
            return Err(ValidationError::ChildrenAgesMismatch {
                children: num_children,
                ages: ages.len(),
            }
            .into());
        }

        async {
            tracing::info!("Setting {} children with ages {:?}", num_children, ages);

            // usually still open from set_adults
            let menu_open = !self
                .driver
                .find_all(&selectors::counter_input(selectors::ADULTS_INPUT_ID))
                .await?
                .is_empty();
            if !menu_open {
                self.open_occupancy_menu().await?;
            }

            let buttons = self.counter_buttons(selectors::CHILDREN_INPUT_ID).await?;
            let outcome = self
                .reset_with(&buttons.minus, selectors::CHILDREN_INPUT_ID, 0)
                .await?;
            self.click_times(&buttons.plus, num_children).await?;

            for (index, &age) in ages.iter().enumerate() {
                self.set_child_age(index, age).await?;
            }

            tracing::info!("Successfully set {} children with ages {:?}", num_children, ages);
            Ok::<_, BookingError>(outcome)
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to set children: {}", e))
    }

    /// Pick `age` in the age dropdown of the `index`-th child (0-based)
    pub async fn set_child_age(&self, index: usize, age: i32) -> Result<(), BookingError> {
        let (age, clamped) = clamp_child_age(age);
        if clamped {
            tracing::warn!(
                "Child age for child {} is outside valid range (0-{}), clamping to {}",
                index + 1,
                MAX_CHILD_AGE,
                age
            );
        }

        let selectors_found = self.driver.find_all(&selectors::KIDS_AGE_SELECT).await?;
        let Some(container) = selectors_found.get(index) else {
            tracing::error!(
                "Failed to set age for child {}: only {} age selector(s) on the page",
                index + 1,
                selectors_found.len()
            );
            return Err(DriverError::not_found(format_args!(
                "age selector #{} ({})",
                index + 1,
                selectors::KIDS_AGE_SELECT
            ))
            .into());
        };
        let dropdown = self
            .driver
            .find_in(container, &selectors::AGE_DROPDOWN)
            .await?;
        self.driver
            .set_value_and_dispatch_change(&dropdown, &age.to_string())
            .await?;

        tracing::info!("Set age for child {} to {}", index + 1, age);
        Ok(())
    }
}
