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

//! # Error taxonomy
//!
//! - [`ValidationError`]: malformed input, raised before any UI interaction.
//! - [`BookingError::Driver`]: missing element or expired wait, fatal for
//!   the current search.
//!
//! Soft outcomes (calendar cap reached, counter stuck below target) are not
//! errors; see `NavigationOutcome` and `AdjustOutcome`.

use chrono::NaiveDate;
use delulu_page_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Date '{0}' is not in YYYY-MM-DD format")]
    DateFormat(String),
    #[error("Check-in date {0} cannot be in the past")]
    CheckInInPast(NaiveDate),
    #[error("Check-out date {check_out} must be after check-in date {check_in}")]
    DateOrder {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("Number of ages provided ({ages}) doesn't match number of children ({children})")]
    ChildrenAgesMismatch { children: u32, ages: usize },
    #[error("Child age {0} must be between 0 and 17")]
    ChildAge(i32),
    #[error("Currency code must be a 3-letter code, got '{0}'")]
    Currency(String),
    #[error("City name cannot be empty")]
    EmptyCity,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("Counter `{counter}` holds a non-numeric value: {value:?}")]
    CounterValue {
        counter: String,
        value: Option<String>,
    },
}

impl BookingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_not_found())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_timeout())
    }
}
