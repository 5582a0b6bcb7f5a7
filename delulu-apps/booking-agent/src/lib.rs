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

// Library for delulu-booking
// Drives the Booking.com search form through a page driver

mod booking_navigator;
mod booking_search;
mod calendar_navigator;
mod config;
mod counter_adjuster;
mod date_picker;
mod errors;
mod search_params;

// Selectors are public so alternative page drivers (and tests) can match on them
pub mod selectors;

pub use booking_navigator::BookingNavigator;
pub use booking_search::{BookingSession, SearchReport};
pub use calendar_navigator::{
    CalendarNavigator, DEFAULT_MAX_MONTH_NAVIGATION, NavigationOutcome, YearMonth, is_reachable,
    month_distance,
};
pub use config::SearchConfig;
pub use counter_adjuster::{
    AdjustOutcome, CounterAction, CounterAdjuster, clamp_child_age, steps_to_converge,
};
pub use date_picker::DatePicker;
pub use errors::{BookingError, ValidationError};
pub use search_params::{
    MAX_CHILD_AGE, OccupancyRequest, SearchParams, SearchParamsBuilder, TargetDate,
};

// Re-export the page driver capability
pub use delulu_page_driver::{
    Browser, BrowserOptions, DriverError, Locator, PageDriver, WebDriverPage,
};
