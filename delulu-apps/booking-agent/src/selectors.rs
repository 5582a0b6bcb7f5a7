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

//! Booking.com markup. These mirror the live site and break whenever it is
//! redesigned.

use std::borrow::Cow;

use delulu_page_driver::Locator;

use crate::search_params::TargetDate;

pub const BASE_URL: &str = "https://www.booking.com";

// =============================================================================
// Navigation
// =============================================================================

pub const CURRENCY_BUTTON: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="header-currency-picker-trigger"]"#));
pub const SEARCH_INPUT: Locator = Locator::Css(Cow::Borrowed(r#"input[name="ss"]"#));
pub const CITY_INPUT: Locator = Locator::Name(Cow::Borrowed("ss"));
pub const SEARCH_BOX: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="searchbox-layout-wide"]"#));
pub const SEARCH_BUTTON: Locator = Locator::Css(Cow::Borrowed("button[type='submit']"));

pub fn currency_item(code: &str) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class, 'CurrencyPicker_currency') and text()='{}']/ancestor::button",
        code
    ))
}

// =============================================================================
// Date picker
// =============================================================================

pub const DATE_CONTAINER: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="searchbox-dates-container"]"#));
pub const CALENDAR: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="searchbox-datepicker-calendar"]"#));
pub const NEXT_MONTH_BUTTON: Locator = Locator::Css(Cow::Borrowed(r#"[aria-label="Next month"]"#));

pub fn date_cell(date: &TargetDate) -> Locator {
    Locator::css(format!(r#"span[data-date="{}"]"#, date.cell_key()))
}

/// Month header inside the calendar, relative to the calendar element
pub fn month_header(month_label: &str) -> Locator {
    Locator::xpath(format!(".//h3[contains(text(),'{}')]", month_label))
}

// =============================================================================
// Occupancy
// =============================================================================

pub const OCCUPANCY_CONFIG: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="occupancy-config"]"#));
pub const ADULTS_INPUT_ID: &str = "group_adults";
pub const CHILDREN_INPUT_ID: &str = "group_children";
pub const KIDS_AGE_SELECT: Locator =
    Locator::Css(Cow::Borrowed(r#"[data-testid="kids-ages-select"]"#));
pub const AGE_DROPDOWN: Locator = Locator::Tag(Cow::Borrowed("select"));
/// Minus then plus, in document order
pub const COUNTER_BUTTON: Locator = Locator::Tag(Cow::Borrowed("button"));

pub fn counter_input(input_id: &str) -> Locator {
    Locator::id(input_id.to_string())
}

/// The `div` wrapping a counter input and its two buttons
pub fn counter_root(input_id: &str) -> Locator {
    Locator::xpath(format!(r#"//input[@id="{}"]/parent::div"#, input_id))
}
