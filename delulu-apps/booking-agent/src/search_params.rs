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

//! # Search Parameters
//!
//! Side-effect free, validated inputs of a hotel search. Everything here is
//! checked before the browser is touched.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::calendar_navigator::YearMonth;
use crate::errors::ValidationError;

pub const MAX_CHILD_AGE: i32 = 17;

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape regex is valid")
});

/// A calendar day the date picker has to land on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    /// Parse a strict `YYYY-MM-DD` date. `2026-3-7` is rejected even though
    /// chrono would accept it.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if !DATE_SHAPE.is_match(s) {
            return Err(ValidationError::DateFormat(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::DateFormat(s.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                ValidationError::DateFormat(format!("{:04}-{:02}-{:02}", year, month, day))
            })
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::from(self.0)
    }

    /// Calendar header text, e.g. `"March 2027"`.
    /// chrono's `%B` is always English unless the `unstable-locales` feature
    /// is enabled, which this crate never does.
    pub fn month_label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }

    /// Value of the `data-date` attribute of the day cell
    pub fn cell_key(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for TargetDate {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

impl From<TargetDate> for String {
    fn from(d: TargetDate) -> String {
        d.cell_key()
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Adults, children and the age of every child
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OccupancyRequest {
    adults: u32,
    children: u32,
    child_ages: Vec<i32>,
}

impl OccupancyRequest {
    /// `adults == 0` is raised to 1 with a warning. A children count that
    /// disagrees with the ages, or an age outside 0..=17, is rejected.
    pub fn new(adults: u32, children: u32, child_ages: Vec<i32>) -> Result<Self, ValidationError> {
        if child_ages.len() != children as usize {
            return Err(ValidationError::ChildrenAgesMismatch {
                children,
                ages: child_ages.len(),
            });
        }
        if let Some(&age) = child_ages.iter().find(|&&a| !(0..=MAX_CHILD_AGE).contains(&a)) {
            return Err(ValidationError::ChildAge(age));
        }

        let adults = if adults < 1 {
            tracing::warn!("Number of adults must be at least 1, setting to 1");
            1
        } else {
            adults
        };

        Ok(Self {
            adults,
            children,
            child_ages,
        })
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn child_ages(&self) -> &[i32] {
        &self.child_ages
    }
}

impl Default for OccupancyRequest {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            child_ages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchParams {
    pub city: String,
    pub check_in: TargetDate,
    pub check_out: TargetDate,
    pub occupancy: OccupancyRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl SearchParams {
    pub fn builder(
        city: impl Into<String>,
        check_in: TargetDate,
        check_out: TargetDate,
        occupancy: OccupancyRequest,
    ) -> SearchParamsBuilder {
        SearchParamsBuilder {
            city: city.into(),
            check_in,
            check_out,
            occupancy,
            currency: None,
        }
    }

    pub fn nights(&self) -> i64 {
        (self.check_out.as_naive_date() - self.check_in.as_naive_date()).num_days()
    }

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.city.trim().is_empty() {
            return Err(ValidationError::EmptyCity);
        }
        if self.check_in.as_naive_date() < today {
            return Err(ValidationError::CheckInInPast(self.check_in.as_naive_date()));
        }
        if self.check_out <= self.check_in {
            return Err(ValidationError::DateOrder {
                check_in: self.check_in.as_naive_date(),
                check_out: self.check_out.as_naive_date(),
            });
        }
        Ok(())
    }
}

fn normalize_currency(code: &str) -> Result<String, ValidationError> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(ValidationError::Currency(code.to_string()))
    }
}

#[derive(Clone)]
pub struct SearchParamsBuilder {
    city: String,
    check_in: TargetDate,
    check_out: TargetDate,
    occupancy: OccupancyRequest,
    currency: Option<String>,
}

impl SearchParamsBuilder {
    /// Empty strings mean "keep the site default"
    pub fn currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency.filter(|c| !c.trim().is_empty());
        self
    }

    /// Validate against the local calendar day
    pub fn build(self) -> Result<SearchParams, ValidationError> {
        self.build_as_of(chrono::Local::now().date_naive())
    }

    pub fn build_as_of(self, today: NaiveDate) -> Result<SearchParams, ValidationError> {
        let currency = self.currency.as_deref().map(normalize_currency).transpose()?;
        let params = SearchParams {
            city: self.city.trim().to_string(),
            check_in: self.check_in,
            check_out: self.check_out,
            occupancy: self.occupancy,
            currency,
        };
        params.validate(today)?;
        Ok(params)
    }
}
