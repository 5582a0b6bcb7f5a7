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

use std::time::Duration;

use delulu_page_driver::PageDriver;
use tracing::{Instrument, Span};

use crate::calendar_navigator::{CalendarNavigator, NavigationOutcome};
use crate::config::SearchConfig;
use crate::errors::BookingError;
use crate::search_params::TargetDate;
use crate::selectors;

pub struct DatePicker<'a, D: PageDriver> {
    driver: &'a D,
    navigator: CalendarNavigator<'a, D>,
    timeout: Duration,
    span: Span,
}

impl<'a, D: PageDriver> DatePicker<'a, D> {
    pub fn new(driver: &'a D, config: &SearchConfig) -> Self {
        let span = tracing::info_span!("date_picker");
        let navigator = CalendarNavigator::new(driver, config)
            .with_span(tracing::info_span!(parent: &span, "calendar"));
        Self {
            driver,
            navigator,
            timeout: config.wait_timeout(),
            span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.navigator = self
            .navigator
            .with_span(tracing::info_span!(parent: &span, "calendar"));
        self.span = span;
        self
    }

    /// Open the date picker and click both days.
    ///
    /// A month the calendar never showed is only a warning here; the day cell
    /// wait that follows turns it into a timeout if the day really is absent.
    pub async fn select_dates(
        &self,
        check_in: &TargetDate,
        check_out: &TargetDate,
    ) -> Result<(NavigationOutcome, NavigationOutcome), BookingError> {
        async {
            tracing::info!("Selecting dates: {} to {}", check_in, check_out);

            let container = self
                .driver
                .wait_until_clickable(&selectors::DATE_CONTAINER, self.timeout)
                .await?;
            self.driver.click(&container).await?;

            let check_in_outcome = self.select_day("Check-in", check_in).await?;
            let check_out_outcome = self.select_day("Check-out", check_out).await?;
            Ok::<_, BookingError>((check_in_outcome, check_out_outcome))
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to select dates: {}", e))
    }

    async fn select_day(
        &self,
        what: &str,
        date: &TargetDate,
    ) -> Result<NavigationOutcome, BookingError> {
        let outcome = self.navigator.navigate_to_month(date).await?;
        if !outcome.is_found() {
            tracing::warn!(
                "{} month {} not shown after {} step(s), trying the day anyway",
                what,
                date.month_label(),
                outcome.advances()
            );
        }

        let cell = self
            .driver
            .wait_until_clickable(&selectors::date_cell(date), self.timeout)
            .await?;
        self.driver.click(&cell).await?;
        tracing::info!("{} date {} selected", what, date);
        Ok(outcome)
    }
}
