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

//! Homepage, currency, destination and submit steps of the search form.

use std::time::Duration;

use delulu_page_driver::PageDriver;
use tracing::{Instrument, Span};

use crate::config::SearchConfig;
use crate::errors::BookingError;
use crate::selectors;

pub struct BookingNavigator<'a, D: PageDriver> {
    driver: &'a D,
    base_url: String,
    timeout: Duration,
    span: Span,
}

impl<'a, D: PageDriver> BookingNavigator<'a, D> {
    pub fn new(driver: &'a D, config: &SearchConfig) -> Self {
        Self {
            driver,
            base_url: config.base_url.clone(),
            timeout: config.wait_timeout(),
            span: tracing::info_span!("navigator"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn go_to_home_page(&self) -> Result<(), BookingError> {
        async {
            tracing::info!("Navigating to {}", self.base_url);
            self.driver.goto(&self.base_url).await?;
            self.driver
                .wait_until_present(&selectors::SEARCH_INPUT, self.timeout)
                .await
                .inspect_err(|_| tracing::error!("Timeout waiting for homepage to load"))?;
            tracing::info!("Homepage loaded successfully");
            Ok::<_, BookingError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// `code` must match the label shown in the currency picker, e.g. `EUR`
    pub async fn change_currency(&self, code: &str) -> Result<(), BookingError> {
        async {
            tracing::info!("Changing currency to {}", code);
            let trigger = self
                .driver
                .wait_until_clickable(&selectors::CURRENCY_BUTTON, self.timeout)
                .await?;
            self.driver.click(&trigger).await?;

            let option = self
                .driver
                .wait_until_clickable(&selectors::currency_item(code), self.timeout)
                .await?;
            self.driver.click(&option).await?;
            tracing::info!("Currency changed to {}", code);
            Ok::<_, BookingError>(())
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to change currency: {}", e))
    }

    pub async fn search_city(&self, city: &str) -> Result<(), BookingError> {
        async {
            tracing::info!("Entering city: {}", city);
            let input = self
                .driver
                .wait_until_clickable(&selectors::CITY_INPUT, self.timeout)
                .await?;
            self.driver.clear(&input).await?;
            self.driver.send_keys(&input, city).await?;
            tracing::info!("City '{}' entered successfully", city);
            Ok::<_, BookingError>(())
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to enter city name: {}", e))
    }

    pub async fn submit_search(&self) -> Result<(), BookingError> {
        async {
            tracing::info!("Submitting search");
            let search_box = self
                .driver
                .wait_until_present(&selectors::SEARCH_BOX, self.timeout)
                .await?;
            let button = self
                .driver
                .find_in(&search_box, &selectors::SEARCH_BUTTON)
                .await?;
            self.driver.click(&button).await?;
            tracing::info!("Search submitted successfully");
            Ok::<_, BookingError>(())
        }
        .instrument(self.span.clone())
        .await
        .inspect_err(|e| tracing::error!("Failed to submit search: {}", e))
    }
}
