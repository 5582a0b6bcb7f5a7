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

//! # Booking Search
//!
//! Effectful (browser) sequencing of a full search:
//!
//! home -> [currency] -> city -> dates -> adults -> [children] -> submit
//!
//! Steps run one after the other and nothing is retried. The first hard
//! failure aborts the search and leaves the page wherever it got to.

use delulu_page_driver::PageDriver;
use serde::Serialize;
use tracing::{Instrument, Span};

use crate::booking_navigator::BookingNavigator;
use crate::calendar_navigator::NavigationOutcome;
use crate::config::SearchConfig;
use crate::counter_adjuster::{AdjustOutcome, CounterAdjuster};
use crate::date_picker::DatePicker;
use crate::errors::BookingError;
use crate::search_params::SearchParams;

/// Soft outcomes of a submitted search, for callers that care whether the
/// widgets converged cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchReport {
    pub check_in_month_found: bool,
    pub check_out_month_found: bool,
    pub calendar_advances: u32,
    pub adults_reset_clean: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children_reset_clean: Option<bool>,
}

impl SearchReport {
    fn new(
        dates: (NavigationOutcome, NavigationOutcome),
        adults: AdjustOutcome,
        children: Option<AdjustOutcome>,
    ) -> Self {
        Self {
            check_in_month_found: dates.0.is_found(),
            check_out_month_found: dates.1.is_found(),
            calendar_advances: dates.0.advances() + dates.1.advances(),
            adults_reset_clean: adults.is_reached(),
            children_reset_clean: children.map(|c| c.is_reached()),
        }
    }
}

/// One browser session running one search at a time
pub struct BookingSession<D: PageDriver> {
    driver: D,
    config: SearchConfig,
    span: Span,
}

impl<D: PageDriver> BookingSession<D> {
    pub fn new(driver: D, config: SearchConfig) -> Self {
        Self {
            driver,
            config,
            span: tracing::info_span!("booking"),
        }
    }

    /// Parent span of everything this session logs
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn search_accommodation(
        &self,
        params: &SearchParams,
    ) -> Result<SearchReport, BookingError> {
        let navigator = BookingNavigator::new(&self.driver, &self.config)
            .with_span(tracing::info_span!(parent: &self.span, "navigator"));
        let date_picker = DatePicker::new(&self.driver, &self.config)
            .with_span(tracing::info_span!(parent: &self.span, "date_picker"));
        let occupancy = CounterAdjuster::new(&self.driver, &self.config)
            .with_span(tracing::info_span!(parent: &self.span, "occupancy"));

        async {
            tracing::info!("Searching accommodations in {}", params.city);

            navigator.go_to_home_page().await?;
            if let Some(currency) = &params.currency {
                navigator.change_currency(currency).await?;
            }
            navigator.search_city(&params.city).await?;

            let dates = date_picker
                .select_dates(&params.check_in, &params.check_out)
                .await?;

            let occ = &params.occupancy;
            let adults = occupancy.set_adults(occ.adults()).await?;
            let children = if occ.children() > 0 {
                Some(occupancy.set_children(occ.children(), occ.child_ages()).await?)
            } else {
                None
            };

            navigator.submit_search().await?;
            tracing::info!("Search submitted successfully");
            Ok::<_, BookingError>(SearchReport::new(dates, adults, children))
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run one search then, if `teardown` is configured, quit the browser
    /// whatever the search outcome. The search error wins over a quit error.
    pub async fn run(self, params: &SearchParams) -> Result<SearchReport, BookingError> {
        let result = self.search_accommodation(params).await;
        if !self.config.teardown {
            return result;
        }

        tracing::info!(parent: &self.span, "Closing browser");
        match (result, self.driver.quit().await) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(quit_err)) => Err(quit_err.into()),
            (Err(search_err), Ok(())) => Err(search_err),
            (Err(search_err), Err(quit_err)) => {
                tracing::warn!(parent: &self.span, "Failed to close browser: {}", quit_err);
                Err(search_err)
            }
        }
    }
}
