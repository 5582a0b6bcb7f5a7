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

//! Runtime knobs of a search session. Every field has a default so a JSON
//! config file may set only what it cares about.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use delulu_page_driver::{Browser, BrowserOptions};
use serde::{Deserialize, Serialize};

use crate::calendar_navigator::DEFAULT_MAX_MONTH_NAVIGATION;
use crate::selectors::BASE_URL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct SearchConfig {
    pub base_url: String,
    pub webdriver_url: String,
    pub browser: Browser,
    pub headless: bool,
    /// Quit the browser once the search is over, whatever its outcome
    pub teardown: bool,
    /// Forward steps the date picker may take looking for a month
    pub max_month_navigation: u32,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            browser: Browser::Chrome,
            headless: false,
            teardown: false,
            max_month_navigation: DEFAULT_MAX_MONTH_NAVIGATION,
            wait_timeout_secs: 10,
            poll_interval_ms: 250,
        }
    }
}

impl SearchConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_month_navigation >= 1, "max_month_navigation must be at least 1");
        ensure!(self.wait_timeout_secs >= 1, "wait_timeout_secs must be at least 1");
        ensure!(self.poll_interval_ms >= 1, "poll_interval_ms must be at least 1");
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            browser: self.browser,
            headless: self.headless,
            poll_interval: self.poll_interval(),
        }
    }
}
