//! Delulu Page Driver
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! WebDriver backend over `thirtyfour`.
//!
//! Connects to an already running chromedriver / geckodriver. Spawning the
//! driver process is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;

use crate::{DriverError, Locator, PageDriver, DEFAULT_POLL_INTERVAL};

const CHROME_ARGS: &[&str] = &[
    "--start-maximized",
    "--disable-infobars",
    "--disable-extensions",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

const SET_VALUE_AND_NOTIFY: &str = "arguments[0].value = arguments[1]; \
     arguments[0].dispatchEvent(new Event('change', { bubbles: true }));";

impl From<WebDriverError> for DriverError {
    fn from(e: WebDriverError) -> Self {
        DriverError::Backend(anyhow::Error::new(e))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub browser: Browser,
    pub headless: bool,
    pub poll_interval: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            browser: Browser::Chrome,
            headless: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn to_by(locator: &Locator) -> By {
    match locator {
        Locator::Css(s) => By::Css(s.to_string()),
        Locator::XPath(s) => By::XPath(s.to_string()),
        Locator::Id(s) => By::Id(s.to_string()),
        Locator::Name(s) => By::Name(s.to_string()),
        Locator::Tag(s) => By::Tag(s.to_string()),
    }
}

/// A live WebDriver session
#[derive(Clone)]
pub struct WebDriverPage {
    driver: WebDriver,
    poll_interval: Duration,
}

impl WebDriverPage {
    /// Open a new session on the WebDriver server at `server_url`
    /// (e.g. `http://localhost:4444`) and maximize its window.
    pub async fn connect(server_url: &str, options: &BrowserOptions) -> Result<Self, DriverError> {
        tracing::info!("Setting up {:?} browser via {}", options.browser, server_url);

        let driver = match options.browser {
            Browser::Chrome => {
                let mut caps = DesiredCapabilities::chrome();
                for arg in CHROME_ARGS {
                    caps.add_arg(arg)?;
                }
                if options.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(server_url, caps).await?
            }
            Browser::Firefox => {
                let mut caps = DesiredCapabilities::firefox();
                if options.headless {
                    caps.set_headless()?;
                }
                WebDriver::new(server_url, caps).await?
            }
        };
        driver.maximize_window().await?;

        tracing::info!("{:?} browser setup completed", options.browser);
        Ok(Self::from_driver(driver, options.poll_interval))
    }

    pub fn from_driver(driver: WebDriver, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<WebElement>, DriverError> {
        Ok(self.driver.find_all(to_by(locator)).await?)
    }

    async fn find_all_in(
        &self,
        parent: &WebElement,
        locator: &Locator,
    ) -> Result<Vec<WebElement>, DriverError> {
        Ok(parent.find_all(to_by(locator)).await?)
    }

    async fn click(&self, element: &WebElement) -> Result<(), DriverError> {
        element.click().await?;
        Ok(())
    }

    async fn read_attribute(
        &self,
        element: &WebElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        // properties track user edits, attributes only the initial markup
        match element.prop(name).await? {
            Some(value) => Ok(Some(value)),
            None => Ok(element.attr(name).await?),
        }
    }

    async fn set_value_and_dispatch_change(
        &self,
        element: &WebElement,
        value: &str,
    ) -> Result<(), DriverError> {
        let args = vec![element.to_json()?, serde_json::Value::from(value)];
        self.driver.execute(SET_VALUE_AND_NOTIFY, args).await?;
        Ok(())
    }

    async fn clear(&self, element: &WebElement) -> Result<(), DriverError> {
        element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &WebElement, text: &str) -> Result<(), DriverError> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.driver.clone().quit().await?;
        Ok(())
    }

    async fn is_interactable(&self, element: &WebElement) -> Result<bool, DriverError> {
        Ok(element.is_clickable().await?)
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
