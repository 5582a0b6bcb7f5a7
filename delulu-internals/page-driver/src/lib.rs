//! Delulu Page Driver
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! delulu-internals/page-driver
//! The small set of DOM query and interaction primitives that UI automation
//! flows are written against, plus bounded polling waits built on top of them.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{self, Instant};

#[cfg(feature = "webdriver")]
mod webdriver;
#[cfg(feature = "webdriver")]
pub use webdriver::{Browser, BrowserOptions, WebDriverPage};

/// Interval between two lookups of a polling wait, unless the backend overrides it
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Errors surfaced by a page driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("element not found: {locator}")]
    NotFound { locator: String },
    #[error("timed out after {timeout:?} waiting for {locator}")]
    Timeout { locator: String, timeout: Duration },
    #[error("browser backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl DriverError {
    pub fn not_found(what: impl fmt::Display) -> Self {
        Self::NotFound {
            locator: what.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// How to locate an element in the page
///
/// Selectors are usually compile-time strings, so they are stored as
/// `Cow<'static, str>` which lets them live in `const` items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(Cow<'static, str>),
    XPath(Cow<'static, str>),
    Id(Cow<'static, str>),
    Name(Cow<'static, str>),
    Tag(Cow<'static, str>),
}

impl Locator {
    pub fn css(selector: impl Into<Cow<'static, str>>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<Cow<'static, str>>) -> Self {
        Self::XPath(expr.into())
    }

    pub fn id(id: impl Into<Cow<'static, str>>) -> Self {
        Self::Id(id.into())
    }

    pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Name(name.into())
    }

    pub fn tag(tag: impl Into<Cow<'static, str>>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) | Self::Id(s) | Self::Name(s) | Self::Tag(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css `{}`", s),
            Self::XPath(s) => write!(f, "xpath `{}`", s),
            Self::Id(s) => write!(f, "id `{}`", s),
            Self::Name(s) => write!(f, "name `{}`", s),
            Self::Tag(s) => write!(f, "tag `{}`", s),
        }
    }
}

/// DOM query and interaction primitives
///
/// Backends implement the raw primitives. `find`, `find_in`, the waits and
/// `advance_calendar_month` have default implementations in terms of them.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Opaque handle to an element of the current page
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>, DriverError>;

    async fn find_all_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Vec<Self::Element>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Live value of an attribute (or DOM property) of an element
    async fn read_attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    /// Set the `value` of a form control and fire a bubbling `change` event
    async fn set_value_and_dispatch_change(
        &self,
        element: &Self::Element,
        value: &str,
    ) -> Result<(), DriverError>;

    async fn clear(&self, element: &Self::Element) -> Result<(), DriverError>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    /// End the browser session
    async fn quit(&self) -> Result<(), DriverError>;

    /// Whether the element is displayed and enabled
    async fn is_interactable(&self, _element: &Self::Element) -> Result<bool, DriverError> {
        Ok(true)
    }

    fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }

    async fn find(&self, locator: &Locator) -> Result<Self::Element, DriverError> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::not_found(locator))
    }

    async fn find_in(
        &self,
        parent: &Self::Element,
        locator: &Locator,
    ) -> Result<Self::Element, DriverError> {
        self.find_all_in(parent, locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::not_found(locator))
    }

    async fn wait_until_present(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        poll_for_element(self, locator, timeout, false).await
    }

    async fn wait_until_clickable(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError> {
        poll_for_element(self, locator, timeout, true).await
    }

    /// Move a paginated calendar one month forward by clicking its
    /// next-month control
    async fn advance_calendar_month(
        &self,
        calendar: &Self::Element,
        next_button: &Locator,
    ) -> Result<(), DriverError> {
        let button = self.find_in(calendar, next_button).await?;
        self.click(&button).await
    }
}

/// Look `locator` up every `poll_interval` until it shows up or `timeout`
/// elapses. No lookup is issued past the deadline.
///
/// With `require_interactable`, an element whose state cannot be read
/// (`Backend` error, typically a stale reference after a re-render) counts
/// as not ready yet.
async fn poll_for_element<D>(
    driver: &D,
    locator: &Locator,
    timeout: Duration,
    require_interactable: bool,
) -> Result<D::Element, DriverError>
where
    D: PageDriver + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        for element in driver.find_all(locator).await? {
            let ready = if require_interactable {
                match driver.is_interactable(&element).await {
                    Ok(ready) => ready,
                    Err(DriverError::Backend(e)) => {
                        tracing::debug!("{} not readable yet: {}", locator, e);
                        false
                    }
                    Err(e) => return Err(e),
                }
            } else {
                true
            };
            if ready {
                tracing::trace!("{} ready after {} attempt(s)", locator, attempts);
                return Ok(element);
            }
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!("Gave up on {} after {} attempt(s)", locator, attempts);
            return Err(DriverError::Timeout {
                locator: locator.to_string(),
                timeout,
            });
        }
        time::sleep(driver.poll_interval().min(deadline - now)).await;
    }
}
