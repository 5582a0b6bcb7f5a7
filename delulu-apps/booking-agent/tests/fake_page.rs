//! In-memory stand-in for the Booking.com search page.
//!
//! Answers the crate's own selectors with a tiny model of the widgets: a
//! forward-only calendar, "-"/"+" counters with a floor, age dropdowns and
//! the search form. Every interaction is recorded for assertions.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use delulu_booking_agent::selectors;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use delulu_booking_agent::{DriverError, Locator, PageDriver, TargetDate, YearMonth};

pub const CURRENCIES: &[&str] = &["EUR", "USD", "GBP", "JPY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    SearchInput,
    CityInput,
    CurrencyButton,
    CurrencyItem(String),
    SearchBox,
    SearchButton,
    DateContainer,
    Calendar,
    NextMonth,
    MonthHeader(YearMonth),
    DateCell(String),
    OccupancyToggle,
    CounterInput(String),
    CounterRoot(String),
    Minus(String),
    Plus(String),
    AgeSelect(usize),
    AgeDropdown(usize),
}

#[derive(Debug, Clone)]
pub struct Counter {
    pub value: u32,
    /// "-" never takes the value below this
    pub floor: u32,
    /// "-" clicks are swallowed
    pub sticky: bool,
    /// Replaces the rendered `value` attribute
    pub raw: Option<String>,
    /// Reads that still show the old value after a "-" click
    pub lag: u32,
    pending: u32,
    stale_reads: u32,
}

impl Counter {
    pub fn new(value: u32, floor: u32) -> Self {
        Self {
            value,
            floor,
            sticky: false,
            raw: None,
            lag: 0,
            pending: 0,
            stale_reads: 0,
        }
    }

    fn decrement(&mut self) {
        if self.value > self.floor {
            self.value -= 1;
        }
    }

    /// Value as rendered by the next read
    fn render(&mut self) -> u32 {
        if self.pending > 0 {
            if self.stale_reads > 0 {
                self.stale_reads -= 1;
            } else {
                for _ in 0..self.pending {
                    self.decrement();
                }
                self.pending = 0;
            }
        }
        self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub url: Option<String>,
    pub calendar_open: bool,
    pub first_month: Option<YearMonth>,
    pub visible_months: u32,
    pub advances: u32,
    pub currency_menu_open: bool,
    pub currency: Option<String>,
    pub city: String,
    pub selected_cells: Vec<String>,
    pub occupancy_open: bool,
    pub occupancy_toggles: u32,
    pub counters: HashMap<String, Counter>,
    pub increments: HashMap<String, u32>,
    pub decrements: HashMap<String, u32>,
    pub child_ages: HashMap<usize, String>,
    pub submitted: bool,
    pub quit: bool,
    pub missing: HashSet<Locator>,
    /// Every clicked element, in order
    pub clicks: Vec<FakeElement>,
    pub reads: u32,
}

impl FakeState {
    pub fn counter(&self, id: &str) -> u32 {
        self.counters.get(id).map(|c| c.value).unwrap_or_default()
    }

    pub fn increments(&self, id: &str) -> u32 {
        self.increments.get(id).copied().unwrap_or_default()
    }

    pub fn decrements(&self, id: &str) -> u32 {
        self.decrements.get(id).copied().unwrap_or_default()
    }

    fn shows_month(&self, month: YearMonth) -> bool {
        self.first_month.is_some_and(|first| {
            (0..self.visible_months).any(|i| first.plus_months(i) == month)
        })
    }
}

/// Clones share the same page, so a test can keep a handle after giving one
/// away
#[derive(Clone)]
pub struct FakePage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    /// A homepage whose calendar opens on `first_month`, with Booking.com's
    /// usual defaults: 2 adults (floor 1), 0 children (floor 0).
    pub fn new(first_month: YearMonth) -> Self {
        let mut counters = HashMap::new();
        counters.insert(selectors::ADULTS_INPUT_ID.to_string(), Counter::new(2, 1));
        counters.insert(selectors::CHILDREN_INPUT_ID.to_string(), Counter::new(0, 0));
        Self {
            state: Arc::new(Mutex::new(FakeState {
                first_month: Some(first_month),
                visible_months: 1,
                counters,
                ..Default::default()
            })),
        }
    }

    pub fn with_visible_months(self, n: u32) -> Self {
        self.state().visible_months = n;
        self
    }

    pub fn with_counter(self, id: &str, value: u32, floor: u32) -> Self {
        self.state()
            .counters
            .insert(id.to_string(), Counter::new(value, floor));
        self
    }

    /// "-" clicks only show up after `reads` further reads of the input
    pub fn with_lagging_counter(self, id: &str, reads: u32) -> Self {
        if let Some(c) = self.state().counters.get_mut(id) {
            c.lag = reads;
        }
        self
    }

    pub fn with_sticky_counter(self, id: &str) -> Self {
        if let Some(c) = self.state().counters.get_mut(id) {
            c.sticky = true;
        }
        self
    }

    pub fn with_raw_counter_value(self, id: &str, raw: &str) -> Self {
        if let Some(c) = self.state().counters.get_mut(id) {
            c.raw = Some(raw.to_string());
        }
        self
    }

    /// Calendar already open, as if the date container had been clicked
    pub fn with_calendar_open(self) -> Self {
        self.state().calendar_open = true;
        self
    }

    pub fn with_occupancy_open(self) -> Self {
        self.state().occupancy_open = true;
        self
    }

    /// `locator` never matches anything
    pub fn without(self, locator: Locator) -> Self {
        self.state().missing.insert(locator);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn snapshot(&self) -> FakeState {
        self.state().clone()
    }

    fn visible_headers(state: &FakeState) -> Vec<YearMonth> {
        match state.first_month {
            Some(first) => (0..state.visible_months).map(|i| first.plus_months(i)).collect(),
            None => Vec::new(),
        }
    }

    fn match_top_level(state: &FakeState, locator: &Locator) -> Vec<FakeElement> {
        use FakeElement::*;

        let home = state.url.is_some();
        if *locator == selectors::SEARCH_INPUT {
            return if home { vec![SearchInput] } else { vec![] };
        }
        if *locator == selectors::CITY_INPUT {
            return if home { vec![CityInput] } else { vec![] };
        }
        if *locator == selectors::CURRENCY_BUTTON {
            return if home { vec![CurrencyButton] } else { vec![] };
        }
        if *locator == selectors::SEARCH_BOX {
            return if home { vec![SearchBox] } else { vec![] };
        }
        if *locator == selectors::DATE_CONTAINER {
            return if home { vec![DateContainer] } else { vec![] };
        }
        if *locator == selectors::CALENDAR {
            return if state.calendar_open { vec![Calendar] } else { vec![] };
        }
        if *locator == selectors::OCCUPANCY_CONFIG {
            return if home { vec![OccupancyToggle] } else { vec![] };
        }
        if *locator == selectors::KIDS_AGE_SELECT {
            if !state.occupancy_open {
                return vec![];
            }
            let n = state.counter(selectors::CHILDREN_INPUT_ID) as usize;
            return (0..n).map(AgeSelect).collect();
        }

        if state.currency_menu_open {
            if let Some(code) = CURRENCIES
                .iter()
                .find(|code| selectors::currency_item(code) == *locator)
            {
                return vec![CurrencyItem(code.to_string())];
            }
        }

        for id in state.counters.keys() {
            if selectors::counter_input(id) == *locator {
                return if state.occupancy_open { vec![CounterInput(id.clone())] } else { vec![] };
            }
            if selectors::counter_root(id) == *locator {
                return if state.occupancy_open { vec![CounterRoot(id.clone())] } else { vec![] };
            }
        }

        // span[data-date="YYYY-MM-DD"]
        if let Locator::Css(css) = locator {
            if let Some(key) = css
                .strip_prefix(r#"span[data-date=""#)
                .and_then(|rest| rest.strip_suffix(r#""]"#))
            {
                if let Ok(date) = TargetDate::parse(key) {
                    if selectors::date_cell(&date) == *locator
                        && state.calendar_open
                        && state.shows_month(date.year_month())
                    {
                        return vec![DateCell(key.to_string())];
                    }
                }
            }
        }
        vec![]
    }

    fn match_nested(
        state: &FakeState,
        parent: &FakeElement,
        locator: &Locator,
    ) -> Vec<FakeElement> {
        use FakeElement::*;

        match parent {
            Calendar => {
                if *locator == selectors::NEXT_MONTH_BUTTON {
                    return vec![NextMonth];
                }
                Self::visible_headers(state)
                    .into_iter()
                    .filter(|&month| {
                        let label = TargetDate::from_ymd(month.year(), month.month(), 1)
                            .map(|d| d.month_label())
                            .unwrap_or_default();
                        selectors::month_header(&label) == *locator
                    })
                    .map(MonthHeader)
                    .collect()
            }
            SearchBox if *locator == selectors::SEARCH_BUTTON => vec![SearchButton],
            CounterRoot(id) if *locator == selectors::COUNTER_BUTTON => {
                vec![Minus(id.clone()), Plus(id.clone())]
            }
            AgeSelect(i) if *locator == selectors::AGE_DROPDOWN => vec![AgeDropdown(*i)],
            _ => vec![],
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.state().url = Some(url.to_string());
        Ok(())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeElement>, DriverError> {
        let state = self.state();
        if state.missing.contains(locator) {
            return Ok(vec![]);
        }
        Ok(Self::match_top_level(&state, locator))
    }

    async fn find_all_in(
        &self,
        parent: &FakeElement,
        locator: &Locator,
    ) -> Result<Vec<FakeElement>, DriverError> {
        let state = self.state();
        if state.missing.contains(locator) {
            return Ok(vec![]);
        }
        Ok(Self::match_nested(&state, parent, locator))
    }

    async fn click(&self, element: &FakeElement) -> Result<(), DriverError> {
        use FakeElement::*;

        let mut state = self.state();
        state.clicks.push(element.clone());
        match element {
            NextMonth => {
                state.advances += 1;
                state.first_month = state.first_month.map(|m| m.plus_months(1));
            }
            DateContainer => state.calendar_open = true,
            DateCell(key) => state.selected_cells.push(key.clone()),
            CurrencyButton => state.currency_menu_open = true,
            CurrencyItem(code) => {
                state.currency = Some(code.clone());
                state.currency_menu_open = false;
            }
            OccupancyToggle => {
                state.occupancy_open = !state.occupancy_open;
                state.occupancy_toggles += 1;
            }
            Minus(id) => {
                *state.decrements.entry(id.clone()).or_default() += 1;
                if let Some(c) = state.counters.get_mut(id) {
                    if !c.sticky {
                        if c.lag > 0 {
                            c.pending += 1;
                            c.stale_reads = c.lag;
                        } else {
                            c.decrement();
                        }
                    }
                }
            }
            Plus(id) => {
                *state.increments.entry(id.clone()).or_default() += 1;
                if let Some(c) = state.counters.get_mut(id) {
                    c.value += 1;
                }
            }
            SearchButton => state.submitted = true,
            _ => {}
        }
        Ok(())
    }

    async fn read_attribute(
        &self,
        element: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let mut state = self.state();
        state.reads += 1;
        match (element, name) {
            (FakeElement::CounterInput(id), "value") => Ok(state.counters.get_mut(id).map(|c| {
                let value = c.render();
                c.raw.clone().unwrap_or_else(|| value.to_string())
            })),
            (FakeElement::AgeDropdown(i), "value") => Ok(state.child_ages.get(i).cloned()),
            (FakeElement::CityInput, "value") => Ok(Some(state.city.clone())),
            _ => Ok(None),
        }
    }

    async fn set_value_and_dispatch_change(
        &self,
        element: &FakeElement,
        value: &str,
    ) -> Result<(), DriverError> {
        if let FakeElement::AgeDropdown(i) = element {
            self.state().child_ages.insert(*i, value.to_string());
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeElement) -> Result<(), DriverError> {
        if *element == FakeElement::CityInput {
            self.state().city.clear();
        }
        Ok(())
    }

    async fn send_keys(&self, element: &FakeElement, text: &str) -> Result<(), DriverError> {
        if *element == FakeElement::CityInput {
            self.state().city.push_str(text);
        }
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.state().quit = true;
        Ok(())
    }
}

pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

pub fn date(s: &str) -> TargetDate {
    TargetDate::parse(s).unwrap()
}

/// Collects formatted log lines of the current thread
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route this thread's events here until the guard drops. Install it
    /// before building the component under test so its span is captured too.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(" WARN ") || line.starts_with("WARN "))
            .collect()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
