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
//!
//! Requires a WebDriver server, e.g. `chromedriver --port=4444`.
//!
//! # Examples
//!
//! ## Basic search
//!
//! ```bash
//! delulu-booking -L "Lisbon" -i 2026-11-02 -o 2026-11-06
//! ```
//!
//! ## Family with children, prices in euros
//!
//! ```bash
//! delulu-booking -L "Barcelona" -i 2027-07-01 -o 2027-07-08 -a 2 -c 2 -A 5,11 -C EUR
//! ```
//!
//! ## Firefox, headless, close the browser afterwards
//!
//! ```bash
//! delulu-booking -L "Oslo" -i 2027-01-10 -o 2027-01-12 --browser firefox --headless --teardown
//! ```
//!
//! ## Dry run (validate and print parameters only)
//!
//! ```bash
//! delulu-booking -L "Tokyo" -i 2027-02-15 -o 2027-02-20 --dry-run
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use delulu_booking_agent::{
    Browser, BookingSession, OccupancyRequest, SearchConfig, SearchParams, TargetDate,
    WebDriverPage,
};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "delulu-booking")]
#[command(version = "0.1.0")]
#[command(about = "Fill in and submit the Booking.com hotel search form")]
struct Args {
    #[arg(short = 'L', long)]
    location: String,
    #[arg(short = 'i', long, help = "Check-in date (YYYY-MM-DD)")]
    checkin: String,
    #[arg(short = 'o', long, help = "Check-out date (YYYY-MM-DD)")]
    checkout: String,
    #[arg(short = 'a', long, default_value = "1")]
    adults: u32,
    #[arg(short = 'c', long, default_value = "0")]
    children: u32,
    #[arg(
        short = 'A',
        long,
        help = "Children ages (comma-separated, e.g., 5,10)"
    )]
    ages: Option<String>,
    #[arg(short = 'C', long, help = "Currency code (e.g., USD, EUR)")]
    currency: Option<String>,
    #[arg(long, value_enum, help = "Browser behind the WebDriver server")]
    browser: Option<BrowserOption>,
    #[arg(long, help = "WebDriver server URL [default: http://localhost:4444]")]
    webdriver_url: Option<String>,
    #[arg(long)]
    headless: bool,
    #[arg(long, help = "Close the browser when the search is over")]
    teardown: bool,
    #[arg(long, help = "Maximum calendar pages to flip looking for a month [default: 24]")]
    max_months: Option<u32>,
    #[arg(long, help = "Wait timeout per element, in seconds [default: 10]")]
    timeout_secs: Option<u64>,
    #[arg(long, help = "JSON config file, overridden by command-line flags")]
    config: Option<PathBuf>,
    #[arg(long, help = "Also write logs to this file")]
    log_file: Option<PathBuf>,
    #[arg(long, help = "Validate and print the search without opening a browser")]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BrowserOption {
    #[clap(name = "chrome")]
    Chrome,
    #[clap(name = "firefox")]
    Firefox,
}

impl From<BrowserOption> for Browser {
    fn from(b: BrowserOption) -> Browser {
        match b {
            BrowserOption::Chrome => Browser::Chrome,
            BrowserOption::Firefox => Browser::Firefox,
        }
    }
}

fn parse_children_ages(s: &str) -> Result<Vec<i32>, std::num::ParseIntError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(|age| age.trim().parse()).collect()
}

fn load_config(args: &Args) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(b) = args.browser {
        config.browser = b.into();
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if let Some(n) = args.max_months {
        config.max_month_navigation = n;
    }
    if let Some(t) = args.timeout_secs {
        config.wait_timeout_secs = t;
    }
    config.headless |= args.headless;
    config.teardown |= args.teardown;
    config.validate()?;
    Ok(config)
}

/// Background writer appending to `path`. Lines still queued are written
/// when the guard drops.
fn log_file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    Ok(tracing_appender::non_blocking(
        tracing_appender::rolling::never(dir, file_name),
    ))
}

/// stderr always, plus `log_file` when given. The returned guard flushes the
/// file writer on drop and must outlive the search.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = log_file_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_file.as_deref())?;

    let config = load_config(&args)?;

    let children_ages = args
        .ages
        .as_deref()
        .map(parse_children_ages)
        .transpose()
        .map_err(|e| anyhow::anyhow!("Failed to parse children ages: {}", e))?
        .unwrap_or_default();

    let occupancy = OccupancyRequest::new(args.adults, args.children, children_ages)?;
    let params = SearchParams::builder(
        args.location.clone(),
        TargetDate::parse(&args.checkin)?,
        TargetDate::parse(&args.checkout)?,
        occupancy,
    )
    .currency(args.currency.clone())
    .build()?;

    println!("\n🏨 Booking.com Search");
    println!("=====================");
    println!("Location: {}", params.city);
    println!(
        "Dates: {} to {} ({} night(s))",
        params.check_in,
        params.check_out,
        params.nights()
    );
    println!(
        "Guests: {} adults, {} children",
        params.occupancy.adults(),
        params.occupancy.children()
    );
    if !params.occupancy.child_ages().is_empty() {
        println!(
            "Children ages: {}",
            params
                .occupancy
                .child_ages()
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    if let Some(c) = &params.currency {
        println!("Currency: {}", c);
    }
    println!("=====================");

    if args.dry_run {
        println!("\n{}", serde_json::to_string_pretty(&params)?);
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!("Starting search for accommodations in {}", params.city);
    let page = WebDriverPage::connect(&config.webdriver_url, &config.browser_options())
        .await
        .context("Browser automation failed to start")?;
    let session = BookingSession::new(page, config).with_span(tracing::info_span!(
        "search",
        city = %params.city,
        check_in = %params.check_in
    ));

    match session.run(&params).await {
        Ok(report) => {
            if !report.check_in_month_found || !report.check_out_month_found {
                eprintln!("Warning: the calendar never showed one of the requested months");
            }
            println!("\n✅ Search submitted");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            eprintln!("Search failed: {:#}", anyhow::Error::new(e));
            // returning lets the log guard flush the file writer
            Ok(ExitCode::FAILURE)
        }
    }
}
