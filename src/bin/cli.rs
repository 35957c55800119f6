//! Bus schedule scraper CLI
//!
//! Needs a running WebDriver server (e.g. `chromedriver --port=9515`) for the
//! `scrape` and `stations` commands.

use std::path::PathBuf;

use bus_scraper::{
    browser::WebDriverPage,
    error::Result,
    models::{Config, ResultMap},
    pipeline,
    services::routes,
    storage::{LocalStorage, ResultStorage},
};
use clap::{Parser, Subcommand};

/// Bus scraper - collects schedules and fares for every station pair
#[derive(Parser, Debug)]
#[command(name = "bus-scraper", version, about = "Intercity bus schedule scraper")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape every route and save results after each one
    Scrape {
        /// Station list file or URL (default: paths.stations_file)
        #[arg(long)]
        stations: Option<String>,

        /// Output document (default: paths.output_file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep routes that already have trips in the output document
        #[arg(long)]
        resume: bool,

        /// Only scrape routes departing from this station (repeatable)
        #[arg(long = "from")]
        sources: Vec<String>,
    },

    /// Read the station list from the search form and save it
    Stations {
        /// Where to write the list (default: paths.stations_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the routes a scrape would visit
    Routes {
        /// Station list file or URL (default: paths.stations_file)
        #[arg(long)]
        stations: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Scrape {
            stations,
            output,
            resume,
            sources,
        } => {
            config.validate()?;
            if let Some(path) = output {
                config.paths.output_file = path;
            }
            let location = stations.unwrap_or_else(|| config.paths.stations_file.clone());

            let stations = pipeline::load_stations(&location).await;
            let pairs = routes::retain_sources(routes::enumerate(&stations), &sources);
            log::info!("{} routes to scrape", pairs.len());

            let storage = LocalStorage::new(&config.paths.output_file);
            let previous = if resume {
                let previous = storage.load().await?.unwrap_or_default();
                log::info!(
                    "Resuming with {} routes from {}",
                    previous.len(),
                    storage.location()
                );
                previous
            } else {
                ResultMap::new()
            };

            let page = WebDriverPage::connect(&config.webdriver).await?;
            pipeline::run_scrape(&config, page, &pairs, &storage, previous).await?;
        }

        Command::Stations { output } => {
            config.validate()?;
            let output = output.unwrap_or_else(|| PathBuf::from(&config.paths.stations_file));

            let page = WebDriverPage::connect(&config.webdriver).await?;
            pipeline::run_stations(&config, page, &output).await?;
        }

        Command::Routes { stations } => {
            let location = stations.unwrap_or_else(|| config.paths.stations_file.clone());
            let stations = pipeline::load_stations(&location).await;

            let pairs = routes::enumerate(&stations);
            for pair in &pairs {
                println!("{}", pair.key());
            }
            log::info!("{} stations, {} routes", stations.len(), pairs.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
