//! N03 STAC export.
//!
//! Downloads every (year, prefecture) edition of the administrative boundary
//! dataset, merges it into one feature per municipality, and writes a static
//! STAC catalog.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ksj_n03::source::{Fetcher, PrefCode};
use ksj_n03::stac::{build_collection, Catalog, CatalogWriter};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export N03 administrative boundaries as a STAC catalog")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Editions to export, e.g. 2022,2018
    #[arg(long, value_delimiter = ',')]
    years: Option<Vec<i32>>,

    /// Two-digit prefecture codes, e.g. 13,14 (default: all 47)
    #[arg(long, value_delimiter = ',')]
    prefs: Option<Vec<String>>,

    /// Directory to write the catalog into
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory for extracted GeoJSON files
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Ignore any configured cache directory
    #[arg(long)]
    no_cache: bool,

    /// Base URL of the N03 download site
    #[arg(long)]
    base_url: Option<String>,

    /// Public URL of the root catalog file
    #[arg(long)]
    catalog_href: Option<String>,
}

impl Args {
    /// Command-line values take precedence over the config file.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(years) = &self.years {
            config.source.years = years.clone();
        }
        if let Some(prefs) = &self.prefs {
            config.source.pref_codes = prefs.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.catalog.output_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.source.cache_dir = Some(dir.clone());
        }
        if self.no_cache {
            config.source.cache_dir = None;
        }
        if let Some(url) = &self.base_url {
            config.source.base_url = url.clone();
        }
        if let Some(href) = &self.catalog_href {
            config.catalog.href = href.clone();
        }
        config
    }
}

fn pref_codes(config: &Config) -> Result<Vec<PrefCode>> {
    if config.source.pref_codes.is_empty() {
        return Ok(PrefCode::all().collect());
    }
    config
        .source
        .pref_codes
        .iter()
        .map(|code| code.parse::<PrefCode>().map_err(anyhow::Error::from))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    let config = args.apply(config);
    let prefs = pref_codes(&config)?;

    info!("N03 STAC Export");
    info!(
        "Years: {:?}, prefectures: {}, output: {}",
        config.source.years,
        prefs.len(),
        config.catalog.output_dir.display()
    );

    let fetcher = Fetcher::new(&config.source.base_url, config.source.cache_dir.clone())
        .context("Failed to create HTTP client")?;

    let mut catalog = Catalog::new(
        &config.catalog.id,
        &config.catalog.title,
        &config.catalog.description,
    );

    let total = config.source.years.len() * prefs.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    for &year in &config.source.years {
        for &pref_code in &prefs {
            pb.set_message(format!("year={year} pref_code={pref_code}"));
            info!("Processing year={} pref_code={} ...", year, pref_code);

            let features = fetcher
                .features(year, pref_code)
                .await
                .with_context(|| format!("Failed to process year={year} pref_code={pref_code}"))?;

            let collection = build_collection(
                &config.catalog.id,
                year,
                pref_code,
                &fetcher.zip_url(year, pref_code),
                &features,
            )
            .with_context(|| format!("Failed to build collection for year={year} pref_code={pref_code}"))?;

            info!(
                "Processed year={} pref_code={}: {} areas",
                year,
                pref_code,
                collection.items.len()
            );
            catalog.add_child(collection);
            pb.inc(1);
        }
    }

    pb.finish_with_message("Processing complete");

    let writer = CatalogWriter::new(&config.catalog.href, &config.catalog.output_dir)
        .context("Invalid catalog href")?;
    let summary = writer.write(&catalog).context("Failed to write catalog")?;

    info!(
        "Exported {} collections with {} items",
        summary.collections, summary.items
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_config() {
        let args = Args::parse_from([
            "export",
            "--years",
            "2020,2021",
            "--prefs",
            "13",
            "--output-dir",
            "out",
            "--cache-dir",
            "cache",
        ]);
        let config = args.apply(Config::default());

        assert_eq!(config.source.years, vec![2020, 2021]);
        assert_eq!(config.source.pref_codes, vec!["13"]);
        assert_eq!(config.catalog.output_dir, PathBuf::from("out"));
        assert_eq!(config.source.cache_dir, Some(PathBuf::from("cache")));
    }

    #[test]
    fn test_no_cache_wins() {
        let args = Args::parse_from(["export", "--cache-dir", "cache", "--no-cache"]);
        let config = args.apply(Config::default());
        assert!(config.source.cache_dir.is_none());
    }

    #[test]
    fn test_pref_codes_default_to_all() {
        let codes = pref_codes(&Config::default()).unwrap();
        assert_eq!(codes.len(), 47);
    }

    #[test]
    fn test_invalid_pref_code() {
        let mut config = Config::default();
        config.source.pref_codes = vec!["13".to_string(), "99".to_string()];
        assert!(pref_codes(&config).is_err());
    }
}
