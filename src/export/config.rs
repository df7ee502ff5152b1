use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use ksj_n03::source::DEFAULT_BASE_URL;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Public URL of the root catalog file
    pub href: String,
    pub output_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            id: "jp-ksj-n03".to_string(),
            title: "日本の行政区域界".to_string(),
            description: "日本の行政区域界のSTACカタログ。年・都道府県ごとにコレクションを分けている。"
                .to_string(),
            href: "https://jp-ksj-n03-stac.sankichi.app/index.json".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub years: Vec<i32>,
    /// Two-digit codes; empty means all 47 prefectures
    pub pref_codes: Vec<String>,
    pub cache_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            years: vec![2022, 2018],
            pref_codes: Vec::new(),
            cache_dir: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}
