use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Environment variable that overrides `api_key` from the config file.
pub const API_KEY_ENV: &str = "CRIMESTAT_API_KEY";

/// Countries flagged as crime-relevant destinations for departure totals.
pub const CRIME_COUNTRIES: [&str; 10] = [
    "중국", "미국", "영국", "인도", "독일",
    "캄보디아", "이스라엘", "몰디브", "미얀마", "필리핀",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub base_url: String,
    pub endpoint: String,
}

impl EndpointConfig {
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }
}

/// Which shape the per-region departure CSV files take.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CsvLayout {
    /// Multi-row header, year marker rows, monthly rows summed per year.
    #[default]
    Wide,
    /// Proper `year,month,<country>...` header, monthly rows kept.
    Long,
}

fn default_crime_countries() -> Vec<String> {
    CRIME_COUNTRIES.iter().map(|c| c.to_string()).collect()
}

fn default_cyber_per_page() -> u32 { 100 }
fn default_voice_per_page() -> u32 { 500 }

/// Everything a sync run needs, passed explicitly into the ingestor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub api_key: String,
    pub scam:   EndpointConfig,
    pub voice:  EndpointConfig,
    pub travel: EndpointConfig,
    /// Region label → CSV path. Regions without a file are skipped.
    #[serde(default)]
    pub csv_files: BTreeMap<String, String>,
    #[serde(default)]
    pub csv_layout: CsvLayout,
    #[serde(default = "default_crime_countries")]
    pub crime_countries: Vec<String>,
    #[serde(default = "default_cyber_per_page")]
    pub cyber_per_page: u32,
    #[serde(default = "default_voice_per_page")]
    pub voice_per_page: u32,
}

/// Diagnostic view of a config: never carries the key itself.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyReport {
    pub api_key_present: bool,
    pub scam_base_url:   String,
    pub voice_base_url:  String,
    pub travel_base_url: String,
    pub csv_regions:     Vec<String>,
}

impl IngestConfig {
    /// Load config from a JSON file, then apply the API key override
    /// from the environment if present.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: IngestConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = key;
            }
        }
        Ok(config)
    }

    /// Config pointing every endpoint at `base_url`, for tests and local stubs.
    pub fn for_base_url(base_url: &str) -> Self {
        let endpoint = |path: &str| EndpointConfig {
            base_url: base_url.to_string(),
            endpoint: path.to_string(),
        };
        Self {
            api_key:         "test-key".to_string(),
            scam:            endpoint("/cyber-scam"),
            voice:           endpoint("/voice-phishing"),
            travel:          endpoint("/travel"),
            csv_files:       BTreeMap::new(),
            csv_layout:      CsvLayout::default(),
            crime_countries: default_crime_countries(),
            cyber_per_page:  default_cyber_per_page(),
            voice_per_page:  default_voice_per_page(),
        }
    }

    pub fn key_report(&self) -> KeyReport {
        KeyReport {
            api_key_present: !self.api_key.trim().is_empty(),
            scam_base_url:   self.scam.base_url.clone(),
            voice_base_url:  self.voice.base_url.clone(),
            travel_base_url: self.travel.base_url.clone(),
            csv_regions:     self.csv_files.keys().cloned().collect(),
        }
    }
}
