use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::Year;
use crate::projection::DEFAULT_CLEAN_BUFFER;
use crate::report::Precision;
use crate::runner::{RunSettings, NO_CARBON_PRICE};
use crate::store::Horizon;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub horizon: HorizonConfig,
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub documents_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("config/documents"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonConfig {
    pub base_year: Year,
    pub end_year: Year,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        let horizon = Horizon::default();
        Self {
            base_year: horizon.base_year,
            end_year: horizon.end_year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub clean_buffer: f64,
    pub carbon_price_scenario: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clean_buffer: DEFAULT_CLEAN_BUFFER,
            carbon_price_scenario: NO_CARBON_PRICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub currency_decimals: u32,
    pub share_decimals: u32,
    pub ratio_decimals: u32,
    pub energy_decimals: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let precision = Precision::default();
        Self {
            currency_decimals: precision.currency,
            share_decimals: precision.share,
            ratio_decimals: precision.ratio,
            energy_decimals: precision.energy,
        }
    }
}

impl Config {
    /// Defaults, then `config/default.toml`, then `PROJECTION__*` env vars
    pub fn load() -> Result<Self> {
        Self::figment("config/default.toml")
            .extract::<Self>()
            .context("failed to load configuration")?
            .validated()
    }

    fn figment(toml_path: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("PROJECTION__").split("__"))
    }

    fn validated(self) -> Result<Self> {
        if self.horizon.end_year < self.horizon.base_year {
            anyhow::bail!(
                "horizon end_year {} is before base_year {}",
                self.horizon.end_year,
                self.horizon.base_year
            );
        }
        if !self.engine.clean_buffer.is_finite() || self.engine.clean_buffer < 0.0 {
            anyhow::bail!("engine.clean_buffer must be >= 0, got {}", self.engine.clean_buffer);
        }
        Ok(self)
    }

    pub fn horizon(&self) -> Horizon {
        Horizon {
            base_year: self.horizon.base_year,
            end_year: self.horizon.end_year,
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            clean_buffer: self.engine.clean_buffer,
            carbon_price_scenario: self.engine.carbon_price_scenario.clone(),
        }
    }

    pub fn precision(&self) -> Precision {
        Precision {
            currency: self.output.currency_decimals,
            share: self.output.share_decimals,
            ratio: self.output.ratio_decimals,
            energy: self.output.energy_decimals,
        }
    }
}
