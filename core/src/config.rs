use crate::error::{DashError, DashResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DATA_FILE_VAR: &str = "DATA_FILE";
pub const LOGO_FILE_VAR: &str = "LOGO_FILE";
pub const PORT_VAR: &str = "PORT";
pub const ANALYSIS_CONFIG_VAR: &str = "ANALYSIS_CONFIG";

pub const DEFAULT_DATA_FILE: &str = "fraud_deliveries.csv";
pub const DEFAULT_LOGO_FILE: &str = "logo.svg";
pub const DEFAULT_PORT: u16 = 8050;

pub const MAX_DECILE_COUNT: usize = 100;
pub const MAX_COMPARISON_WINDOW_DAYS: i64 = 3650;

// ── Analysis knobs ─────────────────────────────────────────────────────────

/// Tunables of the aggregation and insight layer.
/// Every field has a default, so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of equal-population order-value buckets.
    pub decile_count: usize,
    /// Predictors kept after ranking by |r|.
    pub top_predictors: usize,
    /// Width of each window in the period comparison, in calendar days.
    pub comparison_window_days: i64,
    /// Cap on bullets returned by each insight function.
    pub max_bullets: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            decile_count: 10,
            top_predictors: 20,
            comparison_window_days: 7,
            max_bullets: 3,
        }
    }
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> DashResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DashError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: AnalysisConfig = serde_json::from_str(&content)?;
        config.clamp();
        Ok(config)
    }

    /// Zero-sized knobs would silence whole sections; floor them at 1.
    /// Ceilings keep date arithmetic and bucket edges in range.
    fn clamp(&mut self) {
        self.decile_count = self.decile_count.clamp(1, MAX_DECILE_COUNT);
        self.top_predictors = self.top_predictors.max(1);
        self.comparison_window_days = self
            .comparison_window_days
            .clamp(1, MAX_COMPARISON_WINDOW_DAYS);
        self.max_bullets = self.max_bullets.max(1);
    }
}

// ── Process config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_file: PathBuf,
    pub logo_file: PathBuf,
    pub port: u16,
    pub analysis: AnalysisConfig,
}

impl DashboardConfig {
    /// Resolve from the process environment.
    /// Relative defaults are anchored at `base_dir` (the executable's directory).
    pub fn from_env(base_dir: &Path) -> DashResult<Self> {
        Self::from_lookup(base_dir, |key| std::env::var(key).ok())
    }

    /// Resolve from any key lookup. Used by `from_env` and by tests.
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> DashResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup(DATA_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join(DEFAULT_DATA_FILE));

        let logo_file = lookup(LOGO_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join(DEFAULT_LOGO_FILE));

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                log::warn!("{PORT_VAR}={raw:?} is not a valid port, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let analysis = match lookup(ANALYSIS_CONFIG_VAR).filter(|v| !v.trim().is_empty()) {
            Some(path) => AnalysisConfig::load(Path::new(&path))?,
            None => AnalysisConfig::default(),
        };

        Ok(Self {
            data_file,
            logo_file,
            port,
            analysis,
        })
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            logo_file: PathBuf::from(DEFAULT_LOGO_FILE),
            port: DEFAULT_PORT,
            analysis: AnalysisConfig::default(),
        }
    }
}
