use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding transactions.json and budgets.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Canonical categories, in matching order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Quick-pick amounts offered when a budget has to be chosen
    #[serde(default = "default_budget_presets")]
    pub budget_presets: Vec<u64>,

    /// Command keywords
    #[serde(default)]
    pub keywords: KeywordConfig,

    /// Offset used to decide which calendar month "now" falls in.
    /// Falls back to the host's local offset when unset.
    #[serde(default)]
    pub utc_offset_hours: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_chart_keyword")]
    pub chart: String,
    #[serde(default = "default_monthly_keyword")]
    pub monthly: String,
    #[serde(default = "default_guide_keyword")]
    pub guide: String,
    #[serde(default = "default_budget_menu_keyword")]
    pub budget_menu: String,
    #[serde(default = "default_set_keyword")]
    pub set: String,
    #[serde(default = "default_delete_keyword")]
    pub delete: String,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            chart: default_chart_keyword(),
            monthly: default_monthly_keyword(),
            guide: default_guide_keyword(),
            budget_menu: default_budget_menu_keyword(),
            set: default_set_keyword(),
            delete: default_delete_keyword(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_categories() -> Vec<String> {
    ["飲食", "娛樂", "運動", "交通", "健康", "其他"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_budget_presets() -> Vec<u64> {
    vec![3000, 5000, 8000, 10000]
}

fn default_chart_keyword() -> String {
    "圖表".to_string()
}

fn default_monthly_keyword() -> String {
    "本月花費".to_string()
}

fn default_guide_keyword() -> String {
    "使用教學".to_string()
}

fn default_budget_menu_keyword() -> String {
    "設定額度".to_string()
}

fn default_set_keyword() -> String {
    "設定".to_string()
}

fn default_delete_keyword() -> String {
    "刪除".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            categories: default_categories(),
            budget_presets: default_budget_presets(),
            keywords: KeywordConfig::default(),
            utc_offset_hours: None,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!(
            data_dir = %config.data_dir.display(),
            categories = config.categories.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Default configuration rooted at a specific data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("categories must not be empty".into()));
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid("category labels must not be blank".into()));
        }
        if self.budget_presets.is_empty() {
            return Err(ConfigError::Invalid("budget_presets must not be empty".into()));
        }
        let k = &self.keywords;
        for (name, value) in [
            ("chart", &k.chart),
            ("monthly", &k.monthly),
            ("guide", &k.guide),
            ("budget_menu", &k.budget_menu),
            ("set", &k.set),
            ("delete", &k.delete),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("keyword '{}' must not be blank", name)));
            }
        }
        if let Some(hours) = self.utc_offset_hours {
            if FixedOffset::east_opt(hours * 3600).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "utc_offset_hours {} out of range",
                    hours
                )));
            }
        }
        Ok(())
    }

    /// Current wall-clock time in the configured calendar
    pub fn now(&self) -> DateTime<FixedOffset> {
        let utc = Utc::now();
        match self.utc_offset_hours.and_then(|h| FixedOffset::east_opt(h * 3600)) {
            Some(offset) => utc.with_timezone(&offset),
            None => utc.with_timezone(&Local).fixed_offset(),
        }
    }
}
