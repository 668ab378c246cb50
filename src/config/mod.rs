use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::core::filter::SubscriptionFilter;
use crate::currency::{CurrencyCode, Separators};
use crate::domain::SubscriptionState;
use crate::errors::StoreError;

const DEFAULT_DIR_NAME: &str = ".subtrack";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
pub const HOME_ENV: &str = "SUBTRACK_HOME";

/// Stores user-configurable display preferences and the default filter policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default)]
    pub currency_precision: Option<u8>,
    #[serde(default = "Config::default_counted_states")]
    pub counted_states: Vec<SubscriptionState>,
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_snapshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            currency_precision: None,
            counted_states: Self::default_counted_states(),
            excluded_categories: Vec::new(),
            last_snapshot: None,
        }
    }
}

impl Config {
    pub fn default_counted_states() -> Vec<SubscriptionState> {
        vec![SubscriptionState::Active, SubscriptionState::Trial]
    }

    pub fn currency_code(&self) -> CurrencyCode {
        CurrencyCode::new(&self.currency)
    }

    pub fn separators(&self) -> Separators {
        Separators::for_locale(&self.locale)
    }

    /// Filter policy described by this configuration.
    pub fn filter(&self) -> SubscriptionFilter {
        self.excluded_categories.iter().fold(
            SubscriptionFilter::counting(&self.counted_states),
            |filter, category| filter.exclude_category(category.clone()),
        )
    }

    /// Updates a single setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "locale" => self.locale = value.to_string(),
            "currency" => self.currency = CurrencyCode::new(value).as_str().to_string(),
            "currency_precision" => {
                self.currency_precision = match value {
                    "" | "auto" => None,
                    raw => Some(
                        raw.parse()
                            .map_err(|_| format!("invalid precision `{raw}`"))?,
                    ),
                }
            }
            "counted_states" => {
                self.counted_states = split_list(value)
                    .map(str::parse::<SubscriptionState>)
                    .collect::<Result<_, _>>()?;
            }
            "excluded_categories" => {
                self.excluded_categories = split_list(value).map(str::to_string).collect();
            }
            other => return Err(format!("unknown setting `{other}`")),
        }
        Ok(())
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Returns the application data directory, defaulting to `~/.subtrack`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn from_env() -> Result<Self, StoreError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, StoreError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes through a temporary sibling file and renames it into place.
pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}
