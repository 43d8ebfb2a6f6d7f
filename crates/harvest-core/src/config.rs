use crate::advice::{AdviceBackend, ChatCompletions};
use crate::error::{HarvestError, Result};
use crate::io;
use crate::paths;
use crate::store::Store;
use crate::types::Program;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 5000;

// ---------------------------------------------------------------------------
// Settings (harvest.yaml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Weeks before the current Monday that still count toward the forecast.
    #[serde(default)]
    pub lookback_weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceSettings {
    #[serde(default)]
    pub default_program: Program,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            default_program: Program::default(),
            temperature: default_temperature(),
        }
    }
}

/// Optional per-site tuning stored next to the database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub advice: AdviceSettings,
}

impl Settings {
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = paths::config_path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub download_key: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub port: u16,
    pub settings: Settings,
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self> {
        Self::resolve(data_dir, |k| std::env::var(k).ok())
    }

    /// Resolve using `var` for environment lookups. Blank values count as
    /// unset.
    pub fn resolve<F>(data_dir: Option<PathBuf>, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| {
            var(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let data_dir = data_dir
            .or_else(|| var("DB_DIR").map(PathBuf::from))
            .or_else(|| var("DISK_PATH").map(PathBuf::from))
            .or_else(|| {
                let hosted = Path::new(paths::HOSTED_DATA_DIR);
                hosted.is_dir().then(|| hosted.to_path_buf())
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let db_path = var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| paths::db_path(&data_dir));

        let api_key = match var("OPENAI_API_KEY") {
            Some(k) => Some(k),
            None => io::read_trimmed(&paths::api_key_path(&data_dir)).unwrap_or_else(|e| {
                tracing::warn!("cannot read {}: {e}", paths::API_KEY_FILE);
                None
            }),
        };

        let port = match var("PORT") {
            None => DEFAULT_PORT,
            Some(p) => p
                .parse()
                .map_err(|_| HarvestError::Validation(format!("PORT is not a port number: {p}")))?,
        };

        let settings = Settings::load(&data_dir)?;

        Ok(Self {
            db_path,
            download_key: var("DOWNLOAD_KEY"),
            api_key,
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port,
            settings,
            data_dir,
        })
    }

    /// A config rooted at `data_dir` with every optional knob unset.
    pub fn for_data_dir(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            db_path: paths::db_path(data_dir),
            download_key: None,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            settings: Settings::default(),
        }
    }

    pub fn open_store(&self) -> Result<Store> {
        Store::open(&self.db_path)
    }

    pub fn checklist_path(&self) -> PathBuf {
        paths::checklist_path(&self.data_dir)
    }

    /// The chat-completions backend, when a credential is configured.
    pub fn advice_model(&self) -> Option<Box<dyn AdviceBackend>> {
        let key = self.api_key.as_deref()?;
        match ChatCompletions::new(
            &self.base_url,
            key,
            &self.model,
            self.settings.advice.temperature,
        ) {
            Ok(c) => Some(Box::new(c)),
            Err(e) => {
                tracing::warn!("advice model unavailable: {e}");
                None
            }
        }
    }

    /// The credential with its middle elided, safe to show in diagnostics.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask)
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return "***".to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}
