use std::{env, path::PathBuf, str::FromStr};

use anyhow::{ensure, Context, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";
const DATABASE_FILE_NAME: &str = "nse.db";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct App {
    pub nse: Nse,
    pub database: Database,
    pub log: Log,
    /// Enables debug lines; set from `-D`, never from the file.
    #[serde(skip)]
    pub debug: bool,
}

const NSECLI_QUOTE_URL: &str = "NSECLI_QUOTE_URL";
const NSECLI_CATALOG_URL: &str = "NSECLI_CATALOG_URL";
const NSECLI_TIMEOUT_SECS: &str = "NSECLI_TIMEOUT_SECS";

/// Endpoints and the browser-like headers sent to the exchange.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Nse {
    pub quote_url: String,
    pub catalog_url: String,
    pub host: String,
    pub referer: String,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for Nse {
    fn default() -> Self {
        Nse {
            quote_url:
                "http://nseindia.com/live_market/dynaContent/live_watch/get_quote/GetQuote.jsp"
                    .to_string(),
            catalog_url: "http://www.nseindia.com/content/equities/EQUITY_L.csv".to_string(),
            host: "nseindia.com".to_string(),
            referer: "http://nseindia.com/live_market/dynaContent/live_watch/get_quote/GetQuote.jsp?symbol=INFY&illiquid=0".to_string(),
            user_agent:
                "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:28.0) Gecko/20100101 Firefox/28.0"
                    .to_string(),
            accept: "*/*".to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

const NSECLI_DB_PATH: &str = "NSECLI_DB_PATH";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Database {
    /// Defaults to `nse.db` beside the executable.
    pub path: Option<PathBuf>,
}

const NSECLI_LOG_DIR: &str = "NSECLI_LOG_DIR";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Log {
    /// When unset, log lines only go to stderr.
    pub dir: Option<PathBuf>,
}

impl App {
    /// Reads `app.json` when present, then applies environment overrides.
    pub fn load(debug: bool) -> Result<Self> {
        let mut app = Self::get()?.override_with_env()?;
        app.debug = debug;
        Ok(app)
    }

    fn get() -> Result<Self> {
        let config_path = config_path();
        if !config_path.exists() {
            return Ok(App::default());
        }

        config_config::builder()
            .add_source(config_file::from(config_path.clone()))
            .build()
            .and_then(|c| c.try_deserialize::<App>())
            .with_context(|| format!("I can't read the config file {}", config_path.display()))
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Result<Self> {
        if let Ok(url) = env::var(NSECLI_QUOTE_URL) {
            self.nse.quote_url = url;
        }

        if let Ok(url) = env::var(NSECLI_CATALOG_URL) {
            self.nse.catalog_url = url;
        }

        if let Ok(secs) = env::var(NSECLI_TIMEOUT_SECS) {
            self.nse.timeout_secs = parse_timeout_secs(&secs)
                .with_context(|| format!("invalid {}: {:?}", NSECLI_TIMEOUT_SECS, secs))?;
        }

        if let Ok(path) = env::var(NSECLI_DB_PATH) {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(dir) = env::var(NSECLI_LOG_DIR) {
            self.log.dir = Some(PathBuf::from(dir));
        }

        Ok(self)
    }

    /// Location of the SQLite file holding the catalog and display settings.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let exe = env::current_exe().context("Failed to locate the running executable")?;
        let dir = exe
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(dir.join(DATABASE_FILE_NAME))
    }
}

/// A request timeout in whole seconds; zero would fail every request at once.
fn parse_timeout_secs(secs: &str) -> Result<u64> {
    let secs = u64::from_str(secs.trim())?;
    ensure!(secs > 0, "timeout must be at least one second");
    Ok(secs)
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
