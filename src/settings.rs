//! Display settings store.
//!
//! Holds the three field lists of [`DisplaySetting`] plus the security catalog in one
//! SQLite file. `current_fields` is the only list that changes after bootstrap, and
//! every change to it is validated against `all_fields` as a whole request.

use std::{collections::BTreeSet, fs, path::Path, str::FromStr};

use scopeguard::ScopeGuard;
use strum::IntoEnumIterator;

use crate::{
    crawler::QuoteSource,
    database::{
        self,
        table::{config::Config, stock},
        Database,
    },
    declare::{DisplaySetting, Security},
    error::{Error, Result},
    logging::Logger,
    util::text,
};

pub struct Settings {
    db: Database,
    logger: Logger,
}

impl Settings {
    pub fn new(db: Database, logger: &Logger) -> Self {
        Settings {
            db,
            logger: logger.named("settings"),
        }
    }

    /// Opens the store at `path`, bootstrapping it from `source` on first run.
    ///
    /// The catalog is downloaded before the file is created. If the import fails the
    /// new file is removed again so the next run retries from scratch. An existing
    /// file is used as is, however stale its catalog.
    pub async fn open_or_bootstrap(
        path: &Path,
        source: &(impl QuoteSource + Sync),
        logger: &Logger,
    ) -> Result<Self> {
        if database::exists(path) {
            logger.debug(format!("db file {} present, no initialization required", path.display()));
            return Ok(Settings::new(Database::open(path).await?, logger));
        }

        logger.debug(format!("db file {} not present, initialization required", path.display()));
        let csv = source.fetch_security_catalog().await?;

        let cleanup = scopeguard::guard(path.to_path_buf(), |p| {
            if !p.exists() {
                return;
            }
            if let Err(why) = fs::remove_file(&p) {
                crate::logging::error_console(format!(
                    "Failed to remove incomplete database {}: {}",
                    p.display(),
                    why
                ));
            }
        });

        let settings = Settings::new(Database::open(path).await?, logger);
        if let Err(why) = settings.bootstrap(&csv).await {
            settings.close().await;
            return Err(why);
        }

        ScopeGuard::into_inner(cleanup);
        Ok(settings)
    }

    /// Replaces the catalog with `catalog_csv` and seeds the three display settings.
    ///
    /// Everything happens in one transaction: a malformed CSV line leaves the store
    /// untouched.
    pub async fn bootstrap(&self, catalog_csv: &[u8]) -> Result<()> {
        let rows = stock::parse_csv(catalog_csv)?;
        let mut tx = self.db.tx().await?;

        let inserted = stock::replace_all(&mut tx, &rows).await?;
        Config::create_table(&mut tx).await?;
        for setting in DisplaySetting::iter() {
            Config::new(setting.to_string(), text::join_tokens(setting.seed()))
                .upsert(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.logger.info(format!(
            "imported {} securities and seeded display settings",
            inserted
        ));

        Ok(())
    }

    /// Tokens stored under the setting called `name`.
    ///
    /// # Errors
    /// `Error::Configuration` for an unknown name or a missing row.
    pub async fn get_setting(&self, name: &str) -> Result<Vec<String>> {
        self.get(parse_setting(name)?).await
    }

    /// Overwrites the setting called `name`; last writer wins.
    pub async fn set_setting<S: AsRef<str>>(&self, name: &str, value: &[S]) -> Result<()> {
        self.set(parse_setting(name)?, value).await
    }

    pub async fn get(&self, setting: DisplaySetting) -> Result<Vec<String>> {
        self.logger
            .debug(format!("getting config setting for {}", setting));

        match Config::first(self.db.pool(), setting.as_ref()).await {
            Ok(Some(row)) => Ok(text::split_tokens(&row.value)),
            Ok(None) => Err(Error::Configuration(format!(
                "setting {} is missing, delete the database to re-initialize",
                setting
            ))),
            Err(why) => Err(Error::Configuration(format!(
                "setting {} is unreadable: {}",
                setting, why
            ))),
        }
    }

    pub async fn set<S: AsRef<str>>(&self, setting: DisplaySetting, value: &[S]) -> Result<()> {
        let value = text::join_tokens(value);
        self.logger
            .debug(format!("updating {} to: {}", setting, value));

        Config::new(setting.to_string(), value)
            .upsert(self.db.pool())
            .await?;

        Ok(())
    }

    /// Appends `requested` to `current_fields`, all or nothing.
    ///
    /// # Errors
    /// `Error::Validation` naming every field already displayed (or repeated in the
    /// request) and every field unknown to `all_fields`; nothing is added then.
    pub async fn add_fields<S: AsRef<str>>(&self, requested: &[S]) -> Result<()> {
        let requested: Vec<&str> = requested.iter().map(AsRef::as_ref).collect();
        self.logger
            .debug(format!("display fields to be added: {:?}", requested));

        let all_fields = self.get(DisplaySetting::AllFields).await?;
        let mut current_fields = self.get(DisplaySetting::CurrentFields).await?;
        let mut already_exists = BTreeSet::new();
        let mut invalid = BTreeSet::new();
        let mut seen = BTreeSet::new();

        for field in &requested {
            if current_fields.iter().any(|f| f == field) || !seen.insert(*field) {
                already_exists.insert(field.to_string());
            }

            if !all_fields.iter().any(|f| f == field) {
                invalid.insert(field.to_string());
            }
        }

        if !already_exists.is_empty() || !invalid.is_empty() {
            return Err(Error::Validation {
                already_exists,
                invalid,
            });
        }

        current_fields.extend(requested.iter().map(|f| f.to_string()));
        self.set(DisplaySetting::CurrentFields, &current_fields).await
    }

    /// Removes `requested` from `current_fields`, all or nothing.
    ///
    /// # Errors
    /// `Error::Validation` naming every field that is not currently displayed.
    pub async fn remove_fields<S: AsRef<str>>(&self, requested: &[S]) -> Result<()> {
        let requested: Vec<&str> = requested.iter().map(AsRef::as_ref).collect();
        self.logger
            .debug(format!("removing display fields: {:?}", requested));

        let mut current_fields = self.get(DisplaySetting::CurrentFields).await?;
        let mut invalid = BTreeSet::new();

        for field in &requested {
            match current_fields.iter().position(|f| f == field) {
                Some(index) => {
                    current_fields.remove(index);
                }
                None => {
                    invalid.insert(field.to_string());
                }
            }
        }

        if !invalid.is_empty() {
            return Err(Error::Validation {
                already_exists: BTreeSet::new(),
                invalid,
            });
        }

        self.set(DisplaySetting::CurrentFields, &current_fields).await
    }

    /// Copies `default_fields` over `current_fields`.
    pub async fn reset_fields(&self) -> Result<()> {
        self.logger.debug("resetting current_fields".to_string());
        let default_fields = self.get(DisplaySetting::DefaultFields).await?;
        self.set(DisplaySetting::CurrentFields, &default_fields).await
    }

    /// Company name for a security code, case-insensitively.
    pub async fn lookup_name(&self, code: &str) -> Result<String> {
        self.logger
            .debug(format!("fetching stock name for {}", code));
        stock::fetch_name(self.db.pool(), code).await
    }

    /// The whole code→name catalog.
    pub async fn catalog(&self) -> Result<Vec<Security>> {
        stock::fetch_all(self.db.pool()).await
    }

    pub async fn close(&self) {
        self.db.close().await;
    }
}

fn parse_setting(name: &str) -> Result<DisplaySetting> {
    DisplaySetting::from_str(name)
        .map_err(|_| Error::Configuration(format!("unknown setting {}", name)))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{
        config,
        declare::{Quote, ALL_DISPLAY_FIELDS, DEFAULT_DISPLAY_FIELDS},
    };

    use super::*;

    const EQUITY_L: &str = "SYMBOL,NAME OF COMPANY, SERIES, DATE OF LISTING\n\
INFY,Infosys Limited,EQ,08-FEB-1995\n\
TCS,Tata Consultancy Services Limited,EQ,25-AUG-2004\n\
\n";

    struct StubSource {
        csv: Result<Vec<u8>>,
    }

    #[async_trait]
    impl QuoteSource for StubSource {
        async fn fetch_quote(&self, code: &str) -> Result<Quote> {
            Err(Error::InvalidCode(code.to_string()))
        }

        async fn fetch_security_catalog(&self) -> Result<Vec<u8>> {
            match &self.csv {
                Ok(csv) => Ok(csv.clone()),
                Err(_) => Err(Error::network("http://stub/EQUITY_L.csv", "offline")),
            }
        }
    }

    fn logger() -> Logger {
        Logger::new(&config::App::default()).0
    }

    async fn bootstrapped(dir: &tempfile::TempDir) -> Settings {
        let source = StubSource {
            csv: Ok(EQUITY_L.as_bytes().to_vec()),
        };
        Settings::open_or_bootstrap(&dir.path().join("nse.db"), &source, &logger())
            .await
            .unwrap()
    }

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_settings_and_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        assert_eq!(
            settings.get_setting("current_fields").await.unwrap(),
            strings(&DEFAULT_DISPLAY_FIELDS)
        );
        assert_eq!(
            settings.get_setting("default_fields").await.unwrap(),
            strings(&DEFAULT_DISPLAY_FIELDS)
        );
        assert_eq!(
            settings.get_setting("all_fields").await.unwrap(),
            strings(&ALL_DISPLAY_FIELDS)
        );
        assert_eq!(settings.lookup_name("tcs").await.unwrap(), "Tata Consultancy Services Limited");
        assert_eq!(settings.catalog().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_store_skips_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        settings.remove_fields(&["open"]).await.unwrap();
        settings.close().await;

        let offline = StubSource {
            csv: Err(Error::NotFound(String::new())),
        };
        let reopened =
            Settings::open_or_bootstrap(&dir.path().join("nse.db"), &offline, &logger())
                .await
                .unwrap();

        assert!(!reopened
            .get(DisplaySetting::CurrentFields)
            .await
            .unwrap()
            .contains(&"open".to_string()));
    }

    #[tokio::test]
    async fn test_failed_download_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nse.db");
        let offline = StubSource {
            csv: Err(Error::NotFound(String::new())),
        };

        let result = Settings::open_or_bootstrap(&path, &offline, &logger()).await;

        assert!(matches!(result, Err(Error::Network { .. })));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_malformed_catalog_removes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nse.db");
        let broken = StubSource {
            csv: Ok(b"SYMBOL,NAME OF COMPANY\nINFY,Infosys Limited\nBROKEN\n".to_vec()),
        };

        let result = Settings::open_or_bootstrap(&path, &broken, &logger()).await;

        assert!(matches!(result, Err(Error::Import(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_malformed_reimport_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        let result = settings.bootstrap(b"SYMBOL,NAME OF COMPANY\nBROKEN\n").await;

        assert!(matches!(result, Err(Error::Import(_))));
        assert_eq!(settings.catalog().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_setting_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        assert!(matches!(
            settings.get_setting("DISPLAY_FIELDS").await,
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            settings.set_setting("favourite_fields", &["open"]).await,
            Err(Error::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_row_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        sqlx::query("DELETE FROM config WHERE setting = 'default_fields';")
            .execute(settings.db.pool())
            .await
            .unwrap();

        assert!(matches!(
            settings.reset_fields().await,
            Err(Error::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        let value = strings(&["symbol", "lastPrice", "cm_adj_low_dt", "pChange"]);

        settings.set_setting("current_fields", &value).await.unwrap();
        assert_eq!(settings.get_setting("current_fields").await.unwrap(), value);

        settings.set_setting("current_fields", &[] as &[&str]).await.unwrap();
        assert!(settings.get_setting("current_fields").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_fields_appends_in_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        settings.add_fields(&["symbol", "isinCode"]).await.unwrap();

        let current = settings.get(DisplaySetting::CurrentFields).await.unwrap();
        assert_eq!(current.len(), DEFAULT_DISPLAY_FIELDS.len() + 2);
        assert_eq!(&current[current.len() - 2..], ["symbol", "isinCode"]);
    }

    #[tokio::test]
    async fn test_add_fields_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        let before = settings.get(DisplaySetting::CurrentFields).await.unwrap();

        match settings.add_fields(&["symbol", "lastPrice", "bogus"]).await {
            Err(Error::Validation {
                already_exists,
                invalid,
            }) => {
                assert_eq!(already_exists, BTreeSet::from(["lastPrice".to_string()]));
                assert_eq!(invalid, BTreeSet::from(["bogus".to_string()]));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(settings.get(DisplaySetting::CurrentFields).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_add_existing_field_reports_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        match settings.add_fields(&["lastPrice"]).await {
            Err(Error::Validation {
                already_exists,
                invalid,
            }) => {
                assert_eq!(already_exists, BTreeSet::from(["lastPrice".to_string()]));
                assert!(invalid.is_empty());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_fields_rejects_repeats_within_request() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        assert!(matches!(
            settings.add_fields(&["symbol", "symbol"]).await,
            Err(Error::Validation { already_exists, .. }) if already_exists.contains("symbol")
        ));
    }

    #[tokio::test]
    async fn test_remove_fields() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        settings.remove_fields(&["open", "low52"]).await.unwrap();

        let current = settings.get(DisplaySetting::CurrentFields).await.unwrap();
        assert_eq!(current.len(), DEFAULT_DISPLAY_FIELDS.len() - 2);
        assert!(!current.iter().any(|f| f == "open" || f == "low52"));
        assert_eq!(current[0], "lastPrice");
    }

    #[tokio::test]
    async fn test_remove_fields_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        let before = settings.get(DisplaySetting::CurrentFields).await.unwrap();

        match settings.remove_fields(&["open", "symbol"]).await {
            Err(Error::Validation {
                already_exists,
                invalid,
            }) => {
                assert!(already_exists.is_empty());
                assert_eq!(invalid, BTreeSet::from(["symbol".to_string()]));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert_eq!(settings.get(DisplaySetting::CurrentFields).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_reset_fields_restores_defaults_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;
        settings.add_fields(&["symbol"]).await.unwrap();
        settings.remove_fields(&["open", "change"]).await.unwrap();

        settings.reset_fields().await.unwrap();
        let once = settings.get_setting("current_fields").await.unwrap();
        settings.reset_fields().await.unwrap();
        let twice = settings.get_setting("current_fields").await.unwrap();

        assert_eq!(once, settings.get_setting("default_fields").await.unwrap());
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_lookup_name_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let settings = bootstrapped(&dir).await;

        assert!(matches!(
            settings.lookup_name("wipro").await,
            Err(Error::NotFound(code)) if code == "WIPRO"
        ));
    }
}
