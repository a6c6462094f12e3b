use std::{path::Path, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Sqlite, Transaction,
};

use crate::error::Result;

pub mod table;

/// SQLite 連線池封裝。
///
/// The CLI does a handful of sequential statements per run, so the pool holds a
/// single connection; `database::table::*` borrows it through [`Database::pool`].
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database file, creating an empty one when it is missing.
    ///
    /// # Errors
    /// 當檔案無法開啟或建立時回傳錯誤。
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    /// 取得連線池參考。
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 從目前連線池建立一筆 transaction。
    ///
    /// # Errors
    /// 當 `BEGIN` 失敗時回傳錯誤。
    pub async fn tx(&self) -> Result<Transaction<'_, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Waits for the connection to be returned and closes it.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Whether the persistent store has been created by an earlier run.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}
