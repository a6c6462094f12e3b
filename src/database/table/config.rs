use sqlx::{
    sqlite::{SqliteConnection, SqliteQueryResult},
    SqliteExecutor,
};

use crate::error::Result;

/// 系統設定表 `config` 的資料列。
#[derive(sqlx::FromRow, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 設定名稱，例如 `current_fields`。
    pub setting: String,
    /// 以空白串接的欄位名稱。
    pub value: String,
}

impl Config {
    /// 建立一筆 `Config` 實例。
    pub fn new(setting: impl Into<String>, value: impl Into<String>) -> Self {
        Config {
            setting: setting.into(),
            value: value.into(),
        }
    }

    /// Drops and recreates the table; `setting` is unique.
    pub async fn create_table(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query("DROP TABLE IF EXISTS config;")
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            r#"
CREATE TABLE config (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    setting TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL
);"#,
        )
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// 取得一筆指定 setting 的資料，查無資料時回傳 `None`。
    pub async fn first<'e>(
        executor: impl SqliteExecutor<'e>,
        setting: &str,
    ) -> Result<Option<Config>> {
        let sql = r#"
SELECT setting, value
FROM config
WHERE setting = ?1;
"#;

        Ok(sqlx::query_as::<_, Config>(sql)
            .bind(setting)
            .fetch_optional(executor)
            .await?)
    }

    /// 新增或更新 `config` 的設定值。
    pub async fn upsert<'e>(&self, executor: impl SqliteExecutor<'e>) -> Result<SqliteQueryResult> {
        let sql = r#"
INSERT INTO config
    (setting, value)
VALUES
    (?1, ?2)
ON CONFLICT (setting)
DO UPDATE SET value = excluded.value;"#;

        Ok(sqlx::query(sql)
            .bind(&self.setting)
            .bind(&self.value)
            .execute(executor)
            .await?)
    }
}
