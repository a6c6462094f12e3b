use sqlx::{sqlite::SqliteConnection, SqliteExecutor};

use crate::{
    declare::Security,
    error::{Error, Result},
};

/// Column title that marks the header line of `EQUITY_L.csv`.
const HEADER_MARKER: &str = "NAME OF COMPANY";

/// Parses the exchange CSV into `(code, name)` rows.
///
/// The header line and blank lines are skipped; only the first two columns are kept.
///
/// # Errors
/// Bytes that are not UTF-8, or a line with fewer than two columns, fail the whole
/// import with `Error::Import`.
pub fn parse_csv(csv: &[u8]) -> Result<Vec<Security>> {
    let text = std::str::from_utf8(csv)
        .map_err(|why| Error::Import(format!("catalog is not valid UTF-8: {}", why)))?;
    let mut rows = Vec::with_capacity(2048);

    for (index, line) in text.lines().enumerate() {
        if line.contains(HEADER_MARKER) || line.trim().is_empty() {
            continue;
        }

        let mut columns = line.split(',');
        match (columns.next(), columns.next()) {
            (Some(code), Some(name)) => rows.push(Security::new(code.trim(), name.trim())),
            _ => {
                return Err(Error::Import(format!(
                    "line {} has fewer than two columns: {:?}",
                    index + 1,
                    line
                )))
            }
        }
    }

    Ok(rows)
}

/// Drops `stocks`, recreates it and inserts `rows`.
///
/// Run it inside a transaction so a failure leaves no partial catalog behind.
pub async fn replace_all(conn: &mut SqliteConnection, rows: &[Security]) -> Result<u64> {
    sqlx::query("DROP TABLE IF EXISTS stocks;")
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        r#"
CREATE TABLE stocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL,
    name TEXT NOT NULL
);"#,
    )
    .execute(&mut *conn)
    .await?;

    let mut inserted = 0;
    for row in rows {
        inserted += sqlx::query("INSERT INTO stocks (code, name) VALUES (?1, ?2);")
            .bind(&row.code)
            .bind(&row.name)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }

    Ok(inserted)
}

/// Company name for `code`, matched after upper-casing the code.
///
/// # Errors
/// `Error::NotFound` when no row matches.
pub async fn fetch_name<'e>(executor: impl SqliteExecutor<'e>, code: &str) -> Result<String> {
    let code = code.to_uppercase();
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM stocks WHERE code = ?1 ORDER BY id LIMIT 1;")
            .bind(&code)
            .fetch_optional(executor)
            .await?;

    row.map(|(name,)| name).ok_or(Error::NotFound(code))
}

/// Every catalog row in import order.
pub async fn fetch_all<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<Security>> {
    Ok(
        sqlx::query_as::<_, Security>("SELECT code, name FROM stocks ORDER BY id;")
            .fetch_all(executor)
            .await?,
    )
}
