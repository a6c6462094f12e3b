use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use urlencoding::encode;

use crate::{
    crawler::nse::Nse,
    declare::{Quote, Security},
    error::{Error, Result},
    util::text,
};

/// Opening tag of the hidden element whose content is the quote JSON.
static RESPONSE_DIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<div\s+id\s*=\s*["']responseDiv["'][^>]*>"#)
        .expect("responseDiv pattern is valid")
});

#[derive(Deserialize, Debug)]
struct QuoteResponse {
    data: Vec<Quote>,
}

/// 抓取個股即時報價
pub(super) async fn visit(nse: &Nse, code: &str) -> Result<Quote> {
    let url = format!(
        "{base}?symbol={symbol}&illiquid=0",
        base = nse.quote_url,
        symbol = encode(code)
    );
    let text = nse.http.get(&url).await?;

    let quote = parse(code, &text).inspect_err(|_| {
        nse.logger
            .debug(format!("quote page for {} had no usable payload", code));
    })?;
    nse.logger
        .debug(format!("quote for {} carries {} fields", code, quote.field_count()));

    Ok(quote)
}

/// Pulls the first `data` entry out of the quote page body.
///
/// # Errors
/// Any failure to find or decode the payload is reported as `Error::InvalidCode`,
/// the exchange's answer to an unknown symbol.
pub fn parse(code: &str, body: &str) -> Result<Quote> {
    extract(body).map_err(|_| Error::InvalidCode(code.to_string()))
}

fn extract(body: &str) -> anyhow::Result<Quote> {
    let marker = RESPONSE_DIV
        .find(body)
        .ok_or_else(|| anyhow!("responseDiv not found"))?;
    let payload = body[marker.end()..].trim_start();
    let response = serde_json::Deserializer::from_str(payload)
        .into_iter::<QuoteResponse>()
        .next()
        .ok_or_else(|| anyhow!("responseDiv is empty"))??;

    response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("responseDiv data is empty"))
}

/// Securities whose company name or code contains `code`, ignoring case.
///
/// Catalog order is kept and nothing is ranked or deduplicated.
pub fn find_probable_matches(code: &str, catalog: &[Security]) -> Vec<Security> {
    catalog
        .iter()
        .filter(|s| {
            text::contains_ignore_case(&s.name, code) || text::contains_ignore_case(&s.code, code)
        })
        .cloned()
        .collect()
}
