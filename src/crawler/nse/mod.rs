//! # National Stock Exchange of India
//!
//! - `quote`: the GetQuote page, whose `responseDiv` element embeds the quote JSON.
//! - `security_list`: the `EQUITY_L.csv` download of every listed equity.
//!
//! Both calls go through one [`Http`] instance so the session cookie set by the first
//! call is sent with the second.

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, HOST, REFERER, USER_AGENT,
};

use crate::{
    config,
    crawler::QuoteSource,
    declare::Quote,
    error::{Error, Result},
    logging::Logger,
    util::http::Http,
};

/// 即時報價
pub mod quote;
/// 上市股票清單
pub mod security_list;

pub use quote::find_probable_matches;

/// NSE fetcher holding the shared HTTP session.
pub struct Nse {
    http: Http,
    quote_url: String,
    catalog_url: String,
    logger: Logger,
}

impl Nse {
    pub fn new(settings: &config::Nse, logger: &Logger) -> Result<Self> {
        let headers = build_headers(settings)?;

        Ok(Nse {
            http: Http::new(settings, headers, logger.named("http"))?,
            quote_url: settings.quote_url.clone(),
            catalog_url: settings.catalog_url.clone(),
            logger: logger.named("nse"),
        })
    }
}

#[async_trait]
impl QuoteSource for Nse {
    async fn fetch_quote(&self, code: &str) -> Result<Quote> {
        quote::visit(self, code).await
    }

    async fn fetch_security_catalog(&self) -> Result<Vec<u8>> {
        security_list::visit(self).await
    }
}

/// Browser-like headers the exchange expects on every request.
fn build_headers(settings: &config::Nse) -> Result<HeaderMap> {
    let mut h = HeaderMap::with_capacity(6);
    h.insert(ACCEPT, header_value(&settings.accept)?);
    h.insert(ACCEPT_LANGUAGE, header_value(&settings.accept_language)?);
    h.insert(HOST, header_value(&settings.host)?);
    h.insert(REFERER, header_value(&settings.referer)?);
    h.insert(USER_AGENT, header_value(&settings.user_agent)?);
    h.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    Ok(h)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|why| Error::Configuration(format!("invalid header value {:?}: {}", value, why)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_headers() {
        let headers = build_headers(&config::Nse::default()).unwrap();

        assert_eq!(headers.len(), 6);
        assert_eq!(headers[HOST], "nseindia.com");
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
        assert!(headers[USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_build_headers_rejects_control_characters() {
        let mut settings = config::Nse::default();
        settings.referer = "bad\nvalue".to_string();

        assert!(matches!(
            build_headers(&settings),
            Err(Error::Configuration(_))
        ));
    }
}
