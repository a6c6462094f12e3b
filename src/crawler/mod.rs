use async_trait::async_trait;

use crate::{declare::Quote, error::Result};

/// 印度國家證券交易所
pub mod nse;

/// A site that serves live quotes and the bulk code→name list.
#[async_trait]
pub trait QuoteSource {
    /// Current quote fields for one security code.
    async fn fetch_quote(&self, code: &str) -> Result<Quote>;
    /// Raw CSV bytes of every listed security.
    async fn fetch_security_catalog(&self) -> Result<Vec<u8>>;
}
