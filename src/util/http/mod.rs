use std::time::{Duration, Instant};

use reqwest::{header::HeaderMap, Client, Method, Response};

use crate::{
    config,
    error::{Error, Result},
    logging::Logger,
};

/// A reqwest client bound to one set of default headers and a cookie jar.
///
/// Cookies set by one response are replayed on every later request made through the
/// same instance, which the quote page relies on.
pub struct Http {
    client: Client,
    logger: Logger,
}

impl Http {
    /// Builds the client with the configured timeouts and default headers.
    ///
    /// # Errors
    /// Returns `Error::Configuration` when reqwest rejects the builder settings.
    pub fn new(settings: &config::Nse, headers: HeaderMap, logger: Logger) -> Result<Self> {
        // reqwest is built without a bundled provider; a second install is a no-op error.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let client = Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .deflate(true)
            .gzip(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .default_headers(headers)
            .build()
            .map_err(|why| {
                Error::Configuration(format!("Failed to create reqwest client: {:?}", why))
            })?;

        Ok(Http { client, logger })
    }

    /// Performs an HTTP GET request and returns the response as text.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.send(Method::GET, url)
            .await?
            .text()
            .await
            .map_err(|why| Error::network(url, describe(&why)))
    }

    /// Performs an HTTP GET request and returns the raw body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.send(Method::GET, url)
            .await?
            .bytes()
            .await
            .map(|body| body.to_vec())
            .map_err(|why| Error::network(url, describe(&why)))
    }

    /// Sends a single request; no retry is attempted.
    ///
    /// # Errors
    /// Connection failures, timeouts and non-2xx statuses become `Error::Network`.
    async fn send(&self, method: Method, url: &str) -> Result<Response> {
        let visit_log = format!("{method}:{url}");
        let start = Instant::now();
        let res = self.client.request(method, url).send().await;
        let elapsed = start.elapsed().as_millis();

        match res {
            Ok(response) => {
                self.logger.debug(format!(
                    "{} {} {} ms",
                    visit_log,
                    response.status(),
                    elapsed
                ));
                response
                    .error_for_status()
                    .map_err(|why| Error::network(url, describe(&why)))
            }
            Err(why) => {
                self.logger
                    .debug(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
                Err(Error::network(url, describe(&why)))
            }
        }
    }
}

fn describe(why: &reqwest::Error) -> String {
    if why.is_timeout() {
        return "request timed out".to_string();
    }

    if why.is_connect() {
        return format!("no internet connection ({})", why);
    }

    match why.status() {
        Some(status) => format!("HTTP status {}", status),
        None => why.to_string(),
    }
}
