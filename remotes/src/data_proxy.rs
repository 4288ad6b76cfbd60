//! Single-endpoint client every remote uses for its domain data.
//!
//! ERROR HANDLING
//! ==============
//! Failures never escape as `Err`: they become [`DataState::Errored`] so the
//! remote renders them inside its own mount slot and the shell never sees them.

#[cfg(test)]
#[path = "data_proxy_test.rs"]
mod data_proxy_test;

use federation::MountContext;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

/// Display state of one domain-data fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DataState<T> {
    #[default]
    Loading,
    Errored(String),
    Loaded(T),
}

fn status_failed_message(status: u16) -> String {
    format!("request failed with status {status}")
}

/// GETs one backend proxy path with the shell's credentials.
#[derive(Clone, Debug)]
pub struct DataProxyClient {
    http: reqwest::Client,
    url: String,
}

impl DataProxyClient {
    #[must_use]
    pub fn new(ctx: &MountContext, path: &str) -> Self {
        Self { http: ctx.http.clone(), url: ctx.api_url(path) }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch<T: DeserializeOwned>(&self) -> DataState<T> {
        let resp = match self
            .http
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "data proxy request failed");
                return DataState::Errored(format!("request failed: {e}"));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %self.url, status = status.as_u16(), "data proxy returned error status");
            return DataState::Errored(status_failed_message(status.as_u16()));
        }

        match resp.json::<T>().await {
            Ok(payload) => DataState::Loaded(payload),
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "data proxy body did not parse");
                DataState::Errored(format!("invalid response body: {e}"))
            }
        }
    }
}
