//! Metrics remote (`react_metrics`): current value and health of the data source.

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;

use std::sync::Arc;

use federation::{
    ModuleCatalog, MountContext, RENDER_DOM, RENDER_LIB, RemoteComponent, RemoteManifest, RenderContext,
    RenderError, SharedScope, Tone, View,
};
use serde::{Deserialize, Serialize};

use crate::data_proxy::{DataProxyClient, DataState};
use crate::format::thousands;

pub const CAPABILITY_ID: &str = "metrics";
pub const REMOTE_NAME: &str = "react_metrics";
pub const EXPORT: &str = "./App";
pub const DATA_PATH: &str = "/v1/proxy/data/metrics";

/// Body of `GET /v1/proxy/data/metrics`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsData {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub status: String,
}

/// Tone for a reported health status; unknown statuses are informational.
#[must_use]
pub fn status_tone(status: &str) -> Tone {
    match status.to_ascii_lowercase().as_str() {
        "healthy" => Tone::Healthy,
        "warning" => Tone::Warning,
        "critical" => Tone::Critical,
        _ => Tone::Info,
    }
}

#[must_use]
pub fn manifest() -> RemoteManifest {
    RemoteManifest::new(REMOTE_NAME)
        .expose(EXPORT, "./src/App.tsx")
        .share_singleton(RENDER_LIB, "^18.2.0")
        .share_singleton(RENDER_DOM, "^18.2.0")
}

pub fn register(catalog: &mut ModuleCatalog) {
    catalog.register(REMOTE_NAME, EXPORT, |scope: &SharedScope| {
        let context = scope.require::<RenderContext>(RENDER_LIB)?;
        Ok(Arc::new(MetricsDashboard { context }) as Arc<dyn RemoteComponent>)
    });
}

/// Build the dashboard for a fetch state.
#[must_use]
pub fn metrics_view(state: &DataState<MetricsData>, viewer: Option<&str>) -> View {
    let mut children = vec![View::heading("Metrics Dashboard")];
    if let Some(name) = viewer {
        children.push(View::text(format!("Viewing as {name}")));
    }
    match state {
        DataState::Loading => children.push(View::text("Loading metrics data...")),
        DataState::Errored(message) => children.push(View::notice(Tone::Error, format!("Error: {message}"))),
        DataState::Loaded(data) => children.push(View::group(vec![
            View::field("Data Source", &data.source),
            View::field("Type", &data.kind),
            View::field("Current Value", thousands(data.value)),
            View::notice(status_tone(&data.status), &data.status),
        ])),
    }
    View::group(children)
}

struct MetricsDashboard {
    context: Arc<RenderContext>,
}

#[async_trait::async_trait]
impl RemoteComponent for MetricsDashboard {
    fn name(&self) -> &str {
        REMOTE_NAME
    }

    async fn render(&self, ctx: &MountContext) -> Result<View, RenderError> {
        let client = DataProxyClient::new(ctx, DATA_PATH);
        let state = client.fetch::<MetricsData>().await;
        let viewer = self.context.get("user.name");
        Ok(metrics_view(&state, viewer.as_deref()))
    }
}
