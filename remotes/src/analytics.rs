//! Analytics remote (`react_analytics`): growth and active users.

#[cfg(test)]
#[path = "analytics_test.rs"]
mod analytics_test;

use std::sync::Arc;

use federation::{
    ModuleCatalog, MountContext, RENDER_DOM, RENDER_LIB, RemoteComponent, RemoteManifest, RenderContext, RenderError,
    SharedScope, Tone, View,
};
use serde::{Deserialize, Serialize};

use crate::data_proxy::{DataProxyClient, DataState};
use crate::format::thousands_u64;

pub const CAPABILITY_ID: &str = "analytics";
pub const REMOTE_NAME: &str = "react_analytics";
pub const EXPORT: &str = "./App";
pub const DATA_PATH: &str = "/v1/proxy/data/analytics";

/// Body of `GET /v1/proxy/data/analytics`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsData {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub growth: String,
    pub users: u64,
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
        Ok(Arc::new(AnalyticsDashboard { context }) as Arc<dyn RemoteComponent>)
    });
}

#[must_use]
pub fn analytics_view(state: &DataState<AnalyticsData>, viewer: Option<&str>) -> View {
    let mut children = vec![View::heading("Analytics Dashboard")];
    if let Some(name) = viewer {
        children.push(View::text(format!("Viewing as {name}")));
    }
    match state {
        DataState::Loading => children.push(View::text("Loading analytics data...")),
        DataState::Errored(message) => children.push(View::notice(Tone::Error, format!("Error: {message}"))),
        DataState::Loaded(data) => children.push(View::group(vec![
            View::field("Data Source", &data.source),
            View::field("Type", &data.kind),
            View::field("Growth Rate", &data.growth),
            View::field("Active Users", thousands_u64(data.users)),
        ])),
    }
    View::group(children)
}

struct AnalyticsDashboard {
    context: Arc<RenderContext>,
}

#[async_trait::async_trait]
impl RemoteComponent for AnalyticsDashboard {
    fn name(&self) -> &str {
        REMOTE_NAME
    }

    async fn render(&self, ctx: &MountContext) -> Result<View, RenderError> {
        let state = DataProxyClient::new(ctx, DATA_PATH)
            .fetch::<AnalyticsData>()
            .await;
        let viewer = self.context.get("user.name");
        Ok(analytics_view(&state, viewer.as_deref()))
    }
}
