use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[test]
fn loaded_view_groups_user_count() {
    let data = AnalyticsData {
        source: "Data Backend".to_owned(),
        kind: "Analytics".to_owned(),
        growth: "15%".to_owned(),
        users: 5400,
    };
    let view = analytics_view(&DataState::Loaded(data), None);
    assert!(view.contains_text("Analytics Dashboard"));
    assert!(view.contains_text("15%"));
    assert!(view.contains_text("5,400"));
}

#[test]
fn loading_view_has_placeholder() {
    let view = analytics_view(&DataState::Loading, None);
    assert!(view.contains_text("Loading analytics data..."));
}

#[test]
fn manifest_and_catalog_agree() {
    let manifest = manifest();
    let export = manifest.validate(&SharedScope::host()).unwrap();
    assert!(crate::catalog().contains(&manifest.name, export));
    assert_eq!(crate::manifest_for(CAPABILITY_ID), Some(manifest));
    assert_eq!(crate::manifest_for("billing"), None);
}

#[tokio::test]
async fn backend_failure_renders_inside_the_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DATA_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let scope = Arc::new(SharedScope::host());
    let component = crate::catalog().link(REMOTE_NAME, EXPORT, &scope).unwrap();
    let ctx = MountContext {
        capability_id: CAPABILITY_ID.to_owned(),
        shared: scope,
        http: reqwest::Client::new(),
        api_base: url::Url::parse(&server.uri()).unwrap(),
    };

    let view = component.render(&ctx).await.unwrap();
    assert!(view.contains_text("502"));
}
