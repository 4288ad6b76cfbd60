use super::*;
use crate::test_helpers::{StaticSource, unreachable};

fn registry(source: &Arc<StaticSource>) -> CachedRegistry {
    CachedRegistry::new(CapabilityTable::builtin(), Arc::clone(source) as Arc<dyn ModuleSource>)
}

#[tokio::test]
async fn resolve_loads_once_and_caches() {
    let source = Arc::new(StaticSource::builtin());
    let registry = registry(&source);

    let first = registry.resolve("metrics").await.unwrap();
    let second = registry.resolve("metrics").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.loads("metrics"), 1);
    assert!(registry.is_cached("metrics"));
    assert!(!registry.is_cached("analytics"));
}

#[tokio::test]
async fn concurrent_resolve_shares_one_load() {
    let source = Arc::new(StaticSource::builtin());
    let registry = registry(&source);

    let (a, b) = tokio::join!(registry.resolve("analytics"), registry.resolve("analytics"));
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(source.loads("analytics"), 1);
}

#[tokio::test]
async fn unknown_capability_is_rejected_without_loading() {
    let source = Arc::new(StaticSource::builtin());
    let err = registry(&source).resolve("billing").await.unwrap_err();
    assert_eq!(err, LoadError::UnknownCapability("billing".to_owned()));
    assert_eq!(source.loads("billing"), 0);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let source = Arc::new(StaticSource::builtin().with_failure("metrics", unreachable("metrics")));
    let registry = registry(&source);

    assert!(registry.resolve("metrics").await.is_err());
    assert!(!registry.is_cached("metrics"));

    source.heal("metrics");
    assert!(registry.resolve("metrics").await.is_ok());
    assert_eq!(source.loads("metrics"), 2);
}

#[tokio::test]
async fn invalidate_forces_reload() {
    let source = Arc::new(StaticSource::builtin());
    let registry = registry(&source);

    registry.resolve("metrics").await.unwrap();
    registry.resolve("analytics").await.unwrap();
    registry.invalidate("metrics");
    assert!(!registry.is_cached("metrics"));
    assert!(registry.is_cached("analytics"));

    registry.resolve("metrics").await.unwrap();
    assert_eq!(source.loads("metrics"), 2);

    registry.invalidate_all();
    assert!(!registry.is_cached("analytics"));
}
