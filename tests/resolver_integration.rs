//! Integration tests for sector configuration resolution and caching
//!
//! Exercises the resolver over a scripted data source:
//! 1. Identifiers differing only in case/accents/spacing share one cache entry
//! 2. Concurrent resolves of one sector fetch once
//! 3. Override failures fall back to the default template
//! 4. Overrides replace whole fields

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::ScriptedSource;
use maint_registry::{
    DefaultConfigTemplate, RegistryCore, RegistryError, RegistrySettings, SectorConfigResolver,
};

fn resolver(source: &Arc<ScriptedSource>) -> SectorConfigResolver {
    SectorConfigResolver::new(source.clone())
}

// =============================================================================
// CACHE IDENTITY
// =============================================================================

#[tokio::test]
async fn test_resolve_is_case_insensitive_and_cached() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let first = resolver.resolve("MOTORES").await.unwrap();
    assert_eq!(source.sector_lists(), 1);
    assert_eq!(source.override_fetches(), 1);
    assert_eq!(resolver.cache().stats().stores, 1);

    let calls_before = source.total_calls();
    let second = resolver.resolve("motores").await.unwrap();

    assert_eq!(source.total_calls(), calls_before, "second resolve must not fetch");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(resolver.cache().stats().hits, 1);
    assert_eq!(resolver.cache().stats().stores, 1);
}

#[tokio::test]
async fn test_accented_and_spaced_identifiers_share_entry() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let a = resolver
        .resolve("Laboratório de Ensaios Elétricos")
        .await
        .unwrap();
    let b = resolver
        .resolve("  LABORATORIO DE ENSAIOS ELETRICOS ")
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.sector_key.as_str(), "laboratoriodeensaioseletricos");
    assert_eq!(resolver.cache().len().await, 1);
    assert_eq!(source.override_fetches(), 1);
}

#[tokio::test]
async fn test_resolve_by_id() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let by_id = resolver.resolve("10").await.unwrap();
    assert_eq!(by_id.display_name, "Bobinagem");
    assert_eq!(by_id.sector_key.as_str(), "bobinagem");
}

#[tokio::test]
async fn test_unknown_sector_is_not_cached() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let err = resolver.resolve("Fundição").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert!(resolver.cache().is_empty().await);

    // Next attempt asks the source again
    let _ = resolver.resolve("Fundição").await;
    assert_eq!(source.sector_lists(), 2);
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_resolves_fetch_once() {
    let source = ScriptedSource::plant();
    source.delay_overrides(Duration::from_millis(200));
    let resolver = resolver(&source);

    let (a, b, c) = tokio::join!(
        resolver.resolve("Motores"),
        resolver.resolve("MOTORES"),
        resolver.resolve("motores "),
    );

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
    assert_eq!(source.override_fetches(), 1);
    assert_eq!(resolver.cache().stats().stores, 1);
}

#[tokio::test(start_paused = true)]
async fn test_distinct_sectors_resolve_independently() {
    let source = ScriptedSource::plant();
    source.delay_overrides(Duration::from_millis(50));
    let resolver = resolver(&source);

    let results = resolver
        .resolve_many(&["Bobinagem", "Motores", "bobinagem"])
        .await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(source.override_fetches(), 2);
    assert_eq!(resolver.cache().len().await, 2);
}

// =============================================================================
// OVERRIDES
// =============================================================================

#[tokio::test]
async fn test_override_failure_falls_back_to_defaults() {
    let source = ScriptedSource::plant();
    source.fail_overrides(true);
    let resolver = resolver(&source);

    let config = resolver.resolve("Motores").await.unwrap();
    assert_eq!(*config, DefaultConfigTemplate::for_sector("Motores"));
}

#[tokio::test]
async fn test_refresh_picks_up_recovered_override() {
    let source = ScriptedSource::plant();
    source.fail_overrides(true);
    let resolver = resolver(&source);

    let degraded = resolver.resolve("Motores").await.unwrap();
    assert_eq!(degraded.test_dictionary.len(), 2);

    source.fail_overrides(false);
    let refreshed = resolver.refresh("motores").await.unwrap();
    assert_eq!(refreshed.test_dictionary.len(), 1);

    let cached = resolver.resolve("MOTORES").await.unwrap();
    assert!(Arc::ptr_eq(&refreshed, &cached));
}

#[tokio::test]
async fn test_partial_test_dictionary_replaces_whole_map() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let config = resolver.resolve("Motores").await.unwrap();
    let defaults = DefaultConfigTemplate::for_sector("Motores");

    // Override lists a single dictionary with a single test
    assert_eq!(config.test_dictionary.len(), 1);
    assert!(!config.test_dictionary.contains_key("mecanicos"));
    assert_eq!(config.test_dictionary["eletricos"].len(), 1);
    assert_eq!(config.test_dictionary["eletricos"]["TI"], "Tensão aplicada");

    // Everything else keeps the defaults
    assert_eq!(config.field_schema, defaults.field_schema);
    assert_eq!(config.activity_list, defaults.activity_list);
    assert_eq!(config.backend_endpoints, defaults.backend_endpoints);
}

#[tokio::test]
async fn test_display_name_override_keeps_sector_key() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let config = resolver.resolve("12").await.unwrap();
    assert_eq!(config.display_name, "Laboratório de Ensaios");
    assert_eq!(config.sector_key.as_str(), "laboratoriodeensaioseletricos");
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let source = ScriptedSource::plant();
    let resolver = resolver(&source);

    let first = resolver.resolve("Bobinagem").await.unwrap();
    assert!(resolver.invalidate("BOBINAGEM").await);
    assert!(!resolver.invalidate("BOBINAGEM").await);

    let second = resolver.resolve("Bobinagem").await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
    assert_eq!(source.override_fetches(), 2);
}

// =============================================================================
// REGISTRY CORE
// =============================================================================

#[tokio::test]
async fn test_core_warm_up() {
    let source = ScriptedSource::plant();
    let core = RegistryCore::new(source.clone(), &RegistrySettings::default());

    let warmed = core
        .warm(&["Bobinagem".to_string(), "Inexistente".to_string()])
        .await;
    assert_eq!(warmed, 1);

    let calls = source.total_calls();
    core.resolve("bobinagem").await.unwrap();
    assert_eq!(source.total_calls(), calls);
}
