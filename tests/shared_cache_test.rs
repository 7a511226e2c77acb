//! Shared cache tests against a live PostgreSQL
//!
//! Skipped unless `DATABASE_URL` is set.

#![cfg(feature = "postgres")]

mod common;

use common::greeting;
use longcall::cache::{CacheProvider, ResponseCache, SharedResponseCache};
use longcall::config::DatabaseConfig;
use longcall::engine::TaskEngine;
use longcall::task::{CachedResponse, PollOutcome, TaskFailure, TaskHandle, TaskStatus};
use std::sync::Arc;
use std::time::Duration;

async fn shared_cache() -> Option<SharedResponseCache<Vec<String>>> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url: Some(url),
        ..DatabaseConfig::default()
    };
    let cache = SharedResponseCache::connect(&config).await.unwrap();
    cache.ensure_schema().await.unwrap();
    Some(cache)
}

#[tokio::test]
async fn test_put_get_remove() {
    let Some(cache) = shared_cache().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let handle = TaskHandle::generate();

    assert!(cache.get(handle).await.unwrap().is_none());

    cache
        .put(handle, CachedResponse::Complete(greeting()))
        .await
        .unwrap();
    assert_eq!(
        cache.get(handle).await.unwrap(),
        Some(CachedResponse::Complete(greeting()))
    );

    assert_eq!(
        cache.remove(handle).await.unwrap(),
        Some(CachedResponse::Complete(greeting()))
    );
    assert!(cache.remove(handle).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failure_metadata_survives_storage() {
    let Some(cache) = shared_cache().await else {
        return;
    };
    let handle = TaskHandle::generate();
    let failure = TaskFailure::new("billing::Declined", "card; declined=true 100%");

    cache
        .put(handle, CachedResponse::Error(failure.clone()))
        .await
        .unwrap();

    assert_eq!(
        cache.remove(handle).await.unwrap(),
        Some(CachedResponse::Error(failure))
    );
}

#[tokio::test]
async fn test_replace_if_status_is_conditional() {
    let Some(cache) = shared_cache().await else {
        return;
    };
    let handle = TaskHandle::generate();

    assert!(!cache
        .replace_if_status(handle, TaskStatus::Submitted, CachedResponse::Pending)
        .await
        .unwrap());

    cache.put(handle, CachedResponse::Submitted).await.unwrap();
    assert!(cache
        .replace_if_status(handle, TaskStatus::Submitted, CachedResponse::Pending)
        .await
        .unwrap());
    assert!(!cache
        .replace_if_status(handle, TaskStatus::Submitted, CachedResponse::Pending)
        .await
        .unwrap());
    assert_eq!(
        cache.get(handle).await.unwrap(),
        Some(CachedResponse::Pending)
    );

    cache.remove(handle).await.unwrap();
}

#[tokio::test]
async fn test_ensure_schema_is_repeatable() {
    let Some(cache) = shared_cache().await else {
        return;
    };
    cache.ensure_schema().await.unwrap();
    assert!(cache.health_check().await.unwrap());
    assert_eq!(cache.provider_name(), "shared");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_engine_over_shared_cache() {
    let Some(cache) = shared_cache().await else {
        return;
    };
    let engine = TaskEngine::new(
        "shared-test",
        Arc::new(CacheProvider::Shared(Box::new(cache))),
    );

    let submission = engine
        .submit(|| Ok::<_, std::io::Error>(greeting()), Duration::from_secs(2))
        .await
        .unwrap();

    let outcome = loop {
        match engine.poll_handle(submission.handle).await.unwrap() {
            PollOutcome::Pending => tokio::time::sleep(Duration::from_millis(25)).await,
            settled => break settled,
        }
    };
    assert_eq!(outcome, PollOutcome::Complete(greeting()));
    assert_eq!(
        engine.poll_handle(submission.handle).await.unwrap(),
        PollOutcome::Unsubmitted
    );
}
