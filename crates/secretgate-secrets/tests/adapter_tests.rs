//! Integration tests for the cache-fronted backend adapter
//!
//! Key scenarios:
//! - Cache hits never reach the remote client
//! - Expiry of the shared horizon forces exactly one refetch
//! - Concurrent misses each return their own fetch; the first fill is kept
//! - Blank keys are rejected before any cache or remote interaction
//! - Remote failures surface as domain errors carrying the key and cause
//! - Cancellation is reported as-is and leaves the cache untouched

mod common;

use common::*;
use secretgate_core::{BackendKind, ConnectionConfig};
use secretgate_secrets::{
    BackendAdapter, ErrorKind, RemoteFault, RemotePayload, SecretCache, SecretService,
    SecretsError, TransportFailure,
};
use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn adapter(kind: BackendKind, client: MockClient, cache: Arc<SecretCache>) -> BackendAdapter {
    BackendAdapter::new(kind, ConnectionConfig::new("us-east-1"), Arc::new(client), cache)
        .unwrap()
}

#[tokio::test]
async fn test_cache_hit_skips_remote_client() {
    for kind in BackendKind::ALL {
        let mut client = MockClient::new();
        client.expect_fetch().never();

        let cache = isolated_cache(Duration::from_secs(600));
        cache.fill("/app/db/password", "s3cret");
        let adapter = adapter(kind, client, Arc::clone(&cache));

        let value = adapter
            .get_secret("/app/db/password", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "s3cret");
        assert_eq!(cache.stats().hits, 1);
    }
}

#[tokio::test]
async fn test_miss_fetches_once_then_serves_from_cache() {
    let mut client = MockClient::new();
    client
        .expect_fetch()
        .withf(|key, _| key == "prod/api-key")
        .times(1)
        .returning(|_, _| text("abc123"));

    let cache = isolated_cache(Duration::from_secs(600));
    let adapter = adapter(BackendKind::SecretsManager, client, Arc::clone(&cache));
    let cancel = CancellationToken::new();

    assert_eq!(adapter.get_secret("prod/api-key", &cancel).await.unwrap(), "abc123");
    assert_eq!(adapter.get_secret("prod/api-key", &cancel).await.unwrap(), "abc123");

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.fills, 1);
}

#[tokio::test]
async fn test_expiry_forces_single_refetch() {
    let mut client = MockClient::new();
    client
        .expect_fetch()
        .times(2)
        .returning(|_, _| text("rotating"));

    let cache = isolated_cache(Duration::from_secs(1));
    let adapter = adapter(BackendKind::ParameterStore, client, Arc::clone(&cache));
    let cancel = CancellationToken::new();

    adapter.get_secret("/app/token", &cancel).await.unwrap();
    adapter.get_secret("/app/token", &cancel).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    adapter.get_secret("/app/token", &cancel).await.unwrap();
    adapter.get_secret("/app/token", &cancel).await.unwrap();

    assert_eq!(cache.stats().expirations, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_misses_keep_their_own_results() {
    let client = Arc::new(CountingClient::default());
    let cache = isolated_cache(Duration::from_secs(600));
    let adapter = BackendAdapter::new(
        BackendKind::SecretsManager,
        ConnectionConfig::new("us-east-1"),
        client.clone(),
        Arc::clone(&cache),
    )
    .unwrap();
    let cancel = CancellationToken::new();

    // The first lookup's fetch answers last, so its fill loses
    let (slow, fast) = tokio::join!(
        adapter.get_secret("svc/rotating", &cancel),
        adapter.get_secret("svc/rotating", &cancel)
    );

    assert_eq!(slow.unwrap(), "v0");
    assert_eq!(fast.unwrap(), "v1");
    assert_eq!(client.calls(), 2);

    assert_eq!(cache.lookup("svc/rotating").as_deref(), Some("v1"));
    let stats = cache.stats();
    assert_eq!(stats.fills, 1);
    assert_eq!(stats.discarded_fills, 1);
}

#[tokio::test]
async fn test_blank_key_is_invalid_argument() {
    for kind in BackendKind::ALL {
        let mut client = MockClient::new();
        client.expect_fetch().never();

        let cache = isolated_cache(Duration::from_secs(600));
        let adapter = adapter(kind, client, Arc::clone(&cache));

        for key in ["", "  "] {
            let err = adapter
                .get_secret(key, &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(
                matches!(err, SecretsError::InvalidArgument { .. }),
                "{kind}: unexpected error {err:?}"
            );
            assert_eq!(err.kind(), None);
        }

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 0);
    }
}

#[tokio::test]
async fn test_not_found_is_translated_for_every_backend() {
    for kind in BackendKind::ALL {
        let mut client = MockClient::new();
        client
            .expect_fetch()
            .times(1)
            .returning(move |_, _| Err(not_found(kind)));

        let cache = isolated_cache(Duration::from_secs(600));
        let adapter = adapter(kind, client, Arc::clone(&cache));

        let err = adapter
            .get_secret("missing/key", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        let domain = err.as_domain().unwrap();
        assert_eq!(domain.key(), Some("missing/key"));
        assert!(domain.source().is_some());

        let fault = domain.cause::<RemoteFault>().unwrap();
        assert_eq!(fault.backend, kind);
        assert_eq!(fault.status, Some(400));

        assert!(cache.is_empty(), "failures must not be cached");
    }
}

#[tokio::test]
async fn test_remote_failure_kinds() {
    let cases = [
        (
            RemoteFault::service(BackendKind::SecretsManager, "AccessDeniedException", "denied"),
            ErrorKind::AccessDenied,
        ),
        (
            RemoteFault::service(BackendKind::SecretsManager, "ExpiredTokenException", "expired"),
            ErrorKind::Authentication,
        ),
        (
            RemoteFault::new(BackendKind::SecretsManager, "no route to host")
                .with_transport(TransportFailure::Unreachable),
            ErrorKind::Unavailable,
        ),
        (
            RemoteFault::new(BackendKind::SecretsManager, "gateway timeout").with_status(504),
            ErrorKind::Timeout,
        ),
    ];

    for (fault, expected) in cases {
        let mut client = MockClient::new();
        client
            .expect_fetch()
            .times(1)
            .return_once(move |_, _| Err(fault));

        let adapter = adapter(
            BackendKind::SecretsManager,
            client,
            isolated_cache(Duration::from_secs(600)),
        );
        let err = adapter
            .get_secret("svc/credentials", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(expected));
    }
}

#[tokio::test]
async fn test_empty_payload_is_internal() {
    let mut client = MockClient::new();
    client
        .expect_fetch()
        .times(1)
        .returning(|_, _| Ok(RemotePayload::Empty));

    let adapter = adapter(
        BackendKind::SecretsManager,
        client,
        isolated_cache(Duration::from_secs(600)),
    );
    let err = adapter
        .get_secret("svc/empty", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Internal));
    assert_eq!(err.as_domain().unwrap().key(), Some("svc/empty"));
}

#[tokio::test]
async fn test_cancellation_is_not_translated() {
    let cache = isolated_cache(Duration::from_secs(600));
    let adapter = BackendAdapter::new(
        BackendKind::ParameterStore,
        ConnectionConfig::new("us-east-1"),
        Arc::new(StalledClient),
        Arc::clone(&cache),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = adapter.get_secret("/slow/key", &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.kind(), None);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_adapter_rejects_invalid_connection() {
    let err = BackendAdapter::new(
        BackendKind::ParameterStore,
        ConnectionConfig::new(""),
        Arc::new(MockClient::new()),
        isolated_cache(Duration::from_secs(600)),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
