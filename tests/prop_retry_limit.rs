// Property: for any configured max retry count M, a range fetch that keeps
// failing with a retryable error is attempted exactly M + 1 times, while a
// non-retryable failure is attempted once.

use lazyfile::{HttpRangeProvider, LazyConfig, LazyError, RangeProvider};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(max_retries: usize) -> LazyConfig {
    LazyConfig {
        max_retries,
        retry_base_backoff_ms: 1,
        ..Default::default()
    }
}

/// Mock origin answering every GET with `status`, counting requests
fn failing_origin(rt: &Runtime, status: u16) -> (MockServer, Arc<AtomicUsize>) {
    rt.block_on(async {
        let server = MockServer::start().await;
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        Mock::given(method("GET"))
            .and(path("/object"))
            .respond_with(move |_req: &wiremock::Request| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(status)
            })
            .mount(&server)
            .await;

        (server, counter)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Server errors are retried until the budget runs out
    #[test]
    fn prop_retry_limit_enforcement(
        max_retries in 0usize..4,
        lo in 0u64..10_000,
        len in 1u64..1_000,
        status in prop_oneof![Just(500u16), Just(502u16), Just(503u16)],
    ) {
        let rt = Runtime::new().unwrap();
        let (server, counter) = failing_origin(&rt, status);

        // The blocking client runs on this thread while the server keeps
        // running on the runtime's workers
        let url = format!("{}/object", server.uri());
        let mut provider = HttpRangeProvider::with_config(url, &config(max_retries)).unwrap();
        let result = provider.fetch(lo, lo + len);

        match result {
            Err(LazyError::FetchFailed { lo: got_lo, hi, attempts }) => {
                prop_assert_eq!((got_lo, hi), (lo, lo + len));
                prop_assert_eq!(attempts, max_retries + 1);
            }
            other => prop_assert!(false, "expected FetchFailed, got {:?}", other),
        }
        prop_assert_eq!(counter.load(Ordering::SeqCst), max_retries + 1);
        drop(server);
    }

    /// Client errors are never retried
    #[test]
    fn prop_client_errors_not_retried(
        max_retries in 0usize..4,
        status in prop_oneof![Just(403u16), Just(404u16), Just(416u16)],
    ) {
        let rt = Runtime::new().unwrap();
        let (server, counter) = failing_origin(&rt, status);

        let url = format!("{}/object", server.uri());
        let mut provider = HttpRangeProvider::with_config(url, &config(max_retries)).unwrap();
        let result = provider.fetch(0, 10);

        prop_assert!(
            matches!(result, Err(LazyError::OriginClientError { status: s, .. }) if s == status),
            "expected OriginClientError({}), got {:?}",
            status,
            result
        );
        prop_assert_eq!(counter.load(Ordering::SeqCst), 1);
        drop(server);
    }
}
