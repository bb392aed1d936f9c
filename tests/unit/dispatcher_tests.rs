/*!
 * Tests for concurrency-bounded batch dispatch
 */

use coltrans::providers::mock::MockTransport;
use coltrans::translation::{BatchDispatcher, BatchStatus, RetryPolicy, RetryingClient, partition};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use crate::common;

fn client(transport: &MockTransport) -> RetryingClient {
    RetryingClient::new(Arc::new(transport.clone()), "es", RetryPolicy::immediate(3))
}

/// The number of in-flight sends never exceeds the cap
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_all_withSlowTransport_shouldNeverExceedCap() {
    common::init_test_logger();

    for cap in [1, 2, 3, 7] {
        let transport = MockTransport::working().with_delay(Duration::from_millis(15));
        let client = client(&transport);
        let batches = partition(&common::generated_texts(20), 1);

        let results = assert_ok!(
            BatchDispatcher::new(cap)
                .run_all(
                    batches,
                    move |batch| {
                        let client = client.clone();
                        async move { client.send(batch).await }
                    },
                    |_, _| {},
                )
                .await
        );

        assert_eq!(results.len(), 20);
        assert_eq!(transport.request_count(), 20);
        assert!(
            transport.max_in_flight() <= cap,
            "cap {} but saw {} in flight",
            cap,
            transport.max_in_flight()
        );
    }
}

/// With enough batches and latency the cap is actually reached
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_all_withManyBatches_shouldUseAvailableConcurrency() {
    let transport = MockTransport::working().with_delay(Duration::from_millis(40));
    let client = client(&transport);
    let batches = partition(&common::generated_texts(12), 1);

    assert_ok!(
        BatchDispatcher::new(4)
            .run_all(
                batches,
                move |batch| {
                    let client = client.clone();
                    async move { client.send(batch).await }
                },
                |_, _| {},
            )
            .await
    );

    assert!(transport.max_in_flight() > 1);
    assert!(transport.max_in_flight() <= 4);
}

/// Results come back in creation order despite random completion order
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_all_withRandomLatency_shouldKeepCreationOrder() {
    let transport = MockTransport::working().with_random_delay(Duration::from_millis(25));
    let client = client(&transport);
    let input = common::generated_texts(40);
    let batches = partition(&input, 30);
    let batch_count = batches.len();

    let results = assert_ok!(
        BatchDispatcher::new(8)
            .run_all(
                batches,
                move |batch| {
                    let client = client.clone();
                    async move { client.send(batch).await }
                },
                |_, _| {},
            )
            .await
    );

    let indices: Vec<usize> = results.iter().map(|r| r.batch_index).collect();
    assert_eq!(indices, (0..batch_count).collect::<Vec<_>>());

    let output: Vec<String> = results.into_iter().flat_map(|r| r.texts).collect();
    let expected: Vec<String> = input.iter().map(|t| MockTransport::translated(t, "es")).collect();
    assert_eq!(output, expected);
}

/// Failed batches do not stop the others, and resolve as passthrough
#[tokio::test]
async fn test_run_all_withFailingTransport_shouldResolveEveryBatch() {
    let transport = MockTransport::failing();
    let client = client(&transport);
    let input = common::generated_texts(6);
    let batches = partition(&input, 1);

    let results = assert_ok!(
        BatchDispatcher::new(2)
            .run_all(
                batches,
                move |batch| {
                    let client = client.clone();
                    async move { client.send(batch).await }
                },
                |_, _| {},
            )
            .await
    );

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.status == BatchStatus::PassedThrough));
    assert!(results.iter().all(|r| r.attempts == 3));
    assert_eq!(transport.request_count(), 18);
}

/// Progress counts strictly upward to the batch total
#[tokio::test]
async fn test_run_all_withProgressCallback_shouldCountToTotal() {
    let transport = MockTransport::working();
    let client = client(&transport);
    let batches = partition(&common::generated_texts(9), 1);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    assert_ok!(
        BatchDispatcher::new(3)
            .run_all(
                batches,
                move |batch| {
                    let client = client.clone();
                    async move { client.send(batch).await }
                },
                move |completed, total| recorder.lock().push((completed, total)),
            )
            .await
    );

    let mut completed: Vec<usize> = seen.lock().iter().map(|(c, _)| *c).collect();
    completed.sort_unstable();
    assert_eq!(completed, (1..=9).collect::<Vec<_>>());
    assert!(seen.lock().iter().all(|(_, total)| *total == 9));
}
