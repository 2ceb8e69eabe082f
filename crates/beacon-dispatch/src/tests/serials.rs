//! Serial assignment properties.

use super::harness::{dispatcher, RecordingTransport};
use crate::DispatchPolicy;
use std::sync::Arc;

#[tokio::test]
async fn serials_are_sequential_from_one() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport);

    for expected in 1..=10u64 {
        let serial = dispatcher.submit("?idsite=1").unwrap();
        assert_eq!(serial, expected);
    }
    assert_eq!(dispatcher.pending_count(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submitters_never_lose_or_repeat_serials() {
    const TASKS: usize = 10;
    const PER_TASK: usize = 1000;

    let transport = RecordingTransport::new();
    let dispatcher = Arc::new(dispatcher(DispatchPolicy::Manual, transport));

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            (0..PER_TASK)
                .map(|_| dispatcher.submit("?idsite=1").unwrap())
                .collect::<Vec<u64>>()
        }));
    }

    let mut serials = Vec::with_capacity(TASKS * PER_TASK);
    for handle in handles {
        serials.extend(handle.await.unwrap());
    }

    serials.sort_unstable();
    let expected: Vec<u64> = (1..=(TASKS * PER_TASK) as u64).collect();
    assert_eq!(serials, expected);
    assert_eq!(dispatcher.pending_count(), TASKS * PER_TASK);
}

#[tokio::test]
async fn submit_without_collector_url_is_rejected() {
    let config = crate::DispatcherConfig::default();
    let dispatcher = crate::Dispatcher::new(config);

    let err = dispatcher.submit("?idsite=1").unwrap_err();
    assert!(matches!(err, crate::DispatchError::MissingApiUrl));
}
