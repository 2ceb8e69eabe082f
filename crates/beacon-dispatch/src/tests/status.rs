//! Watermark, failure set and status query semantics.

use super::harness::{dispatcher, wait_until, Outcome, RecordingTransport};
use crate::{DispatchPolicy, RequestStatus};

#[tokio::test]
async fn unprocessed_serials_report_pending() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport);

    // Never submitted.
    assert_eq!(dispatcher.request_status(1), RequestStatus::Pending);

    let serial = dispatcher.submit("?idsite=1").unwrap();
    // Submitted but not flushed.
    assert_eq!(dispatcher.request_status(serial), RequestStatus::Pending);
}

#[tokio::test]
async fn successful_batch_advances_watermark_over_all_serials() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport);

    for _ in 0..3 {
        dispatcher.submit("?idsite=1").unwrap();
    }
    dispatcher.flush();

    wait_until(|| dispatcher.last_acknowledged() == 3).await;
    for serial in 1..=3 {
        assert_eq!(dispatcher.request_status(serial), RequestStatus::Succeeded);
    }
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn failed_batch_marks_every_serial_failed() {
    let transport = RecordingTransport::new();
    transport.script([Outcome::Status(500)]);
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());

    for _ in 0..4 {
        dispatcher.submit("?idsite=1").unwrap();
    }
    dispatcher.flush();

    wait_until(|| dispatcher.request_status(4) == RequestStatus::Failed).await;
    assert_eq!(dispatcher.last_acknowledged(), 0);
    for serial in 1..=4 {
        assert_eq!(dispatcher.request_status(serial), RequestStatus::Failed);
    }
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn failed_serials_stay_failed_below_a_later_watermark() {
    let transport = RecordingTransport::new();
    transport.script([Outcome::ConnectionError, Outcome::Status(200)]);
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());

    // First batch fails.
    dispatcher.submit("?idsite=1&rand=1").unwrap();
    dispatcher.submit("?idsite=1&rand=2").unwrap();
    dispatcher.flush();
    wait_until(|| dispatcher.request_status(2) == RequestStatus::Failed).await;

    // Second batch succeeds and advances the watermark past the failures.
    dispatcher.submit("?idsite=1&rand=3").unwrap();
    dispatcher.submit("?idsite=1&rand=4").unwrap();
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 4).await;

    // Failed takes priority over the watermark; nothing retried silently.
    assert_eq!(dispatcher.request_status(1), RequestStatus::Failed);
    assert_eq!(dispatcher.request_status(2), RequestStatus::Failed);
    assert_eq!(dispatcher.request_status(3), RequestStatus::Succeeded);
    assert_eq!(dispatcher.request_status(4), RequestStatus::Succeeded);
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn dry_run_skips_network_but_acknowledges() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());
    dispatcher.set_dry_run(true);

    for _ in 0..5 {
        dispatcher.submit("?idsite=1").unwrap();
    }
    dispatcher.flush();

    wait_until(|| dispatcher.last_acknowledged() == 5).await;
    assert_eq!(transport.request_count(), 0);
    assert_eq!(dispatcher.request_status(5), RequestStatus::Succeeded);
    dispatcher.shutdown().await;
}
