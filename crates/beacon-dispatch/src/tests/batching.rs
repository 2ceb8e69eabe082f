//! POST envelope batching and GET singles.

use super::harness::{dispatcher, wait_until, RecordingTransport};
use crate::DispatchPolicy;
use beacon_core::Method;
use serde_json::Value;

fn envelope_queries(body: &str) -> Vec<String> {
    let parsed: Value = serde_json::from_str(body).expect("envelope is valid JSON");
    parsed["requests"]
        .as_array()
        .expect("requests array")
        .iter()
        .map(|q| q.as_str().expect("query is a string").to_string())
        .collect()
}

#[tokio::test]
async fn forty_five_posts_become_three_envelopes() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());

    for i in 0..45 {
        dispatcher.submit(format!("?idsite=1&rand={i}")).unwrap();
    }
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 45).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);

    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| envelope_queries(r.body.as_deref().unwrap()).len())
        .collect();
    assert_eq!(sizes, vec![20, 20, 5]);

    for request in &requests {
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://stats.example.org/matomo.php");
    }
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn every_query_lands_exactly_once_in_order() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());

    for i in 0..45 {
        dispatcher.submit(format!("?idsite=1&rand={i}")).unwrap();
    }
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 45).await;

    let queries: Vec<String> = transport
        .requests()
        .iter()
        .flat_map(|r| envelope_queries(r.body.as_deref().unwrap()))
        .collect();
    let expected: Vec<String> = (0..45).map(|i| format!("?idsite=1&rand={i}")).collect();
    assert_eq!(queries, expected);
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn single_post_still_uses_the_envelope() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());

    dispatcher.submit("?idsite=1&rec=1").unwrap();
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 1).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body.as_deref().unwrap(),
        "{\"requests\":[\"?idsite=1&rec=1\"]}"
    );
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn get_requests_are_never_batched() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());
    dispatcher.set_method(Method::Get);

    for i in 0..5 {
        dispatcher.submit(format!("?idsite=1&rand={i}")).unwrap();
    }
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 5).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 5);
    for (i, request) in requests.iter().enumerate() {
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());
        assert_eq!(
            request.url,
            format!("http://stats.example.org/matomo.php?idsite=1&rand={i}")
        );
    }
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn secure_flag_switches_scheme() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(DispatchPolicy::Manual, transport.clone());
    dispatcher.set_secure(true);

    dispatcher.submit("?idsite=1").unwrap();
    dispatcher.flush();
    wait_until(|| dispatcher.last_acknowledged() == 1).await;

    assert_eq!(
        transport.requests()[0].url,
        "https://stats.example.org/matomo.php"
    );
    dispatcher.shutdown().await;
}
