use std::sync::Mutex;

use jobwatch_core::{Job, Observation, PipelineStep};
use jobwatch_engine::{
    LiveChannel, ObservationSink, ReqwestLiveChannel, TrackerSettings, TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    observations: Mutex<Vec<Observation>>,
}

impl TestSink {
    fn take(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().drain(..).collect()
    }
}

impl ObservationSink for TestSink {
    fn observe(&self, observation: Observation) {
        self.observations.lock().unwrap().push(observation);
    }
}

fn job() -> Job {
    Job {
        id: "job-1".to_string(),
        stream_token: "tok".to_string(),
    }
}

fn channel(server: &MockServer) -> ReqwestLiveChannel {
    let settings = TrackerSettings {
        api_base_url: server.uri(),
        ..TrackerSettings::default()
    };
    ReqwestLiveChannel::new(&settings).expect("channel")
}

async fn serve_stream(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/api/jobs/stream/job-1"))
        .and(query_param("token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

fn frame(value: serde_json::Value) -> String {
    format!("data: {value}\n\n")
}

#[tokio::test]
async fn forwards_events_in_order_and_stops_at_final_completion() {
    let server = MockServer::start().await;
    let mut body = frame(json!({ "status": "connected", "job_id": "job-1" }));
    body.push_str(": heartbeat\n\n");
    body.push_str(&frame(json!({ "status": "processing", "step": "clarifier", "message": "a", "payload": null })));
    body.push_str(&frame(json!({ "status": "completed", "step": "researcher", "message": "b", "payload": {} })));
    body.push_str(&frame(json!({ "status": "completed", "step": "structure_builder", "message": "c", "payload": { "hero": "X" } })));
    body.push_str(&frame(json!({ "status": "processing", "step": "copywriter", "message": "after", "payload": null })));
    serve_stream(&server, body).await;

    let sink = TestSink::default();
    channel(&server).follow(&job(), &sink).await.expect("terminal");

    assert_eq!(
        sink.take(),
        vec![
            Observation::Progress {
                step: PipelineStep::Clarifier,
                message: "a".to_string(),
            },
            Observation::Progress {
                step: PipelineStep::Researcher,
                message: "b".to_string(),
            },
            Observation::Completed {
                message: "c".to_string(),
                structure: Some(json!({ "hero": "X" })),
            },
        ]
    );
}

#[tokio::test]
async fn stops_after_failure() {
    let server = MockServer::start().await;
    let mut body = frame(json!({ "status": "failed", "step": "clarifier", "message": "M", "payload": null }));
    body.push_str(&frame(json!({ "status": "processing", "step": "researcher", "message": "late" })));
    serve_stream(&server, body).await;

    let sink = TestSink::default();
    channel(&server).follow(&job(), &sink).await.expect("terminal");

    assert_eq!(
        sink.take(),
        vec![Observation::Failed {
            step: Some(PipelineStep::Clarifier),
            message: "M".to_string(),
        }]
    );
}

#[tokio::test]
async fn stream_ending_early_is_a_transport_error() {
    let server = MockServer::start().await;
    serve_stream(
        &server,
        frame(json!({ "status": "processing", "step": "clarifier", "message": "a" })),
    )
    .await;

    let sink = TestSink::default();
    let err = channel(&server).follow(&job(), &sink).await.unwrap_err();

    assert_eq!(err, TransportError::Closed);
    assert_eq!(sink.take().len(), 1);
}

#[tokio::test]
async fn undecodable_message_is_a_transport_error() {
    let server = MockServer::start().await;
    serve_stream(&server, "data: {not json\n\n".to_string()).await;

    let sink = TestSink::default();
    let err = channel(&server).follow(&job(), &sink).await.unwrap_err();

    assert!(matches!(err, TransportError::Decode(_)));
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn rejected_stream_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/jobs/stream/job-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let sink = TestSink::default();
    let err = channel(&server).follow(&job(), &sink).await.unwrap_err();

    assert_eq!(err, TransportError::HttpStatus(401));
}
