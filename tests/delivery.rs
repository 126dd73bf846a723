//! Wire-level tests: stand up a local receiver, point the notifier at
//! it, and inspect what actually arrives.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{Form, Router, extract::State as AxumState, http::StatusCode, routing};
use slack_notify::build::{BuildHost, BuildResult, BuildStatus};
use slack_notify::notifier::{Delivery, SlackNotifier};

type Captured = Arc<Mutex<Vec<String>>>;

/// Host stub: passes templates through untouched and records log lines.
#[derive(Default)]
struct RecordingHost {
    logged: Mutex<Vec<String>>,
}

impl BuildHost for RecordingHost {
    fn interpolate(&self, template: &str) -> String {
        template.to_string()
    }

    fn log(&self, message: &str) {
        self.logged.lock().unwrap().push(message.to_string());
    }
}

/// Decodes the form body and stores the `payload` JSON document.
async fn capture(
    AxumState(captured): AxumState<Captured>,
    Form(form): Form<HashMap<String, String>>,
) -> &'static str {
    let payload = form.get("payload").cloned().unwrap_or_default();
    captured.lock().unwrap().push(payload);
    "ok"
}

async fn always_500() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_receiver(captured: Captured) -> SocketAddr {
    let app = Router::new()
        .route("/hook", routing::post(capture))
        .route("/broken", routing::post(always_500))
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn notifier_for(webhook: String) -> SlackNotifier {
    let mut table = toml::Table::new();
    table.insert("webhook".to_string(), toml::Value::String(webhook));
    table.insert(
        "message".to_string(),
        toml::Value::String("build finished".to_string()),
    );
    SlackNotifier::from_table(table).unwrap()
}

fn sample_build() -> BuildResult {
    BuildResult::new(
        BuildStatus::Success,
        "RUNNING PLUGIN: build\nok\nRUNNING PLUGIN: slack_notify\nnoise",
        "main",
        "main",
    )
}

#[tokio::test]
async fn delivers_form_encoded_payload() {
    tracing_subscriber::fmt().with_env_filter("info").try_init().ok();

    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_receiver(captured.clone()).await;

    let notifier = notifier_for(format!("http://{addr}/hook"));
    let host = RecordingHost::default();

    let outcome = notifier.notify(&sample_build(), &host).await;
    assert_eq!(outcome, Delivery::Delivered);
    assert!(host.logged.lock().unwrap().is_empty());

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 1);

    let payload: serde_json::Value = serde_json::from_str(&bodies[0]).unwrap();
    assert_eq!(payload["username"], "CI");
    assert_eq!(payload["text"], "");
    assert_eq!(payload["title"], "build finished");
    assert_eq!(payload["fallback"], "build finished");
    assert_eq!(payload["color"], "good");

    let fields = payload["fields"].as_array().unwrap();
    assert_eq!(fields[0]["title"], "Status");
    assert_eq!(fields[0]["value"], "Success");
    assert_eq!(fields[0]["short"], true);
    assert!(
        fields
            .iter()
            .any(|f| f["title"] == "RUNNING PLUGIN: build" && f["value"] == "ok")
    );
    assert!(
        !fields
            .iter()
            .any(|f| f["title"].as_str().unwrap().contains("slack_notify"))
    );
}

#[tokio::test]
async fn repeated_notifies_send_identical_bodies() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_receiver(captured.clone()).await;

    let notifier = notifier_for(format!("http://{addr}/hook"));
    let host = RecordingHost::default();
    let build = sample_build();

    assert!(notifier.notify(&build, &host).await.is_delivered());
    assert!(notifier.notify(&build, &host).await.is_delivered());

    let bodies = captured.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn transport_failure_is_logged_not_raised() {
    // Nothing listens on port 1; the connection is refused immediately.
    let notifier = notifier_for("http://127.0.0.1:1/hook".to_string());
    let host = RecordingHost::default();

    let outcome = notifier.notify(&sample_build(), &host).await;
    let Delivery::Failed(reason) = outcome else {
        panic!("expected delivery failure");
    };
    assert!(!reason.is_empty());

    let logged = host.logged.lock().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0], reason);
}

#[tokio::test]
async fn http_error_status_counts_as_failure() {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let addr = spawn_receiver(captured).await;

    let notifier = notifier_for(format!("http://{addr}/broken"));
    let host = RecordingHost::default();

    let outcome = notifier.notify(&sample_build(), &host).await;
    let Delivery::Failed(reason) = outcome else {
        panic!("expected delivery failure");
    };
    assert!(reason.contains("500"));
    assert_eq!(host.logged.lock().unwrap().len(), 1);
}
