// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notify::FakeNotifyAdapter;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

fn notice() -> Notice {
    Notice {
        requester: "amy".into(),
        resource: "cs101".into(),
        message: "You are now enrolled in class cs101!".to_string(),
    }
}

#[tokio::test]
async fn traced_notify_passes_through_to_inner() {
    let fake = FakeNotifyAdapter::new();
    let traced = TracedNotifyAdapter::new(fake.clone());
    let contact = Contact::Email("amy@example.edu".to_string());

    traced.send(&contact, &notice()).await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].contact, contact);
    assert_eq!(calls[0].notice, notice());
}

#[test]
fn traced_notify_logs_span_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedNotifyAdapter::new(FakeNotifyAdapter::new());
        traced
            .send(&Contact::Email("amy@example.edu".to_string()), &notice())
            .await
    });

    assert!(result.is_ok(), "send should succeed: {:?}", result);
    assert!(
        logs.contains("notify.send"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("cs101"),
        "Should log resource. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("delivered"),
        "Should log completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_notify_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeNotifyAdapter::new();
        fake.fail_kind("webhook");
        let traced = TracedNotifyAdapter::new(fake);
        traced
            .send(
                &Contact::Webhook("https://hooks.example.edu/amy".to_string()),
                &notice(),
            )
            .await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("delivery failed"),
        "Should log failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("injected webhook failure"),
        "Should log the error. Logs:\n{}",
        logs
    );
}
