#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

/// Captures tracing events emitted on the current thread.
pub struct TestLogCapture {
    logs: Arc<Mutex<Vec<CapturedLog>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: tracing::Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl TestLogCapture {
    /// Start capturing. Capture stops when the returned value is dropped.
    pub fn start() -> Self {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let layer = CaptureLayer {
            logs: Arc::clone(&logs),
        };

        // Thread-scoped, so parallel tests don't see each other's events.
        let subscriber = tracing_subscriber::registry().with(layer);
        let guard = tracing::subscriber::set_default(subscriber);

        Self {
            logs,
            _guard: guard,
        }
    }

    /// Assert a message was logged containing the given substring.
    pub fn assert_logged(&self, needle: &str) {
        let logs = self.logs.lock().unwrap();
        assert!(
            logs.iter().any(|l| l.message.contains(needle)),
            "Expected log containing '{}'. Logged: {:#?}",
            needle,
            logs.iter().map(|l| &l.message).collect::<Vec<_>>()
        );
    }

    /// Assert a message was logged at the given level.
    pub fn assert_logged_at_level(&self, level: tracing::Level, needle: &str) {
        let logs = self.logs.lock().unwrap();
        assert!(
            logs.iter()
                .any(|l| l.level == level && l.message.contains(needle)),
            "Expected {} log containing '{}'. Logged: {:#?}",
            level,
            needle,
            logs.iter().map(|l| (&l.level, &l.message)).collect::<Vec<_>>()
        );
    }

    /// Assert an event carried `field_name` with a value containing `field_value`.
    pub fn assert_field_logged(&self, field_name: &str, field_value: &str) {
        let logs = self.logs.lock().unwrap();
        let found = logs.iter().any(|l| {
            l.fields
                .iter()
                .any(|(k, v)| k == field_name && v.contains(field_value))
        });
        assert!(
            found,
            "Expected field {}={}. Logged fields: {:#?}",
            field_name,
            field_value,
            logs.iter().map(|l| &l.fields).collect::<Vec<_>>()
        );
    }

    pub fn logs(&self) -> Vec<CapturedLog> {
        self.logs.lock().unwrap().clone()
    }
}

struct CaptureLayer {
    logs: Arc<Mutex<Vec<CapturedLog>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.logs.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}
