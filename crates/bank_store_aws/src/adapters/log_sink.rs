use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Structured event sink injected into the loader and the lookup handler.
pub trait LogSink {
    fn log(&self, level: LogLevel, event: &str, details: Value);

    fn info(&self, event: &str, details: Value) {
        self.log(LogLevel::Info, event, details);
    }

    fn warn(&self, event: &str, details: Value) {
        self.log(LogLevel::Warn, event, details);
    }

    fn error(&self, event: &str, details: Value) {
        self.log(LogLevel::Error, event, details);
    }
}

/// One JSON object per line on stderr, picked up by CloudWatch as-is.
#[derive(Debug, Clone, Copy)]
pub struct JsonStderrSink {
    component: &'static str,
}

impl JsonStderrSink {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl LogSink for JsonStderrSink {
    fn log(&self, level: LogLevel, event: &str, details: Value) {
        eprintln!("{}", render_event(self.component, level, event, details));
    }
}

pub fn render_event(component: &str, level: LogLevel, event: &str, details: Value) -> Value {
    json!({
        "component": component,
        "level": level.as_str(),
        "event": event,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "details": details,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct CapturingSink {
        events: Mutex<Vec<(LogLevel, String)>>,
    }

    impl LogSink for CapturingSink {
        fn log(&self, level: LogLevel, event: &str, _details: Value) {
            self.events
                .lock()
                .expect("poisoned mutex")
                .push((level, event.to_string()));
        }
    }

    #[test]
    fn level_helpers_route_through_log() {
        let sink = CapturingSink {
            events: Mutex::new(Vec::new()),
        };
        sink.info("a", json!({}));
        sink.warn("b", json!({}));
        sink.error("c", json!({}));

        let events = sink.events.lock().expect("poisoned mutex").clone();
        assert_eq!(
            events,
            vec![
                (LogLevel::Info, "a".to_string()),
                (LogLevel::Warn, "b".to_string()),
                (LogLevel::Error, "c".to_string()),
            ]
        );
    }

    #[test]
    fn rendered_event_carries_component_level_and_details() {
        let rendered = render_event(
            "bulk_loader",
            LogLevel::Warn,
            "batch_retry",
            json!({"attempt": 1}),
        );

        assert_eq!(rendered["component"], "bulk_loader");
        assert_eq!(rendered["level"], "warn");
        assert_eq!(rendered["event"], "batch_retry");
        assert_eq!(rendered["details"]["attempt"], 1);
        assert!(rendered["timestamp"].as_str().is_some());
    }
}
