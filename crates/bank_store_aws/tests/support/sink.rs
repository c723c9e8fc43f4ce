#![allow(dead_code)]

use std::sync::Mutex;

use bank_store_aws::adapters::log_sink::{LogLevel, LogSink};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedEvent {
    pub level: LogLevel,
    pub event: String,
    pub details: Value,
}

/// Log sink that keeps every event for later assertions.
#[derive(Default)]
pub struct CapturingSink {
    events: Mutex<Vec<CapturedEvent>>,
}

impl CapturingSink {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().expect("poisoned mutex").clone()
    }

    pub fn named(&self, event: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|captured| captured.event == event)
            .collect()
    }
}

impl LogSink for CapturingSink {
    fn log(&self, level: LogLevel, event: &str, details: Value) {
        self.events
            .lock()
            .expect("poisoned mutex")
            .push(CapturedEvent {
                level,
                event: event.to_string(),
                details,
            });
    }
}
