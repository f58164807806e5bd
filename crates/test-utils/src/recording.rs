use std::sync::{Arc, Mutex};

use shellpump::engine::RequestHandle;
use shellpump::types::LogKind;

/// What a request observed, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Info(String),
    Error(String),
    Complete(i32),
}

/// Records every line and the completion dispatched to one request.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingSink {
    pub fn attach(handle: &RequestHandle) -> Self {
        let sink = Self::default();

        let lines = Arc::clone(&sink.events);
        let done = Arc::clone(&sink.events);
        handle
            .on_log(move |kind, line| {
                let event = match kind {
                    LogKind::Info => Recorded::Info(line.to_string()),
                    LogKind::Error => Recorded::Error(line.to_string()),
                };
                lines.lock().unwrap().push(event);
            })
            .on_complete(move |completion| {
                done.lock()
                    .unwrap()
                    .push(Recorded::Complete(completion.exit_code));
            });

        sink
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn info_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Info(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Error(line) => Some(line),
                _ => None,
            })
            .collect()
    }
}
