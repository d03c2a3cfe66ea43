use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub level: Level,
    pub message: String,
}

/// Receives everything the pipeline has to say about a run.
pub trait DiagnosticSink {
    fn event(&self, event: DiagnosticEvent);

    fn info(&self, message: String) {
        self.event(DiagnosticEvent {
            level: Level::Info,
            message,
        });
    }

    fn warn(&self, message: String) {
        self.event(DiagnosticEvent {
            level: Level::Warning,
            message,
        });
    }

    fn error(&self, message: String) {
        self.event(DiagnosticEvent {
            level: Level::Error,
            message,
        });
    }
}

/// Forwards events to the `tracing` subscriber installed by the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn event(&self, event: DiagnosticEvent) {
        match event.level {
            Level::Info => tracing::info!("{}", event.message),
            Level::Warning => tracing::warn!("{}", event.message),
            Level::Error => tracing::error!("{}", event.message),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.level == Level::Warning)
            .map(|event| event.message)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn event(&self, event: DiagnosticEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
