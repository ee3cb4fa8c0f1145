// src/infra/logger.rs — Structured logging with tracing + error aggregation

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// One captured error-level log event. The presence of any record after a run
/// is what flips the process exit code to 1.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    /// Repository being processed when the event was emitted, if any.
    pub repository: Option<String>,
    pub message: String,
}

#[derive(Default)]
struct SinkInner {
    records: Vec<ErrorRecord>,
    repository: Option<String>,
}

/// Shared handle to the run's aggregated error records, plus the
/// per-repository label attached to new records. Cloning shares state.
#[derive(Clone, Default)]
pub struct ErrorSink {
    inner: Arc<Mutex<SinkInner>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label subsequent records with the repository currently being processed.
    pub fn set_repository(&self, repository: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.repository = Some(repository.to_string());
        }
    }

    /// Reset the logging context between repositories.
    pub fn clear_repository(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.repository = None;
        }
    }

    /// All error-level records captured so far, in emission order.
    pub fn collected(&self) -> Vec<ErrorRecord> {
        self.inner
            .lock()
            .map(|inner| inner.records.clone())
            .unwrap_or_default()
    }

    fn record(&self, message: String) {
        if let Ok(mut inner) = self.inner.lock() {
            let repository = inner.repository.clone();
            inner.records.push(ErrorRecord {
                timestamp: Utc::now(),
                repository,
                message,
            });
        }
    }
}

/// Tracing layer that feeds every ERROR event into an [`ErrorSink`].
pub struct ErrorCollector {
    sink: ErrorSink,
}

impl ErrorCollector {
    pub fn new(sink: ErrorSink) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for ErrorCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::ERROR {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.sink.record(visitor.into_message());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    extra: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extra.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl MessageVisitor {
    fn into_message(self) -> String {
        if self.extra.is_empty() {
            self.message
        } else {
            format!("{} [{}]", self.message, self.extra.join(" "))
        }
    }
}

/// Install the global subscriber (respects RUST_LOG) and return the sink the
/// orchestrator reads the exit-code signal from.
pub fn init(default_level: &str) -> anyhow::Result<ErrorSink> {
    let sink = ErrorSink::new();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_target(false).compact())
        .with(ErrorCollector::new(sink.clone()))
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;

    Ok(sink)
}
