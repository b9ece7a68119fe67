use std::error::Error;

use tracing::error;

use super::bus::{BusEvent, EventBus};

/// Where store actions send the failures they swallow.
pub trait ErrorReporter: Send + Sync {
    /// Records `error`; must never panic.
    fn process(&self, error: &(dyn Error + 'static), context: Option<&str>);
}

/// Logs the error and its source chain through `tracing`, and optionally
/// raises it on the event bus for the console to show.
#[derive(Debug, Default, Clone)]
pub struct TracingErrorReporter {
    bus: Option<EventBus>,
}

impl TracingErrorReporter {
    pub fn with_bus(bus: EventBus) -> Self {
        Self { bus: Some(bus) }
    }
}

fn describe(error: &(dyn Error + 'static)) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

impl ErrorReporter for TracingErrorReporter {
    fn process(&self, error: &(dyn Error + 'static), context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, describe(error)),
            None => describe(error),
        };
        error!("{}", message);
        if let Some(bus) = &self.bus {
            bus.emit(BusEvent::Error(message));
        }
    }
}
