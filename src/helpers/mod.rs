pub mod bus;
pub mod error_handler;
pub mod format;

pub use bus::{BusEvent, EventBus};
pub use error_handler::{ErrorReporter, TracingErrorReporter};
pub use format::{format_balance, parse_amount, AmountError};
