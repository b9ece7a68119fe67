pub mod erc20_session;

pub use erc20_session::{Erc20Session, SessionError};
