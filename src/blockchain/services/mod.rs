pub mod token;
pub mod transactions;
