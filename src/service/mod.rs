pub mod filter;
pub mod history_store;
pub mod reconciler;
pub mod transport;
