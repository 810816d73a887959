pub mod agent;
pub mod aggregate;
pub mod budget;
pub mod category;
pub mod config;
pub mod intent;
/// Intent → mutation → response. Holds no per-user session state.
pub mod interpreter;
pub mod message;
pub mod metrics;
pub mod response;
pub mod store;
