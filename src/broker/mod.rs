//! Message broker integration
//!
//! One durable connection to the broker delivers judge requests into the
//! work loop; acknowledgements flow back per delivery.

pub mod client;
pub mod message;

pub use client::BrokerClient;
pub use message::JudgeRequest;
