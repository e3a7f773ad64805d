pub mod client;
pub mod publish;

pub use client::{EventStore, RelayStore};
pub use publish::{EventPublisher, RelayPublisher};
