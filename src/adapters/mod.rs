//! Infrastructure adapters implementing the domain ports.

pub mod channels;
pub mod docstore;
pub mod memory;
pub mod probes;

pub use channels::{ChannelRegistry, EmailChannel, RecordingChannel, SlackChannel, WebhookChannel};
pub use docstore::{DocStoreConfig, DocStoreGateway};
pub use memory::InMemoryStore;
pub use probes::{
    StaticInspector, StaticPerformanceProbe, StaticSystemProbe, SyntheticPerformanceProbe,
    SyntheticSystemProbe,
};
