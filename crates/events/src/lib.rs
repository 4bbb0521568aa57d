//! Ball events, audit envelopes and the realtime fan-out bus.

pub mod broadcast_bus;
pub mod bus;
pub mod envelope;
pub mod event;

pub use broadcast_bus::BroadcastBus;
pub use bus::{EventBus, RecvError, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
