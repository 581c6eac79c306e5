//! Live event delivery.

pub mod registry;

pub use registry::{Listener, ListenerRegistry, Subscription};
