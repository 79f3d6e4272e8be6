pub mod bus;
pub mod event;
#[cfg(test)]
mod tests;

pub use bus::EventBus;
pub use event::{EventMessage, EventType};
