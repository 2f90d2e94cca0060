pub mod driver;
pub mod error;
pub mod event;
pub mod observer;
pub mod platform;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::SchedCore;
pub use error::SchedError;
pub use event::{PendingInterrupts, SchedEvent};
pub use platform::{ChildExit, InterruptSource, Platform};
pub use state::{Pcb, PcbId, PcbState, Quantum, SchedState};
