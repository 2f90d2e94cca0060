pub mod core;
pub mod os;
pub mod scheduler;
pub mod sim;

pub use scheduler::Scheduler;
pub use sim::{JobSpec, Sim};
