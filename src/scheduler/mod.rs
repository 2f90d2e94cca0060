pub mod index_order;
pub mod round_robin;
pub mod shortest;

use crate::core::state::{PcbId, SchedState};
pub use index_order::IndexOrderScheduler;
pub use round_robin::RoundRobinScheduler;
pub use shortest::ShortestRemainingScheduler;

/// Scheduling decision, consulted once per timer interrupt after the
/// running job was preempted and arrivals were admitted.
pub trait Scheduler {
    fn init(state: &SchedState) -> Self;

    /// Picks the next job to run. Returning a job that is not `Waiting`
    /// is a bookkeeping bug and aborts the simulation.
    fn select(&mut self, state: &SchedState) -> Option<PcbId>;

    fn dispatched(&mut self, _state: &SchedState, _pcb: PcbId) {}

    fn preempted(&mut self, _state: &SchedState, _pcb: PcbId) {}
}
