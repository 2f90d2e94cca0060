use super::{PcbId, SchedState, Scheduler};
use crate::core::state::PcbState;

/// Runs the first waiting job in load order, every quantum. An earlier job
/// always wins over a later one as soon as it exists, so this is strict
/// priority by position rather than time slicing.
pub struct IndexOrderScheduler;

impl Scheduler for IndexOrderScheduler {
    fn init(_state: &SchedState) -> Self {
        Self
    }

    fn select(&mut self, state: &SchedState) -> Option<PcbId> {
        state
            .iter()
            .find(|pcb| pcb.state == PcbState::Waiting)
            .map(|pcb| pcb.id)
    }
}
