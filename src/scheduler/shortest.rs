use super::{PcbId, SchedState, Scheduler};
use crate::core::state::{Pcb, PcbState};

/// Shortest remaining work first, measured in quanta. Ties go to load order.
pub struct ShortestRemainingScheduler;

fn remaining(pcb: &Pcb) -> u64 {
    pcb.workload.saturating_sub(pcb.quanta_run)
}

impl Scheduler for ShortestRemainingScheduler {
    fn init(_state: &SchedState) -> Self {
        Self
    }

    fn select(&mut self, state: &SchedState) -> Option<PcbId> {
        // min_by_key keeps the first of equal keys
        state
            .iter()
            .filter(|pcb| pcb.state == PcbState::Waiting)
            .min_by_key(|pcb| remaining(pcb))
            .map(|pcb| pcb.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::waiting_state;
    use std::time::Instant;

    #[test]
    fn prefers_least_remaining_work() {
        let state = waiting_state(&[4, 2, 3]);
        let mut sched = ShortestRemainingScheduler::init(&state);
        assert_eq!(sched.select(&state), Some(1));
    }

    #[test]
    fn served_quanta_count_against_workload() {
        let mut state = waiting_state(&[3, 2]);
        let mut sched = ShortestRemainingScheduler::init(&state);

        for _ in 0..2 {
            state.mark_running(0, Instant::now());
            state.mark_waiting(0);
        }

        // job0 has 1 quantum left, job1 still 2
        assert_eq!(sched.select(&state), Some(0));
    }

    #[test]
    fn ties_go_to_load_order() {
        let state = waiting_state(&[2, 2]);
        let mut sched = ShortestRemainingScheduler::init(&state);
        assert_eq!(sched.select(&state), Some(0));
    }
}
