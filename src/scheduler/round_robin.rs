use super::{PcbId, SchedState, Scheduler};
use crate::core::state::PcbState;

/// Rotates the scan start so that peers take turns quantum by quantum.
pub struct RoundRobinScheduler {
    next: usize,
}

impl Scheduler for RoundRobinScheduler {
    fn init(_state: &SchedState) -> Self {
        Self { next: 0 }
    }

    fn select(&mut self, state: &SchedState) -> Option<PcbId> {
        let n = state.num_processes();
        (0..n)
            .map(|offset| (self.next + offset) % n)
            .find(|&id| state.pcb(id).state == PcbState::Waiting)
    }

    fn dispatched(&mut self, state: &SchedState, pcb: PcbId) {
        self.next = (pcb + 1) % state.num_processes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::waiting_state;
    use std::time::Instant;

    #[test]
    fn peers_take_turns() {
        let mut state = waiting_state(&[5, 5, 5]);
        let mut sched = RoundRobinScheduler::init(&state);
        let mut order = Vec::new();

        for _ in 0..6 {
            let id = sched.select(&state).unwrap();
            state.mark_running(id, Instant::now());
            sched.dispatched(&state, id);
            order.push(id);
            state.mark_waiting(id);
        }

        assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn skips_terminated_and_wraps() {
        let mut state = waiting_state(&[1, 1, 1]);
        let mut sched = RoundRobinScheduler::init(&state);
        state.mark_running(2, Instant::now());
        sched.dispatched(&state, 2);
        state.mark_terminated(2, Instant::now());

        assert_eq!(sched.select(&state), Some(0));
    }
}
