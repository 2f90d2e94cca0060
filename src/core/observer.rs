use super::state::{PcbState, Quantum, SchedState};

// One dispatch may admit a job and switch to it right away.
fn reachable_in_one_dispatch(from: PcbState, to: PcbState) -> bool {
    from == to
        || from.can_transition_to(to)
        || (from == PcbState::Created && to == PcbState::Running)
}

/// Checks scheduler invariants after every serviced interrupt.
#[derive(Debug)]
pub struct Observer {
    last_states: Vec<PcbState>,
    creation_quanta: Vec<Quantum>,
    last_quantum: Quantum,
}

impl Observer {
    pub fn new(state: &SchedState) -> Self {
        Self {
            last_states: state.iter().map(|pcb| pcb.state).collect(),
            creation_quanta: state.iter().map(|pcb| pcb.creation_quantum).collect(),
            last_quantum: state.current_quantum,
        }
    }

    pub fn observe(&mut self, state: &SchedState) {
        let running = state.count(PcbState::Running);
        debug_assert!(running <= 1, "{running} PCBs running at once");

        if let Some(id) = state.current {
            debug_assert_eq!(
                state.pcb(id).state,
                PcbState::Running,
                "current PCB '{}' must be Running",
                state.pcb(id).name
            );
        } else {
            debug_assert_eq!(running, 0, "Running PCB not tracked as current");
        }

        debug_assert!(
            state.current_quantum >= self.last_quantum,
            "Quantum went backwards"
        );
        self.last_quantum = state.current_quantum;

        for pcb in state.iter() {
            let prev = self.last_states[pcb.id];
            debug_assert!(
                reachable_in_one_dispatch(prev, pcb.state),
                "PCB '{}' jumped from {prev:?} to {:?}",
                pcb.name,
                pcb.state
            );
            self.last_states[pcb.id] = pcb.state;

            debug_assert_eq!(
                pcb.creation_quantum, self.creation_quanta[pcb.id],
                "creation quantum of '{}' changed",
                pcb.name
            );

            if pcb.state != PcbState::Created {
                debug_assert!(pcb.pid.is_some(), "Admitted PCB '{}' has no pid", pcb.name);
            }

            if let (Some(arrival), Some(start)) = (pcb.arrival_time, pcb.start_time) {
                debug_assert!(arrival <= start, "'{}' started before arriving", pcb.name);
            }
            if let (Some(start), Some(done)) = (pcb.start_time, pcb.completion_time) {
                debug_assert!(start <= done, "'{}' completed before starting", pcb.name);
            }
        }
    }
}
