use nix::unistd::Pid;
use rustc_hash::FxHashMap;
use std::time::Instant;

use crate::sim::JobSpec;

// Index into the PCB Vec; fixed for the whole run
pub type PcbId = usize;
pub type Quantum = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcbState {
    Created,
    Waiting,
    Running,
    Terminated,
}

impl PcbState {
    /// Allowed edges of the per-job lifecycle. `Terminated` is final.
    pub fn can_transition_to(self, next: PcbState) -> bool {
        use PcbState::*;
        matches!(
            (self, next),
            (Created, Waiting)
                | (Waiting, Running)
                | (Running, Waiting)
                | (Running, Terminated)
                | (Waiting, Terminated)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Pcb {
    pub id: PcbId,
    pub name: String,
    pub workload: u64,
    pub creation_quantum: Quantum,
    pub state: PcbState,
    pub pid: Option<Pid>,
    pub arrival_time: Option<Instant>,
    pub start_time: Option<Instant>,
    pub completion_time: Option<Instant>,
    // Number of context switches into this job
    pub quanta_run: u64,
}

impl Pcb {
    fn new(id: PcbId, job: JobSpec) -> Self {
        Self {
            id,
            name: job.name,
            workload: job.workload,
            creation_quantum: job.creation_quantum,
            state: PcbState::Created,
            pid: None,
            arrival_time: None,
            start_time: None,
            completion_time: None,
            quanta_run: 0,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.state == PcbState::Terminated
    }
}

/// Scheduler-wide state: the PCB table plus the quantum counter and the
/// currently running job. Only the single control thread touches it.
#[derive(Debug)]
pub struct SchedState {
    pub pcbs: Vec<Pcb>,
    pub current_quantum: Quantum,
    pub current: Option<PcbId>,
    pid_to_pcb: FxHashMap<Pid, PcbId>,
}

impl SchedState {
    pub fn load(jobs: Vec<JobSpec>) -> Self {
        let pcbs = jobs
            .into_iter()
            .enumerate()
            .map(|(id, job)| Pcb::new(id, job))
            .collect();

        Self {
            pcbs,
            current_quantum: 0,
            current: None,
            pid_to_pcb: FxHashMap::default(),
        }
    }

    pub fn num_processes(&self) -> usize {
        self.pcbs.len()
    }

    pub fn pcb(&self, id: PcbId) -> &Pcb {
        &self.pcbs[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pcb> {
        self.pcbs.iter()
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<PcbId> {
        self.pid_to_pcb.get(&pid).copied()
    }

    pub fn count(&self, state: PcbState) -> usize {
        self.pcbs.iter().filter(|pcb| pcb.state == state).count()
    }

    pub fn all_terminated(&self) -> bool {
        self.count(PcbState::Terminated) == self.num_processes()
    }

    pub fn running(&self) -> Option<PcbId> {
        self.current
            .filter(|&id| self.pcbs[id].state == PcbState::Running)
    }

    // Return previous state
    fn transition(&mut self, id: PcbId, to: PcbState) -> PcbState {
        let pcb = &mut self.pcbs[id];
        let from = pcb.state;
        debug_assert!(
            from.can_transition_to(to),
            "PCB '{}' cannot move from {from:?} to {to:?}",
            pcb.name
        );
        pcb.state = to;
        from
    }

    pub fn mark_admitted(&mut self, id: PcbId, pid: Pid, now: Instant) -> PcbState {
        debug_assert!(
            self.pcbs[id].pid.is_none(),
            "PCB '{}' already has a process",
            self.pcbs[id].name
        );
        debug_assert!(
            !self.pid_to_pcb.contains_key(&pid),
            "Process {pid} already owned by another PCB"
        );

        let from = self.transition(id, PcbState::Waiting);
        let pcb = &mut self.pcbs[id];
        pcb.pid = Some(pid);
        pcb.arrival_time = Some(now);
        self.pid_to_pcb.insert(pid, id);
        from
    }

    pub fn mark_running(&mut self, id: PcbId, now: Instant) -> PcbState {
        debug_assert!(
            self.running().is_none(),
            "Another PCB is already running"
        );

        let from = self.transition(id, PcbState::Running);
        let pcb = &mut self.pcbs[id];
        if pcb.start_time.is_none() {
            pcb.start_time = Some(now);
        }
        pcb.quanta_run += 1;
        self.current = Some(id);
        self.current_quantum += 1;
        from
    }

    pub fn mark_waiting(&mut self, id: PcbId) -> PcbState {
        let from = self.transition(id, PcbState::Waiting);
        if self.current == Some(id) {
            self.current = None;
        }
        from
    }

    pub fn mark_terminated(&mut self, id: PcbId, now: Instant) -> PcbState {
        let from = self.transition(id, PcbState::Terminated);
        self.pcbs[id].completion_time = Some(now);
        if self.current == Some(id) {
            self.current = None;
        }
        from
    }

    // Quantum passes with nobody on the CPU
    pub fn advance_idle(&mut self) {
        debug_assert!(self.running().is_none(), "Idle tick while a PCB runs");
        self.current_quantum += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs() -> Vec<JobSpec> {
        vec![
            JobSpec::new("A", 2, 0),
            JobSpec::new("B", 3, 0),
            JobSpec::new("C", 1, 5),
        ]
    }

    #[test]
    fn load_starts_everything_created() {
        let state = SchedState::load(jobs());
        assert_eq!(state.num_processes(), 3);
        assert_eq!(state.count(PcbState::Created), 3);
        assert_eq!(state.current_quantum, 0);
        assert!(state.current.is_none());
        assert_eq!(state.pcb(2).name, "C");
        assert_eq!(state.pcb(2).creation_quantum, 5);
        assert!(state.iter().all(|pcb| pcb.pid.is_none()));
    }

    #[test]
    fn lifecycle_updates_counters_and_times() {
        let mut state = SchedState::load(jobs());
        let t0 = Instant::now();
        let pid = Pid::from_raw(4242);

        state.mark_admitted(0, pid, t0);
        assert_eq!(state.find_by_pid(pid), Some(0));
        assert_eq!(state.pcb(0).arrival_time, Some(t0));

        let t1 = t0 + std::time::Duration::from_millis(5);
        state.mark_running(0, t1);
        assert_eq!(state.running(), Some(0));
        assert_eq!(state.current_quantum, 1);

        state.mark_waiting(0);
        assert_eq!(state.running(), None);

        // A second dispatch keeps the first start time
        let t2 = t1 + std::time::Duration::from_millis(5);
        state.mark_running(0, t2);
        assert_eq!(state.pcb(0).start_time, Some(t1));
        assert_eq!(state.pcb(0).quanta_run, 2);

        state.mark_terminated(0, t2);
        assert!(state.current.is_none());
        assert_eq!(state.count(PcbState::Terminated), 1);
        assert!(!state.all_terminated());
    }

    #[test]
    fn unknown_pid_is_not_found() {
        let state = SchedState::load(jobs());
        assert_eq!(state.find_by_pid(Pid::from_raw(1)), None);
    }

    #[test]
    fn terminated_is_final() {
        for next in [
            PcbState::Created,
            PcbState::Waiting,
            PcbState::Running,
            PcbState::Terminated,
        ] {
            assert!(!PcbState::Terminated.can_transition_to(next));
        }
        assert!(!PcbState::Created.can_transition_to(PcbState::Running));
        assert!(PcbState::Running.can_transition_to(PcbState::Waiting));
    }

    #[test]
    fn empty_load_is_already_done() {
        let state = SchedState::load(Vec::new());
        assert!(state.all_terminated());
    }
}
