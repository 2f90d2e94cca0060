use log::debug;
use std::time::Instant;

use super::{
    event::{PendingInterrupts, SchedEvent},
    observer::Observer,
    platform::Platform,
    state::{PcbId, PcbState, SchedState},
    SchedError,
};
use crate::{scheduler::Scheduler, sim::JobSpec};

/// The scheduler engine: owns the PCB table and reacts to interrupts by
/// preempting, admitting arrivals and asking the policy what runs next.
pub struct SchedCore<S: Scheduler, P: Platform> {
    pub state: SchedState,
    pub scheduler: S,
    platform: P,
    observer: Observer,
    started_at: Instant,
}

impl<S: Scheduler, P: Platform> SchedCore<S, P> {
    pub fn new(jobs: Vec<JobSpec>, platform: P) -> Self {
        let state = SchedState::load(jobs);
        let scheduler = S::init(&state);
        let observer = Observer::new(&state);
        let started_at = platform.now();
        Self {
            state,
            scheduler,
            platform,
            observer,
            started_at,
        }
    }

    /// Services pending interrupts. Child exits are handled before the
    /// timer so preemption never acts on a job that already finished.
    pub fn service(&mut self, pending: PendingInterrupts) -> Result<Vec<SchedEvent>, SchedError> {
        let mut events = Vec::new();
        let mut timer = pending.timer;

        if pending.child_exit && self.handle_child_exit(&mut events)? {
            // The timer went away with the exited job; reschedule now
            timer = true;
        }

        if timer {
            self.handle_timer(&mut events)?;
        }

        self.observer.observe(&self.state);
        Ok(events)
    }

    // Return true if at least one known job terminated
    fn handle_child_exit(&mut self, events: &mut Vec<SchedEvent>) -> Result<bool, SchedError> {
        let mut terminated = false;

        while let Some(exit) = self.platform.reap()? {
            let Some(id) = self.state.find_by_pid(exit.pid) else {
                debug!("Ignoring exit of unknown child {}", exit.pid);
                continue;
            };
            if self.state.pcb(id).is_terminated() {
                continue;
            }

            self.platform.disarm_timer()?;
            let now = self.platform.now();
            let from = self.state.mark_terminated(id, now);

            events.push(SchedEvent::StateChange {
                pcb: id,
                from,
                to: PcbState::Terminated,
            });
            events.push(SchedEvent::Exited {
                pcb: id,
                code: exit.code,
            });
            terminated = true;
        }

        Ok(terminated)
    }

    fn handle_timer(&mut self, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        events.push(SchedEvent::TimerExpired {
            quantum: self.state.current_quantum,
        });

        // Preempt
        if let Some(id) = self.state.running() {
            if let Some(pid) = self.state.pcb(id).pid {
                self.platform.suspend(pid)?;
            }
            let from = self.state.mark_waiting(id);
            self.scheduler.preempted(&self.state, id);
            events.push(SchedEvent::StateChange {
                pcb: id,
                from,
                to: PcbState::Waiting,
            });
        }

        self.handle_arrivals(events)?;

        match self.scheduler.select(&self.state) {
            Some(id) => self.switch_to(id, events),
            None => self.idle(events),
        }
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        let quantum = self.state.current_quantum;
        let arriving: Vec<PcbId> = self
            .state
            .iter()
            .filter(|pcb| pcb.state == PcbState::Created && pcb.creation_quantum == quantum)
            .map(|pcb| pcb.id)
            .collect();

        for id in arriving {
            self.admit(id, events)?;
        }
        Ok(())
    }

    fn admit(&mut self, id: PcbId, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        let pcb = self.state.pcb(id);
        debug_assert_eq!(pcb.state, PcbState::Created);
        debug_assert_eq!(pcb.creation_quantum, self.state.current_quantum);

        let pid = self.platform.spawn_suspended(&pcb.name, pcb.workload)?;
        let now = self.platform.now();
        let from = self.state.mark_admitted(id, pid, now);

        events.push(SchedEvent::Arrived { pcb: id, pid });
        events.push(SchedEvent::StateChange {
            pcb: id,
            from,
            to: PcbState::Waiting,
        });
        Ok(())
    }

    fn switch_to(&mut self, id: PcbId, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        let pcb = self.state.pcb(id);
        let pid = match (pcb.state, pcb.pid) {
            (PcbState::Waiting, Some(pid)) => pid,
            (state, _) => {
                return Err(SchedError::InvalidSwitch {
                    name: pcb.name.clone(),
                    state,
                })
            }
        };

        let now = self.platform.now();
        let from = self.state.mark_running(id, now);
        self.scheduler.dispatched(&self.state, id);

        self.platform.arm_timer()?;
        self.platform.resume(pid)?;

        events.push(SchedEvent::StateChange {
            pcb: id,
            from,
            to: PcbState::Running,
        });
        events.push(SchedEvent::Dispatched {
            pcb: id,
            quantum: self.state.current_quantum,
        });
        Ok(())
    }

    // Keep the clock ticking while future arrivals are still due
    fn idle(&mut self, events: &mut Vec<SchedEvent>) -> Result<(), SchedError> {
        if self.state.running().is_some() || self.state.count(PcbState::Created) == 0 {
            return Ok(());
        }

        self.state.advance_idle();
        self.platform.arm_timer()?;
        events.push(SchedEvent::Idle {
            quantum: self.state.current_quantum,
        });
        Ok(())
    }

    /// Kills and reaps every admitted job that has not terminated yet.
    /// Errors are ignored: this only runs on the way out of a failed run.
    pub fn abort(&mut self) {
        let _ = self.platform.disarm_timer();

        let live: Vec<_> = self
            .state
            .iter()
            .filter(|pcb| !pcb.is_terminated())
            .filter_map(|pcb| pcb.pid)
            .collect();

        for pid in live {
            if self.platform.kill(pid).is_err() {
                debug!("Process {pid} already gone");
            }
        }
    }

    pub fn all_terminated(&self) -> bool {
        self.state.all_terminated()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}
