use log::{debug, info, warn};

use super::{report::Report, JobSpec};
use crate::{
    core::{
        driver::SchedCore, InterruptSource, PendingInterrupts, Platform, SchedError, SchedEvent,
    },
    os::{PlatformConfig, SignalInterrupts, UnixPlatform},
    scheduler::Scheduler,
};

/// The driver loop: sleeps until an interrupt arrives, hands it to the
/// engine, and stops once every job has terminated.
pub struct Sim<S: Scheduler, P: Platform = UnixPlatform, I: InterruptSource = SignalInterrupts> {
    pub core: SchedCore<S, P>,
    interrupts: I,
}

impl<S: Scheduler> Sim<S> {
    pub fn new(jobs: Vec<JobSpec>, config: &PlatformConfig) -> Result<Self, SchedError> {
        // Handlers must be in place before the first child can exit
        let interrupts = SignalInterrupts::install()?;
        let platform = UnixPlatform::new(config)?;
        Ok(Self::with_platform(jobs, platform, interrupts))
    }
}

impl<S: Scheduler, P: Platform, I: InterruptSource> Sim<S, P, I> {
    pub fn with_platform(jobs: Vec<JobSpec>, platform: P, interrupts: I) -> Self {
        Self {
            core: SchedCore::new(jobs, platform),
            interrupts,
        }
    }

    /// Runs until all jobs terminate. On a fatal error every job still alive
    /// is killed before the error is returned.
    pub fn run(&mut self) -> Result<Report, SchedError> {
        if let Err(err) = self.drive() {
            self.core.abort();
            return Err(err);
        }
        Ok(Report::from_state(&self.core.state, self.core.started_at()))
    }

    fn drive(&mut self) -> Result<(), SchedError> {
        let mut pending = PendingInterrupts::STARTUP;

        loop {
            if pending.any() {
                let events = self.core.service(pending)?;
                self.log_events(&events);
            }

            if self.core.all_terminated() {
                return Ok(());
            }

            pending = self.interrupts.wait();
        }
    }

    fn log_events(&self, events: &[SchedEvent]) {
        let state = &self.core.state;
        for event in events {
            match *event {
                SchedEvent::TimerExpired { quantum } => info!("-> interrupt ({quantum})"),
                SchedEvent::Arrived { pcb, pid } => {
                    let pcb = state.pcb(pcb);
                    info!("[*] New process arrival: {}", pcb.name);
                    info!(
                        "'{}' [pid={pid}] created. Workload = {}",
                        pcb.name, pcb.workload
                    );
                }
                SchedEvent::StateChange { pcb, from, to } => {
                    debug!("'{}': {from:?} -> {to:?}", state.pcb(pcb).name)
                }
                SchedEvent::Dispatched { pcb, quantum } => {
                    debug!("Dispatching '{}' (quantum {quantum})", state.pcb(pcb).name)
                }
                SchedEvent::Exited { pcb, code } => {
                    let pcb = state.pcb(pcb);
                    let pid = pcb.pid.map_or(-1, |pid| pid.as_raw());
                    match code {
                        Some(0) => info!("'{}' [pid={pid}] terminated", pcb.name),
                        Some(code) => warn!("'{}' [pid={pid}] exited with code {code}", pcb.name),
                        None => warn!("'{}' [pid={pid}] killed by a signal", pcb.name),
                    }
                }
                SchedEvent::Idle { quantum } => debug!("Idle, advancing to quantum {quantum}"),
            }
        }
    }
}
