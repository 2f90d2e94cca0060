use average::{Estimate, Mean};
use std::fmt;
use std::time::{Duration, Instant};

use crate::core::state::SchedState;

#[derive(Debug, Clone)]
pub struct JobReport {
    pub name: String,
    pub arrival: Duration,
    // None if the job never got the CPU
    pub start: Option<Duration>,
    pub completion: Duration,
    pub quanta_run: u64,
}

impl JobReport {
    pub fn turnaround(&self) -> Duration {
        self.completion.saturating_sub(self.arrival)
    }

    pub fn response(&self) -> Option<Duration> {
        self.start.map(|start| start.saturating_sub(self.arrival))
    }
}

/// Per-job timings relative to the start of the run.
#[derive(Debug, Clone)]
pub struct Report {
    pub jobs: Vec<JobReport>,
}

impl Report {
    pub fn from_state(state: &SchedState, origin: Instant) -> Self {
        let since = |t: Instant| t.saturating_duration_since(origin);
        let jobs = state
            .iter()
            .filter_map(|pcb| {
                Some(JobReport {
                    name: pcb.name.clone(),
                    arrival: since(pcb.arrival_time?),
                    start: pcb.start_time.map(since),
                    completion: since(pcb.completion_time?),
                    quanta_run: pcb.quanta_run,
                })
            })
            .collect();
        Self { jobs }
    }

    pub fn avg_turnaround(&self) -> f64 {
        avg(self.jobs.iter().map(|j| j.turnaround().as_secs_f64()))
    }

    pub fn avg_response(&self) -> f64 {
        avg(self.jobs.iter().filter_map(|j| j.response()).map(|d| d.as_secs_f64()))
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.jobs.is_empty() {
            return Ok(());
        }

        writeln!(
            f,
            "{:<12} {:>9} {:>9} {:>9} {:>11} {:>9} {:>7}",
            "job", "arrival", "start", "done", "turnaround", "response", "quanta"
        )?;
        for job in &self.jobs {
            let start = job
                .start
                .map_or_else(|| "-".to_string(), |s| format!("{:.2}", s.as_secs_f64()));
            let response = job
                .response()
                .map_or_else(|| "-".to_string(), |r| format!("{:.2}", r.as_secs_f64()));
            writeln!(
                f,
                "{:<12} {:>9.2} {:>9} {:>9.2} {:>11.2} {:>9} {:>7}",
                job.name,
                job.arrival.as_secs_f64(),
                start,
                job.completion.as_secs_f64(),
                job.turnaround().as_secs_f64(),
                response,
                job.quanta_run
            )?;
        }
        writeln!(f, "Average turnaround time: {:.2}s", self.avg_turnaround())?;
        writeln!(f, "Average response time: {:.2}s", self.avg_response())
    }
}
