use rand::prelude::*;

use super::JobSpec;

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub quanta: u64,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_workload: u64,
    pub long_workload: u64,
    pub seed: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            quanta: 20,
            p_arrival: 0.3,
            p_short: 0.3,
            short_workload: 2,
            long_workload: 6,
            seed: 0,
        }
    }
}

/// At most one arrival per quantum, each a coin flip; every job is either
/// short or long.
pub fn bernoulli_jobs(config: &GenerateConfig) -> Vec<JobSpec> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut jobs = Vec::new();

    for quantum in 0..config.quanta {
        if rng.random::<f64>() < config.p_arrival {
            let workload = if rng.random::<f64>() < config.p_short {
                config.short_workload
            } else {
                config.long_workload
            };

            jobs.push(JobSpec::new(&format!("job{}", jobs.len()), workload, quantum));
        }
    }

    jobs
}
