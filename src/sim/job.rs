use crate::core::state::Quantum;

/// One record of the job specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    // In time units
    pub workload: u64,
    pub creation_quantum: Quantum,
}

impl JobSpec {
    pub fn new(name: &str, workload: u64, creation_quantum: Quantum) -> Self {
        Self {
            name: name.to_string(),
            workload,
            creation_quantum,
        }
    }
}
