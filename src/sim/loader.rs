//! Job specification files.
//!
//! One job per line: `<name> <workload> <creation_quantum>`. Blank lines and
//! lines starting with `#` are skipped. File order is load order.

use rustc_hash::FxHashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

use super::JobSpec;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: expected `<name> <workload> <creation_quantum>`, found {found} fields")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: job name {name:?} contains a NUL byte")]
    Name { line: usize, name: String },

    #[error("line {line}: workload must be a positive integer, found {value:?}")]
    Workload { line: usize, value: String },

    #[error("line {line}: creation quantum must be a non-negative integer, found {value:?}")]
    Quantum { line: usize, value: String },

    #[error("line {line}: duplicate job name {name:?}")]
    Duplicate { line: usize, name: String },
}

pub fn load_file(path: &Path) -> Result<Vec<JobSpec>, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Vec<JobSpec>, LoadError> {
    let mut jobs = Vec::new();
    let mut names = FxHashSet::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let &[name, workload, quantum] = fields.as_slice() else {
            return Err(LoadError::FieldCount {
                line,
                found: fields.len(),
            });
        };

        if name.contains('\0') {
            return Err(LoadError::Name {
                line,
                name: name.to_string(),
            });
        }

        let workload = match workload.parse::<u64>() {
            Ok(w) if w > 0 => w,
            _ => {
                return Err(LoadError::Workload {
                    line,
                    value: workload.to_string(),
                })
            }
        };

        let creation_quantum = quantum.parse::<u64>().map_err(|_| LoadError::Quantum {
            line,
            value: quantum.to_string(),
        })?;

        if !names.insert(name) {
            return Err(LoadError::Duplicate {
                line,
                name: name.to_string(),
            });
        }

        jobs.push(JobSpec::new(name, workload, creation_quantum));
    }

    Ok(jobs)
}

/// Renders jobs in the format `parse` reads.
pub fn format(jobs: &[JobSpec]) -> String {
    let mut out = String::from("# name workload creation_quantum\n");
    for job in jobs {
        let _ = writeln!(out, "{} {} {}", job.name, job.workload, job.creation_quantum);
    }
    out
}
