pub mod driver;
pub mod generate;
pub mod job;
pub mod loader;
pub mod report;

pub use driver::Sim;
pub use generate::{bernoulli_jobs, GenerateConfig};
pub use job::JobSpec;
pub use report::Report;
