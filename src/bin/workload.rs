//! Stand-in for a CPU-bound job: works in small steps for `duration` time
//! units, redrawing a progress bar as it goes.

use clap::Parser;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use sigsched::os::DEFAULT_TIME_UNIT_MS;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const BAR_WIDTH: usize = 20;
// Progress is redrawn this many times per time unit
const STEPS_PER_UNIT: u32 = 10;

static RESUMED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_resume(_: libc::c_int) {
    RESUMED.store(true, Ordering::SeqCst);
}

#[derive(Parser)]
#[command(name = "workload", about = "Busy job driven by sigsched")]
struct Args {
    name: String,

    /// Work to do, in time units
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    duration: u64,

    #[arg(long, default_value_t = DEFAULT_TIME_UNIT_MS, value_parser = clap::value_parser!(u64).range(1..))]
    unit_ms: u64,
}

fn progress_bar(name: &str, done: Duration, total: Duration) -> String {
    let frac = if total.is_zero() {
        1.0
    } else {
        (done.as_secs_f64() / total.as_secs_f64()).min(1.0)
    };
    let filled = ((frac * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "{name} [{}{}] {:.1}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        frac * 100.0
    )
}

fn draw(name: &str, done: Duration, total: Duration) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "\r{}", progress_bar(name, done, total));
    let _ = out.flush();
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let action = SigAction::new(
        SigHandler::Handler(on_resume),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic
    let installed = unsafe { signal::sigaction(Signal::SIGCONT, &action) };
    if installed.is_err() {
        eprintln!("workload: cannot watch for SIGCONT, resume notices disabled");
    }

    let pid = std::process::id();
    println!("-> Executing '{}' [pid={pid}]", args.name);

    let unit = Duration::from_millis(args.unit_ms);
    let total = Duration::from_millis(args.unit_ms.saturating_mul(args.duration));
    let step = (unit / STEPS_PER_UNIT).max(Duration::from_millis(1));
    let mut done = Duration::ZERO;

    draw(&args.name, done, total);
    while done < total {
        let slice = step.min(total - done);
        thread::sleep(slice);
        done += slice;

        if RESUMED.swap(false, Ordering::SeqCst) {
            println!("\n-> Executing '{}' [pid={pid}]", args.name);
        }
        draw(&args.name, done, total);
    }
    println!();

    ExitCode::SUCCESS
}
