use env_logger::{Builder, Env};
use log::LevelFilter;
use sysinfo::{PidExt, ProcessExt, System, SystemExt};

/// Environment variable holding an `env_logger` filter, e.g. `DONOR_LOG=debug`.
pub static LOG_ENV: &str = "DONOR_LOG";

pub fn init_logging(verbose: usize) {
    let log_level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let env = Env::new().filter(LOG_ENV);
    // try_init so tests and repeated calls don't panic
    let _ = Builder::new()
        .filter(Some("donor_response"), log_level)
        .filter(Some("train_donor_model"), log_level)
        .filter(Some("predict_donor"), log_level)
        .parse_env(env)
        .try_init();
}

/// Resident memory of the current process in bytes, or 0 when unavailable.
pub fn monitor_memory() -> u64 {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0,
    };
    let mut sys = System::new();
    if !sys.refresh_process(pid) {
        return 0;
    }
    sys.process(pid).map_or(0, |process| process.memory())
}

pub fn pid_label() -> String {
    sysinfo::get_current_pid()
        .map(|pid| pid.as_u32().to_string())
        .unwrap_or_else(|_| "?".to_string())
}
