//! Host power-off adapter.
//!
//! Implements [`PowerOffPort`] by running the configured commands with
//! `std::process::Command`.  The first command flushes storage, the
//! remaining ones power the host off.

use std::process::Command;

use log::{info, warn};

use crate::app::ports::{PowerOffError, PowerOffPort};

pub struct CommandPowerOff {
    flush: Vec<String>,
    power_off: Vec<Vec<String>>,
}

impl CommandPowerOff {
    /// Split `commands` into the flush step and the power-off steps.
    pub fn new(commands: &[Vec<String>]) -> Self {
        let (flush, power_off) = match commands.split_first() {
            Some((first, rest)) => (first.clone(), rest.to_vec()),
            None => (Vec::new(), Vec::new()),
        };
        Self { flush, power_off }
    }
}

fn run(argv: &[String]) -> bool {
    let Some((program, args)) = argv.split_first() else {
        return true;
    };
    info!("power-off: running {}", argv.join(" "));
    match Command::new(program).args(args).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            warn!("power-off: {program} exited with {status}");
            false
        }
        Err(e) => {
            warn!("power-off: could not run {program}: {e}");
            false
        }
    }
}

impl PowerOffPort for CommandPowerOff {
    fn flush(&self) -> Result<(), PowerOffError> {
        if run(&self.flush) { Ok(()) } else { Err(PowerOffError::FlushFailed) }
    }

    fn power_off(&self) -> Result<(), PowerOffError> {
        if self.power_off.is_empty() {
            return Err(PowerOffError::PowerOffFailed);
        }
        if self.power_off.iter().all(|argv| run(argv)) {
            Ok(())
        } else {
            Err(PowerOffError::PowerOffFailed)
        }
    }
}
