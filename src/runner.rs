use std::fmt::Display;

use crate::{Resource, ServiceState};

type ErrorHandler<E> = Box<dyn FnOnce(&E) -> (ServiceState, String)>;

/// Runs a check and turns its error, if any, into a service state and message.
pub struct Runner<E> {
    name: String,
    on_error: Option<ErrorHandler<E>>,
}

impl<E: Display> Runner<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_error: None,
        }
    }

    pub fn on_error(mut self, f: impl FnOnce(&E) -> (ServiceState, String) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Runs `f`. On error either the handler given to [Runner::on_error] is used, or the error
    /// is reported as [ServiceState::Critical] with its display text.
    pub fn safe_run(self, f: impl FnOnce() -> Result<Resource, E>) -> RunnerResult {
        match f() {
            Ok(resource) => RunnerResult::Ok(resource),
            Err(err) => {
                let (state, msg) = self
                    .on_error
                    .map(|f| f(&err))
                    .unwrap_or_else(|| (ServiceState::Critical, err.to_string()));

                RunnerResult::Err {
                    name: self.name,
                    state,
                    msg,
                }
            }
        }
    }
}

pub enum RunnerResult {
    Ok(Resource),
    Err {
        name: String,
        state: ServiceState,
        msg: String,
    },
}

impl RunnerResult {
    pub fn state(&self) -> ServiceState {
        match self {
            RunnerResult::Ok(resource) => resource.state(),
            RunnerResult::Err { state, .. } => *state,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.state().exit_code()
    }

    pub fn to_nagios_string(&self) -> String {
        match self {
            RunnerResult::Ok(resource) => resource.to_nagios_string(),
            RunnerResult::Err { name, state, msg } => format!("{} {}: {}", name, state, msg),
        }
    }

    pub fn print_and_exit(self) -> ! {
        match self {
            RunnerResult::Ok(resource) => resource.print_and_exit(),
            RunnerResult::Err { .. } => {
                println!("{}", self.to_nagios_string());
                std::process::exit(self.exit_code());
            }
        }
    }
}
