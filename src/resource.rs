use std::process;

use crate::ServiceState;

/// A Resource represents a single service from the perspective of the monitoring agent.
///
/// If no state is set explicitly it is determined from the pushed metrics.
///
/// ```rust
/// # use check_ses_limit::{Metric, Resource, ServiceState, Unit};
/// let resource = Resource::new("CheckSESLimit")
///     .with_state(ServiceState::Ok)
///     .with_description("SES sending limit is at 12%")
///     .with_metric(Metric::new("usage", 12u64).with_unit(Unit::Percentage));
///
/// assert_eq!(
///     &resource.to_nagios_string(),
///     "CheckSESLimit OK: SES sending limit is at 12% | usage=12%"
/// );
/// ```
pub struct Resource {
    name: String,
    state: Option<ServiceState>,
    description: Option<String>,
    metrics: Vec<Box<dyn PerfData>>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Resource {
            name: name.into(),
            state: None,
            description: None,
            metrics: Vec::new(),
        }
    }

    /// Sets the state manually. This disables the state determination based on the metrics.
    pub fn with_state(mut self, state: ServiceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metric<M>(mut self, metric: M) -> Self
    where
        M: PerfData + 'static,
    {
        self.metrics.push(Box::new(metric));
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn metrics(&self) -> &[Box<dyn PerfData>] {
        &self.metrics
    }

    /// Returns the manually set state, or the worst state among the metrics.
    ///
    /// Falls back to [ServiceState::Unknown] when neither is available.
    pub fn state(&self) -> ServiceState {
        if let Some(state) = self.state {
            return state;
        }

        self.metrics
            .iter()
            .filter_map(|m| m.state())
            .max()
            .unwrap_or(ServiceState::Unknown)
    }

    /// Returns the single output line the monitoring agent parses.
    pub fn to_nagios_string(&self) -> String {
        let mut s = format!("{} {}", self.name, self.state());

        if let Some(ref description) = self.description {
            s.push_str(&format!(": {}", description));
        }

        if !self.metrics.is_empty() {
            s.push_str(" |");

            for metric in self.metrics.iter() {
                s.push_str(&format!(" {}", metric.perf_string()));
            }
        }

        s
    }

    pub fn exit_code(&self) -> i32 {
        self.state().exit_code()
    }

    /// Prints [Self::to_nagios_string] and exits with the code from [Self::exit_code].
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_nagios_string());
        process::exit(self.exit_code());
    }
}

/// A single perfdata entry of a resource. Implemented by [Metric].
pub trait PerfData {
    fn perf_string(&self) -> String;
    fn state(&self) -> Option<ServiceState>;
}

/// Renders a value the way it appears in perfdata, without going through `ToString`.
pub trait ToPerfString {
    fn to_perf_string(&self) -> String;
}

impl_to_perf_string_on_to_string!(u32, u64, i32, i64);
impl_to_perf_string_on_to_string!(f64, String);

impl<T> ToPerfString for Option<T>
where
    T: ToPerfString,
{
    fn to_perf_string(&self) -> String {
        match self {
            Some(ref s) => s.to_perf_string(),
            None => String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Unit {
    None,
    Percentage,
    Counter,
    Other(String),
}

impl Unit {
    fn as_str(&self) -> &str {
        match self {
            Unit::None => "",
            Unit::Percentage => "%",
            Unit::Counter => "c",
            Unit::Other(ref s) => s,
        }
    }
}

/// A perfdata metric: a labelled value with optional thresholds and range.
#[derive(Clone, Debug)]
pub struct Metric<T> {
    name: String,
    value: T,
    state: Option<ServiceState>,
    warning: Option<T>,
    critical: Option<T>,
    min: Option<T>,
    max: Option<T>,
    unit: Unit,
}

impl<T> Metric<T>
where
    T: ToPerfString,
{
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Metric {
            name: name.into(),
            value,
            state: None,
            warning: None,
            critical: None,
            min: None,
            max: None,
            unit: Unit::None,
        }
    }

    pub fn with_state(mut self, state: ServiceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_thresholds(mut self, warning: Option<T>, critical: Option<T>) -> Self {
        self.warning = warning;
        self.critical = critical;
        self
    }

    pub fn with_range(mut self, min: Option<T>, max: Option<T>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    fn label(&self) -> String {
        let name = self.name.replace('=', "_").replace('\'', "''");

        if name.contains(' ') {
            format!("'{}'", name)
        } else {
            name
        }
    }
}

impl<T> PerfData for Metric<T>
where
    T: ToPerfString,
{
    fn perf_string(&self) -> String {
        perf_string!(
            self.label(),
            format!("{}{}", self.value.to_perf_string(), self.unit.as_str()),
            self.warning,
            self.critical,
            self.min,
            self.max
        )
    }

    fn state(&self) -> Option<ServiceState> {
        self.state
    }
}
