//! Solver configuration.

use std::time::Duration;

use exlp_expr::Rational;

/// Default delta precision requested from the solver.
pub const DEFAULT_PRECISION: f64 = 9.999999999999996e-4;

/// Configuration options shared by the façade, the backends and the MPS
/// driver.
///
/// Options can be set programmatically through the `with_*` builders or from
/// embedded `* @set-option :key value` records via [`Config::apply_option`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Requested delta precision; 0 demands an exact optimum.
    pub precision: f64,
    /// Emit a partial-solution callback at each delta-feasible point.
    pub continuous_output: bool,
    /// Produce CSV output.
    pub csv: bool,
    /// Print nothing on stdout.
    pub silent: bool,
    /// Report timings alongside results.
    pub with_timings: bool,
    /// Verbosity level of the driver, in `[0, 5]`.
    pub verbosity: u32,
    /// Verbosity level of the simplex engine, in `[0, 5]`.
    pub simplex_verbosity: u32,
    /// Print the model on a feasible outcome.
    pub produce_models: bool,
    /// Backend timeout; `None` means unlimited.
    pub timeout: Option<Duration>,
    /// Only honor the first RHS and BOUNDS group names in MPS input.
    pub strict_mps: bool,
    /// Check the stored solution against every constraint after a feasible
    /// solve.
    pub verify: bool,
    /// Parse the objective row but do not optimise it.
    pub skip_optimise: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            continuous_output: false,
            csv: false,
            silent: false,
            with_timings: false,
            verbosity: 2,
            simplex_verbosity: 0,
            produce_models: false,
            timeout: None,
            strict_mps: false,
            verify: false,
            skip_optimise: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_continuous_output(mut self, enabled: bool) -> Self {
        self.continuous_output = enabled;
        self
    }

    pub fn with_silent(mut self, enabled: bool) -> Self {
        self.silent = enabled;
        self
    }

    pub fn with_strict_mps(mut self, enabled: bool) -> Self {
        self.strict_mps = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    /// Requested precision as an exact rational.
    pub fn precision_rational(&self) -> Rational {
        Rational::from_float(self.precision).unwrap_or_else(|| Rational::from_integer(0.into()))
    }

    /// Apply an option as found in an embedded `@set-option` record.
    ///
    /// Boolean values accept `yes`/`true`/`1`/`on` (case-insensitive) as
    /// true and anything else as false. Unrecognized keys are ignored with a
    /// warning so that newer inputs stay readable.
    pub fn apply_option(&mut self, key: &str, value: &str) {
        match key {
            ":csv" => self.csv = parse_bool(value),
            ":silent" => self.silent = parse_bool(value),
            ":with-timings" => self.with_timings = parse_bool(value),
            ":precision" => match value.parse::<f64>() {
                Ok(precision) if precision >= 0.0 => self.precision = precision,
                _ => tracing::warn!(
                    component = "config",
                    operation = "apply_option",
                    status = "failure",
                    key,
                    value,
                    "Invalid precision value"
                ),
            },
            ":continuous-output" => self.continuous_output = parse_bool(value),
            ":verbosity" => match value.parse::<u32>() {
                Ok(level) => self.verbosity = level,
                Err(_) => tracing::warn!(
                    component = "config",
                    operation = "apply_option",
                    status = "failure",
                    key,
                    value,
                    "Invalid verbosity value"
                ),
            },
            ":simplex-verbosity" => match value.parse::<u32>() {
                Ok(level) => self.simplex_verbosity = level,
                Err(_) => tracing::warn!(
                    component = "config",
                    operation = "apply_option",
                    status = "failure",
                    key,
                    value,
                    "Invalid simplex verbosity value"
                ),
            },
            ":produce-models" => self.produce_models = parse_bool(value),
            ":timeout" => match value.parse::<u64>() {
                Ok(millis) => self.timeout = Some(Duration::from_millis(millis)),
                Err(_) => tracing::warn!(
                    component = "config",
                    operation = "apply_option",
                    status = "failure",
                    key,
                    value,
                    "Invalid timeout value"
                ),
            },
            other => tracing::warn!(
                component = "config",
                operation = "apply_option",
                status = "ignored",
                key = other,
                value,
                "Unrecognized option"
            ),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}
