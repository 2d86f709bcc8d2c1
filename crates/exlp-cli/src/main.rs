//! `exlp`: exact LP solver over MPS input.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use exlp_core::LpProblem;
use exlp_expr::Rational;
use exlp_mps::parse_reader;
use exlp_simplex::SimplexBackend;
use exlp_solver::{Config, LpResult};

#[derive(Parser, Debug)]
#[command(
    name = "exlp",
    version,
    about = "Exact delta-relaxed linear programming solver over MPS input"
)]
struct Cli {
    /// MPS file to solve; stdin when absent or '-'
    file: Option<PathBuf>,

    /// Delta precision of the solve; 0 demands an exact optimum
    #[arg(long)]
    precision: Option<f64>,

    /// Produce CSV output
    #[arg(long)]
    csv: bool,

    /// Produce JSON output
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Print nothing on stdout
    #[arg(long)]
    silent: bool,

    /// Report timings alongside results
    #[arg(long)]
    with_timings: bool,

    /// Verbosity level in [0, 5]
    #[arg(long)]
    verbosity: Option<u32>,

    /// Simplex engine verbosity level in [0, 5]
    #[arg(long)]
    simplex_verbosity: Option<u32>,

    /// Print the model on a feasible outcome
    #[arg(long)]
    produce_models: bool,

    /// Backend timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Only honor the first RHS and BOUNDS group names
    #[arg(long)]
    strict_mps: bool,

    /// Report every intermediate delta-feasible point
    #[arg(long)]
    continuous_output: bool,

    /// Check the solution against every constraint after a feasible solve
    #[arg(long)]
    verify: bool,

    /// Parse the objective row but do not optimise it
    #[arg(long)]
    skip_optimise: bool,
}

impl Cli {
    fn base_config(&self) -> Config {
        let mut config = Config::new();
        config.strict_mps = self.strict_mps;
        config.skip_optimise = self.skip_optimise;
        self.apply_overrides(&mut config);
        config
    }

    /// Command-line options win over options embedded in the input; this
    /// re-applies every explicitly given flag after parsing.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(precision) = self.precision {
            config.precision = precision;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Some(Duration::from_millis(timeout));
        }
        if self.csv {
            config.csv = true;
        }
        if self.silent {
            config.silent = true;
        }
        if self.with_timings {
            config.with_timings = true;
        }
        if self.produce_models {
            config.produce_models = true;
        }
        if self.continuous_output {
            config.continuous_output = true;
        }
        if self.verify {
            config.verify = true;
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        if let Some(verbosity) = self.simplex_verbosity {
            config.simplex_verbosity = verbosity;
        }
    }
}

#[derive(Serialize)]
struct Summary {
    result: String,
    objective_lb: String,
    objective_ub: String,
    precision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    solve_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<BTreeMap<String, String>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut lp = LpProblem::with_config(Box::new(SimplexBackend::new()), cli.base_config());

    if let Err(err) = parse_input(&mut lp, &cli) {
        eprintln!("exlp: {err}");
        return ExitCode::from(1);
    }
    cli.apply_overrides(lp.config_mut());

    if lp.config().continuous_output && !lp.config().silent {
        lp.set_partial_callback(Box::new(|snapshot| {
            println!(
                "partial: objective in [{}, {}]",
                snapshot.obj_lb, snapshot.obj_ub
            );
            true
        }));
    }

    let mut precision: Rational = lp.config().precision_rational();
    let started = Instant::now();
    let result = match lp.solve(&mut precision, true) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("exlp: {err}");
            return ExitCode::from(LpResult::Error.exit_code() as u8);
        }
    };
    let solve_time = started.elapsed();

    if !lp.check_against_expected(result) {
        eprintln!(
            "exlp: result '{result}' conflicts with the expected '{}'",
            lp.expected()
        );
    }
    let verified = if lp.config().verify && result.is_feasible() {
        let ok = lp.verify();
        if !ok {
            eprintln!("exlp: solution fails verification against the input constraints");
        }
        ok
    } else {
        true
    };

    report(&lp, result, &precision, solve_time, cli.json);

    if !verified {
        return ExitCode::from(LpResult::Error.exit_code() as u8);
    }
    ExitCode::from(result.exit_code() as u8)
}

fn init_tracing(cli: &Cli) {
    let level = |verbosity: u32| match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    let directives = format!(
        "exlp={},exlp_simplex={}",
        level(cli.verbosity.unwrap_or(2)),
        level(cli.simplex_verbosity.unwrap_or(0))
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_input(lp: &mut LpProblem, cli: &Cli) -> Result<(), exlp_mps::ParseError> {
    match &cli.file {
        Some(path) if path.as_os_str() != "-" => exlp_mps::parse_file(lp, path),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            parse_reader(lp, input.as_bytes())
        }
    }
}

fn report(
    lp: &LpProblem,
    result: LpResult,
    precision: &Rational,
    solve_time: Duration,
    json: bool,
) {
    let config = lp.config();
    if config.silent {
        return;
    }
    let (obj_lb, obj_ub) = lp.objective_bounds();
    let solve_time_ms = solve_time.as_secs_f64() * 1000.0;

    if config.csv {
        let mut line = format!("{result},{obj_lb},{obj_ub},{precision}");
        if config.with_timings {
            line.push_str(&format!(",{solve_time_ms:.3}"));
        }
        println!("{line}");
        return;
    }

    let model = (config.produce_models && result.is_feasible()).then(|| {
        lp.variables()
            .iter()
            .zip(lp.solution())
            .map(|(var, value)| (var.name(), value.to_string()))
            .collect::<BTreeMap<_, _>>()
    });

    if json {
        let summary = Summary {
            result: result.to_string(),
            objective_lb: obj_lb.to_string(),
            objective_ub: obj_ub.to_string(),
            precision: precision.to_string(),
            solve_time_ms: config.with_timings.then_some(solve_time_ms),
            model,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("exlp: {err}"),
        }
        return;
    }

    match result {
        LpResult::Optimal | LpResult::DeltaOptimal => {
            println!("{result}  objective in [{obj_lb}, {obj_ub}]  precision {precision}");
        }
        _ => println!("{result}"),
    }
    if config.with_timings {
        println!("solve time: {solve_time_ms:.3} ms");
    }
    if let Some(model) = model {
        for (name, value) in model {
            println!("  {name} = {value}");
        }
    }
}
