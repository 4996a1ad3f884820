use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use gradus_formula::lexer::Lexer;
use gradus_formula::literal::parse_number;
use gradus_formula::{CompileOptions, FormulaRecord, WeightNormalization, WeightSolver};

mod output;

#[derive(Parser, Debug)]
#[command(name = "gradus", version, about = "Weighted grade formulas")]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). GRADUS_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the entities and weightings a formula compiles to.
    Compile(FormulaArgs),
    /// Weighted average of the given values.
    Average(AverageArgs),
    /// Value one entity needs so the average reaches a target.
    Solve(SolveArgs),
    /// Load a saved JSON record and print its state.
    Restore(RestoreArgs),
}

#[derive(Args, Debug)]
struct CompileFlags {
    /// Integer weighting strategy.
    #[arg(long, value_enum, default_value_t = Normalization::CommonDenominator)]
    normalization: Normalization,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FormulaArgs {
    /// Formula, e.g. "(a + 2b)/3".
    formula: String,

    #[command(flatten)]
    flags: CompileFlags,
}

#[derive(Args, Debug)]
struct AverageArgs {
    #[command(flatten)]
    formula: FormulaArgs,

    /// Known value as NAME=VALUE (repeatable).
    #[arg(long = "set", value_parser = parse_assignment)]
    values: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
struct SolveArgs {
    #[command(flatten)]
    formula: FormulaArgs,

    /// Target average.
    #[arg(long)]
    target: f64,

    /// Entity to solve for.
    #[arg(long = "for")]
    unknown: String,

    /// Known value as NAME=VALUE (repeatable).
    #[arg(long = "set", value_parser = parse_assignment)]
    values: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    /// Saved record (JSON).
    path: PathBuf,

    #[command(flatten)]
    flags: CompileFlags,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Normalization {
    CommonDenominator,
    NumeratorOnly,
}

impl CompileFlags {
    fn options(&self) -> CompileOptions {
        let normalization = match self.normalization {
            Normalization::CommonDenominator => WeightNormalization::CommonDenominator,
            Normalization::NumeratorOnly => WeightNormalization::NumeratorOnly,
        };
        CompileOptions {
            normalization,
            ..CompileOptions::default()
        }
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("gradus error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Average(args) => cmd_average(args),
        Command::Solve(args) => cmd_solve(args),
        Command::Restore(args) => cmd_restore(args),
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("GRADUS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// `NAME=VALUE`, the value read with the formula number syntax
fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;

    let mut lexer = Lexer::for_str(value.trim());
    let number = parse_number(&mut lexer, true)
        .map_err(|error| error.to_string())?
        .ok_or_else(|| format!("'{value}' is not a number"))?;
    if !lexer.is_eof() {
        return Err(format!("trailing characters after number in '{raw}'"));
    }

    Ok((name.trim().to_string(), number))
}

fn build_solver(args: &FormulaArgs) -> anyhow::Result<WeightSolver> {
    WeightSolver::from_formula(&args.formula, &args.flags.options())
        .with_context(|| format!("compile formula '{}'", args.formula))
}

fn apply_values(solver: &mut WeightSolver, values: &[(String, f64)]) -> anyhow::Result<()> {
    for (name, value) in values {
        solver
            .set_value(name, *value)
            .with_context(|| format!("set value of '{name}'"))?;
    }
    tracing::debug!(count = values.len(), "applied values");
    Ok(())
}

fn cmd_compile(args: FormulaArgs) -> anyhow::Result<()> {
    let solver = build_solver(&args)?;
    if args.flags.json {
        return output::print_json(&solver.to_record());
    }
    output::print_entities(&solver);
    Ok(())
}

fn cmd_average(args: AverageArgs) -> anyhow::Result<()> {
    let mut solver = build_solver(&args.formula)?;
    apply_values(&mut solver, &args.values)?;

    if args.formula.flags.json {
        return output::print_json(&output::AverageReport::new(&solver));
    }
    output::print_entities(&solver);
    println!();
    println!("average: {}", output::format_value(solver.average()));
    Ok(())
}

fn cmd_solve(args: SolveArgs) -> anyhow::Result<()> {
    let mut solver = build_solver(&args.formula)?;
    apply_values(&mut solver, &args.values)?;

    let needed = solver
        .solve_for(&args.unknown, args.target)
        .with_context(|| format!("solve for '{}'", args.unknown))?;

    if args.formula.flags.json {
        return output::print_json(&output::SolveReport {
            entity: args.unknown,
            target: args.target,
            value: needed,
        });
    }
    println!(
        "{} needs {} for an average of {}",
        args.unknown,
        output::format_value(needed),
        output::format_value(args.target)
    );
    Ok(())
}

fn cmd_restore(args: RestoreArgs) -> anyhow::Result<()> {
    let file = File::open(&args.path)
        .with_context(|| format!("open record '{}'", args.path.display()))?;
    let record: FormulaRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| "parse record JSON")?;
    let solver = WeightSolver::from_record(&record, &args.flags.options())
        .with_context(|| format!("restore formula '{}'", record.formula))?;

    if args.flags.json {
        return output::print_json(&output::AverageReport::new(&solver));
    }
    println!("{}", solver.formula());
    println!();
    output::print_entities(&solver);
    println!();
    println!("average: {}", output::format_value(solver.average()));
    Ok(())
}
