use std::io::{self, BufRead, Write};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::api::{Evaluation, evaluate_bonus, evaluate_discount, evaluate_loan, run_http_server};
use crate::core::{BonusInputs, DiscountInputs, InputError, LoanInputs, RuleBook};
use crate::session::{
    BonusProgram, DiscountProgram, LoanProgram, Program, Prompter, SessionError, run_session,
};

#[derive(Parser, Debug)]
#[command(
    name = "bizcalc",
    about = "Bonus/tax snapshot, customer discount and loan pricing calculators"
)]
pub struct Cli {
    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Employee bonus and annual tax snapshot
    Bonus(BonusArgs),
    /// Customer discount eligibility
    Discount(DiscountArgs),
    /// Loan risk classification and Treasury + spread pricing
    Loan(LoanArgs),
    /// Serve the calculators over HTTP
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Print the result as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

/// Fields left out are asked for interactively.
#[derive(Args, Debug)]
pub struct BonusArgs {
    #[arg(long, help = "Annual salary, e.g. 100,000")]
    pub salary: Option<String>,
    #[arg(long, help = "Performance score between 0 and 100")]
    pub score: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct DiscountArgs {
    #[arg(long, help = "Purchase amount, e.g. 120.00")]
    pub amount: Option<String>,
    #[arg(long, help = "Membership status: yes or no")]
    pub member: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct LoanArgs {
    #[arg(long, help = "Credit score between 0 and 850")]
    pub credit_score: Option<String>,
    #[arg(long, help = "Annual income, must be > 0")]
    pub income: Option<String>,
    #[arg(long, help = "Requested loan amount, must be > 0")]
    pub amount: Option<String>,
    #[arg(long, help = "Loan maturity in whole years")]
    pub maturity: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP server failed: {0}")]
    Server(#[source] io::Error),
}

/// Log filter for the `-v` count, used when `RUST_LOG` is unset.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Runs `command`. A calculator given every field on the command line
/// evaluates once; otherwise it prompts on `input` and writes to `out`.
/// `serve` runs until the server stops.
pub async fn run<R: BufRead, W: Write>(
    command: Command,
    rules: RuleBook,
    input: R,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Command::Bonus(args) => match (&args.salary, &args.score) {
            (Some(salary), Some(score)) => {
                let inputs = BonusInputs::parse(salary, score)?;
                emit(out, &evaluate_bonus(&rules, &inputs), &args.output)
            }
            _ => interactive(&BonusProgram { rules: &rules }, input, out),
        },
        Command::Discount(args) => match (&args.amount, &args.member) {
            (Some(amount), Some(member)) => {
                let inputs = DiscountInputs::parse(amount, member)?;
                emit(out, &evaluate_discount(&rules, &inputs), &args.output)
            }
            _ => interactive(&DiscountProgram { rules: &rules }, input, out),
        },
        Command::Loan(args) => {
            match (&args.credit_score, &args.income, &args.amount, &args.maturity) {
                (Some(credit_score), Some(income), Some(amount), Some(maturity)) => {
                    let inputs = LoanInputs::parse(credit_score, income, amount, maturity)?;
                    emit(out, &evaluate_loan(&rules, &inputs), &args.output)
                }
                _ => interactive(&LoanProgram { rules: &rules }, input, out),
            }
        }
        Command::Serve { port } => run_http_server(port, rules)
            .await
            .map_err(CliError::Server),
    }
}

fn interactive<P: Program, R: BufRead, W: Write>(
    program: &P,
    input: R,
    out: &mut W,
) -> Result<(), CliError> {
    let mut prompter = Prompter::new(input, out);
    let completed = run_session(program, &mut prompter)?;
    debug!(program = program.name(), completed, "interactive session closed");
    Ok(())
}

fn emit<W: Write, T: Serialize>(
    out: &mut W,
    evaluation: &Evaluation<T>,
    output: &OutputArgs,
) -> Result<(), CliError> {
    if output.json {
        serde_json::to_writer_pretty(&mut *out, evaluation)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", evaluation.report)?;
    }
    Ok(())
}
