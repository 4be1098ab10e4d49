//! Interactive read-evaluate-report loop shared by the three calculators.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{info, warn};

use crate::core::{
    BonusInputs, BonusSnapshot, DiscountInputs, Field, InputError, LoanInputs, LoanPricing,
    OrderSummary, RuleBook, parse_decimal, parse_integer, parse_membership, parse_money,
    run_bonus_snapshot, run_loan_pricing, run_order_summary,
};
use crate::report::{render_bonus_snapshot, render_loan_pricing, render_order_summary};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("input stream closed")]
    Closed,

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes `prompt` and returns the trimmed reply.
    pub fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::Closed);
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, text: &str) -> Result<(), SessionError> {
        write!(self.output, "{text}")?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// One calculator: how to collect its inputs, evaluate them and render the result.
pub trait Program {
    type Inputs;
    type Outcome;

    fn name(&self) -> &'static str;

    fn collect<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<Self::Inputs, SessionError>;

    fn evaluate(&self, inputs: &Self::Inputs) -> Self::Outcome;

    fn render(&self, outcome: &Self::Outcome) -> String;

    fn again_prompt(&self) -> &'static str;
}

/// Runs `program` until the operator answers anything but `y` or input ends.
/// Invalid input abandons the current iteration and restarts collection.
/// Returns the number of reports produced.
pub fn run_session<P, R, W>(program: &P, prompter: &mut Prompter<R, W>) -> Result<u32, SessionError>
where
    P: Program,
    R: BufRead,
    W: Write,
{
    info!(program = program.name(), "session started");
    let mut completed = 0;

    loop {
        let inputs = match program.collect(prompter) {
            Ok(inputs) => inputs,
            Err(SessionError::Input(err)) => {
                warn!(program = program.name(), field = err.field().key(), %err, "input rejected");
                prompter.say(&format!("Invalid input: {err}.\n\n"))?;
                continue;
            }
            Err(SessionError::Closed) => break,
            Err(err) => return Err(err),
        };

        let outcome = program.evaluate(&inputs);
        prompter.say(&format!("\n{}\n", program.render(&outcome)))?;
        completed += 1;

        let again = match prompter.ask(program.again_prompt()) {
            Ok(answer) => answer,
            Err(SessionError::Closed) => break,
            Err(err) => return Err(err),
        };
        if again.to_lowercase() != "y" {
            break;
        }
    }

    info!(program = program.name(), completed, "session finished");
    Ok(completed)
}

pub struct BonusProgram<'a> {
    pub rules: &'a RuleBook,
}

impl Program for BonusProgram<'_> {
    type Inputs = BonusInputs;
    type Outcome = BonusSnapshot;

    fn name(&self) -> &'static str {
        "bonus"
    }

    fn collect<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<BonusInputs, SessionError> {
        let salary = parse_money(Field::Salary, &prompter.ask("Enter annual salary: $")?)?;
        let score = parse_decimal(
            Field::PerformanceScore,
            &prompter.ask("Enter performance score (0-100): ")?,
        )?;
        Ok(BonusInputs::new(salary, score)?)
    }

    fn evaluate(&self, inputs: &BonusInputs) -> BonusSnapshot {
        run_bonus_snapshot(self.rules, inputs)
    }

    fn render(&self, outcome: &BonusSnapshot) -> String {
        render_bonus_snapshot(outcome, self.rules.tax_year)
    }

    fn again_prompt(&self) -> &'static str {
        "Calculate another employee? (y/n): "
    }
}

pub struct DiscountProgram<'a> {
    pub rules: &'a RuleBook,
}

impl Program for DiscountProgram<'_> {
    type Inputs = DiscountInputs;
    type Outcome = OrderSummary;

    fn name(&self) -> &'static str {
        "discount"
    }

    fn collect<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<DiscountInputs, SessionError> {
        let amount = parse_money(
            Field::PurchaseAmount,
            &prompter.ask("Enter purchase amount: $")?,
        )?;
        let membership = parse_membership(&prompter.ask("Are you a member? (yes/no): ")?)?;
        Ok(DiscountInputs::new(amount, membership)?)
    }

    fn evaluate(&self, inputs: &DiscountInputs) -> OrderSummary {
        run_order_summary(self.rules, inputs)
    }

    fn render(&self, outcome: &OrderSummary) -> String {
        render_order_summary(outcome)
    }

    fn again_prompt(&self) -> &'static str {
        "Process another customer? (y/n): "
    }
}

pub struct LoanProgram<'a> {
    pub rules: &'a RuleBook,
}

impl Program for LoanProgram<'_> {
    type Inputs = LoanInputs;
    type Outcome = LoanPricing;

    fn name(&self) -> &'static str {
        "loan"
    }

    fn collect<R: BufRead, W: Write>(
        &self,
        prompter: &mut Prompter<R, W>,
    ) -> Result<LoanInputs, SessionError> {
        let credit_score = parse_integer(
            Field::CreditScore,
            &prompter.ask("Enter credit score (0-850): ")?,
        )?;
        let income = parse_money(Field::AnnualIncome, &prompter.ask("Enter annual income: $")?)?;
        let amount = parse_money(
            Field::LoanAmount,
            &prompter.ask("Enter requested loan amount: $")?,
        )?;
        let maturity = parse_integer(
            Field::MaturityYears,
            &prompter.ask("Enter loan maturity (years, ex: 1,2,3,5,7,10,20,30): ")?,
        )?;
        Ok(LoanInputs::new(credit_score, income, amount, maturity)?)
    }

    fn evaluate(&self, inputs: &LoanInputs) -> LoanPricing {
        run_loan_pricing(self.rules, inputs)
    }

    fn render(&self, outcome: &LoanPricing) -> String {
        render_loan_pricing(outcome)
    }

    fn again_prompt(&self) -> &'static str {
        "Price another loan? (y/n): "
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn rules() -> RuleBook {
        RuleBook::tax_year_2026().expect("built-in tables are valid")
    }

    fn drive<P: Program>(program: &P, script: &str) -> (u32, String) {
        let mut prompter = Prompter::new(Cursor::new(script.to_string()), Vec::new());
        let completed = run_session(program, &mut prompter).expect("session should not fail");
        let output = String::from_utf8(prompter.into_output()).expect("utf8 output");
        (completed, output)
    }

    #[test]
    fn bonus_session_reports_and_exits_on_no() {
        let rules = rules();
        let (completed, output) = drive(&BonusProgram { rules: &rules }, "100,000\n92\nn\n");
        assert_eq!(completed, 1);
        assert!(output.contains("ANNUAL FINANCIAL SNAPSHOT (EST.)"));
        assert!(output.contains("$93,250.00"));
        assert!(output.contains("Std Deduction (2026):"));
    }

    #[test]
    fn bonus_session_reprompts_after_invalid_salary() {
        let rules = rules();
        let (completed, output) = drive(
            &BonusProgram { rules: &rules },
            "abc\n50000\n150\n50000\n75\nn\n",
        );
        assert_eq!(completed, 1);
        assert!(output.contains("Invalid input: salary must be a number"));
        assert!(output.contains("Invalid input: performance score must be between 0 and 100"));
        assert_eq!(output.matches("ANNUAL FINANCIAL SNAPSHOT").count(), 1);
    }

    #[test]
    fn bonus_session_stops_asking_after_malformed_salary() {
        let rules = rules();
        let (completed, output) = drive(&BonusProgram { rules: &rules }, "abc\n");
        assert_eq!(completed, 0);
        assert_eq!(
            output,
            "Enter annual salary: $Invalid input: salary must be a number, got \"abc\".\n\n\
             Enter annual salary: $"
        );
    }

    #[test]
    fn loan_session_drops_iteration_at_first_malformed_field() {
        let rules = rules();
        let (completed, output) = drive(
            &LoanProgram { rules: &rules },
            "760\nlots\n760\n80000\n20000\n10\nn\n",
        );
        assert_eq!(completed, 1);
        assert!(output.contains("annual income must be a number"));
        assert_eq!(output.matches("Enter requested loan amount").count(), 1);
        assert!(output.contains("6.46%"));
    }

    #[test]
    fn discount_session_loops_while_operator_answers_y() {
        let rules = rules();
        let (completed, output) = drive(
            &DiscountProgram { rules: &rules },
            "120\nyes\nY\n120\nno\nq\n",
        );
        assert_eq!(completed, 2);
        assert!(output.contains("$102.00"));
        assert!(output.contains("Non-Member"));
    }

    #[test]
    fn discount_session_rejects_unknown_membership() {
        let rules = rules();
        let (completed, output) = drive(&DiscountProgram { rules: &rules }, "120\nmaybe\n");
        assert_eq!(completed, 0);
        assert!(output.contains("membership status must be one of 'yes' or 'no'"));
        assert!(!output.contains("ORDER SUMMARY"));
    }

    #[test]
    fn loan_session_rejects_credit_score_above_range() {
        let rules = rules();
        let (completed, output) = drive(
            &LoanProgram { rules: &rules },
            "900\n80000\n20000\n10\n760\n80000\n20000\n10\nn\n",
        );
        assert_eq!(completed, 1);
        assert!(output.contains("credit score must be between 0 and 850"));
        assert!(output.contains("6.46%"));
    }

    #[test]
    fn session_ends_quietly_when_input_closes() {
        let rules = rules();
        let (completed, output) = drive(&LoanProgram { rules: &rules }, "760\n");
        assert_eq!(completed, 0);
        assert!(output.starts_with("Enter credit score (0-850): "));
    }
}
