//! Fixed-width text reports for the three calculators.

use std::fmt::Display;

use crate::core::{BonusSnapshot, LoanPricing, OrderSummary};

/// Formats an amount as `$1,234.56`.
pub fn money(amount: f64) -> String {
    let digits = format!("{:.2}", amount.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && digits != "0.00" { "-" } else { "" };
    format!("${sign}{grouped}.{cents}")
}

/// Formats a decimal rate as a percentage with `decimals` places, e.g. `4.25%`.
pub fn percent(rate: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}

struct Layout {
    width: usize,
    label_width: usize,
}

impl Layout {
    fn value_width(&self) -> usize {
        self.width - self.label_width
    }
}

struct ReportBuilder {
    layout: Layout,
    lines: Vec<String>,
}

impl ReportBuilder {
    fn new(width: usize, label_width: usize, title: &str) -> Self {
        let mut builder = Self {
            layout: Layout { width, label_width },
            lines: Vec::new(),
        };
        builder.rule('=');
        builder.lines.push(title.to_string());
        builder.rule('=');
        builder
    }

    fn rule(&mut self, ch: char) -> &mut Self {
        self.lines.push(ch.to_string().repeat(self.layout.width));
        self
    }

    fn row(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.lines.push(format!(
            "{label:<lw$}{value:>vw$}",
            lw = self.layout.label_width,
            vw = self.layout.value_width(),
        ));
        self
    }

    /// Whole-number percentage with the `%` sign hanging past the value column.
    fn whole_percent_row(&mut self, label: &str, rate: f64) -> &mut Self {
        self.lines.push(format!(
            "{label:<lw$}{pct:>vw$.0}%",
            pct = rate * 100.0,
            lw = self.layout.label_width,
            vw = self.layout.value_width() - 1,
        ));
        self
    }

    fn finish(&mut self) -> String {
        self.rule('=');
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

pub fn render_bonus_snapshot(snapshot: &BonusSnapshot, tax_year: u16) -> String {
    ReportBuilder::new(44, 25, "ANNUAL FINANCIAL SNAPSHOT (EST.)")
        .row("Base Salary:", money(snapshot.base_salary))
        .row(
            "Performance Score:",
            format!("{:.1}", snapshot.performance_score),
        )
        .whole_percent_row("Bonus Rate:", snapshot.bonus_rate)
        .row("Bonus Amount:", money(snapshot.bonus_amount))
        .rule('-')
        .row("Gross Total Pay:", money(snapshot.gross_total))
        .row(
            &format!("Std Deduction ({tax_year}):"),
            money(snapshot.standard_deduction),
        )
        .row("Est. Federal Income Tax:", money(snapshot.federal_income_tax))
        .row("Est. FICA (SS+Medicare):", money(snapshot.fica_total))
        .rule('-')
        .row("Est. Total Taxes:", money(snapshot.total_taxes))
        .row("Est. Take-Home Pay:", money(snapshot.take_home))
        .finish()
}

pub fn render_order_summary(summary: &OrderSummary) -> String {
    ReportBuilder::new(40, 22, "ORDER SUMMARY")
        .row("Purchase Amount:", money(summary.purchase_amount))
        .row("Membership Status:", summary.membership.label())
        .whole_percent_row("Discount Applied:", summary.discount_rate)
        .row("Discount Amount:", money(summary.discount_amount))
        .rule('-')
        .row("Final Price:", money(summary.final_price))
        .finish()
}

pub fn render_loan_pricing(pricing: &LoanPricing) -> String {
    ReportBuilder::new(56, 28, "LOAN PRICING SNAPSHOT (Treasury + Spread)")
        .row("Credit Score:", pricing.credit_score)
        .row("Annual Income:", money(pricing.annual_income))
        .row("Requested Loan Amount:", money(pricing.loan_amount))
        .row("Loan Maturity (Years):", pricing.maturity_years)
        .row("Loan-to-Income (LTI):", percent(pricing.loan_to_income, 2))
        .rule('-')
        .row("Risk Category:", pricing.risk_category.label())
        .row(
            "Closest Treasury Maturity:",
            format!("{}Y", pricing.treasury_maturity_years),
        )
        .row("Treasury Rate:", percent(pricing.treasury_rate, 2))
        .row("Spread (bps):", pricing.spread_bps)
        .rule('-')
        .row("Expected Yield:", percent(pricing.expected_yield, 2))
        .finish()
}
