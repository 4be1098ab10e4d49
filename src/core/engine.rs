use tracing::debug;

use super::rules::RuleBook;
use super::types::{
    BonusInputs, BonusSnapshot, DiscountInputs, LoanInputs, LoanPricing, Membership, OrderSummary,
};

const BPS_PER_UNIT: f64 = 10_000.0;

pub fn bonus_rate(rules: &RuleBook, performance_score: f64) -> f64 {
    rules.bonus_rates.lookup(performance_score)
}

pub fn discount_rate(rules: &RuleBook, purchase_amount: f64, membership: Membership) -> f64 {
    match membership {
        Membership::Member => rules.discounts.member.lookup(purchase_amount),
        Membership::NonMember => rules.discounts.non_member.lookup(purchase_amount),
    }
}

/// Base spread from the credit score plus the loan-to-income add-on, in bps.
pub fn spread_bps(rules: &RuleBook, credit_score: u32, loan_to_income: f64) -> (u32, u32) {
    let base = rules.credit_spread_bps.lookup(f64::from(credit_score));
    let add_on = rules.lti_add_on_bps.lookup(loan_to_income);
    (base, add_on)
}

pub fn run_bonus_snapshot(rules: &RuleBook, inputs: &BonusInputs) -> BonusSnapshot {
    let rate = bonus_rate(rules, inputs.performance_score);
    let bonus_amount = inputs.salary * rate;
    let gross_total = inputs.salary + bonus_amount;

    let taxable_income = rules.income_tax.taxable_income(gross_total);
    let federal_income_tax = rules.income_tax.brackets.tax(taxable_income);
    let fica = rules.payroll.charge(gross_total);
    let fica_total = fica.total();
    let total_taxes = federal_income_tax + fica_total;

    debug!(
        salary = inputs.salary,
        score = inputs.performance_score,
        bonus_rate = rate,
        gross_total,
        federal_income_tax,
        fica_total,
        "bonus snapshot evaluated"
    );

    BonusSnapshot {
        base_salary: inputs.salary,
        performance_score: inputs.performance_score,
        bonus_rate: rate,
        bonus_amount,
        gross_total,
        standard_deduction: rules.income_tax.standard_deduction,
        taxable_income,
        federal_income_tax,
        social_security_tax: fica.social_security,
        medicare_tax: fica.medicare,
        additional_medicare_tax: fica.additional_medicare,
        fica_total,
        total_taxes,
        take_home: gross_total - total_taxes,
    }
}

pub fn run_order_summary(rules: &RuleBook, inputs: &DiscountInputs) -> OrderSummary {
    let rate = discount_rate(rules, inputs.purchase_amount, inputs.membership);
    let discount_amount = inputs.purchase_amount * rate;

    debug!(
        purchase_amount = inputs.purchase_amount,
        member = inputs.membership.is_member(),
        discount_rate = rate,
        "order summary evaluated"
    );

    OrderSummary {
        purchase_amount: inputs.purchase_amount,
        membership: inputs.membership,
        discount_rate: rate,
        discount_amount,
        final_price: inputs.purchase_amount - discount_amount,
    }
}

pub fn run_loan_pricing(rules: &RuleBook, inputs: &LoanInputs) -> LoanPricing {
    let loan_to_income = inputs.loan_amount / inputs.annual_income;
    let risk_category = rules
        .risk
        .lookup(f64::from(inputs.credit_score), inputs.annual_income);
    // Past u32::MAX the longest curve point is always nearest.
    let maturity_key = u32::try_from(inputs.maturity_years).unwrap_or(u32::MAX);
    let (treasury_maturity_years, treasury_rate) = rules.treasury_curve.resolve(maturity_key);
    let (base_spread_bps, lti_add_on_bps) = spread_bps(rules, inputs.credit_score, loan_to_income);
    let spread_bps = base_spread_bps + lti_add_on_bps;
    let expected_yield = treasury_rate + f64::from(spread_bps) / BPS_PER_UNIT;

    debug!(
        credit_score = inputs.credit_score,
        loan_to_income,
        risk = risk_category.label(),
        treasury_maturity_years,
        spread_bps,
        expected_yield,
        "loan pricing evaluated"
    );

    LoanPricing {
        credit_score: inputs.credit_score,
        annual_income: inputs.annual_income,
        loan_amount: inputs.loan_amount,
        maturity_years: inputs.maturity_years,
        loan_to_income,
        risk_category,
        treasury_maturity_years,
        treasury_rate,
        base_spread_bps,
        lti_add_on_bps,
        spread_bps,
        expected_yield,
    }
}
