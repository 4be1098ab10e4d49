use serde::Serialize;

use super::error::{Domain, Field, InputError};

pub const MAX_PERFORMANCE_SCORE: f64 = 100.0;
pub const MAX_CREDIT_SCORE: u32 = 850;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Membership {
    Member,
    NonMember,
}

impl Membership {
    pub fn is_member(self) -> bool {
        self == Membership::Member
    }

    pub fn label(self) -> &'static str {
        match self {
            Membership::Member => "Member",
            Membership::NonMember => "Non-Member",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskCategory {
    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusInputs {
    pub salary: f64,
    pub performance_score: f64,
}

impl BonusInputs {
    pub fn new(salary: f64, performance_score: f64) -> Result<Self, InputError> {
        let salary = finite(Field::Salary, salary)?;
        let performance_score = finite(Field::PerformanceScore, performance_score)?;
        if salary < 0.0 {
            return Err(out_of_range(Field::Salary, Domain::NonNegative));
        }
        if !(0.0..=MAX_PERFORMANCE_SCORE).contains(&performance_score) {
            return Err(out_of_range(
                Field::PerformanceScore,
                Domain::Between(0.0, MAX_PERFORMANCE_SCORE),
            ));
        }
        Ok(Self {
            salary,
            performance_score,
        })
    }

    pub fn parse(salary: &str, performance_score: &str) -> Result<Self, InputError> {
        let salary = parse_money(Field::Salary, salary)?;
        let performance_score = parse_decimal(Field::PerformanceScore, performance_score)?;
        Self::new(salary, performance_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountInputs {
    pub purchase_amount: f64,
    pub membership: Membership,
}

impl DiscountInputs {
    pub fn new(purchase_amount: f64, membership: Membership) -> Result<Self, InputError> {
        let purchase_amount = finite(Field::PurchaseAmount, purchase_amount)?;
        if purchase_amount < 0.0 {
            return Err(out_of_range(Field::PurchaseAmount, Domain::NonNegative));
        }
        Ok(Self {
            purchase_amount,
            membership,
        })
    }

    pub fn parse(purchase_amount: &str, membership: &str) -> Result<Self, InputError> {
        let purchase_amount = parse_money(Field::PurchaseAmount, purchase_amount)?;
        let membership = parse_membership(membership)?;
        Self::new(purchase_amount, membership)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanInputs {
    pub credit_score: u32,
    pub annual_income: f64,
    pub loan_amount: f64,
    pub maturity_years: u64,
}

impl LoanInputs {
    pub fn new(
        credit_score: i64,
        annual_income: f64,
        loan_amount: f64,
        maturity_years: i64,
    ) -> Result<Self, InputError> {
        let annual_income = finite(Field::AnnualIncome, annual_income)?;
        let loan_amount = finite(Field::LoanAmount, loan_amount)?;

        let credit_score = u32::try_from(credit_score)
            .ok()
            .filter(|score| *score <= MAX_CREDIT_SCORE)
            .ok_or_else(|| {
                out_of_range(
                    Field::CreditScore,
                    Domain::Between(0.0, f64::from(MAX_CREDIT_SCORE)),
                )
            })?;
        if annual_income <= 0.0 {
            return Err(out_of_range(Field::AnnualIncome, Domain::Positive));
        }
        if loan_amount <= 0.0 {
            return Err(out_of_range(Field::LoanAmount, Domain::Positive));
        }
        let maturity_years = u64::try_from(maturity_years)
            .ok()
            .filter(|years| *years >= 1)
            .ok_or_else(|| out_of_range(Field::MaturityYears, Domain::AtLeastOne))?;

        Ok(Self {
            credit_score,
            annual_income,
            loan_amount,
            maturity_years,
        })
    }

    pub fn parse(
        credit_score: &str,
        annual_income: &str,
        loan_amount: &str,
        maturity_years: &str,
    ) -> Result<Self, InputError> {
        let credit_score = parse_integer(Field::CreditScore, credit_score)?;
        let annual_income = parse_money(Field::AnnualIncome, annual_income)?;
        let loan_amount = parse_money(Field::LoanAmount, loan_amount)?;
        let maturity_years = parse_integer(Field::MaturityYears, maturity_years)?;
        Self::new(credit_score, annual_income, loan_amount, maturity_years)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusSnapshot {
    pub base_salary: f64,
    pub performance_score: f64,
    pub bonus_rate: f64,
    pub bonus_amount: f64,
    pub gross_total: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub federal_income_tax: f64,
    pub social_security_tax: f64,
    pub medicare_tax: f64,
    pub additional_medicare_tax: f64,
    pub fica_total: f64,
    pub total_taxes: f64,
    pub take_home: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub purchase_amount: f64,
    pub membership: Membership,
    pub discount_rate: f64,
    pub discount_amount: f64,
    pub final_price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPricing {
    pub credit_score: u32,
    pub annual_income: f64,
    pub loan_amount: f64,
    pub maturity_years: u64,
    pub loan_to_income: f64,
    pub risk_category: RiskCategory,
    pub treasury_maturity_years: u32,
    pub treasury_rate: f64,
    pub base_spread_bps: u32,
    pub lti_add_on_bps: u32,
    pub spread_bps: u32,
    pub expected_yield: f64,
}

/// Parses a currency amount typed by an operator: surrounding whitespace and
/// `,` group separators are ignored.
pub fn parse_money(field: Field, raw: &str) -> Result<f64, InputError> {
    let cleaned = raw.replace(',', "");
    parse_decimal(field, &cleaned)
}

pub fn parse_decimal(field: Field, raw: &str) -> Result<f64, InputError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::Parse {
            field,
            expected: "a number",
            raw: raw.trim().to_string(),
        })
}

pub fn parse_integer(field: Field, raw: &str) -> Result<i64, InputError> {
    raw.trim().parse::<i64>().map_err(|_| InputError::Parse {
        field,
        expected: "a whole number",
        raw: raw.trim().to_string(),
    })
}

pub fn parse_membership(raw: &str) -> Result<Membership, InputError> {
    match raw.trim().to_lowercase().as_str() {
        "yes" => Ok(Membership::Member),
        "no" => Ok(Membership::NonMember),
        other => Err(InputError::Categorical {
            field: Field::Membership,
            accepted: "'yes' or 'no'",
            raw: other.to_string(),
        }),
    }
}

fn finite(field: Field, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::Parse {
            field,
            expected: "a finite number",
            raw: value.to_string(),
        })
    }
}

fn out_of_range(field: Field, domain: Domain) -> InputError {
    InputError::Range { field, domain }
}
