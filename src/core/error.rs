use std::fmt;

use thiserror::Error;

/// Operator-facing input fields across all three calculators.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Field {
    Salary,
    PerformanceScore,
    PurchaseAmount,
    Membership,
    CreditScore,
    AnnualIncome,
    LoanAmount,
    MaturityYears,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Salary => "salary",
            Field::PerformanceScore => "performance score",
            Field::PurchaseAmount => "purchase amount",
            Field::Membership => "membership status",
            Field::CreditScore => "credit score",
            Field::AnnualIncome => "annual income",
            Field::LoanAmount => "loan amount",
            Field::MaturityYears => "maturity",
        }
    }

    /// camelCase key used by the HTTP surface.
    pub fn key(self) -> &'static str {
        match self {
            Field::Salary => "salary",
            Field::PerformanceScore => "performanceScore",
            Field::PurchaseAmount => "purchaseAmount",
            Field::Membership => "membership",
            Field::CreditScore => "creditScore",
            Field::AnnualIncome => "annualIncome",
            Field::LoanAmount => "loanAmount",
            Field::MaturityYears => "maturityYears",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The valid domain a numeric field was checked against.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Domain {
    NonNegative,
    Positive,
    AtLeastOne,
    Between(f64, f64),
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::NonNegative => f.write_str("cannot be negative"),
            Domain::Positive => f.write_str("must be greater than 0"),
            Domain::AtLeastOne => f.write_str("must be at least 1"),
            Domain::Between(lo, hi) => write!(f, "must be between {lo} and {hi}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be {expected}, got {raw:?}")]
    Parse {
        field: Field,
        expected: &'static str,
        raw: String,
    },

    #[error("{field} {domain}")]
    Range { field: Field, domain: Domain },

    #[error("{field} must be one of {accepted}, got {raw:?}")]
    Categorical {
        field: Field,
        accepted: &'static str,
        raw: String,
    },
}

impl InputError {
    pub fn field(&self) -> Field {
        match self {
            InputError::Parse { field, .. }
            | InputError::Range { field, .. }
            | InputError::Categorical { field, .. } => *field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("rule table has no tiers")]
    Empty,

    #[error("final bracket must be unbounded")]
    BoundedTopBracket,

    #[error("only the final bracket may be unbounded (bracket {index})")]
    UnboundedInnerBracket { index: usize },

    #[error("threshold at tier {index} is not strictly increasing")]
    NotIncreasing { index: usize },

    #[error("threshold at tier {index} is not finite")]
    NonFiniteThreshold { index: usize },

    #[error("rate {rate} at tier {index} is outside [0, 1]")]
    InvalidRate { index: usize, rate: f64 },

    #[error("tier {index} is stricter than the tier before it")]
    StricterLaterTier { index: usize },
}
