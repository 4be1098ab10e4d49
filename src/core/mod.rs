mod engine;
mod error;
mod rules;
mod tables;
mod types;

pub use engine::{
    bonus_rate, discount_rate, run_bonus_snapshot, run_loan_pricing, run_order_summary, spread_bps,
};
pub use error::{Domain, Field, InputError, TableError};
pub use rules::{DiscountSchedule, FicaBreakdown, IncomeTaxSchedule, PayrollLevies, RuleBook};
pub use tables::{
    Bracket, BracketSchedule, CappedLevy, JointTier, JointTierTable, NearestKeyTable, Surtax,
    TierPolicy, TierTable,
};
pub use types::{
    BonusInputs, BonusSnapshot, DiscountInputs, LoanInputs, LoanPricing, MAX_CREDIT_SCORE,
    MAX_PERFORMANCE_SCORE, Membership, OrderSummary, RiskCategory, parse_decimal, parse_integer,
    parse_membership, parse_money,
};
