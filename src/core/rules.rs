use super::error::TableError;
use super::tables::{
    Bracket, BracketSchedule, CappedLevy, JointTier, JointTierTable, NearestKeyTable, Surtax,
    TierPolicy, TierTable,
};
use super::types::RiskCategory;

/// Federal income tax for one filing status: standard deduction first, then
/// the progressive schedule on what is left.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeTaxSchedule {
    pub standard_deduction: f64,
    pub brackets: BracketSchedule,
}

impl IncomeTaxSchedule {
    pub fn taxable_income(&self, gross: f64) -> f64 {
        (gross - self.standard_deduction).max(0.0)
    }

    pub fn tax(&self, gross: f64) -> f64 {
        self.brackets.tax(self.taxable_income(gross))
    }
}

/// Employee share of FICA: capped Social Security, flat Medicare and the
/// Additional Medicare surtax, summed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollLevies {
    pub social_security: CappedLevy,
    pub medicare_rate: f64,
    pub additional_medicare: Surtax,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FicaBreakdown {
    pub social_security: f64,
    pub medicare: f64,
    pub additional_medicare: f64,
}

impl FicaBreakdown {
    pub fn total(self) -> f64 {
        self.social_security + self.medicare + self.additional_medicare
    }
}

impl PayrollLevies {
    pub fn charge(&self, gross_wages: f64) -> FicaBreakdown {
        let wages = gross_wages.max(0.0);
        FicaBreakdown {
            social_security: self.social_security.charge(wages),
            medicare: wages * self.medicare_rate,
            additional_medicare: self.additional_medicare.charge(wages),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountSchedule {
    pub member: TierTable<f64>,
    pub non_member: TierTable<f64>,
}

/// Every table the three calculators consult, validated once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBook {
    pub tax_year: u16,
    pub income_tax: IncomeTaxSchedule,
    pub payroll: PayrollLevies,
    pub bonus_rates: TierTable<f64>,
    pub discounts: DiscountSchedule,
    pub treasury_curve: NearestKeyTable,
    pub credit_spread_bps: TierTable<u32>,
    pub lti_add_on_bps: TierTable<u32>,
    pub risk: JointTierTable<RiskCategory>,
}

impl RuleBook {
    /// 2026 single-filer tax figures, the Treasury curve as of 2026-02-10 and
    /// the house bonus, discount and lending tables.
    pub fn tax_year_2026() -> Result<Self, TableError> {
        let income_tax = IncomeTaxSchedule {
            standard_deduction: 16_100.0,
            brackets: BracketSchedule::new(vec![
                Bracket::up_to(12_400.0, 0.10),
                Bracket::up_to(50_400.0, 0.12),
                Bracket::up_to(105_700.0, 0.22),
                Bracket::up_to(201_775.0, 0.24),
                Bracket::up_to(256_225.0, 0.32),
                Bracket::up_to(640_600.0, 0.35),
                Bracket::above(0.37),
            ])?,
        };

        let payroll = PayrollLevies {
            social_security: CappedLevy {
                rate: 0.062,
                cap: 184_500.0,
            },
            medicare_rate: 0.0145,
            additional_medicare: Surtax {
                rate: 0.009,
                threshold: 200_000.0,
            },
        };

        let bonus_rates = TierTable::rates(
            TierPolicy::Floor,
            vec![(70.0, 0.05), (80.0, 0.10), (90.0, 0.20)],
            0.0,
        )?;

        let discounts = DiscountSchedule {
            member: TierTable::rates(TierPolicy::Floor, vec![(100.0, 0.15)], 0.05)?,
            non_member: TierTable::rates(TierPolicy::Floor, vec![(150.0, 0.10)], 0.0)?,
        };

        let treasury_curve = NearestKeyTable::new(vec![
            (1, 0.0342),
            (2, 0.0348),
            (3, 0.0355),
            (5, 0.0375),
            (7, 0.0397),
            (10, 0.0421),
            (20, 0.0479),
            (30, 0.0485),
        ])?;

        let credit_spread_bps = TierTable::floor(
            vec![(620.0, 375), (680.0, 275), (740.0, 175), (800.0, 100)],
            500,
        )?;

        let lti_add_on_bps = TierTable::ceiling(vec![(0.20, 0), (0.35, 50), (0.50, 125)], 250)?;

        let risk = JointTierTable::new(
            vec![
                JointTier {
                    min_first: 720.0,
                    min_second: 60_000.0,
                    value: RiskCategory::Low,
                },
                JointTier {
                    min_first: 650.0,
                    min_second: 40_000.0,
                    value: RiskCategory::Medium,
                },
            ],
            RiskCategory::High,
        )?;

        Ok(Self {
            tax_year: 2026,
            income_tax,
            payroll,
            bonus_rates,
            discounts,
            treasury_curve,
            credit_spread_bps,
            lti_add_on_bps,
            risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn rules() -> RuleBook {
        RuleBook::tax_year_2026().expect("built-in tables are valid")
    }

    #[test]
    fn federal_tax_on_zero_gross_is_zero() {
        let rules = rules();
        assert_approx(rules.income_tax.tax(0.0), 0.0);
        assert_approx(rules.income_tax.tax(16_100.0), 0.0);
    }

    #[test]
    fn federal_tax_sums_per_bracket_marginal_amounts() {
        let rules = rules();
        let expected = 12_400.0 * 0.10 + 38_000.0 * 0.12 + 53_500.0 * 0.22;
        assert_approx(rules.income_tax.taxable_income(120_000.0), 103_900.0);
        assert_approx(rules.income_tax.tax(120_000.0), expected);
    }

    #[test]
    fn federal_tax_reaches_top_bracket() {
        let rules = rules();
        let gross = 1_000_000.0 + 16_100.0;
        let expected = 12_400.0 * 0.10
            + 38_000.0 * 0.12
            + 55_300.0 * 0.22
            + 96_075.0 * 0.24
            + 54_450.0 * 0.32
            + 384_375.0 * 0.35
            + 359_400.0 * 0.37;
        assert_approx(rules.income_tax.tax(gross), expected);
    }

    #[test]
    fn fica_caps_social_security_and_adds_surtax() {
        let rules = rules();
        let fica = rules.payroll.charge(250_000.0);
        assert_approx(fica.social_security, 184_500.0 * 0.062);
        assert_approx(fica.medicare, 250_000.0 * 0.0145);
        assert_approx(fica.additional_medicare, 50_000.0 * 0.009);
    }

    #[test]
    fn fica_on_zero_wages_is_zero() {
        assert_approx(rules().payroll.charge(0.0).total(), 0.0);
    }

    #[test]
    fn treasury_curve_matches_exact_and_tied_maturities() {
        let rules = rules();
        assert_eq!(rules.treasury_curve.resolve(10), (10, 0.0421));
        assert_eq!(rules.treasury_curve.resolve(4), (3, 0.0355));
        assert_eq!(rules.treasury_curve.resolve(15), (10, 0.0421));
        assert_eq!(rules.treasury_curve.resolve(25), (20, 0.0479));
        assert_eq!(rules.treasury_curve.resolve(100), (30, 0.0485));
    }

    #[test]
    fn credit_spread_tiers() {
        let rules = rules();
        assert_eq!(rules.credit_spread_bps.lookup(850.0), 100);
        assert_eq!(rules.credit_spread_bps.lookup(800.0), 100);
        assert_eq!(rules.credit_spread_bps.lookup(760.0), 175);
        assert_eq!(rules.credit_spread_bps.lookup(700.0), 275);
        assert_eq!(rules.credit_spread_bps.lookup(620.0), 375);
        assert_eq!(rules.credit_spread_bps.lookup(619.0), 500);
        assert_eq!(rules.credit_spread_bps.lookup(0.0), 500);
    }

    #[test]
    fn lti_add_on_tiers() {
        let rules = rules();
        assert_eq!(rules.lti_add_on_bps.lookup(0.10), 0);
        assert_eq!(rules.lti_add_on_bps.lookup(0.25), 50);
        assert_eq!(rules.lti_add_on_bps.lookup(0.40), 125);
        assert_eq!(rules.lti_add_on_bps.lookup(0.51), 250);
    }

    #[test]
    fn risk_categories() {
        let rules = rules();
        assert_eq!(rules.risk.lookup(760.0, 80_000.0), RiskCategory::Low);
        assert_eq!(rules.risk.lookup(700.0, 80_000.0), RiskCategory::Medium);
        assert_eq!(rules.risk.lookup(760.0, 45_000.0), RiskCategory::Medium);
        assert_eq!(rules.risk.lookup(640.0, 200_000.0), RiskCategory::High);
        assert_eq!(rules.risk.lookup(800.0, 39_999.0), RiskCategory::High);
    }
}
