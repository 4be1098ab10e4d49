use super::error::TableError;

/// One marginal bracket. `upper == None` marks the unbounded top bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub upper: Option<f64>,
    pub rate: f64,
}

impl Bracket {
    pub const fn up_to(upper: f64, rate: f64) -> Self {
        Self {
            upper: Some(upper),
            rate,
        }
    }

    pub const fn above(rate: f64) -> Self {
        Self { upper: None, rate }
    }
}

/// Progressive schedule: each bracket taxes only the slice of the amount
/// between the previous upper bound and its own.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, TableError> {
        let Some((last, bounded)) = brackets.split_last() else {
            return Err(TableError::Empty);
        };
        if last.upper.is_some() {
            return Err(TableError::BoundedTopBracket);
        }

        let mut previous = 0.0;
        for (index, bracket) in bounded.iter().enumerate() {
            let Some(upper) = bracket.upper else {
                return Err(TableError::UnboundedInnerBracket { index });
            };
            check_threshold(index, upper)?;
            if upper <= previous {
                return Err(TableError::NotIncreasing { index });
            }
            previous = upper;
        }
        for (index, bracket) in brackets.iter().enumerate() {
            check_rate(index, bracket.rate)?;
        }

        Ok(Self { brackets })
    }

    pub fn tax(&self, amount: f64) -> f64 {
        let amount = amount.max(0.0);
        let mut tax = 0.0;
        let mut lower = 0.0;

        for bracket in &self.brackets {
            if amount <= lower {
                break;
            }
            let upper = bracket.upper.unwrap_or(f64::INFINITY);
            tax += (amount.min(upper) - lower) * bracket.rate;
            lower = upper;
        }

        tax
    }
}

/// How a [`TierTable`] matches an input against its thresholds.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TierPolicy {
    /// Highest threshold `<=` input wins; inputs below every threshold get the fallback.
    Floor,
    /// Lowest threshold `>=` input wins; inputs above every threshold get the fallback.
    Ceiling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierTable<T> {
    policy: TierPolicy,
    tiers: Vec<(f64, T)>,
    fallback: T,
}

impl<T: Copy> TierTable<T> {
    /// `tiers` must be listed with strictly increasing thresholds.
    pub fn new(
        policy: TierPolicy,
        tiers: Vec<(f64, T)>,
        fallback: T,
    ) -> Result<Self, TableError> {
        if tiers.is_empty() {
            return Err(TableError::Empty);
        }
        for (index, (threshold, _)) in tiers.iter().enumerate() {
            check_threshold(index, *threshold)?;
        }
        if let Some(index) = tiers.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(TableError::NotIncreasing { index: index + 1 });
        }
        Ok(Self {
            policy,
            tiers,
            fallback,
        })
    }

    pub fn floor(tiers: Vec<(f64, T)>, below_all: T) -> Result<Self, TableError> {
        Self::new(TierPolicy::Floor, tiers, below_all)
    }

    pub fn ceiling(tiers: Vec<(f64, T)>, above_all: T) -> Result<Self, TableError> {
        Self::new(TierPolicy::Ceiling, tiers, above_all)
    }

    pub fn lookup(&self, input: f64) -> T {
        let found = match self.policy {
            TierPolicy::Floor => self
                .tiers
                .iter()
                .rev()
                .find(|(threshold, _)| input >= *threshold),
            TierPolicy::Ceiling => self.tiers.iter().find(|(threshold, _)| input <= *threshold),
        };
        found.map(|(_, value)| *value).unwrap_or(self.fallback)
    }
}

impl TierTable<f64> {
    /// Same as [`TierTable::new`] but also rejects rates outside `[0, 1]`.
    pub fn rates(
        policy: TierPolicy,
        tiers: Vec<(f64, f64)>,
        fallback: f64,
    ) -> Result<Self, TableError> {
        for (index, (_, rate)) in tiers.iter().enumerate() {
            check_rate(index, *rate)?;
        }
        check_rate(tiers.len(), fallback)?;
        Self::new(policy, tiers, fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTier<T> {
    pub min_first: f64,
    pub min_second: f64,
    pub value: T,
}

/// Two-dimensional floor classifier. Tiers are tried strictest first and a
/// tier only matches when both minimums hold.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTierTable<T> {
    tiers: Vec<JointTier<T>>,
    fallback: T,
}

impl<T: Copy> JointTierTable<T> {
    pub fn new(tiers: Vec<JointTier<T>>, fallback: T) -> Result<Self, TableError> {
        if tiers.is_empty() {
            return Err(TableError::Empty);
        }
        for (index, tier) in tiers.iter().enumerate() {
            check_threshold(index, tier.min_first)?;
            check_threshold(index, tier.min_second)?;
        }
        if let Some(index) = tiers.windows(2).position(|w| {
            w[1].min_first > w[0].min_first || w[1].min_second > w[0].min_second
        }) {
            return Err(TableError::StricterLaterTier { index: index + 1 });
        }
        Ok(Self { tiers, fallback })
    }

    pub fn lookup(&self, first: f64, second: f64) -> T {
        self.tiers
            .iter()
            .find(|tier| first >= tier.min_first && second >= tier.min_second)
            .map(|tier| tier.value)
            .unwrap_or(self.fallback)
    }
}

/// Discrete curve keyed by integer points (e.g. maturity years).
#[derive(Debug, Clone, PartialEq)]
pub struct NearestKeyTable {
    points: Vec<(u32, f64)>,
}

impl NearestKeyTable {
    pub fn new(points: Vec<(u32, f64)>) -> Result<Self, TableError> {
        if points.is_empty() {
            return Err(TableError::Empty);
        }
        if let Some(index) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(TableError::NotIncreasing { index: index + 1 });
        }
        for (index, (_, rate)) in points.iter().enumerate() {
            check_rate(index, *rate)?;
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(u32, f64)] {
        &self.points
    }

    /// Returns the point closest to `query`. Equidistant keys resolve to the
    /// lower one, since points are scanned in ascending order and only a
    /// strictly smaller distance replaces the current best.
    pub fn resolve(&self, query: u32) -> (u32, f64) {
        let mut best = self.points[0];
        let mut best_distance = best.0.abs_diff(query);
        for &(key, rate) in &self.points[1..] {
            let distance = key.abs_diff(query);
            if distance < best_distance {
                best = (key, rate);
                best_distance = distance;
            }
        }
        best
    }
}

/// `rate` applied to the amount up to `cap` only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CappedLevy {
    pub rate: f64,
    pub cap: f64,
}

impl CappedLevy {
    pub fn charge(&self, amount: f64) -> f64 {
        amount.max(0.0).min(self.cap) * self.rate
    }
}

/// `rate` applied only to the amount above `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surtax {
    pub rate: f64,
    pub threshold: f64,
}

impl Surtax {
    pub fn charge(&self, amount: f64) -> f64 {
        (amount - self.threshold).max(0.0) * self.rate
    }
}

fn check_threshold(index: usize, threshold: f64) -> Result<(), TableError> {
    if !threshold.is_finite() {
        return Err(TableError::NonFiniteThreshold { index });
    }
    Ok(())
}

fn check_rate(index: usize, rate: f64) -> Result<(), TableError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(TableError::InvalidRate { index, rate });
    }
    Ok(())
}
