//! Heuristic estimates accumulated over formulas for a relaxed
//! planning graph heuristic.
use std::ops::Add;
use std::ops::AddAssign;

/// How the costs of conjuncts combine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CostMerge {
    /// Sum the costs of conjuncts (informative, inadmissible).
    Additive,
    /// Take the most expensive conjunct (admissible).
    Max,
}

impl Default for CostMerge {
    fn default() -> Self {
        CostMerge::Additive
    }
}

/// A heuristic estimate: the additive cost of achieving something,
/// the number of actions that cost sums, and a makespan estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicValue {
    add_cost: f32,
    add_work: u32,
    makespan: f32,
}

impl HeuristicValue {
    pub const ZERO: HeuristicValue = HeuristicValue {
        add_cost: 0.0,
        add_work: 0,
        makespan: 0.0,
    };

    pub const ZERO_COST_UNIT_WORK: HeuristicValue = HeuristicValue {
        add_cost: 0.0,
        add_work: 1,
        makespan: 0.0,
    };

    /// The value of something unreachable.
    pub const INFINITE: HeuristicValue = HeuristicValue {
        add_cost: f32::INFINITY,
        add_work: u32::MAX,
        makespan: f32::INFINITY,
    };

    #[must_use]
    pub fn new(add_cost: f32, add_work: u32, makespan: f32) -> Self {
        Self {
            add_cost,
            add_work,
            makespan,
        }
    }

    #[inline]
    #[must_use]
    pub fn add_cost(&self) -> f32 {
        self.add_cost
    }

    #[inline]
    #[must_use]
    pub fn add_work(&self) -> u32 {
        self.add_work
    }

    #[inline]
    #[must_use]
    pub fn makespan(&self) -> f32 {
        self.makespan
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.add_cost == 0.0 && self.add_work == 0 && self.makespan == 0.0
    }

    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.add_cost.is_infinite()
    }

    pub fn increase_cost(&mut self, delta: f32) {
        self.add_cost += delta;
    }

    pub fn increase_work(&mut self, delta: u32) {
        self.add_work = self.add_work.saturating_add(delta);
    }

    pub fn increase_makespan(&mut self, delta: f32) {
        self.makespan += delta;
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: HeuristicValue) -> HeuristicValue {
        HeuristicValue {
            add_cost: self.add_cost.min(other.add_cost),
            add_work: self.add_work.min(other.add_work),
            makespan: self.makespan.min(other.makespan),
        }
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: HeuristicValue) -> HeuristicValue {
        HeuristicValue {
            add_cost: self.add_cost.max(other.add_cost),
            add_work: self.add_work.max(other.add_work),
            makespan: self.makespan.max(other.makespan),
        }
    }

    /// Combines the values of two conjuncts.
    #[must_use]
    pub fn merge(self, other: HeuristicValue, merge: CostMerge) -> HeuristicValue {
        match merge {
            CostMerge::Additive => self + other,
            CostMerge::Max => self.max(other),
        }
    }
}

/// Costs and work add up, but conjuncts may be achieved in parallel,
/// so the makespan is the larger of the two.
impl AddAssign for HeuristicValue {
    fn add_assign(&mut self, other: HeuristicValue) {
        self.add_cost += other.add_cost;
        self.add_work = self.add_work.saturating_add(other.add_work);
        self.makespan = self.makespan.max(other.makespan);
    }
}

impl Add for HeuristicValue {
    type Output = HeuristicValue;

    fn add(mut self, other: HeuristicValue) -> HeuristicValue {
        self += other;
        self
    }
}

#[test]
fn test_add() {
    let a = HeuristicValue::new(2.0, 1, 3.0);
    let b = HeuristicValue::new(1.0, 2, 5.0);

    assert_eq!(a + b, HeuristicValue::new(3.0, 3, 5.0));
    assert_eq!(a + HeuristicValue::ZERO, a);
    assert!((a + HeuristicValue::INFINITE).is_infinite());
    assert_eq!((a + HeuristicValue::INFINITE).add_work(), u32::MAX);
}

#[test]
fn test_min_max() {
    let a = HeuristicValue::new(2.0, 1, 3.0);
    let b = HeuristicValue::new(1.0, 2, 5.0);

    assert_eq!(a.min(b), HeuristicValue::new(1.0, 1, 3.0));
    assert_eq!(a.max(b), HeuristicValue::new(2.0, 2, 5.0));
    assert_eq!(a.min(HeuristicValue::INFINITE), a);
    assert_eq!(a.merge(b, CostMerge::Max), a.max(b));
    assert_eq!(a.merge(b, CostMerge::Additive), a + b);
}

#[test]
fn test_increments() {
    let mut value = HeuristicValue::ZERO;
    assert!(value.is_zero());
    assert!(!HeuristicValue::ZERO_COST_UNIT_WORK.is_zero());

    value.increase_cost(1.5);
    value.increase_work(2);
    value.increase_makespan(0.5);
    assert_eq!(value, HeuristicValue::new(1.5, 2, 0.5));
    assert!(!value.is_infinite());
}
