//! Repeatable-with-percentage element groups.

use serde::{Deserialize, Serialize};

/// Default tolerance when checking that a group's percentages sum to 100.
pub const DEFAULT_PERCENTAGE_TOLERANCE: f64 = 0.01;

/// An element that can carry a percentage share of its parent.
pub trait Weighted {
    fn percentage(&self) -> Option<f64>;
}

/// Absorbs binary rounding of decimal percentages such as `99.99`.
const ROUNDING_SLACK: f64 = 1e-9;

/// How the members of a group use percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentageUse {
    /// No member carries a percentage.
    None,
    /// Every member carries one; holds their sum.
    All(f64),
    /// Some members carry one and some don't.
    Mixed { with: usize, without: usize },
}

/// IATI's repeatable element pattern, e.g. several sectors on one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiValueGroup<T> {
    members: Vec<T>,
}

impl<T> Default for MultiValueGroup<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T> MultiValueGroup<T> {
    pub fn new(members: Vec<T>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn push(&mut self, member: T) {
        self.members.push(member);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.members.retain(keep);
    }

    pub fn into_members(self) -> Vec<T> {
        self.members
    }
}

impl<T: Weighted> MultiValueGroup<T> {
    pub fn percentage_use(&self) -> PercentageUse {
        percentage_use(&self.members)
    }

    /// The only member, when it covers the whole parent.
    ///
    /// A lone member without a percentage is implicitly 100%.
    pub fn sole_member(&self, tolerance: f64) -> Option<&T> {
        match self.members.as_slice() {
            [only] => match only.percentage() {
                None => Some(only),
                Some(value) if sums_to_hundred(value, tolerance) => Some(only),
                Some(_) => None,
            },
            _ => None,
        }
    }
}

impl<'a, T> IntoIterator for &'a MultiValueGroup<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl<T> FromIterator<T> for MultiValueGroup<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}

/// Classify percentage usage across any slice of weighted members.
pub fn percentage_use<T: Weighted>(members: &[T]) -> PercentageUse {
    let with = members.iter().filter(|m| m.percentage().is_some()).count();
    let without = members.len() - with;
    if with == 0 {
        PercentageUse::None
    } else if without == 0 {
        PercentageUse::All(members.iter().filter_map(Weighted::percentage).sum())
    } else {
        PercentageUse::Mixed { with, without }
    }
}

/// True when `sum` equals 100 within `tolerance`.
pub fn sums_to_hundred(sum: f64, tolerance: f64) -> bool {
    (sum - 100.0).abs() <= tolerance + ROUNDING_SLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Share(Option<f64>);

    impl Weighted for Share {
        fn percentage(&self) -> Option<f64> {
            self.0
        }
    }

    #[test]
    fn classifies_usage() {
        let none: MultiValueGroup<Share> = vec![Share(None), Share(None)].into_iter().collect();
        assert_eq!(none.percentage_use(), PercentageUse::None);

        let all: MultiValueGroup<Share> = vec![Share(Some(60.0)), Share(Some(35.0))]
            .into_iter()
            .collect();
        assert_eq!(all.percentage_use(), PercentageUse::All(95.0));

        let mixed = MultiValueGroup::new(vec![Share(Some(60.0)), Share(None)]);
        assert_eq!(
            mixed.percentage_use(),
            PercentageUse::Mixed {
                with: 1,
                without: 1
            }
        );
    }

    #[test]
    fn sole_member_requires_full_share() {
        let implicit = MultiValueGroup::new(vec![Share(None)]);
        assert!(implicit.sole_member(0.01).is_some());
        let full = MultiValueGroup::new(vec![Share(Some(100.0))]);
        assert!(full.sole_member(0.01).is_some());
        let partial = MultiValueGroup::new(vec![Share(Some(80.0))]);
        assert!(partial.sole_member(0.01).is_none());
        let two = MultiValueGroup::new(vec![Share(Some(50.0)), Share(Some(50.0))]);
        assert!(two.sole_member(0.01).is_none());
    }

    #[test]
    fn tolerance_is_inclusive() {
        assert!(sums_to_hundred(99.99, 0.01));
        assert!(sums_to_hundred(100.01, 0.01));
        assert!(!sums_to_hundred(99.98, 0.01));
        assert!(!sums_to_hundred(95.0, 0.01));
    }
}
