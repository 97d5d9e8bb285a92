//! Closed integer intervals

use std::fmt;

/// A closed interval `[lower, upper]`, or the canonical empty interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    lower: i32,
    upper: i32,
}

impl Default for Range {
    fn default() -> Self {
        Self::empty()
    }
}

impl Range {
    /// The empty interval
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            lower: i32::MAX,
            upper: i32::MIN,
        }
    }

    /// Create `[lower, upper]`; empty when `lower > upper`
    #[must_use]
    pub const fn new(lower: i32, upper: i32) -> Self {
        if lower > upper {
            Self::empty()
        } else {
            Self { lower, upper }
        }
    }

    /// The single value `[value, value]`
    #[must_use]
    pub const fn point(value: i32) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Lower bound, `None` when empty
    #[must_use]
    pub const fn lower(&self) -> Option<i32> {
        if self.is_empty() {
            None
        } else {
            Some(self.lower)
        }
    }

    /// Upper bound, `None` when empty
    #[must_use]
    pub const fn upper(&self) -> Option<i32> {
        if self.is_empty() {
            None
        } else {
            Some(self.upper)
        }
    }

    /// Check if the interval contains no values
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    /// Values present in both intervals
    #[must_use]
    pub fn intersect(&self, other: &Range) -> Range {
        Range::new(self.lower.max(other.lower), self.upper.min(other.upper))
    }

    /// Smallest interval covering both (interval hull, not set union)
    #[must_use]
    pub fn join(&self, other: &Range) -> Range {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Range::new(self.lower.min(other.lower), self.upper.max(other.upper))
    }

    /// Check if every value of `other` lies in this interval
    #[must_use]
    pub fn contains(&self, other: &Range) -> bool {
        other.is_empty() || (self.lower <= other.lower && other.upper <= self.upper)
    }

    /// Check if `value` lies in this interval
    #[must_use]
    pub fn contains_value(&self, value: i32) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else {
            write!(f, "[{},{}]", self.lower, self.upper)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalises_empty() {
        assert!(Range::new(3, 1).is_empty());
        assert_eq!(Range::new(3, 1), Range::empty());
        assert!(!Range::point(4).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Range::new(0, 5);
        assert_eq!(a.intersect(&Range::new(3, 9)), Range::new(3, 5));
        assert!(a.intersect(&Range::new(6, 9)).is_empty());
        assert!(a.intersect(&Range::empty()).is_empty());
    }

    #[test]
    fn test_join_is_hull() {
        let joined = Range::point(1).join(&Range::point(7));
        assert_eq!(joined, Range::new(1, 7));
        assert!(joined.contains_value(4));
        assert_eq!(Range::empty().join(&Range::point(2)), Range::point(2));
    }

    #[test]
    fn test_contains() {
        let a = Range::new(0, 5);
        assert!(a.contains(&Range::new(1, 5)));
        assert!(!a.contains(&Range::new(1, 6)));
        assert!(a.contains(&Range::empty()));
        assert!(!a.contains_value(7));
    }

    #[test]
    fn test_bounds_and_display() {
        assert_eq!(Range::new(2, 4).lower(), Some(2));
        assert_eq!(Range::empty().upper(), None);
        assert_eq!(Range::new(2, 4).to_string(), "[2,4]");
        assert_eq!(Range::empty().to_string(), "[]");
    }
}
