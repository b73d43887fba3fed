use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Transition function from a cell's current state and its live-neighbor
/// count to the cell's next state.
///
/// Implementations must be pure: the engine evaluates them concurrently and
/// in no particular order.
pub trait Rule: Send + Sync {
    fn next_state(&self, alive: bool, live_neighbors: u32) -> bool;
}

impl<F> Rule for F
where
    F: Fn(bool, u32) -> bool + Send + Sync,
{
    fn next_state(&self, alive: bool, live_neighbors: u32) -> bool {
        self(alive, live_neighbors)
    }
}

/// Standard Game of Life: born with 3 neighbors, survives with 2 or 3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConwayRule;

impl Rule for ConwayRule {
    fn next_state(&self, alive: bool, live_neighbors: u32) -> bool {
        live_neighbors == 3 || (alive && live_neighbors == 2)
    }
}

/// Bit `n` set means "applies with `n` live neighbors".
type NeighborMask = u16;

const MAX_COUNT: u32 = 8;

const COUNT_OUT_OF_RANGE: &str = "neighbor counts must be digits 0 to 8";

/// Birth/survival rule in `B3/S23` notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifeLikeRule {
    birth: NeighborMask,
    survival: NeighborMask,
}

impl LifeLikeRule {
    pub const fn conway() -> Self {
        Self {
            birth: 0b0_0000_1000,
            survival: 0b0_0000_1100,
        }
    }

    /// Rule that gives birth with any count in `birth` and keeps a cell alive
    /// with any count in `survival`. Counts above 8 are rejected.
    pub fn new(birth: &[u32], survival: &[u32]) -> Result<Self, ConfigError> {
        match (Self::mask(birth), Self::mask(survival)) {
            (Some(birth), Some(survival)) => Ok(Self { birth, survival }),
            _ => Err(ConfigError::InvalidRule {
                rule: format!("B{:?}/S{:?}", birth, survival),
                reason: COUNT_OUT_OF_RANGE,
            }),
        }
    }

    pub fn births_with(&self, live_neighbors: u32) -> bool {
        Self::has(self.birth, live_neighbors)
    }

    pub fn survives_with(&self, live_neighbors: u32) -> bool {
        Self::has(self.survival, live_neighbors)
    }

    fn mask(counts: &[u32]) -> Option<NeighborMask> {
        let mut mask: NeighborMask = 0;
        for &count in counts {
            if count > MAX_COUNT {
                return None;
            }
            mask |= 1 << count;
        }
        Some(mask)
    }

    fn has(mask: NeighborMask, live_neighbors: u32) -> bool {
        live_neighbors <= MAX_COUNT && mask & (1 << live_neighbors) != 0
    }

    fn parse_counts(rule: &str, digits: &str) -> Result<NeighborMask, ConfigError> {
        let invalid = |reason| ConfigError::InvalidRule {
            rule: rule.to_string(),
            reason,
        };

        let mut mask: NeighborMask = 0;
        for ch in digits.chars() {
            let count = match ch.to_digit(10) {
                Some(count) if count <= MAX_COUNT => count,
                _ => return Err(invalid(COUNT_OUT_OF_RANGE)),
            };
            if mask & (1 << count) != 0 {
                return Err(invalid("repeated neighbor count"));
            }
            mask |= 1 << count;
        }
        Ok(mask)
    }

    fn write_counts(f: &mut fmt::Formatter<'_>, mask: NeighborMask) -> fmt::Result {
        for count in 0..=MAX_COUNT {
            if Self::has(mask, count) {
                write!(f, "{}", count)?;
            }
        }
        Ok(())
    }
}

impl Default for LifeLikeRule {
    fn default() -> Self {
        Self::conway()
    }
}

impl Rule for LifeLikeRule {
    fn next_state(&self, alive: bool, live_neighbors: u32) -> bool {
        if alive {
            self.survives_with(live_neighbors)
        } else {
            self.births_with(live_neighbors)
        }
    }
}

impl FromStr for LifeLikeRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidRule {
            rule: s.to_string(),
            reason,
        };

        let mut birth = None;
        let mut survival = None;
        for part in s.trim().split('/') {
            let mut chars = part.chars();
            let slot = match chars.next() {
                Some('B' | 'b') => &mut birth,
                Some('S' | 's') => &mut survival,
                _ => return Err(invalid("expected B<digits>/S<digits>")),
            };
            if slot.is_some() {
                return Err(invalid("B and S may each appear once"));
            }
            *slot = Some(Self::parse_counts(s, chars.as_str())?);
        }

        match (birth, survival) {
            (Some(birth), Some(survival)) => Ok(Self { birth, survival }),
            _ => Err(invalid("expected B<digits>/S<digits>")),
        }
    }
}

impl fmt::Display for LifeLikeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("B")?;
        Self::write_counts(f, self.birth)?;
        f.write_str("/S")?;
        Self::write_counts(f, self.survival)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conway_truth_table() {
        for count in 0..=8 {
            let born = ConwayRule.next_state(false, count);
            let survives = ConwayRule.next_state(true, count);
            assert_eq!(born, count == 3, "dead, {}", count);
            assert_eq!(survives, count == 2 || count == 3, "alive, {}", count);
        }
    }

    #[test]
    fn rules_are_pure() {
        for count in 0..=8 {
            for alive in [false, true] {
                let first = ConwayRule.next_state(alive, count);
                for _ in 0..3 {
                    assert_eq!(ConwayRule.next_state(alive, count), first);
                }
            }
        }
    }

    #[test]
    fn closures_are_rules() {
        let majority = |_alive: bool, count: u32| count >= 5;
        assert!(majority.next_state(false, 5));
        assert!(!majority.next_state(true, 4));
    }

    #[test]
    fn parsed_b3_s23_matches_conway() {
        let rule: LifeLikeRule = "B3/S23".parse().unwrap();
        assert_eq!(rule, LifeLikeRule::conway());
        for count in 0..=8 {
            for alive in [false, true] {
                let expected = ConwayRule.next_state(alive, count);
                assert_eq!(rule.next_state(alive, count), expected);
            }
        }
    }

    #[test]
    fn parses_other_rules() {
        let high_life: LifeLikeRule = "b36/s23".parse().unwrap();
        assert_eq!(high_life, LifeLikeRule::new(&[3, 6], &[2, 3]).unwrap());
        assert!(high_life.births_with(6));

        let seeds: LifeLikeRule = "S/B2".parse().unwrap();
        assert_eq!(seeds, LifeLikeRule::new(&[2], &[]).unwrap());
        assert!(!seeds.next_state(true, 2));
    }

    #[test]
    fn rejects_malformed_rules() {
        for text in ["", "B3", "23/3", "B3/S23/S1", "B9/S23", "B33/S23", "B3/Sx"] {
            let err = text.parse::<LifeLikeRule>().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRule { .. }));
        }
    }

    #[test]
    fn new_rejects_counts_above_eight() {
        let birth = LifeLikeRule::new(&[3, 9], &[2, 3]).unwrap_err();
        assert!(matches!(birth, ConfigError::InvalidRule { .. }));
        let survival = LifeLikeRule::new(&[3], &[12]).unwrap_err();
        assert!(matches!(survival, ConfigError::InvalidRule { .. }));
    }

    #[test]
    fn display_uses_standard_notation() {
        assert_eq!(LifeLikeRule::conway().to_string(), "B3/S23");
        let rule = LifeLikeRule::new(&[6, 3], &[]).unwrap();
        assert_eq!(rule.to_string(), "B36/S");
    }

    #[test]
    fn counts_beyond_eight_never_apply() {
        let rule = LifeLikeRule::new(&[0, 1, 2, 3, 4, 5, 6, 7, 8], &[]).unwrap();
        assert!(!rule.births_with(9));
    }
}
