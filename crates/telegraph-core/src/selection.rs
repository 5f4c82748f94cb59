//! Weighted candidate tables and the cumulative draw policy.
//!
//! Each symbol kind (dot, dash) has its own ordered table of spawnable
//! candidates with weights in `[0, 1]`. A draw walks the table in its
//! configured order, accumulating weights, and returns the first candidate
//! whose running total reaches the uniform draw in `[0, 1)`.
//!
//! Tables whose weights sum below 1 deliberately miss some draws: the
//! caller treats a miss as "no obstacle for this symbol", not an error.
//! That shortfall behavior is load-bearing for hosts that tune spawn
//! density by leaving probability mass unassigned, so it is preserved
//! exactly and only surfaced as a load-time warning.

use rand::Rng;
use telegraph_types::CandidateId;
use tracing::warn;

/// Tolerance when checking whether a table's weights sum to 1.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// One spawnable option and its selection weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnCandidate {
    /// The host's identifier for the spawnable thing.
    pub id: CandidateId,
    /// Selection weight in `[0, 1]`.
    pub weight: f64,
}

impl SpawnCandidate {
    /// Create a candidate from a name and a weight.
    pub fn new(id: impl Into<CandidateId>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// An ordered weighted table of spawn candidates for one symbol kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateTable {
    candidates: Vec<SpawnCandidate>,
}

impl CandidateTable {
    /// Create a table from an ordered candidate list.
    ///
    /// Order matters: draws walk the list front to back, so when weights
    /// sum above 1 the trailing candidates are unreachable.
    pub const fn new(candidates: Vec<SpawnCandidate>) -> Self {
        Self { candidates }
    }

    /// Whether the table has no candidates at all.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of candidates in the table.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// The ordered candidate list.
    pub fn candidates(&self) -> &[SpawnCandidate] {
        &self.candidates
    }

    /// Sum of all weights in the table.
    pub fn weight_sum(&self) -> f64 {
        self.candidates.iter().map(|c| c.weight).sum()
    }

    /// Draw one candidate, or `None` when the draw lands beyond the
    /// table's total weight.
    ///
    /// Draws a uniform value in `[0, 1)` and returns the first candidate
    /// whose cumulative weight reaches it. A `None` result means no spawn
    /// for this symbol -- a gap, not an error.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CandidateId> {
        let draw: f64 = rng.random();
        let mut cumulative = 0.0;
        for candidate in &self.candidates {
            cumulative += candidate.weight;
            if cumulative >= draw {
                return Some(&candidate.id);
            }
        }
        None
    }

    /// Warn when the table's weights do not sum to 1.
    ///
    /// A shortfall silently under-spawns and an excess makes trailing
    /// candidates unreachable; neither is an error, but both are almost
    /// always configuration mistakes worth a log line at load time.
    pub fn validate(&self, label: &str) {
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                table = label,
                weight_sum = sum,
                "candidate weights do not sum to 1; draws beyond the total \
                 produce no spawn"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn two_even_candidates() -> CandidateTable {
        CandidateTable::new(vec![
            SpawnCandidate::new("rock_low", 0.5),
            SpawnCandidate::new("rock_tall", 0.5),
        ])
    }

    #[test]
    fn even_weights_split_draws_evenly() {
        let table = two_even_candidates();
        let mut rng = StdRng::seed_from_u64(7);

        let mut first = 0.0_f64;
        let trials = 10_000_u32;
        for _ in 0..trials {
            let chosen = table.select(&mut rng);
            assert!(chosen.is_some());
            if chosen.map(CandidateId::as_str) == Some("rock_low") {
                first += 1.0;
            }
        }

        let share = first / f64::from(trials);
        assert!(
            (share - 0.5).abs() < 0.03,
            "rock_low share {share} outside 50% +/- 3%"
        );
    }

    #[test]
    fn shortfall_weights_miss_at_the_expected_rate() {
        let table = CandidateTable::new(vec![SpawnCandidate::new("cactus", 0.3)]);
        let mut rng = StdRng::seed_from_u64(11);

        let mut misses = 0.0_f64;
        let trials = 10_000_u32;
        for _ in 0..trials {
            if table.select(&mut rng).is_none() {
                misses += 1.0;
            }
        }

        let miss_rate = misses / f64::from(trials);
        assert!(
            (miss_rate - 0.7).abs() < 0.03,
            "miss rate {miss_rate} outside 70% +/- 3%"
        );
    }

    #[test]
    fn excess_weight_makes_trailing_candidates_unreachable() {
        let table = CandidateTable::new(vec![
            SpawnCandidate::new("always", 1.0),
            SpawnCandidate::new("never", 1.0),
        ]);
        let mut rng = StdRng::seed_from_u64(23);

        for _ in 0..1_000 {
            let chosen = table.select(&mut rng);
            assert_eq!(chosen.map(CandidateId::as_str), Some("always"));
        }
    }

    #[test]
    fn empty_table_always_misses() {
        let table = CandidateTable::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(table.is_empty());
        assert!(table.select(&mut rng).is_none());
    }

    #[test]
    fn order_is_preserved_from_construction() {
        let table = two_even_candidates();
        let names: Vec<&str> = table
            .candidates()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(names, ["rock_low", "rock_tall"]);
    }

    #[test]
    fn weight_sum_adds_up() {
        let table = CandidateTable::new(vec![
            SpawnCandidate::new("a", 0.25),
            SpawnCandidate::new("b", 0.25),
            SpawnCandidate::new("c", 0.4),
        ]);
        assert!((table.weight_sum() - 0.9).abs() < 1e-12);
    }
}
