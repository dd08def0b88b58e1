//! Plane selection strategies for BSP tree construction.
//!
//! At every division step a node has one to three candidate planes. A
//! primitive straddling the chosen plane stays at the node for good, so the
//! choice trades how many primitives get pinned high up in the tree against
//! how well the rest is separated.

use super::node::SplitPlane;

/// A candidate split plane and the number of primitives it cannot separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneCandidate {
    pub plane: SplitPlane,
    pub intersected: usize,
}

/// Strategy for selecting which candidate plane divides a node.
pub trait PlaneSelector {
    /// Select one of `candidates`, which are given in priority order.
    ///
    /// Returns `None` if the slice is empty.
    /// The returned reference must be to an element in the provided slice.
    fn select<'a>(&self, candidates: &'a [PlaneCandidate]) -> Option<&'a PlaneCandidate>;
}

/// Selects the plane straddled by the most primitives.
///
/// Pins the worst ambiguity at the current node first, so the deeper levels
/// only deal with primitives that can be separated. Ties go to the earlier
/// candidate. This is the default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostIntersected;

impl PlaneSelector for MostIntersected {
    fn select<'a>(&self, candidates: &'a [PlaneCandidate]) -> Option<&'a PlaneCandidate> {
        candidates.iter().fold(None, |best, candidate| match best {
            Some(best) if best.intersected >= candidate.intersected => Some(best),
            _ => Some(candidate),
        })
    }
}

/// Selects the plane straddled by the fewest primitives.
///
/// Keeps nodes near the root small at the cost of pushing straddlers down to
/// later split steps. Ties go to the earlier candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FewestIntersected;

impl PlaneSelector for FewestIntersected {
    fn select<'a>(&self, candidates: &'a [PlaneCandidate]) -> Option<&'a PlaneCandidate> {
        candidates.iter().min_by_key(|candidate| candidate.intersected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_candidates(counts: [usize; 3]) -> Vec<PlaneCandidate> {
        [SplitPlane::XY, SplitPlane::YZ, SplitPlane::XZ]
            .into_iter()
            .zip(counts)
            .map(|(plane, intersected)| PlaneCandidate { plane, intersected })
            .collect()
    }

    #[test]
    fn empty_candidates() {
        assert!(MostIntersected.select(&[]).is_none());
        assert!(FewestIntersected.select(&[]).is_none());
    }

    #[test]
    fn most_intersected_picks_maximum() {
        let candidates = make_candidates([1, 4, 2]);
        assert_eq!(MostIntersected.select(&candidates).unwrap().plane, SplitPlane::YZ);
    }

    #[test]
    fn most_intersected_ties_follow_priority() {
        let candidates = make_candidates([3, 3, 3]);
        assert_eq!(MostIntersected.select(&candidates).unwrap().plane, SplitPlane::XY);

        let candidates = make_candidates([0, 2, 2]);
        assert_eq!(MostIntersected.select(&candidates).unwrap().plane, SplitPlane::YZ);
    }

    #[test]
    fn fewest_intersected_picks_minimum() {
        let candidates = make_candidates([5, 4, 0]);
        assert_eq!(FewestIntersected.select(&candidates).unwrap().plane, SplitPlane::XZ);
    }

    #[test]
    fn fewest_intersected_ties_follow_priority() {
        let candidates = make_candidates([1, 1, 1]);
        assert_eq!(FewestIntersected.select(&candidates).unwrap().plane, SplitPlane::XY);
    }

    #[test]
    fn single_candidate_is_always_selected() {
        let candidates = [PlaneCandidate {
            plane: SplitPlane::XZ,
            intersected: 7,
        }];
        assert_eq!(MostIntersected.select(&candidates), Some(&candidates[0]));
        assert_eq!(FewestIntersected.select(&candidates), Some(&candidates[0]));
    }
}
