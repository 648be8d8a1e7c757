//! Winner selection with match-track vigilance escalation.
//!
//! ```text
//! SEARCHING --resonance >= vigilance--> ACCEPTED (stays on top, no mutation)
//!     |     --escalate--> vigilance = r_top + tracking, drop top, keep searching
//!     `----- exhausted --> CREATED (new prototype) | NO-MATCH (test only)
//! ```

use core::cmp::Ordering;

use crate::network::resonance::ActivationRecord;
use crate::PrototypeId;

/// Outcome of one search pass over the ranked prototypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// An existing prototype resonated; weights change only on commit
    Accepted(PrototypeId),
    /// Nothing resonated, the input was stored as a new prototype
    Created(PrototypeId),
    /// Nothing resonated and the network is in test-only mode
    NoMatch,
}

impl Selection {
    pub fn class(self) -> Option<PrototypeId> {
        match self {
            Selection::Accepted(id) | Selection::Created(id) => Some(id),
            Selection::NoMatch => None,
        }
    }
}

/// Scratch buffer of activation records, drained on every commit.
///
/// Kept in ascending order of (T, id) so the current winner is the last
/// element: highest T first, equal T resolved in favour of the higher id.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    records: Vec<ActivationRecord>,
}

impl Ranking {
    pub(crate) fn buffer(&mut self) -> &mut Vec<ActivationRecord> {
        &mut self.records
    }

    pub fn rank(&mut self) {
        self.records.sort_by(|a, b| {
            a.activation
                .partial_cmp(&b.activation)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
    }

    pub fn top(&self) -> Option<&ActivationRecord> {
        self.records.last()
    }

    pub fn pop(&mut self) -> Option<ActivationRecord> {
        self.records.pop()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WinnerSelector {
    /// Starting vigilance for this pass (0 while match tracking)
    pub vigilance: f32,
    pub tracking_value: f32,
}

impl WinnerSelector {
    /// Walk the ranking until a candidate meets vigilance.
    ///
    /// With `escalate`, the current top was rejected from outside: vigilance
    /// is raised to its resonance plus the tracking value and it is dropped
    /// before the search continues. Returns `None` once the ranking is empty.
    pub fn search(&self, ranking: &mut Ranking, escalate: bool) -> Option<ActivationRecord> {
        let mut vigilance = self.vigilance;
        let mut escalate = escalate;

        while let Some(&top) = ranking.top() {
            let mut candidate = top;
            if escalate {
                vigilance = top.resonance + self.tracking_value;
                ranking.pop();
                escalate = false;
                let Some(&next) = ranking.top() else {
                    break;
                };
                candidate = next;
            }

            if candidate.resonance >= vigilance {
                return Some(candidate);
            }
            log::trace!(
                "prototype {} rejected: resonance {} < vigilance {}",
                candidate.id,
                candidate.resonance,
                vigilance
            );
            ranking.pop();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: PrototypeId, activation: f32, resonance: f32) -> ActivationRecord {
        ActivationRecord {
            id,
            activation,
            resonance,
        }
    }

    fn ranking(records: &[ActivationRecord]) -> Ranking {
        let mut r = Ranking::default();
        r.buffer().extend_from_slice(records);
        r.rank();
        r
    }

    #[test]
    fn test_equal_activation_prefers_higher_id() {
        let r = ranking(&[record(4, 1.5, 0.9), record(7, 1.5, 0.9), record(2, 1.5, 0.9)]);
        assert_eq!(r.top().unwrap().id, 7);
    }

    #[test]
    fn test_highest_activation_wins() {
        let r = ranking(&[record(4, 2.5, 0.9), record(7, 1.5, 0.9)]);
        assert_eq!(r.top().unwrap().id, 4);
    }

    #[test]
    fn test_accepts_first_resonating_candidate() {
        let mut r = ranking(&[record(0, 3.0, 0.5), record(1, 2.0, 0.8), record(2, 1.0, 0.95)]);
        let sel = WinnerSelector {
            vigilance: 0.75,
            tracking_value: -0.001,
        };
        let winner = sel.search(&mut r, false).unwrap();
        assert_eq!(winner.id, 1);
        // Accepted record stays on top for the commit
        assert_eq!(r.top().unwrap().id, 1);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_escalation_skips_rejected_winner() {
        let mut r = ranking(&[record(0, 3.0, 0.6), record(1, 2.0, 0.9), record(2, 1.0, 0.4)]);
        let sel = WinnerSelector {
            vigilance: 0.0,
            tracking_value: -0.001,
        };
        assert_eq!(sel.search(&mut r, false).unwrap().id, 0);

        // Vigilance becomes 0.599, prototype 1 (0.9) still passes
        assert_eq!(sel.search(&mut r, true).unwrap().id, 1);

        // Vigilance becomes 0.899, prototype 2 (0.4) fails and the ranking drains
        assert!(sel.search(&mut r, true).is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn test_escalation_on_empty_ranking_exhausts() {
        let mut r = Ranking::default();
        let sel = WinnerSelector {
            vigilance: 0.0,
            tracking_value: -0.001,
        };
        assert!(sel.search(&mut r, true).is_none());
    }

    #[test]
    fn test_selection_class() {
        assert_eq!(Selection::Accepted(3).class(), Some(3));
        assert_eq!(Selection::Created(5).class(), Some(5));
        assert_eq!(Selection::NoMatch.class(), None);
    }
}
