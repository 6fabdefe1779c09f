//! The entry/exit attendance state machine.
//!
//! Turns a stream of repeated, confident sightings per identity into at most
//! one Entry event and one Exit event per session. Pure state, no I/O, so it
//! tests without a camera.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Entry,
    Exit,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Entry => write!(f, "Entry"),
            EventStatus::Exit => write!(f, "Exit"),
        }
    }
}

/// One attendance event, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceEvent {
    pub name: String,
    /// When the sighting that produced this event happened.
    pub timestamp: NaiveDateTime,
    /// The identity's entry time; equals `timestamp` for Entry events.
    pub entry_time: NaiveDateTime,
    pub status: EventStatus,
}

impl AttendanceEvent {
    /// Line for the end-of-session report, e.g. `Entry - Asha at 09:00:05`.
    pub fn record_line(&self) -> String {
        format!(
            "{} - {} at {}",
            self.status,
            self.name,
            self.timestamp.format("%H:%M:%S")
        )
    }
}

/// Per-identity state for the running session.
#[derive(Debug, Clone)]
struct AttendanceState {
    entry_time: NaiveDateTime,
    exit_time: Option<NaiveDateTime>,
}

/// Outcome of one confident sighting.
#[derive(Debug, Clone, PartialEq)]
pub enum Sighting {
    Entry(AttendanceEvent),
    Exit(AttendanceEvent),
    /// Entry and exit already recorded; nothing changed.
    AlreadyComplete { name: String },
}

/// Owns the identity → state map for one run of the capture loop.
///
/// Transitions per identity are strictly one-directional:
/// no record → entry only → entry+exit, after which every further sighting
/// is an idempotent no-op.
#[derive(Default)]
pub struct AttendanceTracker {
    states: HashMap<String, AttendanceState>,
}

impl AttendanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one confident sighting of `name` at `at`.
    ///
    /// Callers must filter out unknown recognitions first; the tracker is
    /// never consulted for them.
    pub fn observe(&mut self, name: &str, at: NaiveDateTime) -> Sighting {
        match self.states.get_mut(name) {
            None => {
                self.states.insert(
                    name.to_string(),
                    AttendanceState {
                        entry_time: at,
                        exit_time: None,
                    },
                );
                Sighting::Entry(AttendanceEvent {
                    name: name.to_string(),
                    timestamp: at,
                    entry_time: at,
                    status: EventStatus::Entry,
                })
            }
            Some(state) if state.exit_time.is_none() => {
                state.exit_time = Some(at);
                Sighting::Exit(AttendanceEvent {
                    name: name.to_string(),
                    timestamp: at,
                    entry_time: state.entry_time,
                    status: EventStatus::Exit,
                })
            }
            Some(_) => Sighting::AlreadyComplete {
                name: name.to_string(),
            },
        }
    }

    /// Number of identities with any recorded state this session.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_first_sighting_is_entry() {
        let mut tracker = AttendanceTracker::new();
        let sighting = tracker.observe("Asha", at(9, 0, 5));
        match sighting {
            Sighting::Entry(ev) => {
                assert_eq!(ev.name, "Asha");
                assert_eq!(ev.timestamp, at(9, 0, 5));
                assert_eq!(ev.entry_time, at(9, 0, 5));
                assert_eq!(ev.status, EventStatus::Entry);
            }
            other => panic!("expected Entry, got {other:?}"),
        }
    }

    #[test]
    fn test_second_sighting_is_exit_keeping_entry_time() {
        let mut tracker = AttendanceTracker::new();
        tracker.observe("Asha", at(9, 0, 5));
        // Under a second later; no debounce is modeled.
        let sighting = tracker.observe("Asha", at(9, 0, 7));
        match sighting {
            Sighting::Exit(ev) => {
                assert_eq!(ev.timestamp, at(9, 0, 7));
                assert_eq!(ev.entry_time, at(9, 0, 5));
                assert_eq!(ev.status, EventStatus::Exit);
            }
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[test]
    fn test_third_and_later_sightings_are_no_ops() {
        let mut tracker = AttendanceTracker::new();
        tracker.observe("Asha", at(9, 0, 5));
        tracker.observe("Asha", at(9, 0, 7));

        for s in [at(9, 5, 0), at(10, 0, 0), at(11, 30, 0)] {
            let sighting = tracker.observe("Asha", s);
            assert_eq!(
                sighting,
                Sighting::AlreadyComplete {
                    name: "Asha".into()
                }
            );
        }

        // Completing again must not have disturbed the stored times: a fresh
        // exit would differ from the original.
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_identities_are_independent() {
        let mut tracker = AttendanceTracker::new();
        tracker.observe("Asha", at(9, 0, 0));
        tracker.observe("Asha", at(9, 1, 0));

        // Ben's cycle starts fresh regardless of Asha's completion.
        let sighting = tracker.observe("Ben", at(9, 2, 0));
        assert!(matches!(sighting, Sighting::Entry(_)));
        let sighting = tracker.observe("Ben", at(9, 3, 0));
        match sighting {
            Sighting::Exit(ev) => assert_eq!(ev.entry_time, at(9, 2, 0)),
            other => panic!("expected Exit, got {other:?}"),
        }
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_record_line_format() {
        let ev = AttendanceEvent {
            name: "Asha".into(),
            timestamp: at(9, 0, 5),
            entry_time: at(9, 0, 5),
            status: EventStatus::Entry,
        };
        assert_eq!(ev.record_line(), "Entry - Asha at 09:00:05");

        let ev = AttendanceEvent {
            name: "Asha".into(),
            timestamp: at(17, 30, 0),
            entry_time: at(9, 0, 5),
            status: EventStatus::Exit,
        };
        assert_eq!(ev.record_line(), "Exit - Asha at 17:30:00");
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = AttendanceTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.len(), 0);
    }
}
