//! Spin session state: what has been discovered and when the wheel may
//! spin again. Pure data, no clocks of its own, so every rule here is
//! testable with fixed timestamps.

use serde::{Deserialize, Serialize};

use crate::data::{select_random, Project};
use crate::COOLDOWN_SECONDS;

const COOLDOWN_MS: u64 = COOLDOWN_SECONDS as u64 * 1_000;

/// The persisted slice of roulette state. Exactly these two fields survive
/// a reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinSession {
    #[serde(rename = "discoveredProjects")]
    pub discovered: Vec<String>,
    #[serde(rename = "lastSpinTime")]
    pub last_spin_ms: u64,
}

/// Result of applying one spin against a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    Discovered(Project),
    /// Every project in the catalog has already been discovered.
    Exhausted,
}

impl SpinSession {
    /// Cooldown is satisfied once the window has elapsed since the last
    /// spin. A fresh session has `last_spin_ms == 0`, which any real clock
    /// is far past.
    pub fn can_spin(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_spin_ms) >= COOLDOWN_MS
    }

    /// Whole seconds left on the cooldown, floor-based for a ticking
    /// countdown display.
    pub fn cooldown_remaining_secs(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.last_spin_ms);
        (COOLDOWN_MS.saturating_sub(elapsed)) / 1_000
    }

    /// Seconds to quote in a "please wait" message, rounded up so the user
    /// is never told zero while still blocked.
    pub fn wait_secs(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.last_spin_ms);
        COOLDOWN_MS.saturating_sub(elapsed).div_ceil(1_000)
    }

    pub fn reset(&mut self) {
        self.discovered.clear();
        self.last_spin_ms = 0;
    }
}

/// Draw a project and record the spin. The caller checks the cooldown
/// first; this only consults the discovered list.
pub fn apply_spin(
    session: &mut SpinSession,
    catalog: &[Project],
    seed: u64,
    now_ms: u64,
) -> SpinOutcome {
    let Some(project) = select_random(catalog, seed, &session.discovered) else {
        return SpinOutcome::Exhausted;
    };
    session.discovered.push(project.id.clone());
    session.last_spin_ms = now_ms;
    SpinOutcome::Discovered(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::built_in_projects;

    #[test]
    fn fresh_session_can_spin_immediately() {
        let session = SpinSession::default();
        // Never spun: any wall-clock time at or past one window qualifies.
        assert!(session.can_spin(1_700_000_000_000));
        assert!(session.can_spin(COOLDOWN_MS));
        assert!(!session.can_spin(COOLDOWN_MS - 1));
    }

    #[test]
    fn cooldown_blocks_until_ten_seconds_elapsed() {
        let session = SpinSession {
            discovered: vec![],
            last_spin_ms: 100_000,
        };
        assert!(!session.can_spin(100_000));
        assert!(!session.can_spin(109_999));
        assert!(session.can_spin(110_000));
    }

    #[test]
    fn blocked_spin_quotes_rounded_up_wait() {
        let session = SpinSession {
            discovered: vec![],
            last_spin_ms: 100_000,
        };

        assert!(!session.can_spin(105_000));
        assert_eq!(session.wait_secs(105_000), 5);
        assert_eq!(session.wait_secs(105_500), 5); // 4.5s left quotes 5
    }

    #[test]
    fn countdown_floors_and_wait_ceils() {
        let session = SpinSession {
            discovered: vec![],
            last_spin_ms: 0,
        };
        // 9.2 seconds remaining.
        assert_eq!(session.cooldown_remaining_secs(800), 9);
        assert_eq!(session.wait_secs(800), 10);
        assert_eq!(session.cooldown_remaining_secs(10_000), 0);
        assert_eq!(session.wait_secs(10_000), 0);
    }

    #[test]
    fn spins_discover_each_project_once_then_exhaust() {
        let catalog = built_in_projects();
        let mut session = SpinSession::default();

        for i in 0..catalog.len() {
            let now = (i as u64 + 1) * 20_000;
            match apply_spin(&mut session, &catalog, 7 * i as u64 + 3, now) {
                SpinOutcome::Discovered(project) => {
                    // Dedup: each id appears exactly once.
                    let hits = session.discovered.iter().filter(|d| **d == project.id).count();
                    assert_eq!(hits, 1);
                    assert_eq!(session.last_spin_ms, now);
                }
                SpinOutcome::Exhausted => panic!("exhausted after {i} spins"),
            }
        }
        assert_eq!(session.discovered.len(), catalog.len());

        let outcome = apply_spin(&mut session, &catalog, 42, 999_000);
        assert_eq!(outcome, SpinOutcome::Exhausted);
    }

    #[test]
    fn reset_clears_everything() {
        let catalog = built_in_projects();
        let mut session = SpinSession::default();
        apply_spin(&mut session, &catalog, 1, 50_000);
        assert!(!session.discovered.is_empty());

        session.reset();
        assert_eq!(session, SpinSession::default());
        assert!(session.can_spin(50_001));

        session.reset(); // idempotent
        assert_eq!(session, SpinSession::default());
    }

    #[test]
    fn persisted_shape_matches_storage_contract() {
        let session = SpinSession {
            discovered: vec!["acala".into()],
            last_spin_ms: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["discoveredProjects"][0], "acala");
        assert_eq!(value["lastSpinTime"], 1_700_000_000_000u64);
        assert_eq!(value.as_object().unwrap().len(), 2);
    }
}
