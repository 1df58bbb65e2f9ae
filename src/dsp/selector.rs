use crate::dsp::kinematics::ListenerKinematics;
use crate::dsp::lattice::EmitterLattice;
use crate::dsp::propagation::predictive_retarded_time;
use crate::dsp::vec2::Vec2;

/*
Emitter Selection
=================

Once per audio block the voice picks the single emitter it will render
against. The score of a candidate is its predictive retarded time sampled at
horizons {0, H/2, H}, keeping the *maximum*. The furthest-advanced propagation state
serves as a proxy for "will be most audible soon": an emitter the listener
is approaching has its retarded time catching up fastest.

Taking the max (instead of, say, a weighted blend across the horizons) is a
compatibility-preserving heuristic, not physics; the ranking it produces is
what everything downstream was tuned against.

The scan covers a closed index window in row-major order (k outer, m inner).
Strictly-greater comparison means the first candidate of a tied score wins,
which keeps the result deterministic under re-evaluation. Candidates with a
non-finite position are skipped rather than scored, so a degenerate lattice
cannot poison the search. An empty or inverted window is a defined
degenerate case returning the default candidate, not an error.
*/

/// Look-ahead interval for predictive scoring, in seconds. At full listener
/// speed this spans one tangent spacing, so the scan can tell "about to
/// reach" apart from "just passed" for adjacent lattice rows.
pub const PREDICTIVE_HORIZON: f64 = 1.0;

/// A scored emitter candidate. Transient: rebuilt every block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterCandidate {
    pub k: i32,
    pub m: i32,
    pub position: Vec2,
    pub score: f64,
}

impl Default for EmitterCandidate {
    /// The origin emitter with a zero score; returned for degenerate windows.
    fn default() -> Self {
        Self {
            k: 0,
            m: 0,
            position: Vec2::ZERO,
            score: 0.0,
        }
    }
}

/// Predictive score for one emitter: the maximum retarded time across the
/// horizons {0, H/2, H}.
pub fn score_emitter(listener: &ListenerKinematics, emitter: Vec2) -> f64 {
    let horizons = [0.0, PREDICTIVE_HORIZON * 0.5, PREDICTIVE_HORIZON];

    horizons
        .iter()
        .map(|&h| predictive_retarded_time(listener, h, emitter))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Scan every (k, m) in the closed window and return the best candidate.
pub fn find_best_in_window(
    listener: &ListenerKinematics,
    lattice: &EmitterLattice,
    k_min: i32,
    k_max: i32,
    m_min: i32,
    m_max: i32,
) -> EmitterCandidate {
    if k_min > k_max || m_min > m_max {
        return EmitterCandidate::default();
    }

    let mut best: Option<EmitterCandidate> = None;
    let mut best_score = f64::NEG_INFINITY;

    for k in k_min..=k_max {
        for m in m_min..=m_max {
            let position = lattice.position(k, m);
            if !position.is_finite() {
                continue;
            }

            let score = score_emitter(listener, position);
            if score > best_score {
                best_score = score;
                best = Some(EmitterCandidate {
                    k,
                    m,
                    position,
                    score,
                });
            }
        }
    }

    best.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving_listener() -> ListenerKinematics {
        let mut listener = ListenerKinematics::new();
        listener.set_controls(1.0, 0.5); // toward +X
        listener
    }

    #[test]
    fn approaching_beats_receding() {
        let mut listener = moving_listener();
        let near_ahead = score_emitter(&listener, Vec2::new(10.0, 0.0));

        listener.set_controls(1.0, 1.0); // toward -X
        let far_behind = score_emitter(&listener, Vec2::new(50.0, 0.0));

        assert!(near_ahead > far_behind);
    }

    #[test]
    fn symmetric_emitters_score_equal_on_axis_dominates() {
        let listener = moving_listener();

        let above = score_emitter(&listener, Vec2::new(10.0, 5.0));
        let below = score_emitter(&listener, Vec2::new(10.0, -5.0));
        let on_axis = score_emitter(&listener, Vec2::new(10.0, 0.0));

        assert!((above - below).abs() < 1e-12);
        assert!(on_axis > above);
    }

    #[test]
    fn ranking_prefers_close_and_aligned() {
        let listener = moving_listener();

        let ahead = score_emitter(&listener, Vec2::new(10.0, 0.0));
        let off_axis = score_emitter(&listener, Vec2::new(12.0, 4.0));
        let far = score_emitter(&listener, Vec2::new(30.0, 0.0));

        assert!(ahead > off_axis);
        assert!(off_axis > far);
    }

    #[test]
    fn score_is_deterministic() {
        let mut listener = ListenerKinematics::new();
        listener.set_controls(0.7, 0.33);
        let emitter = Vec2::new(5.0, -3.0);

        let first = score_emitter(&listener, emitter);
        for _ in 0..4 {
            assert_eq!(first.to_bits(), score_emitter(&listener, emitter).to_bits());
        }
    }

    #[test]
    fn window_scan_picks_emitter_ahead() {
        let listener = moving_listener();
        let lattice = EmitterLattice::from_controls(1.0, 0.5); // x_{k,m} = (k, m)

        let best = find_best_in_window(&listener, &lattice, -1, 1, 0, 0);
        assert_eq!((best.k, best.m), (1, 0));
    }

    #[test]
    fn window_scan_on_axis_dominates_symmetric_pair() {
        let listener = moving_listener();
        let lattice = EmitterLattice::from_controls(1.0, 0.5);

        let best = find_best_in_window(&listener, &lattice, 1, 1, -1, 1);
        assert_eq!((best.k, best.m), (1, 0));
        assert!(best.score.is_finite());
    }

    #[test]
    fn inverted_window_returns_default() {
        let listener = moving_listener();
        let lattice = EmitterLattice::from_controls(1.0, 0.5);

        for (k_min, k_max, m_min, m_max) in [(2, 1, 0, 0), (0, 0, 3, -3)] {
            let best = find_best_in_window(&listener, &lattice, k_min, k_max, m_min, m_max);
            assert_eq!(best, EmitterCandidate::default());
            assert_eq!(best.score, 0.0);
        }
    }

    #[test]
    fn tie_keeps_first_in_row_major_order() {
        // Zero density collapses every k onto the same line, so all three
        // candidates in this window share one position and one score. The
        // scan visits k = -1 first and strict-greater keeps it.
        let listener = ListenerKinematics::new();
        let line = EmitterLattice::from_controls(0.0, 0.5);

        let best = find_best_in_window(&listener, &line, -1, 1, 1, 1);
        assert_eq!((best.k, best.m), (-1, 1));
    }

    #[test]
    fn repeated_scans_are_bit_identical() {
        let listener = moving_listener();
        let lattice = EmitterLattice::from_controls(0.5, 0.3);

        let a = find_best_in_window(&listener, &lattice, -2, 2, -2, 2);
        let b = find_best_in_window(&listener, &lattice, -2, 2, -2, 2);
        assert_eq!((a.k, a.m), (b.k, b.m));
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }
}
