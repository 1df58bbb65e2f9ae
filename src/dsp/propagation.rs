use crate::dsp::kinematics::ListenerKinematics;
use crate::dsp::vec2::Vec2;

/*
Retarded Time
=============

Sound travels at a finite speed, so what the listener hears *now* left its
emitter earlier. For a listener at time t and an emitter at distance r:

    t_ret = t - r / c

t_ret <= t always holds for r >= 0, strictly so for r > 0. As the listener
approaches an emitter, r shrinks and t_ret catches up faster than wall
clock; receding stretches it out. That differential rate is the Doppler
effect, and the synthesis loop gets it for free by evaluating every source
waveform at t_ret instead of t.

The predictive variant asks the same question about a moment `horizon`
seconds ahead, using the kinematics' linear extrapolation. Non-finite
inputs propagate unchanged; the selector filters candidates before scoring.
*/

/// Propagation speed in world units per second.
pub const SPEED_OF_SOUND: f64 = 343.0;

/// Euclidean distance between listener and emitter positions.
pub fn distance(listener: Vec2, emitter: Vec2) -> f64 {
    listener.distance_to(emitter)
}

/// The time at which a signal now arriving departed an emitter `distance`
/// units away.
pub fn retarded_time(listener_time: f64, distance: f64) -> f64 {
    listener_time - distance / SPEED_OF_SOUND
}

/// Retarded time for the listener's predicted state `horizon` seconds ahead.
pub fn predictive_retarded_time(
    listener: &ListenerKinematics,
    horizon: f64,
    emitter: Vec2,
) -> f64 {
    let predicted = listener.predicted_position(horizon);
    retarded_time(listener.predicted_time(horizon), distance(predicted, emitter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean_norm() {
        assert!((distance(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert!((distance(Vec2::ZERO, Vec2::new(-2.0, 2.0)) - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn retarded_time_never_exceeds_listener_time() {
        for r in [0.0, 0.5, 10.0, 10_000.0] {
            let t_ret = retarded_time(1.0, r);
            assert!(t_ret <= 1.0);
            if r > 0.0 {
                assert!(t_ret < 1.0);
            }
        }
        assert!((retarded_time(1.0, 10_000.0) - (1.0 - 10_000.0 / 343.0)).abs() < 1e-9);
    }

    #[test]
    fn approaching_emitter_advances_retarded_time() {
        let mut listener = ListenerKinematics::new();
        listener.set_controls(1.0, 0.5); // toward +X
        let emitter = Vec2::new(10.0, 0.0);

        listener.advance(1.0);
        let tr0 = retarded_time(listener.time(), distance(listener.position(), emitter));

        listener.advance(1.0);
        let tr1 = retarded_time(listener.time(), distance(listener.position(), emitter));

        assert!(tr1 > tr0);
        // Approaching: retarded time gains on wall clock.
        assert!((tr1 - tr0) > 1.0);
    }

    #[test]
    fn receding_emitter_slows_retarded_time() {
        let mut listener = ListenerKinematics::new();
        listener.set_controls(1.0, 1.0); // toward -X, away from the emitter
        let emitter = Vec2::new(10.0, 0.0);

        listener.advance(1.0);
        let tr0 = retarded_time(listener.time(), distance(listener.position(), emitter));

        listener.advance(1.0);
        let tr1 = retarded_time(listener.time(), distance(listener.position(), emitter));

        // Still increases, but more slowly than listener time.
        assert!(tr1 > tr0);
        assert!((tr1 - tr0) < 1.0);
    }

    #[test]
    fn predictive_variant_matches_direct_formula() {
        let mut listener = ListenerKinematics::new();
        listener.set_controls(1.0, 0.5);
        listener.advance(1.0); // at (1, 0), t = 1

        let emitter = Vec2::new(10.0, 0.0);
        let horizon = 2.0;

        let predicted = listener.predicted_position(horizon);
        let expected =
            (listener.time() + horizon) - distance(predicted, emitter) / SPEED_OF_SOUND;

        let actual = predictive_retarded_time(&listener, horizon, emitter);
        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn non_finite_inputs_propagate() {
        let listener = ListenerKinematics::new();
        assert!(predictive_retarded_time(&listener, 0.0, Vec2::new(f64::NAN, 0.0)).is_nan());
        assert!(
            predictive_retarded_time(&listener, 0.0, Vec2::new(f64::INFINITY, 0.0))
                == f64::NEG_INFINITY
        );
    }
}
