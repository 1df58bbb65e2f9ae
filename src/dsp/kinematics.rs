use crate::dsp::vec2::Vec2;

/*
Listener Kinematics
===================

The listener is a point moving through the emitter plane. Two normalized
controller inputs steer it:

  speed_norm    0.0 .. 1.0, scaled by MAX_LISTENER_SPEED into world units/s.

  heading_norm  0.0 .. 1.0, mapped onto a full turn:

                    theta = 2*pi * heading_norm - pi

                0.0 -> -pi (facing -X), 0.5 -> 0 (facing +X), 1.0 -> +pi.

Integration is plain forward Euler once per audio block:

    position += velocity * dt
    time     += dt

which is exact here because velocity is constant within a block (controls
are only applied at block boundaries).

Prediction is linear extrapolation from the *instantaneous* velocity:

    predicted(h) = position + velocity * h

deliberately not re-integrated, so scoring a candidate emitter is O(1).
*/

/// Maximum listener speed in world units per second (speed_norm = 1.0).
pub const MAX_LISTENER_SPEED: f64 = 1.0;

/// Listener position/time state plus the live motion controls.
///
/// Owned exclusively by one voice. Position and time only move inside
/// `advance`/`advance_time`; `reset` puts the listener back at the origin at
/// t = 0 (called at note-on).
#[derive(Debug, Clone)]
pub struct ListenerKinematics {
    position: Vec2,
    time: f64,
    speed_norm: f64,
    heading_norm: f64,
}

impl ListenerKinematics {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            time: 0.0,
            speed_norm: 0.0,
            heading_norm: 0.5, // facing +X
        }
    }

    /// Store the normalized motion controls. No side effects: the controls
    /// only matter the next time `advance` or a prediction runs.
    pub fn set_controls(&mut self, speed_norm: f64, heading_norm: f64) {
        self.speed_norm = speed_norm;
        self.heading_norm = heading_norm;
    }

    /// Heading angle in radians: `2π·heading − π`.
    pub fn heading_angle(&self) -> f64 {
        core::f64::consts::TAU * self.heading_norm - core::f64::consts::PI
    }

    /// Speed in world units per second.
    pub fn speed(&self) -> f64 {
        MAX_LISTENER_SPEED * self.speed_norm
    }

    /// Unit direction vector for the current heading.
    pub fn unit_vector(&self) -> Vec2 {
        let theta = self.heading_angle();
        Vec2::new(theta.cos(), theta.sin())
    }

    /// Instantaneous velocity vector.
    pub fn velocity(&self) -> Vec2 {
        self.unit_vector() * self.speed()
    }

    /// Integrate position and time forward by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.position += self.velocity() * dt;
        self.time += dt;
    }

    /// Advance time only, leaving the position frozen.
    pub fn advance_time(&mut self, dt: f64) {
        self.time += dt;
    }

    /// Linear extrapolation of the position `horizon` seconds ahead.
    pub fn predicted_position(&self, horizon: f64) -> Vec2 {
        self.position + self.velocity() * horizon
    }

    /// Listener time `horizon` seconds ahead.
    pub fn predicted_time(&self, horizon: f64) -> f64 {
        self.time + horizon
    }

    /// Back to the origin at t = 0. Controls are preserved.
    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.time = 0.0;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Diagnostic override of the position.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Diagnostic override of the time accumulator.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

impl Default for ListenerKinematics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn heading_mapping_covers_full_turn() {
        let mut k = ListenerKinematics::new();

        k.set_controls(0.0, 0.5);
        assert!(k.heading_angle().abs() < 1e-12);

        k.set_controls(0.0, 0.0);
        assert!((k.heading_angle() + PI).abs() < 1e-12);

        k.set_controls(0.0, 1.0);
        assert!((k.heading_angle() - PI).abs() < 1e-12);

        k.set_controls(0.0, 0.25);
        assert!((k.heading_angle() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn speed_maps_linearly() {
        let mut k = ListenerKinematics::new();
        for (norm, expected) in [(0.0, 0.0), (0.25, 0.25), (1.0, MAX_LISTENER_SPEED)] {
            k.set_controls(norm, 0.5);
            assert!((k.speed() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn unit_vector_tracks_heading() {
        let mut k = ListenerKinematics::new();

        k.set_controls(0.0, 0.5);
        let u = k.unit_vector();
        assert!((u.x - 1.0).abs() < 1e-12 && u.y.abs() < 1e-12);

        k.set_controls(0.0, 0.25);
        let u = k.unit_vector();
        assert!(u.x.abs() < 1e-12 && (u.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn advance_integrates_position_and_time() {
        let mut k = ListenerKinematics::new();
        k.set_controls(0.5, 0.5); // 0.5 units/s along +X

        for _ in 0..3 {
            k.advance(0.01);
        }

        assert!((k.time() - 0.03).abs() < 1e-12);
        assert!((k.position().x - 0.015).abs() < 1e-12);
        assert!(k.position().y.abs() < 1e-12);
    }

    #[test]
    fn advance_time_freezes_position() {
        let mut k = ListenerKinematics::new();
        k.set_controls(1.0, 0.5);
        k.advance_time(2.0);

        assert!((k.time() - 2.0).abs() < 1e-12);
        assert_eq!(k.position(), Vec2::ZERO);
    }

    #[test]
    fn prediction_uses_instantaneous_velocity() {
        let mut k = ListenerKinematics::new();
        k.set_controls(1.0, 0.5);
        k.advance(1.0); // at (1, 0), t = 1

        let p = k.predicted_position(2.0);
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!((k.predicted_time(2.0) - 3.0).abs() < 1e-12);

        // Zero horizon is the current state.
        assert_eq!(k.predicted_position(0.0), k.position());
    }

    #[test]
    fn reset_preserves_controls() {
        let mut k = ListenerKinematics::new();
        k.set_controls(0.7, 0.1);
        k.advance(5.0);
        k.reset();

        assert_eq!(k.position(), Vec2::ZERO);
        assert_eq!(k.time(), 0.0);
        assert!((k.speed() - 0.7).abs() < 1e-12);
    }
}
