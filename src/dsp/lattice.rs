use crate::dsp::vec2::Vec2;

/*
Emitter Lattice
===============

Virtual emitters sit on a regular 2-D grid indexed by two integers:

    position(k, m) = k * delta_perp * n(phi)  +  m * DELTA_PAR * b(phi)

where

  phi           lattice rotation, mapped from a normalized control the same
                way the listener heading is: phi = 2*pi*orientation - pi.

  n(phi)        lattice normal   ( cos phi,  sin phi)
  b(phi)        lattice tangent  (-sin phi,  cos phi)

  delta_perp    spacing along the normal, 1 / density. Density 0 would give
                an infinite spacing; instead of letting IEEE infinity leak
                into the multiply (0 * inf = NaN for k = 0) the zero-density
                case is a distinct variant that contributes exactly zero
                displacement along the normal. Only m varies then: the
                lattice collapses to a single line through the origin.

  DELTA_PAR     spacing along the tangent, fixed at 1.0 world unit.

The whole type is immutable after construction: controls are sampled once at
note-on and a fresh lattice is built for the note.
*/

/// Spacing along the lattice normal.
///
/// `SingleLine` is the density-0 case: every k maps onto k = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerpSpacing {
    SingleLine,
    Spaced(f64),
}

/// Spacing along the lattice tangent, in world units.
pub const LATTICE_TANGENT_SPACING: f64 = 1.0;

/// Immutable per-note lattice geometry.
#[derive(Debug, Clone, Copy)]
pub struct EmitterLattice {
    normal: Vec2,
    tangent: Vec2,
    perp: PerpSpacing,
}

impl EmitterLattice {
    /// Build a lattice from the normalized density and orientation controls.
    pub fn from_controls(density_norm: f64, orientation_norm: f64) -> Self {
        let phi = core::f64::consts::TAU * orientation_norm - core::f64::consts::PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        let perp = if density_norm > 0.0 {
            PerpSpacing::Spaced(1.0 / density_norm)
        } else {
            PerpSpacing::SingleLine
        };

        Self {
            normal: Vec2::new(cos_phi, sin_phi),
            tangent: Vec2::new(-sin_phi, cos_phi),
            perp,
        }
    }

    /// World position of the emitter at lattice index (k, m).
    pub fn position(&self, k: i32, m: i32) -> Vec2 {
        let along_tangent = self.tangent * (f64::from(m) * LATTICE_TANGENT_SPACING);

        match self.perp {
            // k contributes exactly zero displacement: no 0 * inf.
            PerpSpacing::SingleLine => along_tangent,
            PerpSpacing::Spaced(delta_perp) => {
                along_tangent + self.normal * (f64::from(k) * delta_perp)
            }
        }
    }

    /// Lattice normal n(φ).
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Lattice tangent b(φ).
    pub fn tangent(&self) -> Vec2 {
        self.tangent
    }

    /// Spacing along the normal; `+∞` for the single-line case.
    pub fn delta_perp(&self) -> f64 {
        match self.perp {
            PerpSpacing::SingleLine => f64::INFINITY,
            PerpSpacing::Spaced(delta_perp) => delta_perp,
        }
    }
}
