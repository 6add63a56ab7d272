// ts-core/src/geo.rs

use uom::si::f64::Length as UomLength;
use uom::si::length::meter;

use crate::numeric::Real;

pub type Length = UomLength;

#[inline]
pub fn m(v: f64) -> Length {
    Length::new::<meter>(v)
}

#[inline]
pub fn to_m(l: Length) -> f64 {
    l.get::<meter>()
}

/// Planar position of a stop or station, in metres on the snapshot's local grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x_m: Real,
    pub y_m: Real,
}

impl Location {
    pub const fn new(x_m: Real, y_m: Real) -> Self {
        Self { x_m, y_m }
    }

    pub fn is_finite(&self) -> bool {
        self.x_m.is_finite() && self.y_m.is_finite()
    }

    /// Straight-line distance to `other`.
    pub fn distance(&self, other: &Location) -> Length {
        m((self.x_m - other.x_m).hypot(self.y_m - other.y_m))
    }

    pub fn within(&self, other: &Location, radius: Length) -> bool {
        self.distance(other) <= radius
    }
}

/// Running midpoint of a sequence of points: each point halves the distance
/// from the current midpoint. `None` for an empty slice.
pub fn midpoint(points: &[Location]) -> Option<Location> {
    let (first, rest) = points.split_first()?;
    Some(rest.iter().fold(*first, |mid, p| {
        Location::new((mid.x_m + p.x_m) / 2.0, (mid.y_m + p.y_m) / 2.0)
    }))
}
