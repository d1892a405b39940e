use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Pose: position + (u, v, w) orientation, radians
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,    // x, y, z (scenario distance units)
    pub orientation: Vector3<f64>, // u, v, w (rad)
}

impl Pose {
    pub fn new(x: f64, y: f64, z: f64, u: f64, v: f64, w: f64) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            orientation: Vector3::new(u, v, w),
        }
    }

    /// Build a pose from `[x, y, z, u, v, w]` with angles in degrees.
    pub fn from_degrees(c: [f64; 6]) -> Self {
        Self::new(
            c[0],
            c[1],
            c[2],
            c[3].to_radians(),
            c[4].to_radians(),
            c[5].to_radians(),
        )
    }

    pub fn x(&self) -> f64 { self.position.x }
    pub fn y(&self) -> f64 { self.position.y }
    pub fn z(&self) -> f64 { self.position.z }
    pub fn u(&self) -> f64 { self.orientation.x }
    pub fn v(&self) -> f64 { self.orientation.y }
    pub fn w(&self) -> f64 { self.orientation.z }

    /// Same position, orientation rotated by a mounting offset.
    pub fn offset_by(&self, mounting: &Vector3<f64>) -> Pose {
        Pose {
            position: self.position,
            orientation: self.orientation + mounting,
        }
    }

    /// Components in flight-log column order.
    pub fn components(&self) -> [f64; 6] {
        [self.x(), self.y(), self.z(), self.u(), self.v(), self.w()]
    }

    pub fn from_components(c: [f64; 6]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4], c[5])
    }
}
