use crate::coords::{Vec2, Vec3};

/// Destination rectangle of a quad in device space plus its depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DestQuad {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub z: f32,
}

impl DestQuad {
    /// Corner positions in winding order (top-left, top-right, bottom-right, bottom-left).
    pub fn corners(self) -> [Vec3; 4] {
        [
            Vec3::new(self.x1, self.y1, self.z),
            Vec3::new(self.x2, self.y1, self.z),
            Vec3::new(self.x2, self.y2, self.z),
            Vec3::new(self.x1, self.y2, self.z),
        ]
    }
}

/// The effective 2D transform applied to target-space draw calls.
///
/// Positions are scaled per axis; sizes are scaled uniformly by `size_scale`
/// so quads keep their aspect ratio under stretch scaling.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform2 {
    pub scale: Vec2,
    pub size_scale: f32,
    pub offset: Vec2,
}

impl Transform2 {
    pub const IDENTITY: Transform2 = Transform2 {
        scale: Vec2::new(1.0, 1.0),
        size_scale: 1.0,
        offset: Vec2::new(0.0, 0.0),
    };

    /// Target-space position mapped into device space. `z` passes through.
    #[inline]
    pub fn scaled_pos(&self, pos: Vec3) -> Vec3 {
        Vec3::new(
            self.offset.x + pos.x * self.scale.x,
            self.offset.y + pos.y * self.scale.y,
            pos.z,
        )
    }

    pub fn dest_quad(&self, pos: Vec3, size: Vec2) -> DestQuad {
        let p = self.scaled_pos(pos);
        DestQuad {
            x1: p.x,
            y1: p.y,
            x2: p.x + size.x * self.size_scale,
            y2: p.y + size.y * self.size_scale,
            z: p.z,
        }
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_through() {
        let q = Transform2::IDENTITY.dest_quad(Vec3::new(10.0, 20.0, 1.0), Vec2::new(5.0, 6.0));
        assert_eq!(q, DestQuad { x1: 10.0, y1: 20.0, x2: 15.0, y2: 26.0, z: 1.0 });
    }

    #[test]
    fn stretch_scales_position_per_axis_and_size_uniformly() {
        let t = Transform2 {
            scale: Vec2::new(3.0, 2.0),
            size_scale: 2.0,
            offset: Vec2::new(100.0, 0.0),
        };
        let q = t.dest_quad(Vec3::flat(10.0, 10.0), Vec2::new(4.0, 4.0));
        assert_eq!(q.x1, 130.0);
        assert_eq!(q.y1, 20.0);
        assert_eq!(q.x2, 138.0);
        assert_eq!(q.y2, 28.0);
    }

    #[test]
    fn corners_wind_clockwise_from_top_left() {
        let c = DestQuad { x1: 0.0, y1: 0.0, x2: 1.0, y2: 2.0, z: 0.5 }.corners();
        assert_eq!(c[0], Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(c[1], Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(c[2], Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(c[3], Vec3::new(0.0, 2.0, 0.5));
    }
}
