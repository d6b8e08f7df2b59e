use crate::geometry::Rect;

/// A 2D affine transform stored as the top two rows of a 3x3 matrix.
///
/// Layout is row-major `[a, b, tx, c, d, ty]`, mapping a point as
/// `x' = a*x + b*y + tx` and `y' = c*x + d*y + ty`. Recorded lists capture
/// one of these per child drawable so the child can be replayed in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub data: [f32; 6],
}

impl Transform {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, // row 1
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            data: [
                1.0, 0.0, x, // row 0
                0.0, 1.0, y, // row 1
            ],
        }
    }

    /// Rotation around the origin, in radians.
    pub fn rotate(angle_radians: f32) -> Self {
        let (sin, cos) = angle_radians.sin_cos();
        Self {
            data: [
                cos, -sin, 0.0, // row 0
                sin, cos, 0.0, // row 1
            ],
        }
    }

    pub fn rotate_degrees(angle_degrees: f32) -> Self {
        Self::rotate(angle_degrees.to_radians())
    }

    pub fn scale(s: f32) -> Self {
        Self::scale_xy(s, s)
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, // row 0
                0.0, sy, 0.0, // row 1
            ],
        }
    }

    /// Compose this transform with another: `self * other`.
    /// Applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let [a1, b1, tx1, c1, d1, ty1] = self.data;
        let [a2, b2, tx2, c2, d2, ty2] = other.data;

        Transform {
            data: [
                a1 * a2 + b1 * c2,
                a1 * b2 + b1 * d2,
                a1 * tx2 + b1 * ty2 + tx1,
                c1 * a2 + d1 * c2,
                c1 * b2 + d1 * d2,
                c1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }

    /// Inverse of this transform. A degenerate matrix inverts to identity.
    pub fn inverse(&self) -> Transform {
        let [a, b, tx, c, d, ty] = self.data;

        let det = a * d - b * c;
        if det.abs() < 1e-10 {
            return Self::IDENTITY;
        }
        let inv_det = 1.0 / det;

        Transform {
            data: [
                d * inv_det,
                -b * inv_det,
                (-d * tx + b * ty) * inv_det,
                -c * inv_det,
                a * inv_det,
                (c * tx - a * ty) * inv_det,
            ],
        }
    }

    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, tx, c, d, ty] = self.data;
        (a * x + b * y + tx, c * x + d * y + ty)
    }

    /// Bounding box of `rect` after mapping its four corners.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        if rect.is_empty() {
            return Rect::ZERO;
        }
        let corners = [
            self.transform_point(rect.x, rect.y),
            self.transform_point(rect.right(), rect.y),
            self.transform_point(rect.x, rect.bottom()),
            self.transform_point(rect.right(), rect.bottom()),
        ];

        let (mut left, mut top) = corners[0];
        let (mut right, mut bottom) = corners[0];
        for &(x, y) in &corners[1..] {
            left = left.min(x);
            top = top.min(y);
            right = right.max(x);
            bottom = bottom.max(y);
        }
        Rect::from_ltrb(left, top, right, bottom)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when the transform only offsets (no scale, rotation or skew).
    pub fn is_translate_only(&self) -> bool {
        let [a, b, _, c, d, _] = self.data;
        a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert!(t.is_identity());
        assert!(t.is_translate_only());
    }

    #[test]
    fn test_translate() {
        let t = Transform::translate(10.0, 20.0);
        let (x, y) = t.transform_point(5.0, 5.0);
        assert!(approx_eq(x, 15.0));
        assert!(approx_eq(y, 25.0));
        assert!(t.is_translate_only());
    }

    #[test]
    fn test_rotate() {
        let t = Transform::rotate_degrees(90.0);
        let (x, y) = t.transform_point(1.0, 0.0);
        assert!(approx_eq(x, 0.0));
        assert!(approx_eq(y, 1.0));
        assert!(!t.is_translate_only());
    }

    #[test]
    fn test_compose() {
        // Point (0,0) -> translate -> (10,0) -> scale -> (20,0)
        let composed = Transform::scale(2.0).then(&Transform::translate(10.0, 0.0));
        let (x, y) = composed.transform_point(0.0, 0.0);
        assert!(approx_eq(x, 20.0));
        assert!(approx_eq(y, 0.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::translate(3.0, -7.0)
            .then(&Transform::rotate_degrees(30.0))
            .then(&Transform::scale_xy(2.0, 0.5));
        let (x, y) = t.then(&t.inverse()).transform_point(3.0, 4.0);
        assert!(approx_eq(x, 3.0));
        assert!(approx_eq(y, 4.0));
    }

    #[test]
    fn test_degenerate_inverse_is_identity() {
        assert!(Transform::scale(0.0).inverse().is_identity());
    }

    #[test]
    fn test_map_rect() {
        let t = Transform::translate(10.0, 10.0).then(&Transform::scale(2.0));
        let mapped = t.map_rect(&Rect::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(mapped, Rect::new(10.0, 10.0, 10.0, 10.0));

        let rotated = Transform::rotate_degrees(90.0).map_rect(&Rect::new(0.0, 0.0, 4.0, 2.0));
        assert!(approx_eq(rotated.x, -2.0));
        assert!(approx_eq(rotated.width, 2.0));
        assert!(approx_eq(rotated.height, 4.0));
    }
}
