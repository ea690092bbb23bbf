//! Ear-clipping triangulation of planar polygons.
//!
//! A polygon arrives as its corner positions in file order. The clipper
//! walks the corners, treating each one as a candidate "ear" together with
//! its two neighbors, and cuts the first ear it finds until three corners
//! remain. The [`Winding`] tells the clipper which way the corners turn
//! when seen from the side the reference normal points to.

use lux_math::Vec3;

/// Order in which a face lists its corners, seen from its front side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Winding {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl Winding {
    /// Direction of travel from a candidate to its "right" neighbor.
    fn step(self) -> isize {
        match self {
            Winding::Clockwise => 1,
            Winding::CounterClockwise => -1,
        }
    }

    /// Orient a Newell normal (counter-clockwise by construction) so the
    /// polygon winds in this direction around it.
    pub fn orient(self, newell: Vec3) -> Vec3 {
        match self {
            Winding::Clockwise => -newell,
            Winding::CounterClockwise => newell,
        }
    }
}

/// Newell's polygon normal. Its length is twice the polygon's area and it
/// points to the side from which the corners run counter-clockwise.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Normal used by the ear test.
///
/// The sum of the face's declared vertex normals wins when there is one;
/// otherwise the Newell normal oriented by `winding`.
pub fn reference_normal(points: &[Vec3], declared: &[Vec3], winding: Winding) -> Vec3 {
    let sum: Vec3 = declared.iter().copied().sum();
    if sum.length_squared() > 1e-12 {
        sum.normalize()
    } else {
        winding.orient(newell_normal(points)).normalize_or_zero()
    }
}

/// Triangulate a polygon, returning corner index triples into `points`.
///
/// Always yields `points.len() - 2` triangles (none for fewer than three
/// corners). Each triangle lists its corners in the polygon's own order.
/// When no ear exists (degenerate or self-intersecting input) the current
/// candidate is clipped regardless and a warning is logged.
pub fn triangulate(points: &[Vec3], normal: Vec3, winding: Winding) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let step = winding.step();
    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);

    let mut t = 0usize;
    let mut misses = 0usize;

    while remaining.len() > 3 {
        let len = remaining.len();
        let left = wrap(t as isize - step, len);
        let right = wrap(t as isize + step, len);

        let p_t = points[remaining[t]];
        let p_left = points[remaining[left]];
        let p_right = points[remaining[right]];

        let ear = is_convex(p_t, p_right, p_left, normal)
            && !remaining.iter().enumerate().any(|(i, &corner)| {
                i != t && i != left && i != right && in_triangle(p_left, p_t, p_right, points[corner])
            });

        if ear || misses >= len {
            if !ear {
                log::warn!(
                    "No ear found among {} remaining corners, clipping corner {} anyway",
                    len,
                    remaining[t]
                );
            }
            let prev = wrap(t as isize - 1, len);
            let next = wrap(t as isize + 1, len);
            triangles.push([remaining[prev], remaining[t], remaining[next]]);
            remaining.remove(t);
            t = 0;
            misses = 0;
        } else {
            t = (t + 1) % len;
            misses += 1;
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

#[inline]
fn wrap(i: isize, len: usize) -> usize {
    i.rem_euclid(len as isize) as usize
}

/// The corner turns the declared way around `normal`.
fn is_convex(center: Vec3, right: Vec3, left: Vec3, normal: Vec3) -> bool {
    (right - center).cross(center - left).dot(normal) > 0.0
}

/// `p` lies strictly inside triangle `abc`.
///
/// Dotting each edge cross product with the triangle normal discards the
/// off-plane component of `p`, which is the same as projecting it first.
fn in_triangle(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> bool {
    let n = (b - a).cross(c - a);
    (b - a).cross(p - a).dot(n) > 0.0
        && (c - b).cross(p - b).dot(n) > 0.0
        && (a - c).cross(p - c).dot(n) > 0.0
}
