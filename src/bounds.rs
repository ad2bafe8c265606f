use crate::error::KdTreeError;
use crate::point::Point;
use rand::Rng;

/// Generic axis-aligned bounding box for N-dimensional space.
///
/// Used as the build region of a [`KdTree`](crate::KdTree), as the informational
/// region of every node, and as the closed query box of range searches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Like [`BoundingBox::new`], but rejects boxes where `min[axis] > max[axis]`.
    pub fn try_new(min: [f64; D], max: [f64; D]) -> Result<Self, KdTreeError> {
        for axis in 0..D {
            if !(min[axis] <= max[axis]) {
                return Err(KdTreeError::InvertedRegion { axis, min: min[axis], max: max[axis] });
            }
        }
        Ok(Self { min, max })
    }

    /// The smallest box containing every point, or `None` for an empty set.
    pub fn enclosing<'a, P, I>(points: I) -> Option<Self>
    where
        P: Point<D> + 'a,
        I: IntoIterator<Item = &'a P>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = [0.0; D];
        for (axis, v) in min.iter_mut().enumerate() {
            *v = first.coordinate(axis);
        }
        let mut max = min;

        for p in iter {
            for axis in 0..D {
                let v = p.coordinate(axis);
                if v < min[axis] { min[axis] = v; }
                if v > max[axis] { max[axis] = v; }
            }
        }
        Some(Self { min, max })
    }

    /// Closed containment test on every axis.
    pub fn contains<P: Point<D> + ?Sized>(&self, point: &P) -> bool {
        (0..D).all(|axis| {
            let v = point.coordinate(axis);
            v >= self.min[axis] && v <= self.max[axis]
        })
    }

    /// Copy of this box with `max[axis]` replaced by `value`.
    pub fn clip_max(&self, axis: usize, value: f64) -> Self {
        let mut b = *self;
        b.max[axis] = value;
        b
    }

    /// Copy of this box with `min[axis]` replaced by `value`.
    pub fn clip_min(&self, axis: usize, value: f64) -> Self {
        let mut b = *self;
        b.min[axis] = value;
        b
    }

    /// Samples a point uniformly inside the box.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; D] {
        let mut p = [0.0; D];
        for (axis, v) in p.iter_mut().enumerate() {
            *v = self.min[axis] + rng.r#gen::<f64>() * (self.max[axis] - self.min[axis]);
        }
        p
    }

    /// Samples `count` points uniformly inside the box.
    pub fn random_points<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<[f64; D]> {
        (0..count).map(|_| self.random_point(rng)).collect()
    }
}
