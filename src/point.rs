use std::cmp::Ordering;

/// Capability a payload must provide to be stored in a [`KdTree`](crate::KdTree).
///
/// The dimensionality is fixed at compile time through `D`. Only coordinate access
/// is required; the Euclidean distance has a default implementation that works
/// against any other `Point<D>`, so a photon can be measured against a bare
/// `[f64; 3]` query position and vice versa.
pub trait Point<const D: usize> {
    /// Returns the coordinate along `axis`, with `axis < D`.
    fn coordinate(&self, axis: usize) -> f64;

    /// Number of axes.
    fn dimensionality(&self) -> usize {
        D
    }

    /// Euclidean distance to `other`.
    fn distance<Q: Point<D> + ?Sized>(&self, other: &Q) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..D {
            let d = self.coordinate(axis) - other.coordinate(axis);
            d2 += d * d;
        }
        d2.sqrt()
    }
}

impl<const D: usize> Point<D> for [f64; D] {
    #[inline]
    fn coordinate(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl<const D: usize, P: Point<D> + ?Sized> Point<D> for &P {
    #[inline]
    fn coordinate(&self, axis: usize) -> f64 {
        (**self).coordinate(axis)
    }

    fn distance<Q: Point<D> + ?Sized>(&self, other: &Q) -> f64 {
        (**self).distance(other)
    }
}

/// Per-axis ordering policy, used only while building the tree to find medians.
///
/// Searches assume the left subtree holds coordinates `<=` the split and the
/// right subtree `>=` it, so an implementation must agree with ascending
/// [`Point::coordinate`] order. It only decides how equal coordinates are ranked.
pub trait AxisOrder<const D: usize, P: Point<D>> {
    /// Orders `a` and `b` along `axis`.
    fn cmp(axis: usize, a: &P, b: &P) -> Ordering;
}

/// Default policy: orders by [`Point::coordinate`] using the IEEE total order,
/// so NaN coordinates sort last instead of poisoning the sort.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByCoordinate;

impl<const D: usize, P: Point<D>> AxisOrder<D, P> for ByCoordinate {
    #[inline]
    fn cmp(axis: usize, a: &P, b: &P) -> Ordering {
        a.coordinate(axis).total_cmp(&b.coordinate(axis))
    }
}
