use crate::bounds::BoundingBox;
use crate::error::KdTreeError;
use crate::point::{AxisOrder, ByCoordinate, Point};
use rayon::prelude::*;
use std::fmt;
use std::marker::PhantomData;

/// Child link meaning "no subtree".
const NONE: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct KdNode<const D: usize> {
    // Informational only, searches prune on the split plane.
    region: BoundingBox<D>,
    left: u32,
    right: u32,
    // Index of the representative (median) point in `KdTree::points`.
    point: u32,
    axis: usize,
}

/// A stored point returned by a query, together with its distance to the query.
#[derive(Debug)]
pub struct Neighbor<'a, P> {
    pub point: &'a P,
    pub distance: f64,
}

impl<P> Clone for Neighbor<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Neighbor<'_, P> {}

/// A balanced kd-tree built once over a static point set.
///
/// Nodes live in a flat arena and reference their children by index. The points
/// are owned by the tree and permuted in place during the build, each node
/// referring to its median by position. Children are pushed before their parent,
/// so the root is always the last node.
///
/// The tree is immutable once built: queries take `&self` and keep all their
/// working state local, so a built tree can be shared across threads freely.
pub struct KdTree<P, const D: usize, C = ByCoordinate> {
    nodes: Vec<KdNode<D>>,
    points: Vec<P>,
    order: PhantomData<fn() -> C>,
}

impl<P: Point<D>, const D: usize> KdTree<P, D> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            points: Vec::new(),
            order: PhantomData,
        }
    }

    /// Builds a tree over `points` ordered by [`ByCoordinate`].
    ///
    /// `region` is the bounding region of the root; it is clipped at every split
    /// and kept per node for inspection.
    pub fn build(points: Vec<P>, region: BoundingBox<D>) -> Self {
        Self::build_ordered(points, region)
    }

    /// Builds a tree whose root region is the enclosing box of `points`.
    pub fn from_points(points: Vec<P>) -> Self {
        match BoundingBox::enclosing(&points) {
            Some(region) => Self::build(points, region),
            None => Self::new(),
        }
    }
}

impl<const D: usize> KdTree<[f64; D], D> {
    /// Builds a tree from interleaved coordinates `[x0, y0, z0, x1, y1, z1, ...]`.
    pub fn from_flat(coords: &[f64], region: BoundingBox<D>) -> Result<Self, KdTreeError> {
        if D == 0 || coords.len() % D != 0 {
            return Err(KdTreeError::FlatLength { len: coords.len(), dim: D });
        }
        let points = coords
            .chunks_exact(D)
            .map(|c| {
                let mut p = [0.0; D];
                p.copy_from_slice(c);
                p
            })
            .collect();
        Ok(Self::build(points, region))
    }
}

impl<P: Point<D>, const D: usize, C> KdTree<P, D, C> {
    /// Builds a tree using the axis ordering policy `C` to find medians.
    ///
    /// At depth `d` the split axis is `d % D`. Each subset is stably sorted along
    /// that axis and the element at `len / 2` becomes the node; the elements
    /// before it form the left subtree and the ones after it the right subtree.
    /// Equal keys keep their relative input order.
    ///
    /// A zero-dimensional tree has no split axis and is rejected at compile time:
    ///
    /// ```compile_fail
    /// use photonkd::{BoundingBox, KdTree};
    /// let tree = KdTree::<[f64; 0], 0>::build(vec![[]], BoundingBox::new([], []));
    /// ```
    pub fn build_ordered(mut points: Vec<P>, region: BoundingBox<D>) -> Self
    where
        C: AxisOrder<D, P>,
    {
        const { assert!(D > 0, "a kd-tree needs at least one axis") };
        debug_assert!(points.len() < NONE as usize);
        let mut nodes = Vec::with_capacity(points.len());
        build_recursive::<P, D, C>(&mut points, 0, region, 0, &mut nodes);

        let tree = Self {
            nodes,
            points,
            order: PhantomData,
        };
        log::debug!("built kd-tree over {} points, depth {}", tree.len(), tree.depth());
        tree
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Stored points in arena order (unspecified, but stable for a given tree).
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Region the tree was built over, `None` when empty.
    pub fn region(&self) -> Option<&BoundingBox<D>> {
        self.nodes.last().map(|n| &n.region)
    }

    /// Number of levels; 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.root().map_or(0, |root| self.depth_recursive(root))
    }

    fn depth_recursive(&self, node_idx: u32) -> usize {
        if node_idx == NONE {
            return 0;
        }
        let node = &self.nodes[node_idx as usize];
        1 + self.depth_recursive(node.left).max(self.depth_recursive(node.right))
    }

    /// Drops every node and point, leaving an empty tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.points.clear();
    }

    fn root(&self) -> Option<u32> {
        if self.nodes.is_empty() {
            None
        } else {
            Some((self.nodes.len() - 1) as u32)
        }
    }

    /// Finds the stored point closest to `query`.
    ///
    /// Returns `None` only for an empty tree. When several points are equally
    /// close, the first one met during the traversal wins.
    pub fn nearest<Q: Point<D> + ?Sized>(&self, query: &Q) -> Option<Neighbor<'_, P>> {
        let root = self.root()?;
        let mut best = None;
        let mut radius = f64::INFINITY;
        self.nearest_recursive(root, query, &mut best, &mut radius);
        best.map(|i| Neighbor { point: &self.points[i], distance: radius })
    }

    fn nearest_recursive<Q: Point<D> + ?Sized>(
        &self,
        node_idx: u32,
        query: &Q,
        best: &mut Option<usize>,
        radius: &mut f64,
    ) {
        if node_idx == NONE {
            return;
        }
        let node = &self.nodes[node_idx as usize];
        let point = &self.points[node.point as usize];

        let dist = query.distance(point);
        if dist < *radius {
            *radius = dist;
            *best = Some(node.point as usize);
        }

        let q = query.coordinate(node.axis);
        let s = point.coordinate(node.axis);
        let (first, second, query_left) = visit_order(node, q, s);

        self.nearest_recursive(first, query, best, radius);
        if sibling_reachable(q, s, *radius, query_left) {
            self.nearest_recursive(second, query, best, radius);
        }
    }

    /// Finds up to `k` stored points closest to `query`, in ascending distance.
    ///
    /// Fewer than `k` points are returned when the tree holds fewer; `k == 0`
    /// yields an empty result.
    pub fn k_nearest<Q: Point<D> + ?Sized>(&self, query: &Q, k: usize) -> Vec<Neighbor<'_, P>> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let mut candidates = Vec::with_capacity(k.min(self.len()) + 1);
        self.k_nearest_recursive(root, query, k, &mut candidates);
        candidates
            .into_iter()
            .map(|(i, distance)| Neighbor { point: &self.points[i], distance })
            .collect()
    }

    fn k_nearest_recursive<Q: Point<D> + ?Sized>(
        &self,
        node_idx: u32,
        query: &Q,
        k: usize,
        candidates: &mut Vec<(usize, f64)>,
    ) {
        if node_idx == NONE {
            return;
        }
        let node = &self.nodes[node_idx as usize];
        let point = &self.points[node.point as usize];

        let dist = query.distance(point);
        if candidates.len() < k {
            insert_candidate(candidates, node.point as usize, dist);
        } else if dist < candidates[k - 1].1 {
            insert_candidate(candidates, node.point as usize, dist);
            candidates.pop();
        }

        let q = query.coordinate(node.axis);
        let s = point.coordinate(node.axis);
        let (first, second, query_left) = visit_order(node, q, s);

        self.k_nearest_recursive(first, query, k, candidates);
        // The first subtree may have tightened the radius.
        if sibling_reachable(q, s, pruning_radius(candidates, k), query_left) {
            self.k_nearest_recursive(second, query, k, candidates);
        }
    }

    /// Collects every stored point inside the closed box `region`, in no particular order.
    pub fn range(&self, region: &BoundingBox<D>) -> Vec<&P> {
        let mut found = Vec::new();
        if let Some(root) = self.root() {
            self.range_recursive(root, region, &mut found);
        }
        found
    }

    fn range_recursive<'a>(&'a self, node_idx: u32, region: &BoundingBox<D>, found: &mut Vec<&'a P>) {
        if node_idx == NONE {
            return;
        }
        let node = &self.nodes[node_idx as usize];
        let point = &self.points[node.point as usize];

        if region.contains(point) {
            found.push(point);
        }

        let axis = node.axis;
        let v = point.coordinate(axis);
        if v >= region.min[axis] && v <= region.max[axis] {
            // The box straddles the split plane.
            self.range_recursive(node.left, region, found);
            self.range_recursive(node.right, region, found);
        } else if v >= region.max[axis] {
            self.range_recursive(node.left, region, found);
        } else if v <= region.min[axis] {
            self.range_recursive(node.right, region, found);
        }
    }

    /// Points in in-order sequence (left subtree, node, right subtree).
    pub fn in_order(&self) -> Vec<&P> {
        let mut out = Vec::with_capacity(self.len());
        if let Some(root) = self.root() {
            self.in_order_recursive(root, &mut out);
        }
        out
    }

    fn in_order_recursive<'a>(&'a self, node_idx: u32, out: &mut Vec<&'a P>) {
        if node_idx == NONE {
            return;
        }
        let node = &self.nodes[node_idx as usize];
        self.in_order_recursive(node.left, out);
        out.push(&self.points[node.point as usize]);
        self.in_order_recursive(node.right, out);
    }
}

impl<P: Point<D> + Sync, const D: usize, C> KdTree<P, D, C> {
    /// Runs [`KdTree::nearest`] for every query in parallel.
    pub fn nearest_batch<Q: Point<D> + Sync>(&self, queries: &[Q]) -> Vec<Option<Neighbor<'_, P>>> {
        queries.par_iter().map(|q| self.nearest(q)).collect()
    }

    /// Runs [`KdTree::k_nearest`] for every query in parallel.
    pub fn k_nearest_batch<Q: Point<D> + Sync>(&self, queries: &[Q], k: usize) -> Vec<Vec<Neighbor<'_, P>>> {
        queries.par_iter().map(|q| self.k_nearest(q, k)).collect()
    }
}

impl<P: Point<D>, const D: usize> Default for KdTree<P, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone, const D: usize, C> Clone for KdTree<P, D, C> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            points: self.points.clone(),
            order: PhantomData,
        }
    }
}

impl<P: Point<D> + fmt::Display, const D: usize, C> fmt::Display for KdTree<P, D, C> {
    /// Writes the points one per line in in-order sequence. Debugging aid only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "tree is empty");
        }
        for p in self.in_order() {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}

fn build_recursive<P, const D: usize, C>(
    points: &mut [P],
    offset: usize,
    region: BoundingBox<D>,
    depth: usize,
    nodes: &mut Vec<KdNode<D>>,
) -> u32
where
    P: Point<D>,
    C: AxisOrder<D, P>,
{
    if points.is_empty() {
        return NONE;
    }

    let axis = depth % D;
    log::trace!("depth {}: partitioning {} points on axis {}", depth, points.len(), axis);

    points.sort_by(|a, b| C::cmp(axis, a, b));
    let m = points.len() / 2;
    let split = points[m].coordinate(axis);

    let (lower, rest) = points.split_at_mut(m);
    let upper = &mut rest[1..];

    let left = build_recursive::<P, D, C>(lower, offset, region.clip_max(axis, split), depth + 1, nodes);
    let right = build_recursive::<P, D, C>(upper, offset + m + 1, region.clip_min(axis, split), depth + 1, nodes);

    let node_idx = nodes.len() as u32;
    nodes.push(KdNode {
        region,
        left,
        right,
        point: (offset + m) as u32,
        axis,
    });
    node_idx
}

/// Children in visiting order plus whether the query lies on the left side.
#[inline]
fn visit_order<const D: usize>(node: &KdNode<D>, q: f64, s: f64) -> (u32, u32, bool) {
    if q <= s {
        (node.left, node.right, true)
    } else {
        (node.right, node.left, false)
    }
}

/// Whether the ball of `radius` around the query may reach across the split plane.
///
/// Crossing to the right is strict, crossing to the left is not. Either way a
/// point exactly on the ball's surface can never beat the current best.
#[inline]
fn sibling_reachable(q: f64, s: f64, radius: f64, query_left: bool) -> bool {
    if query_left {
        q + radius > s
    } else {
        q - radius <= s
    }
}

#[inline]
fn pruning_radius(candidates: &[(usize, f64)], k: usize) -> f64 {
    if candidates.len() < k {
        f64::INFINITY
    } else {
        candidates[k - 1].1
    }
}

/// Inserts after every candidate with a distance `<= dist`, keeping the list sorted.
#[inline]
fn insert_candidate(candidates: &mut Vec<(usize, f64)>, index: usize, dist: f64) {
    let pos = candidates.partition_point(|&(_, d)| d <= dist);
    candidates.insert(pos, (index, dist));
}
