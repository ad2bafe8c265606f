use photonkd::{BoundingBox, KdTree, KdTreeError, Point};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn corner_points() -> Vec<[f64; 3]> {
    vec![[0.0, 0.0, 0.0], [5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 5.0]]
}

fn sorted(mut points: Vec<[f64; 3]>) -> Vec<[f64; 3]> {
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());
    points
}

#[test]
fn test_in_order_round_trip() {
    let bounds = BoundingBox::new([0.0; 3], [10.0; 3]);
    let mut rng = StdRng::seed_from_u64(11);
    let mut points = bounds.random_points(333, &mut rng);
    // A few exact duplicates must survive as separate entries.
    points.extend_from_slice(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]);

    let tree = KdTree::build(points.clone(), bounds);
    let traversed: Vec<[f64; 3]> = tree.in_order().into_iter().copied().collect();
    assert_eq!(traversed.len(), points.len());
    assert_eq!(sorted(traversed), sorted(points));
}

#[test]
fn test_scenario_range() {
    let tree = KdTree::build(corner_points(), BoundingBox::new([-10.0; 3], [10.0; 3]));
    let found = tree.range(&BoundingBox::new([-1.0; 3], [1.0; 3]));
    assert_eq!(found.len(), 1);
    assert_eq!(*found[0], [0.0, 0.0, 0.0]);
}

#[test]
fn test_scenario_k_nearest() {
    let tree = KdTree::build(corner_points(), BoundingBox::new([-10.0; 3], [10.0; 3]));
    let found = tree.k_nearest(&[1.0, 1.0, 1.0], 2);
    assert_eq!(found.len(), 2);
    assert_eq!(*found[0].point, [0.0, 0.0, 0.0]);
    assert!((found[0].distance - 1.732).abs() < 1e-3);
    // Every axis point lies at sqrt(16 + 1 + 1) from (1, 1, 1).
    assert!(corner_points()[1..].contains(found[1].point));
    assert!((found[1].distance - 4.243).abs() < 1e-3);
}

#[test]
fn test_clone_is_independent() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let mut rng = StdRng::seed_from_u64(5);
    let original = KdTree::build(bounds.random_points(100, &mut rng), bounds);
    let before: Vec<[f64; 3]> = original.in_order().into_iter().copied().collect();

    let mut copy = original.clone();
    let copied: Vec<[f64; 3]> = copy.in_order().into_iter().copied().collect();
    assert_eq!(copied, before);
    assert_eq!(copy.depth(), original.depth());
    assert_eq!(copy.region(), original.region());

    copy.clear();
    assert!(copy.is_empty());
    assert_eq!(original.len(), 100);

    // Replacing the clone with a rebuilt tree leaves the original untouched too.
    copy = KdTree::build(vec![[0.5; 3]], bounds);
    assert_eq!(copy.len(), 1);
    drop(copy);
    let after: Vec<[f64; 3]> = original.in_order().into_iter().copied().collect();
    assert_eq!(after, before);
}

#[test]
fn test_empty_tree_queries() {
    let tree: KdTree<[f64; 3], 3> = KdTree::build(Vec::new(), BoundingBox::new([0.0; 3], [1.0; 3]));
    assert!(tree.is_empty());
    assert!(tree.nearest(&[0.5; 3]).is_none());
    assert!(tree.k_nearest(&[0.5; 3], 4).is_empty());
    assert!(tree.range(&BoundingBox::new([0.0; 3], [1.0; 3])).is_empty());

    let default: KdTree<[f64; 2], 2> = KdTree::default();
    assert!(default.is_empty());
    assert!(KdTree::<[f64; 3], 3>::from_points(Vec::new()).is_empty());
}

#[test]
fn test_balanced_depth() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let mut rng = StdRng::seed_from_u64(9);
    for n in [1usize, 2, 3, 7, 8, 1000, 4095, 4096] {
        let tree = KdTree::build(bounds.random_points(n, &mut rng), bounds);
        let expected = (usize::BITS - n.leading_zeros()) as usize;
        assert_eq!(tree.depth(), expected, "n = {}", n);
    }
}

#[test]
fn test_from_points_uses_enclosing_region() {
    let tree = KdTree::from_points(corner_points());
    let region = tree.region().unwrap();
    assert_eq!(region.min, [0.0; 3]);
    assert_eq!(region.max, [5.0; 3]);
}

#[test]
fn test_from_flat() {
    let bounds = BoundingBox::new([0.0; 2], [1.0; 2]);
    let tree = KdTree::from_flat(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], bounds).unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(*tree.nearest(&[0.3, 0.4]).unwrap().point, [0.3, 0.4]);

    match KdTree::from_flat(&[0.1, 0.2, 0.3], bounds) {
        Err(KdTreeError::FlatLength { len, dim }) => {
            assert_eq!((len, dim), (3, 2));
        }
        other => panic!("expected a length error, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn test_batches_match_sequential() {
    let bounds = BoundingBox::new([-1.0; 3], [1.0; 3]);
    let mut rng = StdRng::seed_from_u64(21);
    let tree = KdTree::build(bounds.random_points(2000, &mut rng), bounds);
    let queries = bounds.random_points(300, &mut rng);

    let nearest = tree.nearest_batch(&queries);
    let k_nearest = tree.k_nearest_batch(&queries, 6);
    for (i, q) in queries.iter().enumerate() {
        let single = tree.nearest(q).unwrap();
        let batched = nearest[i].unwrap();
        assert_eq!(single.point, batched.point);
        assert_eq!(single.distance, batched.distance);

        let single: Vec<f64> = tree.k_nearest(q, 6).iter().map(|n| n.distance).collect();
        let batched: Vec<f64> = k_nearest[i].iter().map(|n| n.distance).collect();
        assert_eq!(single, batched);
    }
}

#[test]
fn test_shared_across_threads() {
    let bounds = BoundingBox::new([0.0; 3], [1.0; 3]);
    let mut rng = StdRng::seed_from_u64(77);
    let points = bounds.random_points(1000, &mut rng);
    let tree = KdTree::build(points.clone(), bounds);

    std::thread::scope(|s| {
        for t in 0..4 {
            let tree = &tree;
            let points = &points;
            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(t);
                for _ in 0..100 {
                    let q = bounds.random_point(&mut rng);
                    let best = points.iter().map(|p| p.distance(&q)).fold(f64::INFINITY, f64::min);
                    assert_eq!(tree.nearest(&q).unwrap().distance, best);
                }
            });
        }
    });
}

#[derive(Clone, Debug, PartialEq)]
struct Sample {
    position: [f64; 3],
    id: usize,
}

impl Point<3> for Sample {
    fn coordinate(&self, axis: usize) -> f64 {
        self.position[axis]
    }
}

#[test]
fn test_custom_payload_and_mixed_queries() {
    let samples: Vec<Sample> = corner_points()
        .into_iter()
        .enumerate()
        .map(|(id, position)| Sample { position, id })
        .collect();
    let tree = KdTree::from_points(samples);

    // Query with a bare array against stored samples.
    assert_eq!(tree.nearest(&[4.0, 0.5, 0.0]).unwrap().point.id, 1);
    // Query with a sample against stored samples.
    let probe = Sample { position: [0.0, 4.0, 0.0], id: 99 };
    assert_eq!(tree.nearest(&probe).unwrap().point.id, 2);

    let mut ids: Vec<usize> = tree.range(&BoundingBox::new([0.0; 3], [0.0, 5.0, 5.0])).iter().map(|s| s.id).collect();
    ids.sort();
    assert_eq!(ids, vec![0, 2, 3]);
}
