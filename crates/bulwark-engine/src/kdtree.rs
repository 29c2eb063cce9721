//! Static KD-tree for nearest-neighbor queries.
//!
//! Built once over a fixed point set; rebuild when the set changes.
//! The coordinate accessor is only needed at build time, so stored items
//! can be arbitrary payloads (tracks, ballistic table rows).

use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct Node<const K: usize> {
    point: [f32; K],
    item: usize,
    axis: usize,
    left: Option<Box<Node<K>>>,
    right: Option<Box<Node<K>>>,
}

/// KD-tree over `K`-dimensional keys extracted from stored items.
#[derive(Debug, Clone)]
pub struct KdTree<T, const K: usize> {
    root: Option<Box<Node<K>>>,
    items: Vec<T>,
}

impl<T, const K: usize> KdTree<T, K> {
    /// Build from a set of items and a coordinate accessor. O(n log n)
    /// via per-level axis sorts.
    pub fn build(items: Vec<T>, accessor: impl Fn(&T) -> [f32; K]) -> Self {
        let mut indexed: Vec<([f32; K], usize)> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (accessor(item), i))
            .collect();
        let root = Self::build_node(&mut indexed, 0);
        Self { root, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn build_node(points: &mut [([f32; K], usize)], depth: usize) -> Option<Box<Node<K>>> {
        if points.is_empty() {
            return None;
        }
        let axis = depth % K;
        points.sort_unstable_by(|a, b| {
            a.0[axis].partial_cmp(&b.0[axis]).unwrap_or(Ordering::Equal)
        });
        let median = points.len() / 2;
        let (point, item) = points[median];
        let (left, rest) = points.split_at_mut(median);
        let right = &mut rest[1..];
        Some(Box::new(Node {
            point,
            item,
            axis,
            left: Self::build_node(left, depth + 1),
            right: Self::build_node(right, depth + 1),
        }))
    }

    /// Nearest stored item to the query under Euclidean distance.
    ///
    /// An empty tree returns the type's default as a "no data" sentinel
    /// rather than an error; callers must treat it defensively.
    pub fn nearest(&self, query: [f32; K]) -> T
    where
        T: Clone + Default,
    {
        let mut best: Option<(f32, usize)> = None;
        if let Some(root) = &self.root {
            Self::search(root, query, &mut best);
        }
        match best {
            Some((_, index)) => self.items[index].clone(),
            None => T::default(),
        }
    }

    fn search(node: &Node<K>, query: [f32; K], best: &mut Option<(f32, usize)>) {
        let dist_sq = distance_squared(&node.point, &query);
        if best.map_or(true, |(b, _)| dist_sq < b) {
            *best = Some((dist_sq, node.item));
        }

        let delta = query[node.axis] - node.point[node.axis];
        let (near, far) = if delta < 0.0 {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };

        if let Some(child) = near {
            Self::search(child, query, best);
        }
        // Explore the sibling only if its hyperplane is closer than the
        // current best.
        if let Some(child) = far {
            if best.map_or(true, |(b, _)| delta * delta < b) {
                Self::search(child, query, best);
            }
        }
    }
}

fn distance_squared<const K: usize>(a: &[f32; K], b: &[f32; K]) -> f32 {
    let mut sum = 0.0;
    for i in 0..K {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}
