//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Uses a binary tree structure for efficient ray-scene intersection testing.
//! Nodes share their primitives through `Arc`, so the same object can sit
//! in a scene list and a tree at once.

use std::sync::Arc;

use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 2;

/// BVH node - either a branch with two children or a leaf with primitives.
///
/// Using an enum keeps traversal free of dynamic dispatch until a leaf
/// is reached.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with one or two primitives.
    Leaf {
        objects: Vec<Arc<dyn Hittable>>,
        bbox: Aabb,
    },
    /// Empty node (for edge cases).
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Objects with an empty bounding box (an empty mesh, say) can never
    /// be hit and are left out, so every node's box stays finite.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        let before = objects.len();
        objects.retain(|o| !o.bounding_box().is_empty());
        if objects.len() < before {
            log::debug!("Skipping {} objects with empty bounds", before - objects.len());
        }

        if objects.is_empty() {
            return BvhNode::Empty;
        }
        let count = objects.len();
        let node = Self::build(objects);
        log::debug!(
            "Built BVH over {} primitives: {} nodes, depth {}",
            count,
            node.node_count(),
            node.depth()
        );
        node
    }

    pub fn from_list(list: HittableList) -> Self {
        Self::new(list.into_objects())
    }

    /// Recursive BVH construction.
    ///
    /// Simple median-split approach: sort objects by centroid on the axis
    /// where the centroids spread widest, split in half, recurse.
    fn build(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        let n = objects.len();

        let bounds = objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::surrounding(&acc, &o.bounding_box()));

        // Create leaf for small sets
        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        // Choose split axis based on centroid spread
        let axis = Aabb::enclosing(objects.iter().map(|o| o.bounding_box().centroid()))
            .longest_axis();

        let key = |o: &Arc<dyn Hittable>| -> f32 { centroid_on(o.bounding_box().centroid(), axis) };
        objects.sort_unstable_by(|a, b| key(a).total_cmp(&key(b)));

        // Split at midpoint
        let right_objects = objects.split_off(n / 2);
        let left_objects = objects;

        let left = Self::build(left_objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Number of nodes in the tree, leaves included.
    pub fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[inline]
fn centroid_on(centroid: Vec3, axis: usize) -> f32 {
    match axis {
        0 => centroid.x,
        1 => centroid.y,
        _ => centroid.z,
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest: Option<HitRecord<'a>> = None;
                for obj in objects {
                    let window = ray_t.with_max(closest.map_or(ray_t.max, |rec| rec.t));
                    if let Some(rec) = obj.hit(ray, window, rng) {
                        closest = Some(rec);
                    }
                }
                closest
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t, rng);

                // Only check right up to closest hit
                let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(ray, ray_t.with_max(right_max), rng);

                hit_right.or(hit_left)
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
