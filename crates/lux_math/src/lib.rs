//! Math primitives for the lux path tracer.
//!
//! Re-exports glam for vector types and adds the ray-tracing specific
//! pieces on top: rays, intervals, bounding boxes, orthonormal bases and
//! closed-form polynomial root solvers.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod onb;
mod ray;
pub mod roots;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use transform::{Axis, Mat4Ext};
