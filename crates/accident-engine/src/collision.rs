//! Pairwise collision geometry

use std::collections::BTreeSet;

use frame::BoundingBox;
use tracing::debug;

use crate::context::FrameContext;
use crate::EngineConfig;

/// Boxes with clearly different silhouettes, both large enough to judge.
///
/// Separates head-on or side impacts from bumper-to-bumper queues.
pub fn orientation_mismatch(a: &BoundingBox, b: &BoundingBox, config: &EngineConfig) -> bool {
    let (Some(ar_a), Some(ar_b)) = (a.aspect_ratio(), b.aspect_ratio()) else {
        return false;
    };
    let min_dim = config.orientation_min_dimension;
    (ar_a - ar_b).abs() > config.orientation_aspect_diff
        && a.width().min(a.height()) > min_dim
        && b.width().min(b.height()) > min_dim
}

/// Colliding pairs `(i, j)` with `i < j` among collision vehicles.
///
/// Static-like scenes need a large overlap, an orientation mismatch and a
/// damage flag on either vehicle. Dynamic scenes need a moderate overlap and
/// crash motion on either vehicle.
pub fn colliding_pairs(ctx: &FrameContext<'_>, config: &EngineConfig) -> BTreeSet<(usize, usize)> {
    let vehicles: Vec<usize> = ctx
        .indices_where(|det| det.detection.class.is_collision_vehicle())
        .collect();
    let static_rule = ctx.scene.is_static_like();

    let mut pairs = BTreeSet::new();
    for (n, &i) in vehicles.iter().enumerate() {
        for &j in &vehicles[n + 1..] {
            let a = &ctx.detections[i];
            let b = &ctx.detections[j];
            let iou = a.detection.bbox.iou(&b.detection.bbox);

            let colliding = if static_rule {
                iou > config.static_collision_iou
                    && orientation_mismatch(&a.detection.bbox, &b.detection.bbox, config)
                    && (ctx.structural(i).is_flagged() || ctx.structural(j).is_flagged())
            } else {
                iou > config.dynamic_collision_iou
                    && (a.kinematics.is_crash_motion() || b.kinematics.is_crash_motion())
            };

            if colliding {
                debug!(i, j, iou, scene = %ctx.scene, "collision pair");
                pairs.insert((i, j));
            }
        }
    }
    pairs
}
