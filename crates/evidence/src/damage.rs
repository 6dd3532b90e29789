//! Structural damage from localised edge disruption

use frame::{ObjectClass, Region};
use tracing::trace;

use crate::contrast::clahe;
use crate::edges::EdgeMap;
use crate::EvidenceConfig;

/// Contrast-enhanced edge map of a region
pub fn enhanced_edges(region: &Region<'_>, thresholds: (f32, f32), config: &EvidenceConfig) -> EdgeMap {
    let gray = clahe(&region.to_gray_image(), config.clahe_clip_limit, config.clahe_tiles);
    EdgeMap::detect(&gray, thresholds.0, thresholds.1)
}

/// Decide damage from a prepared edge map.
///
/// Returns the density that triggered the decision, or `None`.
pub fn assess_edges(edges: &EdgeMap, class: ObjectClass, is_static: bool, config: &EvidenceConfig) -> Option<f32> {
    if !edges.is_localized(config.localized_dominance, config.localized_floor) {
        return None;
    }

    // Damage visible at rest shows up in a single quadrant
    if is_static {
        if let Some(q) = edges
            .quadrant_densities()
            .and_then(|qs| qs.into_iter().find(|&d| d > config.static_quadrant_density))
        {
            return Some(q);
        }
    }

    let mut threshold = if is_static {
        config.static_damage_density
    } else {
        config.dynamic_damage_density
    };
    if class == ObjectClass::Bus {
        threshold += config.bus_damage_bonus;
    }

    let density = edges.density();
    trace!(density, threshold, "damage density");
    (density > threshold).then_some(density)
}

/// Structural damage check on a vehicle region
pub fn assess_damage(region: &Region<'_>, class: ObjectClass, is_static: bool, config: &EvidenceConfig) -> Option<f32> {
    let edges = enhanced_edges(region, config.damage_canny, config);
    assess_edges(&edges, class, is_static, config)
}
