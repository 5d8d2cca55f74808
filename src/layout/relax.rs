use crate::config::LayoutConfig;
use crate::workflow::Position;

const COINCIDENT_EPSILON: f64 = 0.01;

/// Damped pairwise relaxation. Runs exactly `config.relax_passes` passes; each
/// pass pushes apart pairs closer than `min_distance`, pulls slightly together
/// pairs between `min_distance` and `preferred_distance`, then pulls nodes
/// that strayed more than `max_vertical_spread` from the mean y partway back.
pub(super) fn optimize_positions(positions: &mut [Position], config: &LayoutConfig) {
    if positions.len() < 2 {
        return;
    }
    for _ in 0..config.relax_passes {
        separate_pairs(positions, config);
        bound_vertical_spread(positions, config);
    }
}

fn separate_pairs(positions: &mut [Position], config: &LayoutConfig) {
    let count = positions.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let dx = positions[j].x - positions[i].x;
            let dy = positions[j].y - positions[i].y;
            let distance = (dx * dx + dy * dy).sqrt();

            let (ux, uy) = if distance > COINCIDENT_EPSILON {
                (dx / distance, dy / distance)
            } else {
                // No usable angle; separate vertically, alternating by pair.
                (0.0, if (i + j) % 2 == 0 { 1.0 } else { -1.0 })
            };

            if distance < config.min_distance {
                let push = (config.min_distance - distance) / 2.0;
                positions[i].x -= ux * push;
                positions[i].y -= uy * push;
                positions[j].x += ux * push;
                positions[j].y += uy * push;
            } else if distance < config.preferred_distance {
                let pull = (distance - config.min_distance) * config.attraction / 2.0;
                positions[i].x += ux * pull;
                positions[i].y += uy * pull;
                positions[j].x -= ux * pull;
                positions[j].y -= uy * pull;
            }
        }
    }
}

fn bound_vertical_spread(positions: &mut [Position], config: &LayoutConfig) {
    let mean_y = positions.iter().map(|p| p.y).sum::<f64>() / positions.len() as f64;
    for position in positions.iter_mut() {
        let deviation = position.y - mean_y;
        let excess = deviation.abs() - config.max_vertical_spread;
        if excess > 0.0 {
            position.y -= deviation.signum() * excess * config.vertical_pullback;
        }
    }
}
