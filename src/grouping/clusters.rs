//! Visual-similarity and proximity clustering: icon sets plus the
//! fallback strategies for whatever earlier passes left unclaimed.

use super::{union_bounds, Arrangement, DetectedRegion, Group, GroupKind, GroupingConfig, RegionKind};

fn variance(values: &[f32]) -> f32 {
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32
}

fn unclaimed_objects(regions: &[DetectedRegion], claimed: &[bool]) -> Vec<usize> {
    (0..regions.len())
        .filter(|&i| !claimed[i] && regions[i].kind == RegionKind::Object)
        .collect()
}

/// Greedy single-pass clustering: each unvisited candidate seeds a
/// cluster and pulls in every later-considered candidate the predicate
/// accepts against the *seed*. Every candidate is considered exactly
/// once, so the outcome depends only on input order.
fn greedy_clusters(
    candidates: &[usize],
    accepts: impl Fn(usize, usize) -> bool,
) -> Vec<Vec<usize>> {
    let mut clusters = Vec::new();
    let mut visited = vec![false; candidates.len()];

    for (seed_pos, &seed) in candidates.iter().enumerate() {
        if visited[seed_pos] {
            continue;
        }
        visited[seed_pos] = true;
        let mut cluster = vec![seed];
        for (other_pos, &other) in candidates.iter().enumerate() {
            if visited[other_pos] {
                continue;
            }
            if accepts(seed, other) {
                visited[other_pos] = true;
                cluster.push(other);
            }
        }
        if cluster.len() >= 2 {
            clusters.push(cluster);
        }
    }
    clusters
}

fn similar(
    regions: &[DetectedRegion],
    a: usize,
    b: usize,
    size_tolerance: f32,
    aspect_tolerance: f32,
) -> bool {
    let (ra, rb) = (regions[a].bounds, regions[b].bounds);
    let (area_a, area_b) = (ra.area(), rb.area());
    let (aspect_a, aspect_b) = (ra.aspect(), rb.aspect());
    let size_diff = (area_a - area_b).abs() / area_a.max(area_b);
    let aspect_diff = (aspect_a - aspect_b).abs() / aspect_a.max(aspect_b);
    size_diff <= size_tolerance && aspect_diff <= aspect_tolerance
}

/// Strategy 4: icon sets — small, near-square objects of similar size,
/// labeled with their arrangement (row, column or grid) from the variance
/// of member centers.
pub(super) fn icon_sets(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let candidates: Vec<usize> = unclaimed_objects(regions, claimed)
        .into_iter()
        .filter(|&i| {
            let b = regions[i].bounds;
            let squareness = (b.width() - b.height()).abs() / b.width().max(b.height());
            b.area() < config.icon_max_area && squareness < config.icon_squareness
        })
        .collect();

    let clusters = greedy_clusters(&candidates, |a, b| {
        similar(
            regions,
            a,
            b,
            config.icon_size_tolerance,
            config.icon_aspect_tolerance,
        )
    });

    clusters
        .into_iter()
        .map(|members| {
            let xs: Vec<f32> = members.iter().map(|&i| regions[i].bounds.center().0).collect();
            let ys: Vec<f32> = members.iter().map(|&i| regions[i].bounds.center().1).collect();
            let arrangement = if variance(&ys) < config.arrangement_variance {
                Arrangement::Horizontal
            } else if variance(&xs) < config.arrangement_variance {
                Arrangement::Vertical
            } else {
                Arrangement::Grid
            };

            for &index in &members {
                claimed[index] = true;
            }
            Group {
                kind: GroupKind::IconSet,
                bounds: union_bounds(regions, &members),
                container: None,
                text: None,
                label: None,
                line_count: None,
                arrangement: Some(arrangement),
                members,
            }
        })
        .collect()
}

/// Strategy 5a: cluster leftover objects whose centers sit within 50 px.
pub(super) fn proximity_groups(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let candidates = unclaimed_objects(regions, claimed);
    let clusters = greedy_clusters(&candidates, |a, b| {
        regions[a].bounds.center_distance(&regions[b].bounds) <= config.proximity_distance
    });

    clusters
        .into_iter()
        .map(|members| {
            for &index in &members {
                claimed[index] = true;
            }
            Group {
                kind: GroupKind::Proximity,
                bounds: union_bounds(regions, &members),
                container: None,
                text: None,
                label: None,
                line_count: None,
                arrangement: None,
                members,
            }
        })
        .collect()
}

/// Strategy 5b: cluster whatever remains by area and aspect similarity.
pub(super) fn similarity_groups(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let candidates = unclaimed_objects(regions, claimed);
    let clusters = greedy_clusters(&candidates, |a, b| {
        similar(regions, a, b, config.size_tolerance, config.aspect_tolerance)
    });

    clusters
        .into_iter()
        .map(|members| {
            for &index in &members {
                claimed[index] = true;
            }
            Group {
                kind: GroupKind::SimilarObjects,
                bounds: union_bounds(regions, &members),
                container: None,
                text: None,
                label: None,
                line_count: None,
                arrangement: None,
                members,
            }
        })
        .collect()
}
