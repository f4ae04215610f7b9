//! UI component detection: buttons and cards.

use super::{union_bounds, DetectedRegion, Group, GroupKind, GroupingConfig, RegionKind};

/// Strategy 2: button-shaped objects with nearby text.
///
/// A button is wider than tall (aspect above 1.5) and moderately sized;
/// its label is every unclaimed text region whose center lies within
/// 100 px of the object's center. Objects with no nearby text are not
/// buttons.
pub(super) fn buttons(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let mut groups = Vec::new();

    for i in 0..regions.len() {
        if claimed[i] || regions[i].kind != RegionKind::Object {
            continue;
        }
        let bounds = regions[i].bounds;
        let (width, height) = (bounds.width(), bounds.height());
        if bounds.aspect() <= config.button_min_aspect
            || width < config.button_min_width
            || width > config.button_max_width
            || height < config.button_min_height
            || height > config.button_max_height
        {
            continue;
        }

        let nearby: Vec<usize> = (0..regions.len())
            .filter(|&j| {
                !claimed[j]
                    && regions[j].kind == RegionKind::TextWord
                    && bounds.center_distance(&regions[j].bounds) < config.button_text_distance
            })
            .collect();
        if nearby.is_empty() {
            continue;
        }

        let label = nearby
            .iter()
            .filter_map(|&j| regions[j].text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");

        let mut members = Vec::with_capacity(nearby.len() + 1);
        members.push(i);
        members.extend(&nearby);
        for &index in &members {
            claimed[index] = true;
        }

        groups.push(Group {
            kind: GroupKind::Button,
            bounds: union_bounds(regions, &members),
            container: None,
            text: None,
            label: Some(label),
            line_count: None,
            arrangement: None,
            members,
        });
    }
    groups
}

/// Strategy 3: large containers with at least two members fully inside.
pub(super) fn cards(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let mut groups = Vec::new();

    for i in 0..regions.len() {
        if claimed[i] || regions[i].kind != RegionKind::Object {
            continue;
        }
        let container = regions[i].bounds;
        if container.area() <= config.card_min_area {
            continue;
        }

        let members: Vec<usize> = (0..regions.len())
            .filter(|&j| j != i && !claimed[j] && container.contains(&regions[j].bounds))
            .collect();
        if members.len() < config.card_min_members {
            continue;
        }

        claimed[i] = true;
        for &index in &members {
            claimed[index] = true;
        }

        let mut all = members.clone();
        all.push(i);
        groups.push(Group {
            kind: GroupKind::Card,
            bounds: union_bounds(regions, &all),
            container: Some(i),
            text: None,
            label: None,
            line_count: None,
            arrangement: None,
            members,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::Rect;

    fn object(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> DetectedRegion {
        DetectedRegion::object(Rect::new(min_x, min_y, max_x, max_y), 0.9)
    }

    fn word(min_x: f32, min_y: f32, max_x: f32, max_y: f32, text: &str) -> DetectedRegion {
        DetectedRegion::text_word(Rect::new(min_x, min_y, max_x, max_y), 0.9, text)
    }

    #[test]
    fn test_button_with_centered_label() {
        let regions = vec![
            object(40.0, 40.0, 140.0, 80.0), // 100x40, aspect 2.5
            word(60.0, 50.0, 120.0, 70.0, "Submit"),
        ];
        let mut claimed = vec![false; regions.len()];
        let groups = buttons(&regions, &mut claimed, &GroupingConfig::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Button);
        assert_eq!(groups[0].label.as_deref(), Some("Submit"));
        assert_eq!(groups[0].members, vec![0, 1]);
        assert!(claimed.iter().all(|&c| c));
    }

    #[test]
    fn test_square_object_is_not_a_button() {
        let regions = vec![
            object(40.0, 40.0, 100.0, 100.0), // aspect 1.0
            word(50.0, 60.0, 90.0, 80.0, "icon"),
        ];
        let mut claimed = vec![false; regions.len()];
        assert!(buttons(&regions, &mut claimed, &GroupingConfig::default()).is_empty());
        assert!(claimed.iter().all(|&c| !c));
    }

    #[test]
    fn test_button_without_text_is_skipped() {
        let regions = vec![object(40.0, 40.0, 140.0, 80.0)];
        let mut claimed = vec![false; 1];
        assert!(buttons(&regions, &mut claimed, &GroupingConfig::default()).is_empty());
    }

    #[test]
    fn test_far_text_is_not_a_label() {
        let regions = vec![
            object(40.0, 40.0, 140.0, 80.0),
            word(300.0, 300.0, 360.0, 320.0, "elsewhere"),
        ];
        let mut claimed = vec![false; regions.len()];
        assert!(buttons(&regions, &mut claimed, &GroupingConfig::default()).is_empty());
    }

    #[test]
    fn test_card_claims_contained_members() {
        let regions = vec![
            object(0.0, 0.0, 200.0, 150.0), // 30000 px container
            object(10.0, 10.0, 60.0, 60.0),
            word(20.0, 100.0, 120.0, 120.0, "caption"),
            object(300.0, 300.0, 340.0, 340.0), // Outside
        ];
        let mut claimed = vec![false; regions.len()];
        let groups = cards(&regions, &mut claimed, &GroupingConfig::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].container, Some(0));
        assert_eq!(groups[0].members, vec![1, 2]);
        assert_eq!(groups[0].bounds, regions[0].bounds);
        assert!(!claimed[3]);
    }

    #[test]
    fn test_card_needs_two_members() {
        let regions = vec![
            object(0.0, 0.0, 200.0, 150.0),
            object(10.0, 10.0, 60.0, 60.0),
        ];
        let mut claimed = vec![false; regions.len()];
        assert!(cards(&regions, &mut claimed, &GroupingConfig::default()).is_empty());
        assert!(claimed.iter().all(|&c| !c));
    }

    #[test]
    fn test_small_container_is_not_a_card() {
        let regions = vec![
            object(0.0, 0.0, 90.0, 90.0), // 8100 px, under the threshold
            object(10.0, 10.0, 30.0, 30.0),
            word(40.0, 40.0, 80.0, 60.0, "x"),
        ];
        let mut claimed = vec![false; regions.len()];
        assert!(cards(&regions, &mut claimed, &GroupingConfig::default()).is_empty());
    }
}
