//! Smart grouping of detected regions.
//!
//! Detection and OCR services hand the editor flat lists of boxes; this
//! module partitions them into semantically meaningful clusters: text
//! blocks, buttons, cards, icon sets, and loose proximity/similarity
//! groups. Five strategies run in a fixed order over an explicit claimed
//! set — a region grabbed by an earlier strategy is invisible to the later
//! ones — so a full pass is deterministic and reproducible. Grouping is a
//! one-shot batch: any change to the input lists requires a re-run.

mod clusters;
mod components;
mod text;

use log::debug;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in image-pixel units (detection space is sub-pixel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Rect {
        Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width() / self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Euclidean distance between box centers.
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// True when `other` lies fully inside this box.
    pub fn contains(&self, other: &Rect) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// What a detection service classified a region as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Object,
    TextWord,
}

/// One externally detected region. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub bounds: Rect,
    pub kind: RegionKind,
    pub confidence: f32,
    /// Recognized string, present for text regions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DetectedRegion {
    pub fn object(bounds: Rect, confidence: f32) -> DetectedRegion {
        DetectedRegion {
            bounds,
            kind: RegionKind::Object,
            confidence,
            text: None,
        }
    }

    pub fn text_word(bounds: Rect, confidence: f32, text: impl Into<String>) -> DetectedRegion {
        DetectedRegion {
            bounds,
            kind: RegionKind::TextWord,
            confidence,
            text: Some(text.into()),
        }
    }
}

/// Parse a detection payload (a JSON array of regions).
pub fn regions_from_json(payload: &str) -> Result<Vec<DetectedRegion>, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Semantic cluster type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    TextBlock,
    Button,
    Card,
    IconSet,
    Proximity,
    SimilarObjects,
}

/// How an icon set's members are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrangement {
    Horizontal,
    Vertical,
    Grid,
}

/// One cluster of detected regions. Members are indices into the region
/// slice the grouping pass ran over; groups reference regions, they never
/// own them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub kind: GroupKind,
    /// Member indices in group-specific order (reading order for text).
    pub members: Vec<usize>,
    /// The containing region for cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<usize>,
    /// Tight union of all member (and container) bounds.
    pub bounds: Rect,
    /// Concatenated text for text blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Joined nearby text for buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Number of merged lines for text blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_count: Option<usize>,
    /// Layout direction for icon sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<Arrangement>,
}

/// Thresholds for all five strategies. Defaults mirror the production
/// heuristics; all distances are image-pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Two text regions share a line when their vertical centers differ
    /// by less than this fraction of their average height.
    pub line_merge_factor: f32,
    /// Consecutive lines merge into a paragraph when the gap is below
    /// this fraction of the previous line's average height.
    pub paragraph_gap_factor: f32,
    /// Max center distance between a button shape and its label text.
    pub button_text_distance: f32,
    /// A button is wider than tall by at least this ratio.
    pub button_min_aspect: f32,
    pub button_min_width: f32,
    pub button_max_width: f32,
    pub button_min_height: f32,
    pub button_max_height: f32,
    /// Containers below this area are never cards.
    pub card_min_area: f32,
    /// Minimum contained members for a card.
    pub card_min_members: usize,
    /// Icons are small...
    pub icon_max_area: f32,
    /// ...and near-square: |w - h| / max(w, h) below this.
    pub icon_squareness: f32,
    pub icon_size_tolerance: f32,
    pub icon_aspect_tolerance: f32,
    /// Center variance below this reads as a row/column arrangement.
    pub arrangement_variance: f32,
    /// Max center distance for proximity clustering.
    pub proximity_distance: f32,
    pub size_tolerance: f32,
    pub aspect_tolerance: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig {
            line_merge_factor: 0.5,
            paragraph_gap_factor: 1.5,
            button_text_distance: 100.0,
            button_min_aspect: 1.5,
            button_min_width: 50.0,
            button_max_width: 300.0,
            button_min_height: 20.0,
            button_max_height: 80.0,
            card_min_area: 10_000.0,
            card_min_members: 2,
            icon_max_area: 5_000.0,
            icon_squareness: 0.3,
            icon_size_tolerance: 0.2,
            icon_aspect_tolerance: 0.15,
            arrangement_variance: 100.0,
            proximity_distance: 50.0,
            size_tolerance: 0.3,
            aspect_tolerance: 0.2,
        }
    }
}

/// Tight union of the bounds of `members`.
fn union_bounds(regions: &[DetectedRegion], members: &[usize]) -> Rect {
    let mut iter = members.iter();
    let first = *iter.next().expect("groups are never empty");
    let mut bounds = regions[first].bounds;
    for &index in iter {
        bounds = bounds.union(&regions[index].bounds);
    }
    bounds
}

/// Partition `regions` into semantic groups.
///
/// Runs the five strategies in order — text blocks, buttons, cards, icon
/// sets, proximity/similarity fallback — each one skipping regions already
/// claimed by an earlier one. Two runs over the same input produce
/// identical groups in identical order. An empty input (detection
/// unavailable or nothing found) produces an empty output.
pub fn group_regions(regions: &[DetectedRegion], config: &GroupingConfig) -> Vec<Group> {
    let mut claimed = vec![false; regions.len()];
    let mut groups = Vec::new();

    groups.extend(text::text_blocks(regions, &mut claimed, config));
    groups.extend(components::buttons(regions, &mut claimed, config));
    groups.extend(components::cards(regions, &mut claimed, config));
    groups.extend(clusters::icon_sets(regions, &mut claimed, config));
    groups.extend(clusters::proximity_groups(regions, &mut claimed, config));
    groups.extend(clusters::similarity_groups(regions, &mut claimed, config));

    debug!(
        "grouping pass: {} regions -> {} groups ({} claimed)",
        regions.len(),
        groups.len(),
        claimed.iter().filter(|&&c| c).count()
    );
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> DetectedRegion {
        DetectedRegion::object(Rect::new(min_x, min_y, max_x, max_y), 0.9)
    }

    fn word(min_x: f32, min_y: f32, max_x: f32, max_y: f32, text: &str) -> DetectedRegion {
        DetectedRegion::text_word(Rect::new(min_x, min_y, max_x, max_y), 0.9, text)
    }

    #[test]
    fn test_empty_input_produces_empty_output() {
        assert!(group_regions(&[], &GroupingConfig::default()).is_empty());
    }

    #[test]
    fn test_grouping_is_deterministic() {
        let regions = vec![
            word(10.0, 10.0, 60.0, 22.0, "Create"),
            word(64.0, 10.0, 120.0, 22.0, "account"),
            object(40.0, 40.0, 140.0, 80.0),
            word(60.0, 50.0, 120.0, 70.0, "Submit"),
            object(200.0, 200.0, 230.0, 230.0),
            object(240.0, 201.0, 270.0, 231.0),
            object(280.0, 199.0, 310.0, 229.0),
            object(500.0, 40.0, 530.0, 90.0),
            object(520.0, 60.0, 550.0, 110.0),
        ];
        let config = GroupingConfig::default();
        let first = group_regions(&regions, &config);
        let second = group_regions(&regions, &config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_strategies_claim_exclusively() {
        // Three small squares in a row: claimed as an icon set, so the
        // proximity and similarity fallbacks must not re-group them.
        let regions = vec![
            object(10.0, 10.0, 40.0, 40.0),
            object(50.0, 11.0, 80.0, 41.0),
            object(90.0, 9.0, 120.0, 39.0),
        ];
        let groups = group_regions(&regions, &GroupingConfig::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::IconSet);
    }

    #[test]
    fn test_regions_from_json_payload() {
        let payload = r#"[
            {"bounds": {"minX": 4.0, "minY": 8.0, "maxX": 100.0, "maxY": 40.0},
             "kind": "object", "confidence": 0.87},
            {"bounds": {"minX": 10.0, "minY": 12.0, "maxX": 60.0, "maxY": 30.0},
             "kind": "text_word", "confidence": 0.93, "text": "Checkout"}
        ]"#;
        let regions = regions_from_json(payload).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].kind, RegionKind::Object);
        assert_eq!(regions[1].text.as_deref(), Some("Checkout"));
        assert_eq!(regions[1].bounds.min_x, 10.0);
    }

    #[test]
    fn test_rect_helpers() {
        let a = Rect::new(0.0, 0.0, 10.0, 4.0);
        let b = Rect::new(2.0, 1.0, 6.0, 3.0);
        assert_eq!(a.area(), 40.0);
        assert_eq!(a.aspect(), 2.5);
        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert_eq!(a.union(&b), a);
        assert_eq!(b.center(), (4.0, 2.0));
    }
}
