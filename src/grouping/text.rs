//! Text block detection: merge recognized words into lines, lines into
//! paragraphs.

use super::{union_bounds, DetectedRegion, Group, GroupKind, GroupingConfig, RegionKind};

fn line_top(regions: &[DetectedRegion], line: &[usize]) -> f32 {
    line.iter()
        .map(|&i| regions[i].bounds.min_y)
        .fold(f32::INFINITY, f32::min)
}

fn line_bottom(regions: &[DetectedRegion], line: &[usize]) -> f32 {
    line.iter()
        .map(|&i| regions[i].bounds.max_y)
        .fold(f32::NEG_INFINITY, f32::max)
}

fn line_avg_height(regions: &[DetectedRegion], line: &[usize]) -> f32 {
    line.iter()
        .map(|&i| regions[i].bounds.height())
        .sum::<f32>()
        / line.len() as f32
}

/// Strategy 1: partition unclaimed text regions into paragraphs.
///
/// Words sort by vertical position; two words share a line when their
/// vertical centers differ by less than half their average height;
/// consecutive lines merge into a paragraph when the gap between them is
/// below 1.5x the previous line's average height. Paragraphs with a
/// single word are left unclaimed — a lone label is more useful to the
/// button detector than as a one-word "block".
pub(super) fn text_blocks(
    regions: &[DetectedRegion],
    claimed: &mut [bool],
    config: &GroupingConfig,
) -> Vec<Group> {
    let mut indices: Vec<usize> = (0..regions.len())
        .filter(|&i| !claimed[i] && regions[i].kind == RegionKind::TextWord)
        .collect();
    if indices.is_empty() {
        return Vec::new();
    }
    indices.sort_by(|&a, &b| {
        regions[a]
            .bounds
            .min_y
            .total_cmp(&regions[b].bounds.min_y)
            .then(a.cmp(&b))
    });

    // Merge into lines.
    let mut lines: Vec<Vec<usize>> = vec![vec![indices[0]]];
    for pair in indices.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let (_, prev_cy) = regions[prev].bounds.center();
        let (_, cur_cy) = regions[cur].bounds.center();
        let avg_height = (regions[prev].bounds.height() + regions[cur].bounds.height()) / 2.0;

        if (cur_cy - prev_cy).abs() < config.line_merge_factor * avg_height {
            lines.last_mut().expect("at least one line").push(cur);
        } else {
            lines.push(vec![cur]);
        }
    }

    // Merge lines into paragraphs.
    let mut paragraphs: Vec<Vec<Vec<usize>>> = vec![vec![lines[0].clone()]];
    for pair in lines.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        let gap = line_top(regions, cur) - line_bottom(regions, prev);
        if gap < config.paragraph_gap_factor * line_avg_height(regions, prev) {
            paragraphs
                .last_mut()
                .expect("at least one paragraph")
                .push(cur.clone());
        } else {
            paragraphs.push(vec![cur.clone()]);
        }
    }

    let mut groups = Vec::new();
    for paragraph in paragraphs {
        let word_count: usize = paragraph.iter().map(Vec::len).sum();
        if word_count < 2 {
            continue;
        }

        // Reading order: lines top to bottom, words left to right.
        let mut members = Vec::with_capacity(word_count);
        for mut line in paragraph.iter().cloned() {
            line.sort_by(|&a, &b| {
                regions[a]
                    .bounds
                    .min_x
                    .total_cmp(&regions[b].bounds.min_x)
                    .then(a.cmp(&b))
            });
            members.extend(line);
        }

        let text = members
            .iter()
            .filter_map(|&i| regions[i].text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        for &index in &members {
            claimed[index] = true;
        }

        groups.push(Group {
            kind: GroupKind::TextBlock,
            bounds: union_bounds(regions, &members),
            container: None,
            text: Some(text),
            label: None,
            line_count: Some(paragraph.len()),
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

    fn word(min_x: f32, min_y: f32, max_x: f32, max_y: f32, text: &str) -> DetectedRegion {
        DetectedRegion::text_word(Rect::new(min_x, min_y, max_x, max_y), 0.9, text)
    }

    fn run(regions: &[DetectedRegion]) -> Vec<Group> {
        let mut claimed = vec![false; regions.len()];
        text_blocks(regions, &mut claimed, &GroupingConfig::default())
    }

    #[test]
    fn test_words_on_one_line_join_in_reading_order() {
        // Out of x-order in the input.
        let regions = vec![
            word(80.0, 10.0, 140.0, 22.0, "world"),
            word(10.0, 10.5, 70.0, 22.5, "hello"),
        ];
        let groups = run(&regions);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text.as_deref(), Some("hello world"));
        assert_eq!(groups[0].line_count, Some(1));
        assert_eq!(groups[0].members, vec![1, 0]);
    }

    #[test]
    fn test_close_lines_form_one_paragraph() {
        let regions = vec![
            word(10.0, 10.0, 100.0, 20.0, "first"),
            word(10.0, 22.0, 100.0, 32.0, "second"),
        ];
        let groups = run(&regions);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].line_count, Some(2));
        assert_eq!(groups[0].text.as_deref(), Some("first second"));
    }

    #[test]
    fn test_large_gap_splits_paragraphs() {
        // Gap of 28 px against a 10 px line height: a new paragraph.
        let regions = vec![
            word(10.0, 10.0, 100.0, 20.0, "intro"),
            word(10.0, 22.0, 100.0, 32.0, "body"),
            word(10.0, 60.0, 100.0, 70.0, "footer"),
        ];
        let groups = run(&regions);
        // The footer paragraph is a single word, so only one block emits.
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![0, 1]);
    }

    #[test]
    fn test_single_word_is_not_a_block() {
        let regions = vec![word(10.0, 10.0, 60.0, 22.0, "Submit")];
        let mut claimed = vec![false; 1];
        let groups = text_blocks(&regions, &mut claimed, &GroupingConfig::default());
        assert!(groups.is_empty());
        assert!(!claimed[0]);
    }

    #[test]
    fn test_bounds_cover_all_members() {
        let regions = vec![
            word(10.0, 10.0, 100.0, 20.0, "a"),
            word(120.0, 11.0, 200.0, 21.0, "b"),
        ];
        let groups = run(&regions);
        let bounds = groups[0].bounds;
        assert_eq!((bounds.min_x, bounds.max_x), (10.0, 200.0));
        assert_eq!((bounds.min_y, bounds.max_y), (10.0, 21.0));
    }

    #[test]
    fn test_objects_are_ignored() {
        let regions = vec![
            DetectedRegion::object(Rect::new(0.0, 0.0, 50.0, 20.0), 0.8),
            word(10.0, 10.0, 100.0, 20.0, "a"),
            word(110.0, 10.0, 150.0, 20.0, "b"),
        ];
        let groups = run(&regions);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec![1, 2]);
    }
}
