//! Inline text: `text` + `marks` char ranges in storage, marked runs in the tree.
//!
//! Canonical stored form lists each mark as maximal ranges sorted by
//! `(start, end, mark)`. Extraction always produces that form, so content
//! that is already canonical survives a build/extract cycle unchanged.

use crate::errors::{ConvertError, ConvertResult};
use courseweave_model::{Mark, MarkRange, TextRun};
use serde_json::{json, Value};

pub fn parse_mark_ranges(value: Value) -> ConvertResult<Vec<MarkRange>> {
    serde_json::from_value(value).map_err(|e| ConvertError::invalid_field("marks", e.to_string()))
}

/// Split `text` at every mark boundary into runs carrying the covering marks
pub fn runs_from_text(text: &str, marks: &[MarkRange]) -> ConvertResult<Vec<TextRun>> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    for range in marks {
        if range.start > range.end || range.end > len {
            return Err(ConvertError::invalid_field(
                "marks",
                format!("range {}..{} outside text of {} chars", range.start, range.end, len),
            ));
        }
    }

    let mut bounds = vec![0, len];
    for range in marks {
        bounds.push(range.start);
        bounds.push(range.end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut runs = Vec::new();
    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        if start == end {
            continue;
        }

        let mut run_marks: Vec<Mark> = marks
            .iter()
            .filter(|range| range.start <= start && range.end >= end)
            .map(|range| range.mark.clone())
            .collect();
        run_marks.sort();
        run_marks.dedup();

        runs.push(TextRun::marked(chars[start..end].iter().collect::<String>(), run_marks));
    }

    Ok(runs)
}

/// Flatten runs back into text plus canonical mark ranges
pub fn text_from_runs<'a>(runs: impl IntoIterator<Item = &'a TextRun>) -> (String, Vec<MarkRange>) {
    let mut text = String::new();
    let mut pos = 0usize;
    let mut open: Vec<(Mark, usize)> = Vec::new();
    let mut ranges = Vec::new();

    for run in runs {
        if run.text.is_empty() {
            continue;
        }

        open.retain(|(mark, start)| {
            if run.marks.contains(mark) {
                true
            } else {
                ranges.push(MarkRange::new(*start, pos, mark.clone()));
                false
            }
        });

        for mark in &run.marks {
            if !open.iter().any(|(open_mark, _)| open_mark == mark) {
                open.push((mark.clone(), pos));
            }
        }

        text.push_str(&run.text);
        pos += run.text.chars().count();
    }

    for (mark, start) in open {
        ranges.push(MarkRange::new(start, pos, mark));
    }

    ranges.sort_by(|a, b| (a.start, a.end, &a.mark).cmp(&(b.start, b.end, &b.mark)));
    (text, ranges)
}

fn mark_value(mark: &Mark) -> Value {
    match mark {
        Mark::Bold => json!({ "type": "bold" }),
        Mark::Italic => json!({ "type": "italic" }),
        Mark::Underline => json!({ "type": "underline" }),
        Mark::Strike => json!({ "type": "strike" }),
        Mark::Code => json!({ "type": "code" }),
        Mark::Link { href } => json!({ "type": "link", "href": href }),
    }
}

/// Stored `marks` array for canonical ranges
pub fn mark_ranges_value(ranges: &[MarkRange]) -> Value {
    ranges
        .iter()
        .map(|range| json!({ "start": range.start, "end": range.end, "mark": mark_value(&range.mark) }))
        .collect()
}
