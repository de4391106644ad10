//! Weighted similarity between two findings.
//!
//! | Signal | Weight | Credit |
//! |---|---|---|
//! | file path exact match | 3 | all or nothing |
//! | line proximity | 2 | full at distance 0, half within the line window |
//! | category match | 2 | all or nothing |
//! | subcategory match | 1 | all or nothing |
//! | rule id exact match | 2 | both present and equal |
//! | message word-set Jaccard | 2 | proportional |
//!
//! The sum is divided by the total weight (12), so the result lies in [0, 1].

use std::collections::HashSet;

use argus_core::entities::RawFinding;

const WEIGHT_FILE: f64 = 3.0;
const WEIGHT_LINE: f64 = 2.0;
const WEIGHT_CATEGORY: f64 = 2.0;
const WEIGHT_SUBCATEGORY: f64 = 1.0;
const WEIGHT_RULE: f64 = 2.0;
const WEIGHT_MESSAGE: f64 = 2.0;

const TOTAL_WEIGHT: f64 =
    WEIGHT_FILE + WEIGHT_LINE + WEIGHT_CATEGORY + WEIGHT_SUBCATEGORY + WEIGHT_RULE + WEIGHT_MESSAGE;

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard index of the lowercase word sets of `a` and `b`.
///
/// Returns 0.0 when neither text has any words.
#[must_use]
pub fn message_jaccard(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = intersection as f64 / union as f64;
    ratio
}

fn line_credit(a: &RawFinding, b: &RawFinding, line_window: u32) -> f64 {
    match (a.line_start, b.line_start) {
        (Some(x), Some(y)) => match x.abs_diff(y) {
            0 => 1.0,
            d if d <= line_window => 0.5,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

/// Similarity of two findings in [0, 1]. Symmetric.
#[must_use]
pub fn similarity(a: &RawFinding, b: &RawFinding, line_window: u32) -> f64 {
    let mut score = 0.0;
    if a.file_path == b.file_path {
        score += WEIGHT_FILE;
    }
    score += WEIGHT_LINE * line_credit(a, b, line_window);
    if a.category == b.category {
        score += WEIGHT_CATEGORY;
    }
    if a.subcategory == b.subcategory {
        score += WEIGHT_SUBCATEGORY;
    }
    if a.rule_id.is_some() && a.rule_id == b.rule_id {
        score += WEIGHT_RULE;
    }
    score += WEIGHT_MESSAGE * message_jaccard(&a.message, &b.message);
    score / TOTAL_WEIGHT
}
