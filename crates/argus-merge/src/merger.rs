//! Combines finding sets from several sources into one ranked, deduplicated list.
//!
//! Sources are processed highest priority first. Each finding is folded into
//! the most similar already accepted finding when the similarity reaches the
//! duplicate threshold, otherwise it is accepted as new. A folded finding
//! never replaces the accepted one: AI duplicates only fill empty AI text
//! fields, and disagreements are recorded as conflicts.

use std::cmp::{Ordering, Reverse};
use std::collections::HashMap;

use argus_confidence::{ConfidenceCalculator, ConfidenceFilter, clamp01};
use argus_config::{ConfidenceConfig, MergeConfig};
use argus_core::entities::{MergeProvenance, MergedFinding, RawFinding, RunSummary};
use argus_core::enums::SourceKind;
use argus_core::ids::{PREFIX_FINDING, generate_id};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflict::{ConflictField, ConflictInfo, ConflictResolver, ConflictValue, ResolutionRule};
use crate::error::MergeInputError;
use crate::similarity::similarity;
use crate::source::FindingSource;

/// A finding rejected before merging, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedFinding {
    pub finding_id: String,
    pub file_path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Sorted by resolved severity, then confidence, then location.
    pub findings: Vec<MergedFinding>,
    pub conflicts: Vec<ConflictInfo>,
    pub dropped: Vec<DroppedFinding>,
    /// AI findings excluded for falling below the AI confidence threshold.
    pub below_ai_threshold: usize,
    /// Findings removed by the confidence filter.
    pub filtered_out: usize,
    /// Findings cut by `max_results`.
    pub truncated: usize,
    pub summary: RunSummary,
}

/// Folds findings from several sources into one deduplicated set.
#[derive(Debug, Clone)]
pub struct ResultMerger {
    config: MergeConfig,
    calculator: ConfidenceCalculator,
    filter: Option<ConfidenceFilter>,
}

impl Default for ResultMerger {
    fn default() -> Self {
        Self::new(MergeConfig::default(), ConfidenceConfig::default())
    }
}

impl ResultMerger {
    /// The confidence filter is active when `confidence.filter_enabled` is set.
    #[must_use]
    pub fn new(config: MergeConfig, confidence: ConfidenceConfig) -> Self {
        let filter = confidence
            .filter_enabled
            .then(|| ConfidenceFilter::new(confidence.clone()));
        Self {
            config,
            calculator: ConfidenceCalculator::new(confidence),
            filter,
        }
    }

    #[must_use]
    pub const fn calculator(&self) -> &ConfidenceCalculator {
        &self.calculator
    }

    /// Merge `sources`, scoring against the previous run's findings in `history`.
    #[must_use]
    pub fn merge(
        &self,
        mut sources: Vec<FindingSource>,
        history: Option<&[RawFinding]>,
    ) -> MergeOutcome {
        sources.sort_by_key(|source| Reverse(source.priority()));
        let source_count = sources.len();

        let mut accepted: Vec<MergedFinding> = Vec::new();
        let mut conflicts = Vec::new();
        let mut dropped = Vec::new();
        let mut below_ai_threshold = 0;
        let mut folded = 0;

        for source in sources {
            let kind = source.kind;
            for finding in source.findings {
                let finding = match Self::admit(finding) {
                    Ok(finding) => finding,
                    Err((finding, error)) => {
                        warn!(source = %kind, %error, "dropping malformed finding");
                        dropped.push(DroppedFinding {
                            finding_id: finding.id,
                            file_path: finding.file_path,
                            reason: error.to_string(),
                        });
                        continue;
                    }
                };

                if kind == SourceKind::Ai && !self.passes_ai_threshold(&finding, history) {
                    debug!(finding = %finding.id, "AI finding below confidence threshold");
                    below_ai_threshold += 1;
                    continue;
                }

                match self.best_match(&accepted, &finding) {
                    Some((index, score)) => {
                        folded += 1;
                        let rescore =
                            self.fold(&mut accepted[index], finding, kind, score, &mut conflicts);
                        if rescore {
                            let merged = &mut accepted[index];
                            merged.confidence = self.calculator.calculate(&merged.finding, history);
                        }
                    }
                    None => {
                        let confidence = self.calculator.calculate(&finding, history);
                        accepted.push(MergedFinding {
                            resolved_severity: finding.severity,
                            finding,
                            source: kind,
                            confidence,
                            merged_from: Vec::new(),
                        });
                    }
                }
            }
        }

        Self::settle_conflicts(&mut conflicts, &mut accepted);

        let mut filtered_out = 0;
        if let Some(filter) = &self.filter {
            let outcome = filter.apply(accepted);
            filtered_out = outcome.rejected.len();
            accepted = outcome.kept;
        }

        accepted.sort_by(rank);
        let mut truncated = 0;
        if let Some(max) = self.config.max_results {
            truncated = accepted.len().saturating_sub(max);
            accepted.truncate(max);
        }

        let summary = RunSummary::from_findings(&accepted);
        info!(
            sources = source_count,
            kept = accepted.len(),
            folded,
            conflicts = conflicts.len(),
            dropped = dropped.len(),
            below_ai_threshold,
            filtered_out,
            truncated,
            "merge complete"
        );

        MergeOutcome {
            findings: accepted,
            conflicts,
            dropped,
            below_ai_threshold,
            filtered_out,
            truncated,
            summary,
        }
    }

    /// Validate and make sure the finding has an id.
    fn admit(mut finding: RawFinding) -> Result<RawFinding, (RawFinding, MergeInputError)> {
        if let Err(error) = MergeInputError::check(&finding) {
            return Err((finding, error));
        }
        if finding.id.is_empty() {
            match generate_id(PREFIX_FINDING) {
                Ok(id) => finding.id = id,
                Err(e) => {
                    let error = MergeInputError::Identity {
                        file_path: finding.file_path.clone(),
                        reason: e.to_string(),
                    };
                    return Err((finding, error));
                }
            }
        }
        Ok(finding)
    }

    /// The AI source's own confidence when given, else the calculated score.
    fn passes_ai_threshold(&self, finding: &RawFinding, history: Option<&[RawFinding]>) -> bool {
        let confidence = finding
            .ai_confidence
            .map_or_else(|| self.calculator.calculate(finding, history).overall, clamp01);
        confidence >= self.config.ai_confidence_threshold
    }

    /// Most similar accepted finding at or above the duplicate threshold.
    /// Ties go to the earliest accepted.
    fn best_match(&self, accepted: &[MergedFinding], finding: &RawFinding) -> Option<(usize, f64)> {
        accepted
            .iter()
            .enumerate()
            .map(|(index, merged)| {
                (
                    index,
                    similarity(&merged.finding, finding, self.config.line_window),
                )
            })
            .filter(|(_, score)| *score >= self.config.duplicate_threshold)
            .min_by(|a, b| b.1.total_cmp(&a.1))
    }

    /// Fold a duplicate into an accepted finding. Returns whether the
    /// accepted finding's scoring inputs changed.
    fn fold(
        &self,
        existing: &mut MergedFinding,
        incoming: RawFinding,
        kind: SourceKind,
        score: f64,
        conflicts: &mut Vec<ConflictInfo>,
    ) -> bool {
        debug!(
            kept = %existing.finding.id,
            folded = %incoming.id,
            similarity = score,
            "folding duplicate finding"
        );
        existing.merged_from.push(MergeProvenance {
            finding_id: incoming.id.clone(),
            source: kind,
            agent: incoming.agent.clone(),
            similarity: score,
        });

        if incoming.severity != existing.resolved_severity {
            let (rule, kept) = if self.config.prefer_static_for_conflict {
                (ResolutionRule::PreferHigherPriority, existing.resolved_severity)
            } else {
                (
                    ResolutionRule::MostSevere,
                    existing.resolved_severity.max(incoming.severity),
                )
            };
            conflicts.push(ConflictInfo {
                finding_id: existing.finding.id.clone(),
                field: ConflictField::Severity,
                values: vec![
                    ConflictValue::Severity(existing.resolved_severity),
                    ConflictValue::Severity(incoming.severity),
                ],
                rule: Some(rule),
                resolved: Some(ConflictValue::Severity(kept)),
            });
            existing.resolved_severity = kept;
        }

        if kind == SourceKind::Ai {
            return enhance_with_ai(&mut existing.finding, &incoming);
        }

        let id = existing.finding.id.clone();
        let kept = &existing.finding;
        if kept.category != incoming.category {
            conflicts.push(ConflictInfo::unresolved(
                &id,
                ConflictField::Category,
                vec![
                    ConflictValue::Category(kept.category),
                    ConflictValue::Category(incoming.category),
                ],
            ));
        }
        if kept.message.trim() != incoming.message.trim() {
            conflicts.push(ConflictInfo::unresolved(
                &id,
                ConflictField::Message,
                vec![
                    ConflictValue::Text(kept.message.clone()),
                    ConflictValue::Text(incoming.message),
                ],
            ));
        }
        if let (Some(ours), Some(theirs)) = (
            non_blank(kept.suggestion.as_deref()),
            non_blank(incoming.suggestion.as_deref()),
        ) {
            if ours != theirs {
                conflicts.push(ConflictInfo::unresolved(
                    &id,
                    ConflictField::Suggestion,
                    vec![
                        ConflictValue::Text(ours.to_string()),
                        ConflictValue::Text(theirs.to_string()),
                    ],
                ));
            }
        }
        false
    }

    fn settle_conflicts(conflicts: &mut [ConflictInfo], accepted: &mut [MergedFinding]) {
        let pending = conflicts.iter().filter(|c| !c.is_resolved()).count();
        if pending == 0 {
            return;
        }
        let resolved = ConflictResolver::resolve_auto(conflicts);
        debug!(pending, resolved, "auto-resolved conflicts");

        let by_id: HashMap<String, usize> = accepted
            .iter()
            .enumerate()
            .map(|(index, merged)| (merged.finding.id.clone(), index))
            .collect();
        for conflict in conflicts.iter().filter(|c| {
            matches!(
                c.rule,
                Some(ResolutionRule::AutoHighestSeverity | ResolutionRule::AutoKeepFirst)
            )
        }) {
            if let Some(index) = by_id.get(&conflict.finding_id) {
                ConflictResolver::apply(conflict, &mut accepted[*index]);
            }
        }
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Copy AI text onto empty fields only. Returns whether anything was copied.
fn enhance_with_ai(existing: &mut RawFinding, incoming: &RawFinding) -> bool {
    let mut changed = false;
    for (ours, theirs) in [
        (&mut existing.ai_explanation, &incoming.ai_explanation),
        (&mut existing.ai_suggestion, &incoming.ai_suggestion),
        (&mut existing.ai_advisory, &incoming.ai_advisory),
    ] {
        if non_blank(ours.as_deref()).is_none() && non_blank(theirs.as_deref()).is_some() {
            ours.clone_from(theirs);
            changed = true;
        }
    }
    if changed && existing.ai_confidence.is_none() {
        existing.ai_confidence = incoming.ai_confidence;
    }
    changed
}

fn rank(a: &MergedFinding, b: &MergedFinding) -> Ordering {
    b.resolved_severity
        .cmp(&a.resolved_severity)
        .then_with(|| b.confidence.overall.total_cmp(&a.confidence.overall))
        .then_with(|| a.finding.file_path.cmp(&b.finding.file_path))
        .then_with(|| a.finding.line_start.cmp(&b.finding.line_start))
}
