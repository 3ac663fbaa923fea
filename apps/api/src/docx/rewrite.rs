//! Bullet rewrites: find a paragraph whose text equals an original bullet,
//! swap in the rewritten text while keeping run formatting where possible,
//! and mark the changed run with the accent color.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::model::{Document, Paragraph, ACCENT_COLOR};
use super::DocxError;

/// One suggested rewrite. Unknown fields are ignored; missing ones are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewritePair {
    pub original: String,
    pub rewritten: String,
}

impl RewritePair {
    pub fn new(original: impl Into<String>, rewritten: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            rewritten: rewritten.into(),
        }
    }
}

/// Which replacement path `replace_in_paragraph` took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceKind {
    /// One run held the whole original text; only that run changed.
    SingleRun(usize),
    /// The text spanned runs; everything was folded into run 0.
    Consolidated,
    /// The original text is not in the paragraph; nothing changed.
    NotFound,
}

/// Per-entry result of a rewrite pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    Applied { paragraph_index: usize },
    SkippedEmpty,
    SkippedNoMatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub entries: Vec<EntryOutcome>,
}

impl RewriteReport {
    pub fn applied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, EntryOutcome::Applied { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.len() - self.applied_count()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Run-preserving replacement
// ────────────────────────────────────────────────────────────────────────────

/// Replaces `original` with `rewritten` inside `paragraph`.
///
/// If a single run contains the whole of `original`, the replacement happens
/// in that run alone and only it is recolored. Otherwise the paragraph's full
/// text is replaced and written into the first run (adopting its formatting),
/// which is recolored, and every later run is emptied.
pub fn replace_in_paragraph(
    paragraph: &mut Paragraph,
    original: &str,
    rewritten: &str,
) -> ReplaceKind {
    let full_text = paragraph.text();
    if original.is_empty() || !full_text.contains(original) {
        return ReplaceKind::NotFound;
    }

    let runs = paragraph.runs_mut();
    if let Some(index) = runs.iter().position(|run| run.text().contains(original)) {
        let run = &mut runs[index];
        let replaced = run.text().replace(original, rewritten);
        run.set_text(&replaced);
        run.set_color(ACCENT_COLOR);
        return ReplaceKind::SingleRun(index);
    }

    // `full_text` contains `original`, so there is at least one run.
    let (first, rest) = runs.split_at_mut(1);
    first[0].set_text(&full_text.replace(original, rewritten));
    first[0].set_color(ACCENT_COLOR);
    for run in rest {
        run.set_text("");
    }
    ReplaceKind::Consolidated
}

// ────────────────────────────────────────────────────────────────────────────
// Document rewrite pass
// ────────────────────────────────────────────────────────────────────────────

/// Applies `changes` in order. Each entry rewrites at most the first paragraph
/// (in document order) whose trimmed text equals its trimmed `original`.
/// Entries with an empty side or no matching paragraph are skipped.
pub fn apply_rewrites(document: &mut Document, changes: &[RewritePair]) -> RewriteReport {
    let mut report = RewriteReport::default();

    for change in changes {
        let original = change.original.trim();
        let rewritten = change.rewritten.trim();
        if original.is_empty() || rewritten.is_empty() {
            report.entries.push(EntryOutcome::SkippedEmpty);
            continue;
        }

        let matched = document
            .paragraphs()
            .iter()
            .position(|paragraph| paragraph.text().trim() == original);

        let outcome = match matched {
            Some(index) => {
                let paragraph = &mut document.paragraphs_mut()[index];
                let kind = replace_in_paragraph(paragraph, original, rewritten);
                debug!("Rewrote paragraph {index} ({kind:?})");
                EntryOutcome::Applied {
                    paragraph_index: index,
                }
            }
            None => {
                debug!("No paragraph matches bullet: {original:?}");
                EntryOutcome::SkippedNoMatch
            }
        };
        report.entries.push(outcome);
    }

    report
}

/// Loads a fresh copy of `source`, applies `changes` and writes the result to
/// `destination` (overwriting it). `source` itself is only read.
pub fn rewrite_file(
    source: &Path,
    destination: &Path,
    changes: &[RewritePair],
) -> Result<RewriteReport, DocxError> {
    if !source.exists() {
        return Err(DocxError::NotFound(source.display().to_string()));
    }

    let mut document = Document::open(source)?;
    let report = apply_rewrites(&mut document, changes);
    document.save(destination)?;

    info!(
        "Applied {}/{} bullet rewrites to {}",
        report.applied_count(),
        report.entries.len(),
        destination.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::model::tests::{document_from_xml, document_with, package_bytes, NS};
    use crate::docx::model::RgbColor;

    fn snapshot(doc: &Document) -> Vec<Vec<(String, Option<RgbColor>)>> {
        doc.paragraphs()
            .iter()
            .map(|p| {
                p.runs()
                    .iter()
                    .map(|r| (r.text().to_string(), r.color()))
                    .collect()
            })
            .collect()
    }

    // ── replace_in_paragraph ────────────────────────────────────────────────

    #[test]
    fn test_single_run_replacement_touches_only_that_run() {
        let mut doc = document_with(&[&["Built a scalable service for clients"]]);
        let rewritten = "Built a highly scalable, fault-tolerant service for clients";

        let kind = replace_in_paragraph(
            &mut doc.paragraphs_mut()[0],
            "Built a scalable service for clients",
            rewritten,
        );

        assert_eq!(kind, ReplaceKind::SingleRun(0));
        let run = &doc.paragraphs()[0].runs()[0];
        assert_eq!(run.text(), rewritten);
        assert_eq!(run.color(), Some(ACCENT_COLOR));
    }

    #[test]
    fn test_single_run_replacement_leaves_siblings_untouched() {
        let mut doc = document_with(&[&["Role: ", "Shipped the billing API", " (2021)"]]);

        let kind = replace_in_paragraph(
            &mut doc.paragraphs_mut()[0],
            "Shipped the billing API",
            "Shipped the usage-based billing API",
        );

        assert_eq!(kind, ReplaceKind::SingleRun(1));
        let runs = doc.paragraphs()[0].runs();
        assert_eq!(runs[0].text(), "Role: ");
        assert_eq!(runs[0].color(), None);
        assert_eq!(runs[1].text(), "Shipped the usage-based billing API");
        assert_eq!(runs[1].color(), Some(ACCENT_COLOR));
        assert_eq!(runs[2].text(), " (2021)");
        assert_eq!(runs[2].color(), None);
    }

    #[test]
    fn test_cross_run_replacement_consolidates_into_first_run() {
        let mut doc = document_with(&[&["Led ", "a team of 5 engineers"]]);

        let kind = replace_in_paragraph(
            &mut doc.paragraphs_mut()[0],
            "Led a team of 5 engineers",
            "Led a cross-functional team of 5 engineers",
        );

        assert_eq!(kind, ReplaceKind::Consolidated);
        let runs = doc.paragraphs()[0].runs();
        assert_eq!(runs[0].text(), "Led a cross-functional team of 5 engineers");
        assert_eq!(runs[0].color(), Some(ACCENT_COLOR));
        assert_eq!(runs[1].text(), "");
        assert_eq!(runs[1].color(), None);
    }

    #[test]
    fn test_replacement_is_noop_when_text_absent() {
        let mut doc = document_with(&[&["Led ", "a team"]]);
        let before = snapshot(&doc);

        let kind = replace_in_paragraph(&mut doc.paragraphs_mut()[0], "Managed a budget", "x");

        assert_eq!(kind, ReplaceKind::NotFound);
        assert_eq!(snapshot(&doc), before);
    }

    // ── apply_rewrites ──────────────────────────────────────────────────────

    #[test]
    fn test_no_match_leaves_document_unchanged() {
        let xml = crate::docx::model::tests::document_xml(&[&["Led ", "a team"], &["Other bullet"]]);
        let mut doc = document_from_xml(&xml);

        let report = apply_rewrites(
            &mut doc,
            &[RewritePair::new("Nonexistent bullet text", "Something new")],
        );

        assert_eq!(report.entries, vec![EntryOutcome::SkippedNoMatch]);
        assert_eq!(String::from_utf8(doc.to_xml().unwrap()).unwrap(), xml);
    }

    #[test]
    fn test_partial_application_modifies_exactly_one_paragraph() {
        let mut doc = document_with(&[
            &["Designed the ingestion pipeline"],
            &["Mentored two interns"],
            &["Wrote runbooks"],
        ]);
        let changes = vec![
            RewritePair::new("Designed ingestion pipelines", "nope"),
            RewritePair::new("Mentored two interns", "Mentored two interns to full-time offers"),
            RewritePair::new("Wrote the runbooks", "nope"),
        ];

        let report = apply_rewrites(&mut doc, &changes);

        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.entries[1], EntryOutcome::Applied { paragraph_index: 1 });
        let snap = snapshot(&doc);
        assert_eq!(snap[0], vec![("Designed the ingestion pipeline".to_string(), None)]);
        assert_eq!(
            snap[1],
            vec![("Mentored two interns to full-time offers".to_string(), Some(ACCENT_COLOR))]
        );
        assert_eq!(snap[2], vec![("Wrote runbooks".to_string(), None)]);
    }

    #[test]
    fn test_entry_is_trimmed_before_matching() {
        let mut doc = document_with(&[&["Improved latency by 40%"]]);

        let report = apply_rewrites(
            &mut doc,
            &[RewritePair::new(
                "  Improved latency by 40%  ",
                "Reduced latency by 40% through caching",
            )],
        );

        assert_eq!(report.applied_count(), 1);
        assert_eq!(
            doc.paragraphs()[0].text(),
            "Reduced latency by 40% through caching"
        );
    }

    #[test]
    fn test_paragraph_with_surrounding_whitespace_still_matches() {
        let mut doc = document_with(&[&["  Cut costs by 10%", " "]]);

        let report = apply_rewrites(
            &mut doc,
            &[RewritePair::new("Cut costs by 10%", "Cut cloud costs by 10%")],
        );

        assert_eq!(report.applied_count(), 1);
        assert_eq!(doc.paragraphs()[0].runs()[0].text(), "  Cut cloud costs by 10%");
        assert_eq!(doc.paragraphs()[0].runs()[1].text(), " ");
    }

    #[test]
    fn test_empty_entries_are_skipped() {
        let mut doc = document_with(&[&["Kept"]]);
        let report = apply_rewrites(
            &mut doc,
            &[RewritePair::new("   ", "x"), RewritePair::new("Kept", "  ")],
        );
        assert_eq!(
            report.entries,
            vec![EntryOutcome::SkippedEmpty, EntryOutcome::SkippedEmpty]
        );
        assert_eq!(doc.paragraphs()[0].text(), "Kept");
        assert_eq!(doc.paragraphs()[0].runs()[0].color(), None);
    }

    #[test]
    fn test_only_first_matching_paragraph_is_rewritten() {
        let mut doc = document_with(&[&["Same bullet"], &["Same bullet"]]);

        let report = apply_rewrites(&mut doc, &[RewritePair::new("Same bullet", "New bullet")]);

        assert_eq!(report.entries, vec![EntryOutcome::Applied { paragraph_index: 0 }]);
        assert_eq!(doc.paragraphs()[0].text(), "New bullet");
        assert_eq!(doc.paragraphs()[1].text(), "Same bullet");
    }

    #[test]
    fn test_later_entries_rescan_from_the_top() {
        let mut doc = document_with(&[&["Alpha"]]);
        let report = apply_rewrites(
            &mut doc,
            &[RewritePair::new("Alpha", "Beta"), RewritePair::new("Beta", "Gamma")],
        );
        assert_eq!(report.applied_count(), 2);
        assert_eq!(doc.paragraphs()[0].text(), "Gamma");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut doc = document_with(&[&["Led the migration"]]);
        let report = apply_rewrites(&mut doc, &[RewritePair::new("led the migration", "x")]);
        assert_eq!(report.entries, vec![EntryOutcome::SkippedNoMatch]);
    }

    #[test]
    fn test_rewrite_pair_tolerates_missing_and_extra_fields() {
        let pairs: Vec<RewritePair> = serde_json::from_str(
            r#"[{"original": "a", "rewritten": "b", "reason": "x"}, {"original": "only"}]"#,
        )
        .unwrap();
        assert_eq!(pairs[0], RewritePair::new("a", "b"));
        assert_eq!(pairs[1], RewritePair::new("only", ""));
    }

    // ── rewrite_file ────────────────────────────────────────────────────────

    fn write_master(dir: &Path, paragraphs: &[&[&str]]) -> std::path::PathBuf {
        let path = dir.join("master.docx");
        let xml = crate::docx::model::tests::document_xml(paragraphs);
        std::fs::write(&path, package_bytes(&xml)).unwrap();
        path
    }

    #[test]
    fn test_rewrite_file_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = rewrite_file(
            &dir.path().join("missing.docx"),
            &dir.path().join("out.docx"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, DocxError::NotFound(_)));
    }

    #[test]
    fn test_rewrite_file_leaves_source_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let master = write_master(dir.path(), &[&["Led ", "a team of 5 engineers"]]);
        let master_bytes = std::fs::read(&master).unwrap();
        let out = dir.path().join("tailored.docx");

        let report = rewrite_file(
            &master,
            &out,
            &[RewritePair::new(
                "Led a team of 5 engineers",
                "Led a cross-functional team of 5 engineers",
            )],
        )
        .unwrap();

        assert_eq!(report.applied_count(), 1);
        assert_eq!(std::fs::read(&master).unwrap(), master_bytes);
        let tailored = Document::open(&out).unwrap();
        assert_eq!(
            tailored.paragraphs()[0].runs()[0].text(),
            "Led a cross-functional team of 5 engineers"
        );
        assert_eq!(tailored.paragraphs()[0].runs()[0].color(), Some(ACCENT_COLOR));
    }

    #[test]
    fn test_two_passes_from_fresh_copies_agree_and_rerun_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let master = write_master(
            dir.path(),
            &[&["Led ", "a team of 5 engineers"], &["Improved latency by 40%"]],
        );
        let changes = vec![
            RewritePair::new(
                "Led a team of 5 engineers",
                "Led a cross-functional team of 5 engineers",
            ),
            RewritePair::new(
                "Improved latency by 40%",
                "Reduced latency by 40% through caching",
            ),
        ];

        let first = dir.path().join("first.docx");
        let second = dir.path().join("second.docx");
        rewrite_file(&master, &first, &changes).unwrap();
        rewrite_file(&master, &second, &changes).unwrap();

        let first_xml = Document::open(&first).unwrap().to_xml().unwrap();
        let second_xml = Document::open(&second).unwrap().to_xml().unwrap();
        assert_eq!(first_xml, second_xml);

        // Re-running over the output: originals no longer match anything.
        let again = dir.path().join("again.docx");
        let report = rewrite_file(&first, &again, &changes).unwrap();
        assert_eq!(report.applied_count(), 0);
        assert_eq!(Document::open(&again).unwrap().to_xml().unwrap(), first_xml);
    }

    #[test]
    fn test_rewrite_preserves_unrelated_xml() {
        let xml = format!(
            "<w:document {NS}><w:body><w:p><w:pPr><w:numPr><w:ilvl w:val=\"0\"/></w:numPr></w:pPr>\
             <w:r><w:t>Old</w:t></w:r><w:bookmarkEnd w:id=\"0\"/></w:p><w:sectPr/></w:body></w:document>"
        );
        let mut doc = document_from_xml(&xml);
        apply_rewrites(&mut doc, &[RewritePair::new("Old", "New")]);

        let out = String::from_utf8(doc.to_xml().unwrap()).unwrap();
        assert!(out.contains("<w:pPr><w:numPr><w:ilvl w:val=\"0\"/></w:numPr></w:pPr>"));
        assert!(out.contains("<w:bookmarkEnd w:id=\"0\"/>"));
        assert!(out.contains("<w:sectPr/>"));
        assert!(out.contains("<w:t>New</w:t>"));
    }
}
