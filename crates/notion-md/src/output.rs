//! Conversion reporting on stderr.
//!
//! stdout carries the Markdown document, so every status line goes to stderr.

use std::path::Path;

use console::{Style, Term};
use notion_md_renderer::{Warning, WarningKind};

/// Colored stderr reporter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Confirm the document was written to `path`.
    pub(crate) fn written(&self, path: &Path, bytes: usize) {
        self.line(&self.green, &format!("Wrote {bytes} bytes to {}", path.display()));
    }

    /// Summarize conversion warnings, one line per issue kind.
    ///
    /// Individual blocks are logged at `warn` level while rendering.
    pub(crate) fn warnings(&self, warnings: &[Warning]) {
        if warnings.is_empty() {
            return;
        }
        self.line(&self.yellow, &format!("Warnings ({}):", warnings.len()));
        for summary in summarize(warnings) {
            self.line(&self.yellow, &format!("  {summary}"));
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(&self.red, msg);
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}

/// Group warnings by kind in order of first appearance.
fn summarize(warnings: &[Warning]) -> Vec<String> {
    let mut unsupported: Vec<(&str, usize)> = Vec::new();
    let mut malformed_spans = 0;
    let mut malformed_blocks = 0;

    for warning in warnings {
        match &warning.kind {
            WarningKind::UnsupportedBlockType { kind } => {
                match unsupported.iter_mut().find(|(seen, _)| *seen == kind.as_str()) {
                    Some((_, count)) => *count += 1,
                    None => unsupported.push((kind.as_str(), 1)),
                }
            }
            WarningKind::MalformedRichText { spans } => {
                malformed_spans += spans;
                malformed_blocks += 1;
            }
        }
    }

    let mut lines: Vec<String> = unsupported
        .into_iter()
        .map(|(kind, count)| format!("unsupported block type `{kind}` skipped ({})", blocks(count)))
        .collect();
    if malformed_blocks > 0 {
        lines.push(format!(
            "{malformed_spans} malformed rich text span(s) dropped ({})",
            blocks(malformed_blocks)
        ));
    }
    lines
}

fn blocks(count: usize) -> String {
    if count == 1 {
        "1 block".to_owned()
    } else {
        format!("{count} blocks")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_summarize_groups_by_kind() {
        let warnings = vec![
            Warning::unsupported("a", "breadcrumb"),
            Warning::malformed("b", 2),
            Warning::unsupported("c", "table_of_contents"),
            Warning::unsupported("d", "breadcrumb"),
            Warning::malformed("e", 1),
        ];
        assert_eq!(
            summarize(&warnings),
            vec![
                "unsupported block type `breadcrumb` skipped (2 blocks)",
                "unsupported block type `table_of_contents` skipped (1 block)",
                "3 malformed rich text span(s) dropped (2 blocks)",
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
