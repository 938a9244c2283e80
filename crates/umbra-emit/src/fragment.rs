//! Artifact fragments and the blank-line partitioning of artifact text.

use serde::{Deserialize, Serialize};
use tracing::warn;
use umbra_core::{Labels, VerifiedPredicate};

/// One predicate record: a guard line followed by instruction lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// First line of the record, normally a `// expr == const` annotation.
    pub guard: String,
    /// Remaining lines in file order.
    pub body: Vec<String>,
}

impl Fragment {
    /// Builds the record for a verified predicate: annotation, one line per
    /// operation, compare against the constant, branch to the successor and jump to
    /// the dead branch.
    pub fn from_predicate(predicate: &VerifiedPredicate, labels: &Labels) -> Self {
        let mut body = predicate.emission_lines();
        body.push(compare_line(predicate.constant));
        body.push(format!("as->jz({})", labels.successor));
        body.push(format!("as->jmp({})", labels.dead_branch));
        Self {
            guard: format!("// {}", predicate.annotation()),
            body,
        }
    }

    /// Artifact text for this fragment, blank separator included.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 * (self.body.len() + 1));
        out.push_str(&self.guard);
        out.push('\n');
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Compare instruction closing every fragment.
pub fn compare_line(constant: u64) -> String {
    format!("as->cmp(x, zasm::Imm({constant}))")
}

/// Splits artifact text into fragments on blank (whitespace-only) lines.
///
/// Runs of blank lines never produce empty fragments. Trailing lines with no
/// terminating separator are a torn final write and are dropped.
pub fn parse_artifact(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                let mut lines = std::mem::take(&mut current).into_iter();
                if let Some(guard) = lines.next() {
                    fragments.push(Fragment {
                        guard,
                        body: lines.collect(),
                    });
                }
            }
            continue;
        }
        current.push(line.to_string());
    }

    if !current.is_empty() {
        warn!(
            "Dropping {} trailing artifact line(s) without a blank separator",
            current.len()
        );
    }
    fragments
}
