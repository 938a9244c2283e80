//! Append-only destinations for verified predicates.

use crate::fragment::Fragment;
use crate::record::ErrorRecord;
use crate::result::{Error, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use umbra_core::{Labels, VerifiedPredicate};

/// Receives pipeline output in order.
pub trait PredicateSink {
    /// Records one verified predicate and returns the fragment written for it.
    fn accept(&mut self, predicate: &VerifiedPredicate, labels: &Labels) -> Result<Fragment>;
    /// Records an abandoned solver claim.
    fn reject(&mut self, record: &ErrorRecord) -> Result<()>;
}

/// File-backed sink.
///
/// Every write opens the target in append mode, writes the whole record, syncs and
/// closes it again, so an interrupted run leaves every earlier fragment intact. No
/// file is created until there is something to put in it.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    artifact: PathBuf,
    expressions: Option<PathBuf>,
    errors: Option<PathBuf>,
    written: usize,
    expression_failures: usize,
}

impl ArtifactSink {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            expressions: None,
            errors: None,
            written: 0,
            expression_failures: 0,
        }
    }

    /// Also append `expr == const` lines to `path`.
    pub fn with_expressions(mut self, path: impl Into<PathBuf>) -> Self {
        self.expressions = Some(path.into());
        self
    }

    /// Append error records to `path` instead of only logging them.
    pub fn with_error_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.errors = Some(path.into());
        self
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    /// Fragments written through this sink.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Expression lines lost after their fragment reached the artifact.
    pub fn expression_failures(&self) -> usize {
        self.expression_failures
    }
}

impl PredicateSink for ArtifactSink {
    fn accept(&mut self, predicate: &VerifiedPredicate, labels: &Labels) -> Result<Fragment> {
        let fragment = Fragment::from_predicate(predicate, labels);
        append_scoped(&self.artifact, &fragment.render())?;
        self.written += 1;
        // fragment committed; the expressions file is best-effort
        if let Some(path) = &self.expressions
            && let Err(e) = append_scoped(path, &format!("{}\n", predicate.annotation()))
        {
            warn!("Fragment kept but expression line lost: {}", e);
            self.expression_failures += 1;
        }
        debug!(
            "Appended fragment #{} to {}",
            self.written,
            self.artifact.display()
        );
        Ok(fragment)
    }

    fn reject(&mut self, record: &ErrorRecord) -> Result<()> {
        warn!("Rejected solver claim: {}", record);
        if let Some(path) = &self.errors {
            append_scoped(path, &format!("{record}\n"))?;
        }
        Ok(())
    }
}

/// In-memory sink collecting fragments and records, for callers that post-process
/// output themselves.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub fragments: Vec<Fragment>,
    pub predicates: Vec<VerifiedPredicate>,
    pub errors: Vec<ErrorRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact text equivalent to what [`ArtifactSink`] would have written.
    pub fn artifact_text(&self) -> String {
        self.fragments.iter().map(Fragment::render).collect()
    }
}

impl PredicateSink for MemorySink {
    fn accept(&mut self, predicate: &VerifiedPredicate, labels: &Labels) -> Result<Fragment> {
        let fragment = Fragment::from_predicate(predicate, labels);
        self.fragments.push(fragment.clone());
        self.predicates.push(predicate.clone());
        Ok(fragment)
    }

    fn reject(&mut self, record: &ErrorRecord) -> Result<()> {
        self.errors.push(record.clone());
        Ok(())
    }
}

fn append_scoped(path: &Path, text: &str) -> Result<()> {
    let io_err = |source: std::io::Error| Error::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    file.sync_data().map_err(io_err)?;
    Ok(())
}
