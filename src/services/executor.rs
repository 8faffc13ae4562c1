//! Plan execution
//!
//! Copies each planned source file to its destination. Existing destinations
//! are never overwritten, which makes re-running a plan safe; a run can also
//! resume by skipping a number of leading records.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::filesystem::Filesystem;
use super::plan_store::Mapping;

/// Counts for one execution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Leading records skipped on request
    pub skipped: usize,
    /// Destinations that already existed
    pub already_present: usize,
    pub copied: usize,
    /// Directories created for destinations
    pub directories_created: usize,
    pub bytes_copied: u64,
}

impl ExecutionReport {
    pub fn summary(&self) -> String {
        format!(
            "{} copied ({} bytes), {} already present, {} skipped, {} directories created",
            self.copied,
            self.bytes_copied,
            self.already_present,
            self.skipped,
            self.directories_created
        )
    }
}

pub struct ExecutorService<'a> {
    fs: &'a dyn Filesystem,
    dry_run: bool,
}

impl<'a> ExecutorService<'a> {
    pub fn new(fs: &'a dyn Filesystem, dry_run: bool) -> Self {
        Self { fs, dry_run }
    }

    /// Execute `mappings`, ignoring the first `skip` records.
    ///
    /// A failed copy stops the run; the report logged so far tells the
    /// operator how many records to skip when resuming.
    pub async fn execute(&self, mappings: &[Mapping], skip: usize) -> Result<ExecutionReport> {
        let mut report = ExecutionReport {
            skipped: skip.min(mappings.len()),
            ..Default::default()
        };
        if skip > 0 {
            info!(skip, total = mappings.len(), "Skipping already processed records");
        }

        // Directories a dry run would have created; they never appear on disk
        let mut pending_dirs = HashSet::new();
        for (index, mapping) in mappings.iter().enumerate().skip(skip) {
            self.process(mapping, &mut pending_dirs, &mut report)
                .await
                .with_context(|| format!("Record {} failed, resume with --skip {}", index + 1, index))?;
        }

        info!(summary = %report.summary(), dry_run = self.dry_run, "Execution complete");
        Ok(report)
    }

    async fn process(
        &self,
        mapping: &Mapping,
        pending_dirs: &mut HashSet<PathBuf>,
        report: &mut ExecutionReport,
    ) -> Result<()> {
        let Mapping { src, dest } = mapping;

        if self.fs.exists(dest).await {
            warn!(src = %src.display(), dest = %dest.display(), "Destination exists, skipping");
            report.already_present += 1;
            return Ok(());
        }

        if let Some(dest_dir) = dest.parent()
            && !pending_dirs.contains(dest_dir)
            && !self.fs.exists(dest_dir).await
        {
            debug!(dir = %dest_dir.display(), "Creating destination directory");
            if self.dry_run {
                pending_dirs.insert(dest_dir.to_path_buf());
            } else {
                self.fs.create_directory(dest_dir).await?;
            }
            report.directories_created += 1;
        }

        info!(src = %src.display(), dest = %dest.display(), dry_run = self.dry_run, "Copying");
        if !self.dry_run {
            report.bytes_copied += self.fs.copy_file(src, dest).await?;
        }
        report.copied += 1;
        Ok(())
    }
}
