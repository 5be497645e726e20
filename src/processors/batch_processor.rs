use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::processors::Pipeline;
use crate::utils::filename::output_dir_for_export;
use crate::utils::progress::ProgressReporter;
use crate::writers::write_artifacts;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Result of validating one export inside a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub result: Result<FileStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileStats {
    pub records: usize,
    pub flagged_cells: usize,
    pub artifacts: usize,
}

/// Validates many exports in parallel; each file is an independent pipeline run.
pub struct BatchProcessor {
    max_workers: usize,
    settings: Settings,
}

impl BatchProcessor {
    pub fn new(max_workers: usize, settings: Settings) -> Self {
        Self {
            max_workers: max_workers.max(1),
            settings,
        }
    }

    /// Process every file, writing each one's artifacts under
    /// `{output_base}/validado_{stem}`. A failing file does not stop the others.
    pub fn process_files(
        &self,
        files: &[PathBuf],
        output_base: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<FileOutcome>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;
        let pipeline = Pipeline::from_settings(&self.settings);

        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .map(|input| {
                    let output_dir = output_dir_for_export(output_base, input);
                    let result = self.process_one(&pipeline, input, &output_dir);
                    if let Err(e) = &result {
                        error!("Failed to validate {}: {}", input.display(), e);
                    }
                    if let Some(p) = progress {
                        p.set_message(&format!("Validated {}", input.display()));
                        p.increment(1);
                    }
                    FileOutcome {
                        input: input.clone(),
                        output_dir,
                        result,
                    }
                })
                .collect()
        });

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            "Batch finished: {} succeeded, {} failed",
            outcomes.len() - failed,
            failed
        );
        Ok(outcomes)
    }

    fn process_one(&self, pipeline: &Pipeline, input: &Path, output_dir: &Path) -> Result<FileStats> {
        let result = pipeline.run_file(input)?;
        let artifacts = write_artifacts(output_dir, &result, &self.settings)?;
        Ok(FileStats {
            records: result.records.len(),
            flagged_cells: result.summary.total_flags(),
            artifacts: artifacts.len(),
        })
    }
}
