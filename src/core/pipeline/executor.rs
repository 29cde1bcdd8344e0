//! Pipeline execution implementation.

use crate::core::executor::{self, Batch, ExecutionPolicy};
use crate::core::index::FileIndex;
use crate::core::reconcile::{reconcile, Reconciliation};
use crate::core::reporter;
use crate::core::similarity::SimilarityKind;
use crate::core::work::{CopyWork, JoinOutcome, JoinWork, UnitOfWork, WorkResult};
use crate::error::{JoinerError, Result};
use crate::events::{
    null_sender, BatchKind, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuration for one run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source list directory
    pub input1: PathBuf,
    /// Compare list directory
    pub input2: PathBuf,
    /// Root against which relative destinations resolve
    pub work: PathBuf,
    /// Matched input1 files land here
    pub output: PathBuf,
    /// Matched input2 files land here
    pub found: PathBuf,
    /// Unmatched input1 files land here
    pub notfound1: PathBuf,
    /// Unmatched input2 files land here
    pub notfound2: PathBuf,
    /// Fused pairs land here
    pub joined: PathBuf,
    /// CSV reports land here
    pub csv: PathBuf,
    /// Also run the join phase
    pub join: bool,
    /// Run only the join phase
    pub join_only: bool,
    /// Score each joined pair
    pub join_similarity: bool,
    /// Similarity algorithm name from the registry
    pub algorithm: String,
    /// Execution policy for the join batch
    pub policy: ExecutionPolicy,
    /// Worker-count override for the join batch, 0 for the default
    pub join_tasks: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input1: PathBuf::new(),
            input2: PathBuf::new(),
            work: PathBuf::new(),
            output: PathBuf::from("Output"),
            found: PathBuf::from("Found"),
            notfound1: PathBuf::from("Notfound1"),
            notfound2: PathBuf::from("Notfound2"),
            joined: PathBuf::from("Joined"),
            csv: PathBuf::from("Reports"),
            join: false,
            join_only: false,
            join_similarity: false,
            algorithm: "match".to_string(),
            policy: ExecutionPolicy::FutureCore,
            join_tasks: 0,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn input1(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input1 = path.into();
        self
    }

    pub fn input2(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input2 = path.into();
        self
    }

    /// Prefix for every destination that is not absolute
    pub fn work(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.work = path.into();
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    pub fn found(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.found = path.into();
        self
    }

    pub fn notfound1(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.notfound1 = path.into();
        self
    }

    pub fn notfound2(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.notfound2 = path.into();
        self
    }

    pub fn joined(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.joined = path.into();
        self
    }

    pub fn csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.csv = path.into();
        self
    }

    pub fn join(mut self, join: bool) -> Self {
        self.config.join = join;
        self
    }

    pub fn join_only(mut self, join_only: bool) -> Self {
        self.config.join_only = join_only;
        self
    }

    pub fn join_similarity(mut self, join_similarity: bool) -> Self {
        self.config.join_similarity = join_similarity;
        self
    }

    pub fn algorithm(mut self, name: impl Into<String>) -> Self {
        self.config.algorithm = name.into();
        self
    }

    pub fn policy(mut self, policy: ExecutionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn join_tasks(mut self, join_tasks: usize) -> Self {
        self.config.join_tasks = join_tasks;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Files indexed per input
    pub input1_files: usize,
    pub input2_files: usize,
    /// Matched and one-sided counts
    pub common: usize,
    pub left_only: usize,
    pub right_only: usize,
    /// Names of copy units that failed
    pub copy_errors: Vec<String>,
    /// Every join outcome, successes and captured failures
    pub join_outcomes: Vec<JoinOutcome>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn join_errors(&self) -> usize {
        self.join_outcomes
            .iter()
            .filter(|o| o.error.is_some())
            .count()
    }

    pub fn scores(&self) -> usize {
        self.join_outcomes
            .iter()
            .filter(|o| o.score.is_some())
            .count()
    }
}

/// The reconcile-and-join pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run without progress events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run with progress events
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Indexing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Indexing,
        }));

        let index1 = FileIndex::scan_with_events(&self.config.input1, events)?;
        let index2 = FileIndex::scan_with_events(&self.config.input2, events)?;

        if index1.is_empty() {
            return Err(JoinerError::InvalidIndex {
                path: self.config.input1.clone(),
            });
        }
        if index2.is_empty() {
            return Err(JoinerError::InvalidIndex {
                path: self.config.input2.clone(),
            });
        }

        tracing::info!(
            "The Input1 folder '{}' consist of files: {}",
            dir_name(&self.config.input1),
            index1.len()
        );
        tracing::info!(
            "The Input2 folder '{}' consist of files: {}",
            dir_name(&self.config.input2),
            index2.len()
        );

        // Phase 2: Reconciling
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Reconciling,
        }));
        let recon = reconcile(&index1, &index2);
        tracing::info!("Common files : {}", recon.common.len());

        let mut result = PipelineResult {
            input1_files: index1.len(),
            input2_files: index2.len(),
            common: recon.common.len(),
            left_only: recon.left_only.len(),
            right_only: recon.right_only.len(),
            copy_errors: Vec::new(),
            join_outcomes: Vec::new(),
            duration_ms: 0,
        };

        // Phase 3: Copying, unless the run is join-only
        if !self.config.join_only {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Copying,
            }));
            self.run_copy_phases(&recon, &mut result, events)?;
        }

        // Phase 4: Joining
        if (self.config.join || self.config.join_only) && !recon.common.is_empty() {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Joining,
            }));
            self.run_join_phase(&recon, &mut result, events)?;
        }

        // Phase 5: Reporting
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Reporting,
        }));
        self.export_reports(&recon, &result)?;

        result.duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                input1_files: result.input1_files,
                input2_files: result.input2_files,
                common: result.common,
                left_only: result.left_only,
                right_only: result.right_only,
                copy_errors: result.copy_errors.len(),
                join_errors: result.join_errors(),
                scores: result.scores(),
                duration_ms: result.duration_ms,
            },
        }));

        Ok(result)
    }

    fn run_copy_phases(
        &self,
        recon: &Reconciliation,
        result: &mut PipelineResult,
        events: &EventSender,
    ) -> Result<()> {
        let output = self.resolve(&self.config.output);
        let found = self.resolve(&self.config.found);
        let notfound1 = self.resolve(&self.config.notfound1);
        let notfound2 = self.resolve(&self.config.notfound2);

        let batches = [
            (
                &output,
                recon
                    .common
                    .iter()
                    .map(|(left, _)| left.path.clone())
                    .collect::<Vec<_>>(),
            ),
            (
                &found,
                recon
                    .common
                    .iter()
                    .map(|(_, right)| right.path.clone())
                    .collect(),
            ),
            (
                &notfound1,
                recon.left_only.iter().map(|r| r.path.clone()).collect(),
            ),
            (
                &notfound2,
                recon.right_only.iter().map(|r| r.path.clone()).collect(),
            ),
        ];

        let strategy = executor::ExecutionPolicy::FutureThread.strategy();
        let workers = executor::copy_worker_default();
        tracing::info!("Use copy with max threads: {workers}");

        for (dest_dir, sources) in batches {
            create_dir(dest_dir)?;
            let items = sources
                .into_iter()
                .map(|source| {
                    UnitOfWork::Copy(CopyWork {
                        source,
                        dest_dir: dest_dir.clone(),
                    })
                })
                .collect();

            let batch = Batch::new(BatchKind::Copy, dir_name(dest_dir), items);
            let results = strategy.run(batch, workers, events)?;

            for work_result in results {
                if let WorkResult::Copy(outcome) = work_result {
                    if outcome.error.is_some() {
                        let name = outcome
                            .source
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        result.copy_errors.push(name);
                    }
                }
            }
        }

        if !result.copy_errors.is_empty() {
            tracing::warn!(
                "Error copy files ({}): {:?}",
                result.copy_errors.len(),
                result.copy_errors
            );
        }

        Ok(())
    }

    fn run_join_phase(
        &self,
        recon: &Reconciliation,
        result: &mut PipelineResult,
        events: &EventSender,
    ) -> Result<()> {
        let joined = self.resolve(&self.config.joined);
        create_dir(&joined)?;

        let similarity = self.similarity_kind();

        let items = recon
            .common
            .iter()
            .map(|(left, right)| {
                UnitOfWork::Join(JoinWork {
                    left: left.path.clone(),
                    right: right.path.clone(),
                    dest_dir: joined.clone(),
                    similarity,
                })
            })
            .collect();

        let strategy = self.config.policy.strategy();
        tracing::info!(
            "Join files : {} with mode {}",
            recon.common.len(),
            self.config.policy
        );
        let batch = Batch::new(BatchKind::Join, dir_name(&joined), items);
        let results = strategy.run(batch, self.config.join_tasks, events)?;

        for work_result in results {
            if let WorkResult::Join(outcome) = work_result {
                result.join_outcomes.push(outcome);
            }
        }

        let failed = result.join_errors();
        if failed > 0 {
            tracing::warn!("Error join files: {failed}");
        }

        Ok(())
    }

    /// Resolve the similarity algorithm, downgrading an unknown name to
    /// "similarity skipped" so the join batch still runs.
    fn similarity_kind(&self) -> Option<SimilarityKind> {
        if !self.config.join_similarity {
            return None;
        }
        match self.config.algorithm.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::error!("{e}; similarity skipped");
                None
            }
        }
    }

    fn export_reports(&self, recon: &Reconciliation, result: &PipelineResult) -> Result<()> {
        let csv_dir = self.resolve(&self.config.csv);

        if !self.config.join_only {
            let notfound1: Vec<String> = recon.left_only.iter().map(|r| r.file_name()).collect();
            let notfound2: Vec<String> = recon.right_only.iter().map(|r| r.file_name()).collect();
            reporter::export_names(&notfound1, &csv_dir.join("notfound1.csv"))?;
            reporter::export_names(&notfound2, &csv_dir.join("notfound2.csv"))?;
        }

        if self.config.join_similarity {
            let scored: Vec<&JoinOutcome> = result
                .join_outcomes
                .iter()
                .filter(|o| o.error.is_none())
                .collect();
            reporter::export_scores(&scored, &csv_dir.join("similarity.csv"))?;
        }

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || self.config.work.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.config.work.join(path)
        }
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| JoinerError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builder_applies_configuration() {
        let pipeline = Pipeline::builder()
            .input1("/scans/in1")
            .input2("/scans/in2")
            .join(true)
            .join_similarity(true)
            .policy(ExecutionPolicy::OneCore)
            .join_tasks(2)
            .build();

        assert!(pipeline.config.join);
        assert_eq!(pipeline.config.policy, ExecutionPolicy::OneCore);
        assert_eq!(pipeline.config.join_tasks, 2);
        assert_eq!(pipeline.config.algorithm, "match");
    }

    #[test]
    fn relative_destinations_resolve_against_work() {
        let pipeline = Pipeline::builder()
            .work("/data/run")
            .output("Output")
            .build();

        assert_eq!(
            pipeline.resolve(&pipeline.config.output),
            PathBuf::from("/data/run/Output")
        );
        assert_eq!(
            pipeline.resolve(&PathBuf::from("/abs/Output")),
            PathBuf::from("/abs/Output")
        );
    }

    #[test]
    fn empty_input_is_an_invalid_index() {
        let input1 = TempDir::new().unwrap();
        let input2 = TempDir::new().unwrap();
        std::fs::write(input2.path().join("a.tif"), b"x").unwrap();

        let work = TempDir::new().unwrap();
        let pipeline = Pipeline::builder()
            .input1(input1.path())
            .input2(input2.path())
            .work(work.path())
            .build();

        let error = pipeline.run().unwrap_err();
        assert!(matches!(error, JoinerError::InvalidIndex { .. }));
    }

    #[test]
    fn unknown_algorithm_downgrades_to_no_similarity() {
        let pipeline = Pipeline::builder()
            .join(true)
            .join_similarity(true)
            .algorithm("surf")
            .build();

        assert_eq!(pipeline.similarity_kind(), None);
    }

    #[test]
    fn known_algorithm_is_selected() {
        let pipeline = Pipeline::builder()
            .join(true)
            .join_similarity(true)
            .algorithm("orb")
            .build();

        assert_eq!(pipeline.similarity_kind(), Some(SimilarityKind::Orb));
    }
}
