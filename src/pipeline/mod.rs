//! Ordered execution of publishing pipes.
//!
//! Each pipe is asked whether to skip, then to fill in its configuration
//! defaults, then to run. The first failure aborts the run and names the pipe
//! and phase; later pipes are never touched.

use crate::context::Context;
use crate::error::{Phase, ReleaseError, Result};
use async_trait::async_trait;

/// One publishing stage
#[async_trait]
pub trait Pipe: Send + Sync {
    /// Name used in logs and error reports
    fn name(&self) -> &'static str;

    /// Whether this pipe has nothing to do for this run
    fn skip(&self, ctx: &Context) -> bool;

    /// Fill in defaults for this pipe's configuration subtree.
    ///
    /// Must be idempotent.
    fn default(&self, ctx: &mut Context) -> Result<()>;

    /// Do the work
    async fn run(&self, ctx: &mut Context) -> Result<()>;
}

/// What happened to a pipe during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeStatus {
    /// `skip` returned true
    Skipped,
    /// Defaults applied and run completed
    Completed,
}

/// Per-pipe statuses of a successful run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// `(pipe name, status)` pairs
    pub pipes: Vec<(&'static str, PipeStatus)>,
}

impl PipelineReport {
    /// Status recorded for a pipe
    pub fn status(&self, name: &str) -> Option<PipeStatus> {
        self.pipes
            .iter()
            .find(|(pipe, _)| *pipe == name)
            .map(|(_, status)| *status)
    }
}

/// Fixed, ordered list of pipes
pub struct Pipeline {
    pipes: Vec<Box<dyn Pipe>>,
}

impl Pipeline {
    /// Pipeline over the given pipes, run in the order given
    pub fn new(pipes: Vec<Box<dyn Pipe>>) -> Self {
        Self { pipes }
    }

    /// Names of the registered pipes, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.pipes.iter().map(|p| p.name()).collect()
    }

    /// Run every pipe in order, stopping at the first failure
    pub async fn run(&self, ctx: &mut Context) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for pipe in &self.pipes {
            let name = pipe.name();
            if ctx.is_cancelled() {
                return Err(ReleaseError::Cancelled);
            }

            if pipe.skip(ctx) {
                log::info!(pipe = name; "skipped");
                report.pipes.push((name, PipeStatus::Skipped));
                continue;
            }

            pipe.default(ctx)
                .map_err(|e| fail(name, Phase::Default, e))?;

            log::info!(pipe = name; "running");
            pipe.run(ctx)
                .await
                .map_err(|e| fail(name, Phase::Execute, e))?;

            report.pipes.push((name, PipeStatus::Completed));
        }

        Ok(report)
    }

    /// Apply every non-skipped pipe's defaults without running anything
    pub fn apply_defaults(&self, ctx: &mut Context) -> Result<()> {
        for pipe in &self.pipes {
            if pipe.skip(ctx) {
                continue;
            }
            pipe.default(ctx)
                .map_err(|e| fail(pipe.name(), Phase::Default, e))?;
        }
        Ok(())
    }
}

fn fail(pipe: &'static str, phase: Phase, source: ReleaseError) -> ReleaseError {
    log::error!(pipe = pipe, phase:% = phase, err:% = source; "pipe failed");
    ReleaseError::Pipe {
        pipe: pipe.to_string(),
        phase,
        source: Box::new(source),
    }
}
