// tabula-core/src/application/pipeline.rs
//
// Ordered accumulation of operations plus the lineage record each produced.
// The pipeline owns its history and the executor, never the table: tables
// flow through `append_step` and back to the caller.

use serde::{Deserialize, Serialize};

use crate::application::executor::TransformExecutor;
use crate::domain::dataset::Table;
use crate::domain::error::DomainError;
use crate::domain::lineage::StepResult;
use crate::domain::ops::OperationSpec;
use crate::error::TabulaError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub spec: OperationSpec,
    pub result: StepResult,
}

#[derive(Debug, Default)]
pub struct Pipeline {
    executor: TransformExecutor,
    steps: Vec<PipelineStep>,
}

impl Pipeline {
    pub fn new(executor: TransformExecutor) -> Self {
        Self {
            executor,
            steps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn history(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Execute one operation and record it. A step that fails validation or
    /// execution is never appended: the history always replays cleanly.
    pub fn append_step(
        &mut self,
        table: &Table,
        spec: OperationSpec,
    ) -> Result<(Table, StepResult), TabulaError> {
        let (new_table, result) = self
            .executor
            .apply(table, &spec)
            .map_err(|source| TabulaError::Step {
                index: self.steps.len(),
                source,
            })?;
        self.steps.push(PipelineStep {
            spec,
            result: result.clone(),
        });
        Ok((new_table, result))
    }

    /// Re-execute the recorded operations, in order, against a fresh copy of
    /// the initial table. Every operation is deterministic, so this
    /// reproduces the exact table the original `append_step` calls built.
    pub fn replay(&self, initial: &Table) -> Result<Table, TabulaError> {
        self.replay_prefix(initial, self.steps.len())
    }

    /// Discard every step after `step_index` and return the table as it
    /// stood right after that step. The retained prefix is replayed first;
    /// if anything goes wrong the history is left untouched.
    pub fn truncate(&mut self, step_index: usize, initial: &Table) -> Result<Table, TabulaError> {
        if step_index >= self.steps.len() {
            return Err(DomainError::StepOutOfRange {
                index: step_index,
                len: self.steps.len(),
            }
            .into());
        }
        let table = self.replay_prefix(initial, step_index + 1)?;
        self.steps.truncate(step_index + 1);
        Ok(table)
    }

    fn replay_prefix(&self, initial: &Table, count: usize) -> Result<Table, TabulaError> {
        let mut table = initial.clone();
        for (index, step) in self.steps.iter().take(count).enumerate() {
            let (next, _) = self
                .executor
                .apply(&table, &step.spec)
                .map_err(|source| TabulaError::Step { index, source })?;
            table = next;
        }
        Ok(table)
    }
}
