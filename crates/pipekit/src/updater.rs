//! Writing end-prep text onto pipes.

use std::collections::BTreeSet;

use pipekit_connect::{both_end_preps, ConnectorGraph, PreferenceSet};
use pipekit_model::{classify, ElementId, Notifier, ParameterStore, PassThroughRule, PipingModel};

use crate::SessionError;

const END_PREP_ERROR_TITLE: &str = "End Prep Error";

/// What [`EndPrepUpdater::update_pipe`] did to one pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The parameter was set to this value.
    Written(String),
    /// The parameter already holds the computed value.
    Unchanged,
    /// The parameter holds manual text and the update was not forced.
    Kept,
    /// The pipe has no end-prep parameter.
    MissingParameter,
}

/// Counts of a whole-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    /// Pipes whose parameter was written.
    pub written: usize,
    /// Pipes already up to date.
    pub unchanged: usize,
    /// Pipes with manual text left alone.
    pub kept: usize,
    /// Pipes without the parameter.
    pub missing: usize,
    /// Pipes that could not be classified.
    pub failed: usize,
}

/// Computes end-prep text and writes it to a pipe parameter.
///
/// A value is only written when the parameter exists, is blank (or the
/// update is forced), and differs from the computed text.
pub struct EndPrepUpdater<'s> {
    parameter: &'s str,
    preferences: &'s PreferenceSet,
    rule: &'s PassThroughRule,
    limit: usize,
}

impl<'s> EndPrepUpdater<'s> {
    /// Create an updater writing to `parameter`.
    pub fn new(
        parameter: &'s str,
        preferences: &'s PreferenceSet,
        rule: &'s PassThroughRule,
        limit: usize,
    ) -> Self {
        Self {
            parameter,
            preferences,
            rule,
            limit,
        }
    }

    /// Name of the target parameter.
    pub fn parameter(&self) -> &str {
        self.parameter
    }

    /// Update one pipe.
    pub fn update_pipe<D: PipingModel + ParameterStore + ?Sized>(
        &self,
        doc: &mut D,
        notifier: &dyn Notifier,
        pipe: ElementId,
        force: bool,
    ) -> Result<UpdateOutcome, SessionError> {
        let Some(current) = doc.text_parameter(pipe, self.parameter) else {
            return Ok(UpdateOutcome::MissingParameter);
        };
        if !force && !current.trim().is_empty() {
            return Ok(UpdateOutcome::Kept);
        }

        let value = {
            let graph = ConnectorGraph::new(&*doc, self.rule, notifier).with_limit(self.limit);
            both_end_preps(&graph, pipe, self.preferences)?
        };
        if value == current {
            return Ok(UpdateOutcome::Unchanged);
        }
        doc.set_text_parameter(pipe, self.parameter, &value)?;
        log::debug!("pipe {}: {} = {}", pipe, self.parameter, value);
        Ok(UpdateOutcome::Written(value))
    }

    /// Update every pipe of the document. A pipe that cannot be classified
    /// is reported and skipped.
    pub fn update_all<D: PipingModel + ParameterStore + ?Sized>(
        &self,
        doc: &mut D,
        notifier: &dyn Notifier,
        force: bool,
    ) -> Result<UpdateSummary, SessionError> {
        let pipes: Vec<ElementId> = doc
            .element_ids()
            .into_iter()
            .filter(|id| doc.element(*id).is_some_and(classify::is_pipe))
            .collect();
        self.update_pipes(doc, notifier, &pipes, force)
    }

    /// Update the given pipes.
    pub fn update_pipes<D: PipingModel + ParameterStore + ?Sized>(
        &self,
        doc: &mut D,
        notifier: &dyn Notifier,
        pipes: &[ElementId],
        force: bool,
    ) -> Result<UpdateSummary, SessionError> {
        let mut summary = UpdateSummary::default();
        for pipe in pipes {
            match self.update_pipe(doc, notifier, *pipe, force) {
                Ok(UpdateOutcome::Written(_)) => summary.written += 1,
                Ok(UpdateOutcome::Unchanged) => summary.unchanged += 1,
                Ok(UpdateOutcome::Kept) => summary.kept += 1,
                Ok(UpdateOutcome::MissingParameter) => summary.missing += 1,
                Err(SessionError::EndPrep(e)) => {
                    notifier.notify(END_PREP_ERROR_TITLE, &format!("pipe {}: {}", pipe, e));
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "end-prep update: {} written, {} unchanged, {} kept, {} missing, {} failed",
            summary.written,
            summary.unchanged,
            summary.kept,
            summary.missing,
            summary.failed
        );
        Ok(summary)
    }

    /// Pipes whose end-prep text may change when `changed` elements change:
    /// changed pipes themselves plus every pipe reached from a changed
    /// element's ports, looking through pass-through fittings.
    pub fn affected_pipes<M: PipingModel + ?Sized>(
        &self,
        model: &M,
        notifier: &dyn Notifier,
        changed: &[ElementId],
    ) -> Vec<ElementId> {
        let graph = ConnectorGraph::new(model, self.rule, notifier).with_limit(self.limit);
        let mut pipes = BTreeSet::new();
        for id in changed {
            let Some(element) = model.element(*id) else {
                continue;
            };
            if classify::is_pipe(element) {
                pipes.insert(*id);
                continue;
            }
            for connector in graph.connectors(*id) {
                match graph.try_get_connected_skip_nc(connector) {
                    Ok(Some(peer)) => {
                        if model.element(peer.owner).is_some_and(classify::is_pipe) {
                            pipes.insert(peer.owner);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("skipping {} after change: {}", connector, e),
                }
            }
        }
        pipes.into_iter().collect()
    }
}
