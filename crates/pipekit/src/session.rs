//! Per-document session state.

use pipekit_connect::{ConnectorGraph, PipeEndPrepPreferences, PreferenceSet};
use pipekit_dim::{plan_dimensions, DimensionReport, DimensionStyles};
use pipekit_line::{build_pipe_line, PipeLine, PipingFilter};
use pipekit_math::Point3;
use pipekit_model::{DimensionHost, ElementId, Notifier, PipingModel, View, ViewId};

use crate::{Component, EndPrepUpdater, ParameterGrid, SessionError, Settings};

/// Configuration of the tools for one open document.
///
/// Nothing is cached between documents: call [`Session::reload`] whenever
/// the active document changes.
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    preferences: PreferenceSet,
    styles: DimensionStyles,
}

impl Session {
    /// Create a session with empty preferences.
    pub fn new(settings: Settings) -> Self {
        let styles = settings.dimensions.clone();
        Self {
            settings,
            preferences: PreferenceSet::default(),
            styles,
        }
    }

    /// Rebuild document-scoped state: seed end-prep preferences from the
    /// fitting types of `model`, overlay `saved` records, and take `styles`
    /// or the configured defaults.
    pub fn reload<M: PipingModel + ?Sized>(
        &mut self,
        model: &M,
        saved: &[PipeEndPrepPreferences],
        styles: Option<DimensionStyles>,
    ) {
        let mut preferences = PreferenceSet::seed(model);
        preferences.apply_saved(saved);
        self.preferences = preferences;
        self.styles = styles.unwrap_or_else(|| self.settings.dimensions.clone());
        log::info!(
            "session reloaded: {} fitting type(s), {} saved record(s)",
            self.preferences.len(),
            saved.len()
        );
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// End-prep preferences of the current document.
    pub fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    /// Mutable end-prep preferences, for editing.
    pub fn preferences_mut(&mut self) -> &mut PreferenceSet {
        &mut self.preferences
    }

    /// Dimension styles of the current document.
    pub fn styles(&self) -> &DimensionStyles {
        &self.styles
    }

    /// Connector graph over `model` with the configured pass-through rule
    /// and traversal limit.
    pub fn graph<'a, M: PipingModel + ?Sized>(
        &'a self,
        model: &'a M,
        notifier: &'a dyn Notifier,
    ) -> ConnectorGraph<'a, M> {
        ConnectorGraph::new(model, &self.settings.pass_through, notifier)
            .with_limit(self.settings.traversal_limit)
    }

    /// Run filter of the pipe-line tools.
    pub fn filter(&self, linear_only: bool) -> PipingFilter {
        let mut filter = PipingFilter::default_run().with_linear_only(linear_only);
        filter.tolerance = self.settings.linear_tolerance;
        filter
    }

    fn require(&self, component: Component) -> Result<(), SessionError> {
        if self.settings.components.is_enabled(component) {
            Ok(())
        } else {
            Err(SessionError::ComponentDisabled(component))
        }
    }

    /// End-prep updater over the current preferences.
    pub fn end_prep_updater(&self) -> Result<EndPrepUpdater<'_>, SessionError> {
        self.require(Component::EndPrepUpdater)?;
        Ok(EndPrepUpdater::new(
            &self.settings.end_prep.parameter,
            &self.preferences,
            &self.settings.pass_through,
            self.settings.traversal_limit,
        ))
    }

    /// The pipe line around `pipe`, restricted to elements visible in
    /// `view` when given.
    pub fn select_pipe_line<M: PipingModel + ?Sized>(
        &self,
        model: &M,
        notifier: &dyn Notifier,
        pipe: ElementId,
        view: Option<&View>,
        linear_only: bool,
    ) -> Result<PipeLine, SessionError> {
        self.require(Component::SelectPipeLine)?;
        let graph = self.graph(model, notifier);
        let line = build_pipe_line(&graph, pipe, &self.filter(linear_only), view)?;
        log::info!("pipe line of {}: {} element(s)", pipe, line.len());
        Ok(line)
    }

    /// Dimension the pipe line around `pipe` in `view`, with the overall
    /// dimension line through `placement`.
    ///
    /// The line is assembled from elements visible in the view. Dimensions
    /// are planned against the document first and created afterwards.
    pub fn dimension_pipe_line<D: PipingModel + DimensionHost + ?Sized>(
        &self,
        doc: &mut D,
        notifier: &dyn Notifier,
        pipe: ElementId,
        view: ViewId,
        placement: Point3,
        linear_only: bool,
    ) -> Result<DimensionReport, SessionError> {
        self.require(Component::DimensionPipeLine)?;
        let plan = {
            let model: &D = &*doc;
            let view = model.view(view).ok_or(SessionError::ViewNotFound(view.0))?;
            let graph = self.graph(model, notifier);
            let line = build_pipe_line(&graph, pipe, &self.filter(linear_only), Some(view))?;
            plan_dimensions(&graph, &line, view, placement, &self.styles)?
        };
        let report = plan.apply(doc, notifier);
        log::info!(
            "dimensioned pipe line of {}: {} sub-dimension(s), {} failure(s)",
            pipe,
            report.secondary.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Parameter grid over `elements`.
    pub fn parameter_grid<M: PipingModel + ?Sized>(
        &self,
        model: &M,
        elements: &[ElementId],
    ) -> Result<ParameterGrid, SessionError> {
        self.require(Component::ParameterGrid)?;
        Ok(ParameterGrid::build(model, elements))
    }
}
