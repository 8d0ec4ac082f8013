//! Traits a host integration implements.

use std::cell::RefCell;

use pipekit_math::Line3;

use crate::{
    Connector, ConnectorId, DimensionId, DimensionTypeId, DimensionTypeInfo, Element, ElementId,
    ModelError, ReferenceId, View, ViewId,
};

/// Read access to the host document.
pub trait PipingModel {
    /// Element by id.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Ids of every element in the document.
    fn element_ids(&self) -> Vec<ElementId>;

    /// View by id.
    fn view(&self, id: ViewId) -> Option<&View>;

    /// Text metrics of a dimension type.
    fn dimension_type(&self, id: DimensionTypeId) -> Option<&DimensionTypeInfo>;

    /// Connector by id.
    fn connector(&self, id: ConnectorId) -> Option<&Connector> {
        self.element(id.owner)?.connector(id.index)
    }

    /// All ports of an element's connector manager.
    fn connector_manager(&self, owner: ElementId) -> Result<&[Connector], ModelError> {
        self.element(owner)
            .ok_or(ModelError::ElementNotFound(owner))?
            .connector_list()
    }
}

/// Text parameter access on elements.
pub trait ParameterStore {
    /// Current value, `None` when the parameter does not exist.
    fn text_parameter(&self, element: ElementId, name: &str) -> Option<String>;

    /// Write a value to an existing parameter.
    fn set_text_parameter(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), ModelError>;
}

/// A linear dimension the engine asks the host to create.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRequest {
    /// View to place the dimension in.
    pub view: ViewId,
    /// Dimension line.
    pub line: Line3,
    /// References measured between, in order.
    pub references: Vec<ReferenceId>,
    /// Dimension type to use.
    pub dimension_type: DimensionTypeId,
}

/// Dimension creation in the host document.
pub trait DimensionHost {
    /// Create a linear dimension.
    fn create_dimension(&mut self, request: &DimensionRequest) -> Result<DimensionId, ModelError>;
}

/// User-facing notification channel.
pub trait Notifier {
    /// Show a message with a title.
    fn notify(&self, title: &str, message: &str);
}

/// Notifier that forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        log::warn!("{}: {}", title, message);
    }
}

/// Notifier that keeps every message, for tests and batch runs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far as `(title, message)` pairs.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.borrow().clone()
    }

    /// Number of messages received.
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Whether nothing was received.
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        log::debug!("{}: {}", title, message);
        self.messages
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}
