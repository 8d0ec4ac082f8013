//! Connector graph primitives.

use std::collections::HashSet;

use pipekit_math::Tolerance;
use pipekit_model::{ConnectionType, ConnectorId, ElementId, Notifier, PassThroughRule, PipingModel};

use crate::TraversalError;

/// Default cap on steps taken by a single skip-through walk.
pub const DEFAULT_TRAVERSAL_LIMIT: usize = 10_000;

const CONNECTOR_ERROR_TITLE: &str = "Connector Error";

/// Traversal over the joins between connectors of a host document.
///
/// Bundles the document, the pass-through rule and the notification channel
/// so the primitives can be chained without threading them through every
/// call.
pub struct ConnectorGraph<'a, M: PipingModel + ?Sized> {
    model: &'a M,
    rule: &'a PassThroughRule,
    notifier: &'a dyn Notifier,
    limit: usize,
}

impl<'a, M: PipingModel + ?Sized> ConnectorGraph<'a, M> {
    /// Create a graph view with the default step limit.
    pub fn new(model: &'a M, rule: &'a PassThroughRule, notifier: &'a dyn Notifier) -> Self {
        Self {
            model,
            rule,
            notifier,
            limit: DEFAULT_TRAVERSAL_LIMIT,
        }
    }

    /// Builder: cap the number of steps of skip-through walks.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// The underlying document.
    pub fn model(&self) -> &'a M {
        self.model
    }

    /// The pass-through rule in use.
    pub fn rule(&self) -> &'a PassThroughRule {
        self.rule
    }

    /// The notification channel in use.
    pub fn notifier(&self) -> &'a dyn Notifier {
        self.notifier
    }

    /// Step cap for walks.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// All ports of an element. Empty when the element or its connector
    /// manager is absent.
    pub fn connectors(&self, element: ElementId) -> Vec<ConnectorId> {
        match self.model.connector_manager(element) {
            Ok(ports) => ports.iter().map(|c| c.id).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The peer joined to `connector`: the first referenced end connector
    /// owned by a different element.
    pub fn try_get_connected(&self, connector: ConnectorId) -> Option<ConnectorId> {
        let source = self.model.connector(connector)?;
        if !source.is_connected() {
            return None;
        }
        source.refs.iter().copied().find(|r| {
            r.owner != source.owner()
                && self
                    .model
                    .connector(*r)
                    .is_some_and(|p| p.connection_type == ConnectionType::End)
        })
    }

    /// Another port on the same owner.
    ///
    /// When several candidates exist, a port parallel to the source (angle
    /// within [`Tolerance::PARALLEL_PORT_ANGLE`]) wins; otherwise the first
    /// candidate is returned. An invalid connector manager is reported to
    /// the user and yields `None`.
    pub fn adjacent_connector(&self, connector: ConnectorId) -> Option<ConnectorId> {
        let ports = match self.model.connector_manager(connector.owner) {
            Ok(ports) => ports,
            Err(e) => {
                self.notifier.notify(CONNECTOR_ERROR_TITLE, &e.to_string());
                return None;
            }
        };
        let source = ports.iter().find(|c| c.id == connector)?;
        let mut first = None;
        for port in ports.iter().filter(|c| c.id != connector) {
            if (port.angle - source.angle).abs() < Tolerance::PARALLEL_PORT_ANGLE {
                return Some(port.id);
            }
            first.get_or_insert(port.id);
        }
        first
    }

    /// Like [`try_get_connected`](Self::try_get_connected), but pass-through
    /// fittings are skipped: the walk continues through the fitting's
    /// adjacent port to the next peer.
    pub fn try_get_connected_skip_nc(
        &self,
        connector: ConnectorId,
    ) -> Result<Option<ConnectorId>, TraversalError> {
        Ok(self
            .connected_family_instance_with_connector(connector)?
            .map(|(_, peer)| peer))
    }

    /// The first non-pass-through element reached from `connector`, with the
    /// peer connector it was reached through.
    ///
    /// A dead end inside a chain of pass-through fittings yields `None`.
    /// Revisiting a connector yields [`TraversalError::CycleDetected`];
    /// needing more than `limit` hops through pass-through fittings yields
    /// [`TraversalError::IterationLimit`].
    pub fn connected_family_instance_with_connector(
        &self,
        connector: ConnectorId,
    ) -> Result<Option<(ElementId, ConnectorId)>, TraversalError> {
        let mut visited = HashSet::from([connector]);
        let Some(mut peer) = self.try_get_connected(connector) else {
            return Ok(None);
        };

        let mut hops = 0;
        loop {
            if !visited.insert(peer) {
                return Err(TraversalError::CycleDetected {
                    start: connector,
                    revisited: peer,
                });
            }
            let Some(owner) = self.model.element(peer.owner) else {
                return Ok(None);
            };
            if !self.rule.is_pass_through(owner) {
                return Ok(Some((owner.id, peer)));
            }

            if hops == self.limit {
                return Err(TraversalError::IterationLimit(self.limit));
            }
            hops += 1;

            log::debug!("skipping pass-through fitting {}", owner.id);
            let Some(exit) = self.adjacent_connector(peer) else {
                return Ok(None);
            };
            if !visited.insert(exit) {
                return Err(TraversalError::CycleDetected {
                    start: connector,
                    revisited: exit,
                });
            }
            let Some(next) = self.try_get_connected(exit) else {
                return Ok(None);
            };
            peer = next;
        }
    }
}
