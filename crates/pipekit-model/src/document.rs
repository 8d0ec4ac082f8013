//! In-memory document snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ConnectorId, DimensionHost, DimensionId, DimensionRequest, DimensionTypeId,
    DimensionTypeInfo, Element, ElementId, ModelError, ParameterStore, PipingModel, ReferenceId,
    View, ViewId,
};

/// A dimension recorded by [`Document`] acting as a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedDimension {
    /// Identity.
    pub id: DimensionId,
    /// View it was placed in.
    pub view: ViewId,
    /// Point on the dimension line.
    pub origin: [f64; 3],
    /// Dimension line direction.
    pub direction: [f64; 3],
    /// Measured references.
    pub references: Vec<ReferenceId>,
    /// Dimension type.
    pub dimension_type: DimensionTypeId,
}

/// A piping document snapshot.
///
/// Holds elements, views and dimension types, and records dimensions and
/// parameter writes made against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// Elements keyed by id.
    #[serde(default)]
    pub elements: BTreeMap<ElementId, Element>,
    /// Views keyed by id.
    #[serde(default)]
    pub views: BTreeMap<ViewId, View>,
    /// Dimension types keyed by id.
    #[serde(default)]
    pub dimension_types: BTreeMap<DimensionTypeId, DimensionTypeInfo>,
    /// Dimensions created so far.
    #[serde(default)]
    pub dimensions: Vec<CreatedDimension>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            elements: BTreeMap::new(),
            views: BTreeMap::new(),
            dimension_types: BTreeMap::new(),
            dimensions: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string and [`validate`](Self::validate) it.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check that every element sits under its own id and that every
    /// connector id names its owner and list position.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (key, element) in &self.elements {
            if *key != element.id {
                return Err(ModelError::ElementKeyMismatch {
                    key: *key,
                    found: element.id,
                });
            }
            for (position, connector) in element.connectors.iter().flatten().enumerate() {
                if connector.id != ConnectorId::new(element.id, position as u32) {
                    return Err(ModelError::ConnectorMismatch {
                        element: element.id,
                        position,
                        found: connector.id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert an element, replacing any element with the same id.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.insert(id, element);
        id
    }

    /// Insert a view.
    pub fn add_view(&mut self, view: View) -> ViewId {
        let id = view.id;
        self.views.insert(id, view);
        id
    }

    /// Insert a dimension type.
    pub fn add_dimension_type(&mut self, info: DimensionTypeInfo) -> DimensionTypeId {
        let id = info.id;
        self.dimension_types.insert(id, info);
        id
    }

    /// Mutable element by id.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Join two free connectors to each other.
    pub fn connect(&mut self, a: ConnectorId, b: ConnectorId) -> Result<(), ModelError> {
        for id in [a, b] {
            let connector = self.connector(id).ok_or(ModelError::ConnectorNotFound(id))?;
            if connector.is_connected() {
                return Err(ModelError::AlreadyConnected(id));
            }
        }
        self.connector_mut(a)?.refs.push(b);
        self.connector_mut(b)?.refs.push(a);
        Ok(())
    }

    /// Break the join at `a`, clearing both sides.
    pub fn disconnect(&mut self, a: ConnectorId) -> Result<(), ModelError> {
        let peers = std::mem::take(&mut self.connector_mut(a)?.refs);
        for peer in peers {
            if let Ok(c) = self.connector_mut(peer) {
                c.refs.retain(|r| *r != a);
            }
        }
        Ok(())
    }

    fn connector_mut(&mut self, id: ConnectorId) -> Result<&mut crate::Connector, ModelError> {
        self.elements
            .get_mut(&id.owner)
            .and_then(|e| e.connector_mut(id.index))
            .ok_or(ModelError::ConnectorNotFound(id))
    }
}

impl PipingModel for Document {
    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn element_ids(&self) -> Vec<ElementId> {
        self.elements.keys().copied().collect()
    }

    fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(&id)
    }

    fn dimension_type(&self, id: DimensionTypeId) -> Option<&DimensionTypeInfo> {
        self.dimension_types.get(&id)
    }
}

impl ParameterStore for Document {
    fn text_parameter(&self, element: ElementId, name: &str) -> Option<String> {
        self.elements.get(&element)?.parameters.get(name).cloned()
    }

    fn set_text_parameter(
        &mut self,
        element: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), ModelError> {
        let slot = self
            .elements
            .get_mut(&element)
            .ok_or(ModelError::ElementNotFound(element))?
            .parameters
            .get_mut(name)
            .ok_or_else(|| ModelError::ParameterNotFound {
                element,
                name: name.to_string(),
            })?;
        *slot = value.to_string();
        Ok(())
    }
}

impl DimensionHost for Document {
    fn create_dimension(&mut self, request: &DimensionRequest) -> Result<DimensionId, ModelError> {
        if request.references.len() < 2 {
            return Err(ModelError::DimensionFailed(format!(
                "a dimension needs at least two references, got {}",
                request.references.len()
            )));
        }
        if !self.views.contains_key(&request.view) {
            return Err(ModelError::DimensionFailed(format!(
                "view {} not found",
                request.view.0
            )));
        }
        let id = DimensionId(self.dimensions.len() as i64 + 1);
        let dir = request.line.direction.as_ref();
        self.dimensions.push(CreatedDimension {
            id,
            view: request.view,
            origin: pipekit_math::point_to_array(&request.line.origin),
            direction: [dir.x, dir.y, dir.z],
            references: request.references.clone(),
            dimension_type: request.dimension_type,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_math::{Line3, Point3, Vec3};

    fn two_pipes() -> Document {
        let mut doc = Document::new();
        doc.add_element(Element::pipe(
            ElementId(1),
            Point3::origin(),
            Point3::new(5.0, 0.0, 0.0),
        ));
        doc.add_element(Element::pipe(
            ElementId(2),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
        ));
        doc
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut doc = two_pipes();
        let a = ConnectorId::new(ElementId(1), 1);
        let b = ConnectorId::new(ElementId(2), 0);
        doc.connect(a, b).unwrap();
        assert_eq!(doc.connector(a).unwrap().refs, vec![b]);
        assert_eq!(doc.connector(b).unwrap().refs, vec![a]);
        assert!(matches!(
            doc.connect(a, ConnectorId::new(ElementId(2), 1)),
            Err(ModelError::AlreadyConnected(_))
        ));
        doc.disconnect(b).unwrap();
        assert!(!doc.connector(a).unwrap().is_connected());
    }

    #[test]
    fn test_roundtrip_document() {
        let mut doc = two_pipes();
        doc.connect(
            ConnectorId::new(ElementId(1), 1),
            ConnectorId::new(ElementId(2), 0),
        )
        .unwrap();
        doc.add_view(View::plan(ViewId(10), 48.0));
        let json = doc.to_json().expect("serialize");
        let restored = Document::from_json(&json).expect("deserialize");
        assert_eq!(doc, restored);
    }

    #[test]
    fn test_load_rejects_misnumbered_connectors() {
        let mut doc = two_pipes();
        doc.element_mut(ElementId(1))
            .unwrap()
            .connectors
            .as_mut()
            .unwrap()
            .swap(0, 1);
        let json = doc.to_json().unwrap();
        match Document::from_json(&json) {
            Err(ModelError::ConnectorMismatch {
                element,
                position,
                found,
            }) => {
                assert_eq!(element, ElementId(1));
                assert_eq!(position, 0);
                assert_eq!(found, ConnectorId::new(ElementId(1), 1));
            }
            other => panic!("expected connector mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_element_under_foreign_key() {
        let mut doc = two_pipes();
        let moved = doc.elements.remove(&ElementId(2)).unwrap();
        doc.elements.insert(ElementId(7), moved);
        assert!(matches!(
            doc.validate(),
            Err(ModelError::ElementKeyMismatch {
                key: ElementId(7),
                found: ElementId(2),
            })
        ));
        let json = doc.to_json().unwrap();
        assert!(matches!(
            Document::from_json(&json),
            Err(ModelError::ElementKeyMismatch { .. })
        ));
        assert!(matches!(
            Document::from_json("{ not json"),
            Err(ModelError::Json(_))
        ));
    }

    #[test]
    fn test_parameter_write_requires_existing_parameter() {
        let mut doc = Document::new();
        doc.add_element(
            Element::pipe(ElementId(1), Point3::origin(), Point3::new(1.0, 0.0, 0.0))
                .with_parameter("End Prep", ""),
        );
        doc.set_text_parameter(ElementId(1), "End Prep", "MJ x PE")
            .unwrap();
        assert_eq!(
            doc.text_parameter(ElementId(1), "End Prep").as_deref(),
            Some("MJ x PE")
        );
        assert!(doc
            .set_text_parameter(ElementId(1), "Comments", "x")
            .is_err());
    }

    #[test]
    fn test_dimension_needs_two_references() {
        let mut doc = two_pipes();
        doc.add_view(View::plan(ViewId(10), 48.0));
        let line = Line3::unbound(Point3::origin(), Vec3::x()).unwrap();
        let mut request = DimensionRequest {
            view: ViewId(10),
            line,
            references: vec![ReferenceId::new("a")],
            dimension_type: DimensionTypeId(1),
        };
        assert!(doc.create_dimension(&request).is_err());
        request.references.push(ReferenceId::new("b"));
        assert_eq!(doc.create_dimension(&request).unwrap(), DimensionId(1));
        assert_eq!(doc.dimensions.len(), 1);
    }
}
