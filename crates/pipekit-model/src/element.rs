//! Elements and their connectors.

use std::collections::BTreeMap;

use pipekit_math::{point_from_array, point_to_array, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::{ConnectorId, ElementId, GeometryObject, ModelError, ReferenceId, TypeId};

/// Host category of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    /// Straight pipe segment.
    Pipe,
    /// Pipe fitting (elbow, tee, flange, ...).
    PipeFitting,
    /// Pipe accessory (valve, strainer, ...).
    PipeAccessory,
    /// Mechanical equipment (pump, tank, ...).
    MechanicalEquipment,
    /// Anything else.
    #[default]
    Other,
}

/// Semantic sub-classification of a fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PartType {
    /// No part type (non-fittings, or fittings without one).
    #[default]
    Undefined,
    /// Elbow / bend.
    Elbow,
    /// Tee.
    Tee,
    /// Wye.
    Wye,
    /// Cross.
    Cross,
    /// Lateral tee.
    LateralTee,
    /// Lateral cross.
    LateralCross,
    /// Flange.
    Flange,
    /// Union.
    Union,
    /// Multi-port fitting.
    MultiPort,
    /// Size transition / reducer.
    Transition,
    /// End cap.
    Cap,
    /// Coupling.
    Coupling,
}

/// How a connector joins its peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionType {
    /// Physical end-to-end connection.
    #[default]
    End,
    /// Connection along a curve (tap into a pipe body).
    Curve,
    /// Physical but not end-based.
    Physical,
    /// Logical-only connection.
    Logical,
}

/// A joinable port on an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Identity (owner + index).
    pub id: ConnectorId,
    /// Position of the port `[x, y, z]`.
    pub origin: [f64; 3],
    /// Port angle in radians, used to detect parallel ports.
    #[serde(default)]
    pub angle: f64,
    /// Connection type.
    #[serde(default)]
    pub connection_type: ConnectionType,
    /// Connectors this port is joined to.
    #[serde(default)]
    pub refs: Vec<ConnectorId>,
    /// Whether this is the fitting's primary port.
    #[serde(default)]
    pub is_primary: bool,
}

impl Connector {
    /// Create an unconnected end connector.
    pub fn new(owner: ElementId, index: u32, origin: Point3) -> Self {
        Self {
            id: ConnectorId::new(owner, index),
            origin: point_to_array(&origin),
            angle: 0.0,
            connection_type: ConnectionType::End,
            refs: Vec::new(),
            is_primary: false,
        }
    }

    /// Position of the port.
    pub fn origin_point(&self) -> Point3 {
        point_from_array(self.origin)
    }

    /// Whether the port is joined to anything.
    pub fn is_connected(&self) -> bool {
        !self.refs.is_empty()
    }

    /// Owning element.
    pub fn owner(&self) -> ElementId {
        self.id.owner
    }
}

/// An element of the host document, reduced to what the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Identity.
    pub id: ElementId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Host category.
    #[serde(default)]
    pub category: Category,
    /// Fitting part type.
    #[serde(default)]
    pub part_type: PartType,
    /// Family name.
    #[serde(default)]
    pub family_name: String,
    /// Type identity.
    #[serde(default)]
    pub type_id: TypeId,
    /// Type name.
    #[serde(default)]
    pub type_name: String,
    /// Location point `[x, y, z]`, if the element has one.
    #[serde(default)]
    pub location: Option<[f64; 3]>,
    /// Ports; `None` when the element has no usable connector manager.
    #[serde(default)]
    pub connectors: Option<Vec<Connector>>,
    /// Text parameters by name.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Exposed geometry.
    #[serde(default)]
    pub geometry: Vec<GeometryObject>,
}

impl Element {
    /// Create an element with no ports or geometry.
    pub fn new(id: ElementId, category: Category) -> Self {
        Self {
            id,
            name: String::new(),
            category,
            part_type: PartType::Undefined,
            family_name: String::new(),
            type_id: TypeId::default(),
            type_name: String::new(),
            location: None,
            connectors: Some(Vec::new()),
            parameters: BTreeMap::new(),
            geometry: Vec::new(),
        }
    }

    /// A straight pipe from `start` to `end`.
    ///
    /// The pipe's centerline is exposed as a line whose endpoints carry the
    /// references `pipe-<id>-0` and `pipe-<id>-1`.
    pub fn pipe(id: ElementId, start: Point3, end: Point3) -> Self {
        let mid = pipekit_math::lerp(&start, &end, 0.5);
        Self::new(id, Category::Pipe)
            .with_name(format!("Pipe {}", id))
            .with_location(mid)
            .with_connector(start)
            .with_connector(end)
            .with_geometry(GeometryObject::Line {
                start: point_to_array(&start),
                end: point_to_array(&end),
                style: None,
                reference: Some(ReferenceId::new(format!("pipe-{}", id))),
                start_reference: Some(ReferenceId::new(format!("pipe-{}-0", id))),
                end_reference: Some(ReferenceId::new(format!("pipe-{}-1", id))),
            })
    }

    /// A pipe fitting of the given part type and type identity.
    pub fn fitting(id: ElementId, part_type: PartType, type_id: impl Into<String>) -> Self {
        let type_id = TypeId::new(type_id);
        let mut element = Self::new(id, Category::PipeFitting).with_part_type(part_type);
        element.type_name = type_id.0.clone();
        element.type_id = type_id;
        element
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set the part type.
    pub fn with_part_type(mut self, part_type: PartType) -> Self {
        self.part_type = part_type;
        self
    }

    /// Builder: set the family name.
    pub fn with_family(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = family_name.into();
        self
    }

    /// Builder: set the type identity and name.
    pub fn with_type(mut self, type_id: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.type_id = TypeId::new(type_id);
        self.type_name = type_name.into();
        self
    }

    /// Builder: set the location point.
    pub fn with_location(mut self, location: Point3) -> Self {
        self.location = Some(point_to_array(&location));
        self
    }

    /// Builder: append a non-primary end connector at `origin`.
    pub fn with_connector(self, origin: Point3) -> Self {
        self.push_connector(origin, 0.0, false)
    }

    /// Builder: append the primary end connector at `origin`.
    pub fn with_primary_connector(self, origin: Point3) -> Self {
        self.push_connector(origin, 0.0, true)
    }

    /// Builder: append a connector with an explicit port angle.
    pub fn with_angled_connector(self, origin: Point3, angle: f64) -> Self {
        self.push_connector(origin, angle, false)
    }

    fn push_connector(mut self, origin: Point3, angle: f64, is_primary: bool) -> Self {
        let list = self.connectors.get_or_insert_with(Vec::new);
        let mut connector = Connector::new(self.id, list.len() as u32, origin);
        connector.angle = angle;
        connector.is_primary = is_primary;
        list.push(connector);
        self
    }

    /// Builder: drop the connector manager entirely.
    pub fn without_connector_manager(mut self) -> Self {
        self.connectors = None;
        self
    }

    /// Builder: set a text parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Builder: add a geometry object.
    pub fn with_geometry(mut self, geometry: GeometryObject) -> Self {
        self.geometry.push(geometry);
        self
    }

    /// The connector manager's ports.
    pub fn connector_list(&self) -> Result<&[Connector], ModelError> {
        self.connectors
            .as_deref()
            .ok_or(ModelError::NoConnectorManager(self.id))
    }

    /// Port by index, if present.
    pub fn connector(&self, index: u32) -> Option<&Connector> {
        self.connectors.as_ref()?.get(index as usize)
    }

    /// Mutable port by index, if present.
    pub fn connector_mut(&mut self, index: u32) -> Option<&mut Connector> {
        self.connectors.as_mut()?.get_mut(index as usize)
    }

    /// Number of ports (zero without a connector manager).
    pub fn connector_count(&self) -> usize {
        self.connectors.as_ref().map_or(0, Vec::len)
    }

    /// Location point, if any.
    pub fn location_point(&self) -> Option<Point3> {
        self.location.map(point_from_array)
    }

    /// Location point, else the mean of the connector origins.
    pub fn centroid(&self) -> Option<Point3> {
        if let Some(p) = self.location_point() {
            return Some(p);
        }
        let connectors = self.connectors.as_ref()?;
        if connectors.is_empty() {
            return None;
        }
        let sum = connectors
            .iter()
            .fold(Vec3::zeros(), |acc, c| acc + c.origin_point().coords);
        Some(Point3::from(sum / connectors.len() as f64))
    }
}
