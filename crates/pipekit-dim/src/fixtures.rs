//! Test documents shared by the dimension tests.

use pipekit_connect::ConnectorGraph;
use pipekit_line::{build_default_pipe_line, PipeLine};
use pipekit_math::{point_to_array, Point3, Vec3};
use pipekit_model::{
    Category, ConnectorId, DimensionHost, DimensionId, DimensionRequest, DimensionTypeId,
    DimensionTypeInfo, Document, Element, ElementId, GeometryObject, ModelError, PartType,
    PipingModel, ReferenceId, StyleId, View, ViewId,
};

use crate::DimensionStyles;

pub const CENTERLINE: StyleId = StyleId(9);

pub fn c(owner: i64, index: u32) -> ConnectorId {
    ConnectorId::new(ElementId(owner), index)
}

pub fn at(dir: Vec3, s: f64) -> Point3 {
    Point3::from(dir * s)
}

fn face(p: Point3, normal: Vec3, reference: Option<String>) -> GeometryObject {
    GeometryObject::PlanarFace {
        origin: point_to_array(&p),
        normal: [normal.x, normal.y, normal.z],
        reference: reference.map(ReferenceId::new),
    }
}

/// Two-port accessory with end faces and a centerline across its middle.
pub fn valve(id: i64, dir: Vec3, s0: f64, s1: f64) -> Element {
    let mid = at(dir, (s0 + s1) / 2.0);
    Element::new(ElementId(id), Category::PipeAccessory)
        .with_name(format!("Valve {}", id))
        .with_location(mid)
        .with_connector(at(dir, s0))
        .with_connector(at(dir, s1))
        .with_geometry(face(at(dir, s0), -dir, Some(format!("valve-{}-a", id))))
        .with_geometry(face(at(dir, s1), dir, Some(format!("valve-{}-b", id))))
        .with_geometry(GeometryObject::Line {
            start: point_to_array(&(mid - Vec3::y())),
            end: point_to_array(&(mid + Vec3::y())),
            style: Some(CENTERLINE),
            reference: Some(ReferenceId::new(format!("valve-{}-c", id))),
            start_reference: None,
            end_reference: None,
        })
}

/// Flange of type `flg` whose faces are only referenced through its symbol.
pub fn flange(id: i64, dir: Vec3, s0: f64, s1: f64) -> Element {
    Element::fitting(ElementId(id), PartType::Flange, "flg")
        .with_location(at(dir, (s0 + s1) / 2.0))
        .with_connector(at(dir, s0))
        .with_connector(at(dir, s1))
        .with_geometry(GeometryObject::Instance {
            instance: vec![face(at(dir, s0), -dir, None), face(at(dir, s1), dir, None)],
            symbol: vec![
                face(Point3::origin(), -Vec3::x(), Some(format!("flange-{}-a", id))),
                face(Point3::new(0.5, 0.0, 0.0), Vec3::x(), Some(format!("flange-{}-b", id))),
            ],
        })
}

fn with_view_and_types(doc: &mut Document) {
    doc.add_view(plan_view());
    for (id, text_size, text_offset) in [(1, 0.125, 0.0625), (2, 0.1, 0.05)] {
        doc.add_dimension_type(DimensionTypeInfo {
            id: DimensionTypeId(id),
            name: format!("Linear {}", id),
            text_size,
            text_offset,
        });
    }
}

/// pipe 1 | flange 2 | pipe 3 | valve 4 | pipe 5 laid along `dir`.
pub fn straight_run(dir: Vec3) -> Document {
    let mut doc = Document::new();
    doc.add_element(Element::pipe(ElementId(1), at(dir, 0.0), at(dir, 10.0)));
    doc.add_element(flange(2, dir, 10.0, 10.5));
    doc.add_element(Element::pipe(ElementId(3), at(dir, 10.5), at(dir, 20.0)));
    doc.add_element(valve(4, dir, 20.0, 21.0));
    doc.add_element(Element::pipe(ElementId(5), at(dir, 21.0), at(dir, 30.0)));
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        doc.connect(c(a, 1), c(b, 0)).unwrap();
    }
    with_view_and_types(&mut doc);
    doc
}

/// pipe 1 | flange 2 | flange 3 | pipe 4 along the X axis.
pub fn flange_pair() -> Document {
    let mut doc = Document::new();
    doc.add_element(Element::pipe(ElementId(1), at(Vec3::x(), 0.0), at(Vec3::x(), 10.0)));
    doc.add_element(flange(2, Vec3::x(), 10.0, 10.5));
    doc.add_element(flange(3, Vec3::x(), 10.5, 11.0));
    doc.add_element(Element::pipe(ElementId(4), at(Vec3::x(), 11.0), at(Vec3::x(), 20.0)));
    for (a, b) in [(1, 2), (2, 3), (3, 4)] {
        doc.connect(c(a, 1), c(b, 0)).unwrap();
    }
    with_view_and_types(&mut doc);
    doc
}

pub fn plan_view() -> View {
    View::plan(ViewId(1), 4.0)
}

pub fn styles() -> DimensionStyles {
    DimensionStyles::new(DimensionTypeId(1), DimensionTypeId(2)).with_centerline_style(CENTERLINE)
}

pub fn line_of<M: PipingModel + ?Sized>(graph: &ConnectorGraph<'_, M>, seed: i64) -> PipeLine {
    build_default_pipe_line(graph, ElementId(seed), None).unwrap()
}

/// Dimension host that records requests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub requests: Vec<DimensionRequest>,
    pub reject: bool,
}

impl DimensionHost for RecordingHost {
    fn create_dimension(&mut self, request: &DimensionRequest) -> Result<DimensionId, ModelError> {
        if self.reject {
            return Err(ModelError::DimensionFailed("rejected by host".to_string()));
        }
        self.requests.push(request.clone());
        Ok(DimensionId(self.requests.len() as i64))
    }
}
