//! Bulk parameter editing.

use std::collections::{BTreeMap, BTreeSet};

use pipekit_model::{ElementId, ParameterStore, PipingModel};

use crate::SessionError;

/// One element's row of a [`ParameterGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    /// Element shown in the row.
    pub element: ElementId,
    /// Element display name.
    pub name: String,
    /// Text parameter values by column name.
    pub values: BTreeMap<String, String>,
}

/// A table of text parameters over a set of elements.
///
/// Columns are the union of the parameter names of every row, sorted.
/// Cells an element has no parameter for are empty and cannot be set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterGrid {
    columns: Vec<String>,
    rows: Vec<GridRow>,
}

impl ParameterGrid {
    /// Build a grid over `elements`, in the given order. Missing elements
    /// are skipped.
    pub fn build<M: PipingModel + ?Sized>(model: &M, elements: &[ElementId]) -> Self {
        let mut columns = BTreeSet::new();
        let mut rows = Vec::with_capacity(elements.len());
        for id in elements {
            let Some(element) = model.element(*id) else {
                log::debug!("grid: element {} not found", id);
                continue;
            };
            columns.extend(element.parameters.keys().cloned());
            rows.push(GridRow {
                element: element.id,
                name: element.name.clone(),
                values: element.parameters.clone(),
            });
        }
        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows.
    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// Row of `element`.
    pub fn row(&self, element: ElementId) -> Option<&GridRow> {
        self.rows.iter().find(|r| r.element == element)
    }

    /// Cell value.
    pub fn value(&self, element: ElementId, column: &str) -> Option<&str> {
        self.row(element)?.values.get(column).map(String::as_str)
    }

    /// Write a cell through to the document, then update the grid.
    pub fn set<S: ParameterStore + ?Sized>(
        &mut self,
        store: &mut S,
        element: ElementId,
        column: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        store.set_text_parameter(element, column, value)?;
        if let Some(row) = self.rows.iter_mut().find(|r| r.element == element) {
            row.values.insert(column.to_string(), value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_math::Point3;
    use pipekit_model::{Document, Element, ModelError};

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.add_element(
            Element::pipe(ElementId(1), Point3::origin(), Point3::new(5.0, 0.0, 0.0))
                .with_parameter("End Prep", "PE x PE")
                .with_parameter("Comments", ""),
        );
        doc.add_element(
            Element::pipe(ElementId(2), Point3::origin(), Point3::new(0.0, 5.0, 0.0))
                .with_parameter("Mark", "P-2"),
        );
        doc
    }

    #[test]
    fn test_columns_are_the_sorted_union() {
        let doc = doc();
        let grid = ParameterGrid::build(&doc, &[ElementId(2), ElementId(1), ElementId(7)]);
        assert_eq!(grid.columns(), ["Comments", "End Prep", "Mark"]);
        assert_eq!(grid.rows().len(), 2);
        assert_eq!(grid.rows()[0].element, ElementId(2));
        assert_eq!(grid.value(ElementId(1), "End Prep"), Some("PE x PE"));
        assert_eq!(grid.value(ElementId(2), "End Prep"), None);
    }

    #[test]
    fn test_set_writes_through() {
        let mut doc = doc();
        let mut grid = ParameterGrid::build(&doc, &[ElementId(1), ElementId(2)]);
        grid.set(&mut doc, ElementId(1), "Comments", "field cut").unwrap();
        assert_eq!(grid.value(ElementId(1), "Comments"), Some("field cut"));
        assert_eq!(doc.elements[&ElementId(1)].parameters["Comments"], "field cut");
    }

    #[test]
    fn test_set_of_absent_parameter_fails() {
        let mut doc = doc();
        let mut grid = ParameterGrid::build(&doc, &[ElementId(2)]);
        let result = grid.set(&mut doc, ElementId(2), "Comments", "x");
        assert!(matches!(
            result,
            Err(SessionError::Model(ModelError::ParameterNotFound { .. }))
        ));
        assert_eq!(grid.value(ElementId(2), "Comments"), None);
    }
}
