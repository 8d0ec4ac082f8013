//! Per-fitting-type end-prep preferences.

use std::collections::BTreeMap;

use pipekit_model::{classify, PipingModel, TypeId};
use serde::{Deserialize, Serialize};

use crate::EndType;

/// Bell text for a fitting type nobody configured yet.
pub const DEFAULT_BELL: &str = "DEFAULT_BELL";

/// Spigot text for a fitting type nobody configured yet.
pub const DEFAULT_SPIGOT: &str = "DEFAULT_SPIGOT";

/// Text of the sentinel preference used for unknown fitting types.
pub const NULL_END_PREP: &str = "NULL";

/// End-prep text configured for one fitting type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipeEndPrepPreferences {
    /// Fitting type identity.
    pub pipe_type_id: TypeId,
    /// Fitting type name.
    pub pipe_type_name: String,
    /// Text for ends reaching the fitting's primary port.
    pub bell_end_prep: String,
    /// Text for every other end.
    pub spigot_end_prep: String,
}

impl PipeEndPrepPreferences {
    /// Create a record.
    pub fn new(
        type_id: impl Into<String>,
        type_name: impl Into<String>,
        bell: impl Into<String>,
        spigot: impl Into<String>,
    ) -> Self {
        Self {
            pipe_type_id: TypeId::new(type_id),
            pipe_type_name: type_name.into(),
            bell_end_prep: bell.into(),
            spigot_end_prep: spigot.into(),
        }
    }

    /// Record with the default bell/spigot texts.
    pub fn with_defaults(type_id: TypeId, type_name: impl Into<String>) -> Self {
        Self {
            pipe_type_id: type_id,
            pipe_type_name: type_name.into(),
            bell_end_prep: DEFAULT_BELL.to_string(),
            spigot_end_prep: DEFAULT_SPIGOT.to_string(),
        }
    }

    /// The sentinel returned for unknown fitting types.
    pub fn null() -> Self {
        Self::new("", NULL_END_PREP, NULL_END_PREP, NULL_END_PREP)
    }

    /// Text for the given end type; untyped ends use the spigot text.
    pub fn end_prep_for(&self, end_type: EndType) -> &str {
        match end_type {
            EndType::Bell => &self.bell_end_prep,
            EndType::Spigot | EndType::None => &self.spigot_end_prep,
        }
    }
}

/// The preference records of one document, ordered by type name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet {
    entries: Vec<PipeEndPrepPreferences>,
}

impl PreferenceSet {
    /// Wrap existing records.
    pub fn from_entries(entries: Vec<PipeEndPrepPreferences>) -> Self {
        Self { entries }
    }

    /// One default record per fitting type found in the document.
    pub fn seed<M: PipingModel + ?Sized>(model: &M) -> Self {
        let mut types: BTreeMap<TypeId, String> = BTreeMap::new();
        for id in model.element_ids() {
            let Some(element) = model.element(id) else {
                continue;
            };
            if classify::is_fitting(element) && !element.type_id.as_str().is_empty() {
                types
                    .entry(element.type_id.clone())
                    .or_insert_with(|| element.type_name.clone());
            }
        }
        let mut entries: Vec<_> = types
            .into_iter()
            .map(|(id, name)| PipeEndPrepPreferences::with_defaults(id, name))
            .collect();
        entries.sort_by(|a, b| a.pipe_type_name.cmp(&b.pipe_type_name));
        log::debug!("seeded {} end-prep preference records", entries.len());
        Self { entries }
    }

    /// Apply saved texts to records of the same type identity. Saved records
    /// for types no longer in the document are ignored.
    pub fn apply_saved(&mut self, saved: &[PipeEndPrepPreferences]) {
        for entry in &mut self.entries {
            if let Some(s) = saved.iter().find(|s| s.pipe_type_id == entry.pipe_type_id) {
                entry.bell_end_prep = s.bell_end_prep.clone();
                entry.spigot_end_prep = s.spigot_end_prep.clone();
            }
        }
    }

    /// Record for a fitting type, if configured.
    pub fn find(&self, type_id: &TypeId) -> Option<&PipeEndPrepPreferences> {
        self.entries.iter().find(|e| &e.pipe_type_id == type_id)
    }

    /// Record for a fitting type, or the sentinel.
    pub fn get(&self, type_id: &TypeId) -> PipeEndPrepPreferences {
        self.find(type_id)
            .cloned()
            .unwrap_or_else(PipeEndPrepPreferences::null)
    }

    /// Change the texts of one record. Returns `false` for unknown types.
    pub fn set(&mut self, type_id: &TypeId, bell: &str, spigot: &str) -> bool {
        match self.entries.iter_mut().find(|e| &e.pipe_type_id == type_id) {
            Some(entry) => {
                entry.bell_end_prep = bell.to_string();
                entry.spigot_end_prep = spigot.to_string();
                true
            }
            None => false,
        }
    }

    /// All records.
    pub fn entries(&self) -> &[PipeEndPrepPreferences] {
        &self.entries
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_math::Point3;
    use pipekit_model::{Document, Element, ElementId, PartType};

    fn doc() -> Document {
        let mut doc = Document::new();
        doc.add_element(Element::pipe(ElementId(1), Point3::origin(), Point3::new(1.0, 0.0, 0.0)));
        doc.add_element(
            Element::fitting(ElementId(2), PartType::Flange, "200").with_type("200", "Weld Neck"),
        );
        doc.add_element(
            Element::fitting(ElementId(3), PartType::Flange, "200").with_type("200", "Weld Neck"),
        );
        doc.add_element(
            Element::fitting(ElementId(4), PartType::Elbow, "100").with_type("100", "MJ Bend"),
        );
        doc
    }

    #[test]
    fn test_seed_one_record_per_fitting_type() {
        let prefs = PreferenceSet::seed(&doc());
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs.entries()[0].pipe_type_name, "MJ Bend");
        let flange = prefs.find(&TypeId::new("200")).unwrap();
        assert_eq!(flange.bell_end_prep, DEFAULT_BELL);
        assert_eq!(flange.spigot_end_prep, DEFAULT_SPIGOT);
    }

    #[test]
    fn test_saved_records_override_matching_types() {
        let mut prefs = PreferenceSet::seed(&doc());
        prefs.apply_saved(&[
            PipeEndPrepPreferences::new("100", "old name", "MJ", "PE"),
            PipeEndPrepPreferences::new("999", "gone", "X", "Y"),
        ]);
        let bend = prefs.find(&TypeId::new("100")).unwrap();
        assert_eq!(bend.bell_end_prep, "MJ");
        assert_eq!(bend.pipe_type_name, "MJ Bend");
        assert!(prefs.find(&TypeId::new("999")).is_none());
    }

    #[test]
    fn test_unknown_type_gets_null_sentinel() {
        let prefs = PreferenceSet::seed(&doc());
        let p = prefs.get(&TypeId::new("nope"));
        assert_eq!(p.end_prep_for(EndType::Bell), NULL_END_PREP);
        assert_eq!(p.end_prep_for(EndType::Spigot), NULL_END_PREP);
    }

    #[test]
    fn test_set_changes_known_types_only() {
        let mut prefs = PreferenceSet::seed(&doc());
        assert!(prefs.set(&TypeId::new("200"), "FLG", "FLG"));
        assert!(!prefs.set(&TypeId::new("300"), "FLG", "FLG"));
        assert_eq!(prefs.get(&TypeId::new("200")).bell_end_prep, "FLG");
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let prefs =
            PreferenceSet::from_entries(vec![PipeEndPrepPreferences::new("1", "A", "MJ", "PE")]);
        let json = prefs.to_json().unwrap();
        assert!(json.contains("\"pipeTypeId\": \"1\""));
        assert!(json.contains("\"bellEndPrep\""));
        assert_eq!(PreferenceSet::from_json(&json).unwrap(), prefs);
    }
}
