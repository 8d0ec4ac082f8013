//! TOML settings.

use std::fmt;
use std::fs;
use std::path::Path;

use pipekit_connect::DEFAULT_TRAVERSAL_LIMIT;
use pipekit_dim::DimensionStyles;
use pipekit_line::DEFAULT_LINEAR_TOLERANCE;
use pipekit_model::PassThroughRule;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// A tool that can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Writes end-prep text onto pipes.
    EndPrepUpdater,
    /// Dimensions pipe lines.
    DimensionPipeLine,
    /// Selects pipe lines.
    SelectPipeLine,
    /// Bulk parameter editing.
    ParameterGrid,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::EndPrepUpdater => "end-prep updater",
            Component::DimensionPipeLine => "pipe-line dimensioning",
            Component::SelectPipeLine => "pipe-line selection",
            Component::ParameterGrid => "parameter grid",
        };
        f.write_str(name)
    }
}

/// Which tools are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentToggles {
    /// See [`Component::EndPrepUpdater`].
    pub end_prep_updater: bool,
    /// See [`Component::DimensionPipeLine`].
    pub dimension_pipe_line: bool,
    /// See [`Component::SelectPipeLine`].
    pub select_pipe_line: bool,
    /// See [`Component::ParameterGrid`].
    pub parameter_grid: bool,
}

impl Default for ComponentToggles {
    fn default() -> Self {
        Self {
            end_prep_updater: true,
            dimension_pipe_line: true,
            select_pipe_line: true,
            parameter_grid: true,
        }
    }
}

impl ComponentToggles {
    /// Whether `component` is enabled.
    pub fn is_enabled(&self, component: Component) -> bool {
        match component {
            Component::EndPrepUpdater => self.end_prep_updater,
            Component::DimensionPipeLine => self.dimension_pipe_line,
            Component::SelectPipeLine => self.select_pipe_line,
            Component::ParameterGrid => self.parameter_grid,
        }
    }
}

/// End-prep updater settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndPrepSettings {
    /// Text parameter receiving the end-prep string.
    pub parameter: String,
    /// Overwrite non-blank values by default.
    pub force_update: bool,
}

impl Default for EndPrepSettings {
    fn default() -> Self {
        Self {
            parameter: "End Prep".to_string(),
            force_update: false,
        }
    }
}

/// Configuration of a session, usually read from `pipekit.toml`.
///
/// Every field is optional in the file; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Step cap for connector walks.
    pub traversal_limit: usize,
    /// Distance tolerance of the linear-only pipe-line filter.
    pub linear_tolerance: f64,
    /// Enabled tools.
    pub components: ComponentToggles,
    /// How pass-through fittings are recognized.
    pub pass_through: PassThroughRule,
    /// End-prep updater settings.
    pub end_prep: EndPrepSettings,
    /// Dimension styles used until a document supplies its own.
    pub dimensions: DimensionStyles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            traversal_limit: DEFAULT_TRAVERSAL_LIMIT,
            linear_tolerance: DEFAULT_LINEAR_TOLERANCE,
            components: ComponentToggles::default(),
            pass_through: PassThroughRule::default(),
            end_prep: EndPrepSettings::default(),
            dimensions: DimensionStyles::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize settings to TOML text.
    pub fn to_toml_string(&self) -> Result<String, SessionError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read settings from a file.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let contents = fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&contents)?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Read settings from a file, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, SessionError> {
        match Self::load(path) {
            Err(SessionError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no settings at {}; using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_dim::FlangeDimensionMode;
    use pipekit_model::{DimensionTypeId, TypeId};

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.end_prep.parameter, "End Prep");
        assert!(settings.components.is_enabled(Component::ParameterGrid));
    }

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::from_toml_str(
            r#"
            traversal_limit = 50

            [components]
            parameter_grid = false

            [pass_through]
            kind = "FamilyNames"
            value = ["NC", "Spacer"]

            [end_prep]
            parameter = "Connection"
            force_update = true

            [dimensions]
            primary = 12
            secondary = 13
            centerline_styles = [4, 5]

            [dimensions.flange_modes]
            "flg-150" = "Partial"
            "#,
        )
        .unwrap();
        assert_eq!(settings.traversal_limit, 50);
        assert!(!settings.components.is_enabled(Component::ParameterGrid));
        assert!(settings.components.is_enabled(Component::SelectPipeLine));
        assert_eq!(
            settings.pass_through,
            PassThroughRule::FamilyNames(vec!["NC".into(), "Spacer".into()])
        );
        assert_eq!(settings.end_prep.parameter, "Connection");
        assert!(settings.end_prep.force_update);
        assert_eq!(settings.dimensions.primary, DimensionTypeId(12));
        assert_eq!(
            settings.dimensions.flange_mode(&TypeId::new("flg-150")),
            FlangeDimensionMode::Partial
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Settings::from_toml_str("traversal_limit = \"many\""),
            Err(SessionError::Settings(_))
        ));
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let text = Settings::default().to_toml_string().unwrap();
        assert_eq!(Settings::from_toml_str(&text).unwrap(), Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = Path::new("/nonexistent/pipekit/settings.toml");
        assert_eq!(Settings::load_or_default(path).unwrap(), Settings::default());
        assert!(matches!(Settings::load(path), Err(SessionError::Io { .. })));
    }
}
