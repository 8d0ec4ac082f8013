#![warn(missing_docs)]

//! pipekit - piping network engine for MEP design documents
//!
//! Walks the connector graph of a piping document to:
//!
//! - write canonical `"A x B"` end-prep text onto pipes ([`EndPrepUpdater`])
//! - select the contiguous run around a pipe ([`Session::select_pipe_line`])
//! - dimension that run in a view ([`Session::dimension_pipe_line`])
//! - edit element parameters in bulk ([`ParameterGrid`])
//!
//! A [`Session`] holds the configuration for one open document and is
//! reloaded explicitly whenever the active document changes.
//!
//! # Example
//!
//! ```rust
//! use pipekit::{Session, Settings};
//! use pipekit::model::{Document, Element, ElementId, LogNotifier};
//! use pipekit::math::Point3;
//!
//! let mut doc = Document::new();
//! doc.add_element(
//!     Element::pipe(ElementId(1), Point3::origin(), Point3::new(10.0, 0.0, 0.0))
//!         .with_parameter("End Prep", ""),
//! );
//!
//! let mut session = Session::new(Settings::default());
//! session.reload(&doc, &[], None);
//! let updater = session.end_prep_updater().unwrap();
//! updater.update_all(&mut doc, &LogNotifier, false).unwrap();
//! assert_eq!(doc.elements[&ElementId(1)].parameters["End Prep"], "PE x PE");
//! ```

mod grid;
mod session;
mod settings;
mod updater;

pub use grid::{GridRow, ParameterGrid};
pub use session::Session;
pub use settings::{Component, ComponentToggles, EndPrepSettings, Settings};
pub use updater::{EndPrepUpdater, UpdateOutcome, UpdateSummary};

pub use pipekit_connect as connect;
pub use pipekit_dim as dim;
pub use pipekit_line as line;
pub use pipekit_math as math;
pub use pipekit_model as model;

use std::path::PathBuf;

use pipekit_connect::EndPrepError;
use pipekit_dim::DimensionError;
use pipekit_line::PipeLineError;
use pipekit_model::ModelError;
use thiserror::Error;

/// Errors returned by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The component is switched off in the settings.
    #[error("{0} is disabled in the settings")]
    ComponentDisabled(Component),

    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`].
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("cannot serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    /// Preference records are not valid JSON.
    #[error("invalid preferences: {0}")]
    Preferences(#[from] serde_json::Error),

    /// The requested view does not exist.
    #[error("view {0} not found")]
    ViewNotFound(i64),

    /// End-prep classification failed.
    #[error(transparent)]
    EndPrep(#[from] EndPrepError),

    /// Pipe-line assembly failed.
    #[error(transparent)]
    PipeLine(#[from] PipeLineError),

    /// Dimension layout failed.
    #[error(transparent)]
    Dimension(#[from] DimensionError),

    /// Host document failure.
    #[error(transparent)]
    Model(#[from] ModelError),
}
