//! End-prep classification.
//!
//! Each end of a pipe is described by the fitting it is joined to: a bell
//! end when the pipe reaches the fitting's primary port, a spigot end
//! otherwise, with the preparation text configured per fitting type. An
//! open end, or an end joined to another pipe, is a plain end (`PE`).

use std::cmp::Ordering;
use std::fmt;

use pipekit_math::Point3;
use pipekit_model::{classify, ConnectorId, ElementId, PipingModel};

use crate::{ConnectorGraph, EndPrepError, PreferenceSet, TraversalError};

/// Prep code of a plain pipe end.
pub const PLAIN_END: &str = "PE";

/// Which half of a joint an end is.
///
/// Declaration order is the display order: bell ends first, then spigot
/// ends, then ends without a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EndType {
    /// Female end.
    Bell,
    /// Male end.
    Spigot,
    /// Unknown.
    #[default]
    None,
}

/// A raw end-prep description split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEndPrep {
    /// End type named in the text, `None` when absent.
    pub end_type: EndType,
    /// Prep code with the flag words removed.
    pub prep: String,
    /// Whether the text marks the end as tapped.
    pub is_tapped: bool,
    /// Whether the text marks the end as domestic.
    pub is_domestic: bool,
}

/// Parse a raw description such as `"MJ"`, `"BELL FLG TAPPED"` or
/// `"GRV DOM"`.
///
/// Words are matched case-insensitively: `BELL`/`B` and `SPIGOT`/`SP` set the
/// end type, `TAPPED`/`TAP` and `DOMESTIC`/`DOM` set the flags, and the
/// remaining words, upper-cased and joined by single spaces, form the prep
/// code.
pub fn parse_end_prep(raw: &str) -> ParsedEndPrep {
    let mut parsed = ParsedEndPrep::default();
    let mut words = Vec::new();
    for word in raw.split_whitespace() {
        let upper = word.to_uppercase();
        match upper.as_str() {
            "BELL" | "B" => parsed.end_type = EndType::Bell,
            "SPIGOT" | "SP" => parsed.end_type = EndType::Spigot,
            "TAPPED" | "TAP" => parsed.is_tapped = true,
            "DOMESTIC" | "DOM" => parsed.is_domestic = true,
            _ => words.push(upper),
        }
    }
    parsed.prep = words.join(" ");
    parsed
}

/// End-prep of one connector of a pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct EndPrepInfo {
    /// Position of the pipe's connector.
    pub position: Point3,
    /// Bell, spigot or unknown.
    pub end_type: EndType,
    /// Preparation text as configured.
    pub end_prep: String,
    /// Tapped end.
    pub is_tapped: bool,
    /// Domestic material.
    pub is_domestic: bool,
}

impl EndPrepInfo {
    /// An open or plain end: spigot, `PE`.
    pub fn plain_end(position: Point3) -> Self {
        Self {
            position,
            end_type: EndType::Spigot,
            end_prep: PLAIN_END.to_string(),
            is_tapped: false,
            is_domestic: false,
        }
    }

    /// Build from configured text, picking up the tapped/domestic flags.
    pub fn from_text(position: Point3, end_type: EndType, text: &str) -> Self {
        let parsed = parse_end_prep(text);
        Self {
            position,
            end_type,
            end_prep: text.trim().to_string(),
            is_tapped: parsed.is_tapped,
            is_domestic: parsed.is_domestic,
        }
    }

    /// Prep code used for ordering (flag words stripped).
    pub fn prep_code(&self) -> String {
        parse_end_prep(&self.end_prep).prep
    }

    /// Whether this is a plain end.
    pub fn is_plain_end(&self) -> bool {
        self.prep_code() == PLAIN_END
    }
}

impl fmt::Display for EndPrepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.end_prep)
    }
}

/// Classify the end of a pipe at `connector`.
///
/// Unconnected connectors, and connectors that do not reach a fitting,
/// accessory or equipment instance, are plain ends.
pub fn end_prep<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    connector: ConnectorId,
    prefs: &PreferenceSet,
) -> Result<EndPrepInfo, TraversalError> {
    let model = graph.model();
    let Some(source) = model.connector(connector) else {
        return Ok(EndPrepInfo::plain_end(Point3::origin()));
    };
    let position = source.origin_point();
    if !source.is_connected() {
        return Ok(EndPrepInfo::plain_end(position));
    }

    let Some((owner, peer)) = graph.connected_family_instance_with_connector(connector)? else {
        return Ok(EndPrepInfo::plain_end(position));
    };
    let Some(fitting) = model.element(owner) else {
        return Ok(EndPrepInfo::plain_end(position));
    };
    if classify::is_pipe(fitting) {
        return Ok(EndPrepInfo::plain_end(position));
    }

    let pref = prefs.get(&fitting.type_id);
    let is_primary = model.connector(peer).is_some_and(|c| c.is_primary);
    let end_type = if is_primary {
        EndType::Bell
    } else {
        EndType::Spigot
    };
    log::debug!(
        "connector {} reaches {} port of fitting {} ({})",
        connector,
        if is_primary { "primary" } else { "secondary" },
        fitting.id,
        pref.pipe_type_name
    );
    Ok(EndPrepInfo::from_text(
        position,
        end_type,
        pref.end_prep_for(end_type),
    ))
}

/// Whether `b` must be displayed before `a`.
///
/// Bell ends come before spigot ends, which come before untyped ends.
/// Between equal end types a plain end goes second, then prep codes sort
/// ascending, and between equal codes the tapped side goes second.
pub fn check_if_reorder(a: &EndPrepInfo, b: &EndPrepInfo) -> bool {
    if a.end_type != b.end_type {
        return a.end_type > b.end_type;
    }
    match (a.is_plain_end(), b.is_plain_end()) {
        (true, false) => return true,
        (false, true) => return false,
        _ => {}
    }
    match a.prep_code().cmp(&b.prep_code()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => a.is_tapped && !b.is_tapped,
    }
}

/// Combine two ends into the canonical `"<first> x <second>"` string.
pub fn format_end_preps(a: &EndPrepInfo, b: &EndPrepInfo) -> String {
    let (first, second) = if check_if_reorder(a, b) { (b, a) } else { (a, b) };
    format!("{} x {}", first, second)
}

/// End-prep string for both ends of a two-port pipe.
pub fn both_end_preps<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    pipe: ElementId,
    prefs: &PreferenceSet,
) -> Result<String, EndPrepError> {
    if graph.model().element(pipe).is_none() {
        return Err(EndPrepError::ElementNotFound(pipe));
    }
    let connectors = graph.connectors(pipe);
    let &[a, b] = connectors.as_slice() else {
        return Err(EndPrepError::NotTwoPort {
            element: pipe,
            count: connectors.len(),
        });
    };
    let a = end_prep(graph, a, prefs)?;
    let b = end_prep(graph, b, prefs)?;
    Ok(format_end_preps(&a, &b))
}
