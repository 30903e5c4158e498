//! One-shot scan report for the command line

use crate::engine::HighlightEngine;
use ahl_host::Dom;
use ahl_registry::MergeOutcome;
use serde::Serialize;
use std::fmt::Write as _;

/// A marked element as shown in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedElement {
    /// Arena index of the element
    pub id: usize,
    /// Lowercase tag name
    pub tag: String,
    /// Candidate attribute values in priority order
    pub candidates: Vec<String>,
}

/// Outcome of a harvest-then-highlight run over a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Location fragment of the document
    pub fragment: String,
    /// Registered addresses after the run
    pub registered: Vec<String>,
    /// Addresses newly added by the harvest
    pub harvested: Vec<String>,
    /// Every element carrying the marker
    pub marked: Vec<MarkedElement>,
}

impl ScanReport {
    /// Collect the report from the engine's current state
    #[must_use]
    pub fn collect(engine: &HighlightEngine, outcome: &MergeOutcome) -> Self {
        let doc = engine.document().read();
        let scanner = engine.scanner();
        let marker = engine.marker();

        let marked = doc
            .descendants(doc.body())
            .into_iter()
            .filter(|&id| marker.is_marked(&*doc, id))
            .map(|id| MarkedElement {
                id: id.index(),
                tag: doc.tag(id).unwrap_or_default().to_string(),
                candidates: scanner
                    .candidates(&*doc, id)
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
            })
            .collect();

        Self {
            fragment: doc.location_fragment().to_string(),
            registered: engine.registry().snapshot().to_vec(),
            harvested: outcome.added.iter().map(ToString::to_string).collect(),
            marked,
        }
    }

    /// Human-readable rendering
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "View: #{}", self.fragment);
        let _ = writeln!(out, "Registered: {}", self.registered.len());
        for address in &self.registered {
            let _ = writeln!(out, "  {address}");
        }
        let _ = writeln!(out, "Harvested: {}", self.harvested.len());
        for address in &self.harvested {
            let _ = writeln!(out, "  + {address}");
        }
        let _ = writeln!(out, "Marked: {}", self.marked.len());
        for element in &self.marked {
            let _ = writeln!(
                out,
                "  <{}> #{} {}",
                element.tag,
                element.id,
                element.candidates.join(" | ")
            );
        }
        out
    }
}
