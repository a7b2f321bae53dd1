//! The exported span record.
//!
//! A [`Span`] here is the export-side view of a single timed unit of
//! work: a display name, stable identifiers, and a map of attribute
//! values stored as JSON-encoded strings. Span creation and timing live
//! in the tracing runtime; this type only carries what the
//! serialization layer needs.

use crate::encoder::TraceValueEncoder;
use crate::id::{SpanId, TraceId};
use crate::value::CapturedValue;
use crate::wire_debug;
use serde_json::Value;
use std::collections::HashMap;

/// Reserved span attribute keys assigned by the platform.
pub mod attribute_key {
    /// Request id of the trace the span belongs to.
    pub const REQUEST_ID: &str = "trace.request_id";

    /// JSON-encoded inputs captured for the span's operation.
    pub const INPUTS: &str = "trace.inputs";

    /// JSON-encoded outputs captured for the span's operation.
    pub const OUTPUTS: &str = "trace.outputs";

    /// Caller-fixed start time override, in nanoseconds since the epoch.
    pub const START_TIME_NS: &str = "trace.start_time_ns";
}

/// Single operation within a trace, as seen by the serialization layer.
///
/// A span is exclusively owned by its trace until export. The display
/// name is mutable through [`Span::rename`] (used by name
/// deduplication); the name the span was created with remains available
/// through [`Span::original_name`].
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    name: String,
    original_name: Option<String>,
    trace_id: TraceId,
    span_id: SpanId,
    parent_id: Option<SpanId>,
    attributes: HashMap<String, String>,
}

impl Span {
    /// Create a span record with the given name and identifiers.
    pub fn new(name: impl Into<String>, trace_id: TraceId, span_id: SpanId) -> Self {
        Span {
            name: name.into(),
            original_name: None,
            trace_id,
            span_id,
            parent_id: None,
            attributes: HashMap::new(),
        }
    }

    /// Set the parent span id.
    pub fn with_parent(mut self, parent_id: SpanId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// The span's current display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name the span carried before any deduplication rename.
    pub fn original_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or(&self.name)
    }

    /// Replace the display name, retaining the original name on the
    /// first rename. Used by
    /// [`deduplicate_span_names`](crate::dedup::deduplicate_span_names).
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self.original_name {
            None => self.original_name = Some(std::mem::replace(&mut self.name, name)),
            Some(_) => self.name = name,
        }
    }

    /// The trace this span belongs to.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The span's own identifier.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// The parent span id, if any.
    pub fn parent_id(&self) -> Option<SpanId> {
        self.parent_id
    }

    /// The raw attribute map of JSON-encoded string values.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Store a raw, already JSON-encoded attribute value.
    pub fn set_attribute(&mut self, key: impl Into<String>, json: impl Into<String>) {
        self.attributes.insert(key.into(), json.into());
    }

    /// Serialize a captured value through `encoder` and store it under
    /// `key`.
    pub fn set_attribute_value(
        &mut self,
        key: impl Into<String>,
        value: &CapturedValue,
        encoder: &TraceValueEncoder,
    ) {
        self.attributes
            .insert(key.into(), encoder.encode(value).to_string());
    }

    /// Look up `key` and JSON-decode the stored value.
    ///
    /// This is a best-effort diagnostic accessor: a missing key or a
    /// value that is not valid JSON yields `None` with a debug-level
    /// diagnostic, never an error.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        let raw = self.attributes.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                wire_debug!(
                    name: "span.attribute_decode_failed",
                    key = key.to_string(),
                    error = format!("{err}")
                );
                None
            }
        }
    }
}
