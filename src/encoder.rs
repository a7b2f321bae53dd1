//! JSON serialization of captured trace values.
//!
//! [`TraceValueEncoder::encode`] turns any [`CapturedValue`] into a
//! JSON value through an ordered fallback chain; it never fails. Rules
//! that depend on optional integration libraries are gated by
//! [`Integrations`], a feature-flag set installed once at process
//! startup: an absent integration simply disables its rule and the
//! chain proceeds.

use crate::value::{CapturedValue, ModelExport};
use crate::wire_debug;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Nesting depth at which the encoder degrades to string conversion
/// instead of recursing further.
const MAX_ENCODE_DEPTH: usize = 64;

/// Version of an installed integration library, compared against the
/// export-surface boundaries below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
}

impl Version {
    /// Construct a version triple.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Below this version, the object-modeling integration's instances use
/// its own legacy dict export rather than the data-validation surface.
pub const OBJECT_MODELING_LEGACY_BOUNDARY: Version = Version::new(0, 3, 0);

/// From this version on, the data-validation integration offers the
/// structured-dump export; older versions only offer the legacy dict
/// export.
pub const DATA_VALIDATION_V2_BOUNDARY: Version = Version::new(2, 0, 0);

/// Which optional integration libraries are available at runtime.
///
/// Install the set once at startup with [`Integrations::install`];
/// [`TraceValueEncoder::new`] picks it up from there. Every flag
/// defaults to absent, which disables the corresponding encoder rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Integrations {
    object_modeling: Option<Version>,
    data_validation: Option<Version>,
    streaming: bool,
}

static INSTALLED_INTEGRATIONS: OnceLock<Integrations> = OnceLock::new();

static NO_INTEGRATIONS: Integrations = Integrations {
    object_modeling: None,
    data_validation: None,
    streaming: false,
};

impl Integrations {
    /// No optional integrations available.
    pub fn none() -> Self {
        Integrations::default()
    }

    /// Mark the object-modeling integration as installed at `version`.
    pub fn with_object_modeling(mut self, version: Version) -> Self {
        self.object_modeling = Some(version);
        self
    }

    /// Mark the data-validation integration as installed at `version`.
    pub fn with_data_validation(mut self, version: Version) -> Self {
        self.data_validation = Some(version);
        self
    }

    /// Mark the streaming-response integration as installed, enabling
    /// the unsafe-string-conversion safety gate.
    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    /// Install this set as the process-wide default. Only the first
    /// install takes effect.
    pub fn install(self) {
        if INSTALLED_INTEGRATIONS.set(self).is_err() {
            wire_debug!(name: "integrations.already_installed");
        }
    }

    /// The process-wide set, or the empty set if none was installed.
    pub fn installed() -> &'static Integrations {
        INSTALLED_INTEGRATIONS.get().unwrap_or(&NO_INTEGRATIONS)
    }
}

/// JSON encoder for captured trace values.
///
/// Serialization runs an ordered fallback chain; the first applicable
/// rule wins:
///
/// 1. instances from the object-modeling integration's legacy API
///    surface export their own dict form;
/// 2. data-validation base models export through the version-appropriate
///    method (structured dump from v2, legacy dict before);
/// 3. plain structured records become a field-name-to-value mapping,
///    falling through if their fields were unconvertible;
/// 4. values whose string conversion is known to be unsafe serialize as
///    their type name, never their string form;
/// 5. natively representable values pass through; everything else falls
///    back to generic string conversion.
///
/// `encode` is total: rule 5 is the universal catch-all.
///
/// # Examples
///
/// ```
/// use trace_wire::encoder::{Integrations, TraceValueEncoder};
/// use trace_wire::value::CapturedValue;
///
/// let encoder = TraceValueEncoder::with_integrations(Integrations::none());
/// assert_eq!(encoder.encode(&CapturedValue::from(42)), serde_json::json!(42));
/// ```
#[derive(Clone, Debug)]
pub struct TraceValueEncoder {
    integrations: Integrations,
}

impl Default for TraceValueEncoder {
    fn default() -> Self {
        TraceValueEncoder::new()
    }
}

impl TraceValueEncoder {
    /// Create an encoder using the process-wide [`Integrations`] set.
    pub fn new() -> Self {
        TraceValueEncoder {
            integrations: Integrations::installed().clone(),
        }
    }

    /// Create an encoder with an explicit integration set.
    pub fn with_integrations(integrations: Integrations) -> Self {
        TraceValueEncoder { integrations }
    }

    /// Serialize `value` to JSON. Never fails.
    pub fn encode(&self, value: &CapturedValue) -> Value {
        self.encode_at_depth(value, 0)
    }

    fn encode_at_depth(&self, value: &CapturedValue, depth: usize) -> Value {
        if depth >= MAX_ENCODE_DEPTH {
            wire_debug!(name: "encoder.max_depth_reached", depth = depth);
            return Value::String(self.render(value));
        }

        // Rule 1: legacy object-modeling surface exports its own dict
        // form.
        if let CapturedValue::ModelObject(model) = value {
            if self
                .integrations
                .object_modeling
                .is_some_and(|version| version < OBJECT_MODELING_LEGACY_BOUNDARY)
            {
                return Value::Object(model.legacy_fields().clone());
            }
        }

        // Rule 2: data-validation base models. Modern object-modeling
        // instances are validation models too, so they land here when
        // rule 1 did not classify them.
        if let Some(version) = self.integrations.data_validation {
            match value {
                CapturedValue::ValidatedModel(model) | CapturedValue::ModelObject(model) => {
                    return Value::Object(Self::validation_export(model, version).clone());
                }
                _ => {}
            }
        }

        // Rule 3: plain structured records become field maps; records
        // whose field conversion failed fall through.
        if let CapturedValue::Record(record) = value {
            match record.fields() {
                Some(fields) => {
                    let mut map = Map::with_capacity(fields.len());
                    for (name, field) in fields {
                        map.insert(name.clone(), self.encode_at_depth(field, depth + 1));
                    }
                    return Value::Object(map);
                }
                None => {
                    wire_debug!(
                        name: "encoder.record_fields_unavailable",
                        type_name = record.type_name().to_string()
                    );
                }
            }
        }

        // Rule 4: safety gate. Types with a stream-consuming string
        // conversion serialize as their type name, never their string
        // form. Skipped entirely when the defining integration is
        // absent.
        if self.integrations.streaming {
            if let CapturedValue::Opaque(opaque) = value {
                if opaque.is_streaming() {
                    wire_debug!(
                        name: "encoder.unsafe_string_conversion",
                        type_name = opaque.type_name().to_string()
                    );
                    return Value::String(opaque.type_name().to_string());
                }
            }
        }

        // Rule 5: built-in handling, then generic string conversion.
        match value {
            CapturedValue::Json(json) => json.clone(),
            CapturedValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.encode_at_depth(item, depth + 1))
                    .collect(),
            ),
            other => Value::String(self.render(other)),
        }
    }

    fn validation_export(model: &ModelExport, version: Version) -> &Map<String, Value> {
        if version >= DATA_VALIDATION_V2_BOUNDARY {
            // Fall back to the legacy export if the capture layer did
            // not snapshot a structured dump.
            model.structured_fields().unwrap_or_else(|| {
                wire_debug!(
                    name: "encoder.structured_export_unavailable",
                    type_name = model.type_name().to_string()
                );
                model.legacy_fields()
            })
        } else {
            model.legacy_fields()
        }
    }

    /// Generic string conversion of `value`.
    fn render(&self, value: &CapturedValue) -> String {
        match value {
            CapturedValue::Json(json) => json.to_string(),
            CapturedValue::ModelObject(model) | CapturedValue::ValidatedModel(model) => {
                model.to_string()
            }
            CapturedValue::Record(record) => record.to_string(),
            CapturedValue::List(items) => format!("{items:?}"),
            CapturedValue::Opaque(opaque) => opaque.render(),
        }
    }
}
