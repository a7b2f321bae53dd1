//! Reserved trace tags and metadata helpers.

use std::collections::HashMap;

/// Tag recording the user who produced the trace.
pub const TAG_USER: &str = "trace.user";

/// Tag recording the name of the trace's source entry point.
pub const TAG_SOURCE_NAME: &str = "trace.source.name";

/// Tag recording the kind of the trace's source entry point.
pub const TAG_SOURCE_TYPE: &str = "trace.source.type";

/// Tag carrying the trace's display name.
pub const TAG_TRACE_NAME: &str = "trace.name";

/// Tag carrying the evaluation request id when a trace is produced
/// inside a model evaluation.
pub const TAG_EVAL_REQUEST_ID: &str = "trace.eval.request_id";

/// Platform-assigned tag keys that callers may never override.
pub const IMMUTABLE_TAGS: &[&str] = &[TAG_USER, TAG_SOURCE_NAME, TAG_SOURCE_TYPE];

/// Maximum character count of a metadata or tag value.
pub const MAX_CHARS_IN_TRACE_INFO_METADATA_AND_TAGS: usize = 250;

/// Suffix appended to truncated metadata values.
pub const TRUNCATION_SUFFIX: &str = "...";

/// Remove the [`IMMUTABLE_TAGS`] keys from a caller-supplied tag map,
/// leaving all other entries unchanged.
pub fn exclude_immutable_tags(tags: &HashMap<String, String>) -> HashMap<String, String> {
    tags.iter()
        .filter(|(key, _)| !IMMUTABLE_TAGS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Clamp a metadata value to [`MAX_CHARS_IN_TRACE_INFO_METADATA_AND_TAGS`]
/// characters, appending [`TRUNCATION_SUFFIX`] when truncated. Absent
/// or empty input yields the empty string.
pub fn truncate_metadata(value: Option<&str>) -> String {
    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ => return String::new(),
    };
    if value.chars().count() <= MAX_CHARS_IN_TRACE_INFO_METADATA_AND_TAGS {
        return value.to_string();
    }
    let keep = MAX_CHARS_IN_TRACE_INFO_METADATA_AND_TAGS - TRUNCATION_SUFFIX.len();
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}
