//! # Trace Wire
//!
//! Serialization and identity plumbing for trace records produced by the
//! platform tracing subsystem. Spans are created and exported elsewhere;
//! this crate owns the pieces that must run correctly regardless of what
//! produced the data:
//!
//! * [`id`] — encoding and decoding of span/trace identifiers between
//!   their integer form and the canonical `0x`-prefixed hex wire form,
//!   with a bounded memoizing cache for hot encode loops.
//! * [`span`] — the exported span record and best-effort decoding of its
//!   JSON-encoded attribute values.
//! * [`dedup`] — span-name deduplication applied to a trace before it is
//!   persisted or displayed.
//! * [`value`] / [`encoder`] — serialization of arbitrary captured
//!   runtime values (including third-party model objects with their own
//!   export conventions) into JSON through an ordered fallback chain.
//! * [`context`] — accessors for the ambient evaluation context.
//! * [`tags`] — reserved-tag filtering and metadata truncation.
//!
//! All components are pure, synchronous and safe to use from multiple
//! threads operating on disjoint spans.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]
#![cfg_attr(test, deny(warnings))]

pub mod context;
pub mod dedup;
pub mod encoder;
pub mod error;
pub mod id;
mod internal_logging;
pub mod span;
pub mod tags;
pub mod value;

pub use context::{maybe_get_dependencies_schemas, maybe_get_request_id, PredictionContext};
pub use dedup::deduplicate_span_names;
pub use encoder::{Integrations, TraceValueEncoder};
pub use error::{TraceWireError, TraceWireResult};
pub use id::{IdCodec, SpanId, TraceId};
pub use span::Span;
pub use value::CapturedValue;

#[cfg(feature = "internal-logs")]
#[doc(hidden)]
pub mod _private {
    pub use tracing::{debug, warn};
}
