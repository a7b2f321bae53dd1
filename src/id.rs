//! Span and trace identifiers and their canonical hex wire form.
//!
//! Identifiers are plain non-negative integers inside the process and
//! `0x`-prefixed, zero-padded lowercase hex strings on the wire: 16 hex
//! digits for a span id, 32 for a trace id. Encoding is a pure function
//! of the integer; [`IdCodec`] additionally memoizes the most recently
//! encoded values because wire-format building tends to stringify the
//! same id in bursts.

use crate::error::{TraceWireError, TraceWireResult};
use crate::wire_debug;
use rand::rngs;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::fmt;
use std::sync::Mutex;

/// An 8-byte value which identifies a given span.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Invalid span id
    pub const INVALID: SpanId = SpanId(0);

    /// Converts a string in base 16 to a span id.
    ///
    /// Accepts the bare digits only; use [`decode_span_id`] for the
    /// `0x`-prefixed wire form.
    pub fn from_hex(hex: &str) -> TraceWireResult<Self> {
        u64::from_str_radix(hex, 16)
            .map(SpanId)
            .map_err(|source| TraceWireError::InvalidId {
                value: hex.to_string(),
                source,
            })
    }

    /// Returns the underlying integer value.
    pub const fn to_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::LowerHex for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// A 16-byte value which identifies a given trace.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Invalid trace id
    pub const INVALID: TraceId = TraceId(0);

    /// Converts a string in base 16 to a trace id.
    ///
    /// Accepts the bare digits only; use [`decode_trace_id`] for the
    /// `0x`-prefixed wire form.
    pub fn from_hex(hex: &str) -> TraceWireResult<Self> {
        u128::from_str_radix(hex, 16)
            .map(TraceId)
            .map_err(|source| TraceWireError::InvalidId {
                value: hex.to_string(),
                source,
            })
    }

    /// Returns the underlying integer value.
    pub const fn to_u128(self) -> u128 {
        self.0
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::LowerHex for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Decode a hex identifier string, with or without the `0x` prefix, to
/// its integer value.
pub fn decode_id(hex: &str) -> TraceWireResult<u128> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    u128::from_str_radix(digits, 16).map_err(|source| TraceWireError::InvalidId {
        value: hex.to_string(),
        source,
    })
}

/// Decode a span id from its wire form.
pub fn decode_span_id(hex: &str) -> TraceWireResult<SpanId> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    SpanId::from_hex(digits)
}

/// Decode a trace id from its wire form.
pub fn decode_trace_id(hex: &str) -> TraceWireResult<TraceId> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    TraceId::from_hex(digits)
}

/// Bounded most-recently-used cache of encoded identifiers.
///
/// Correctness never depends on the cache: a miss or a lost entry only
/// costs a recomputation.
#[derive(Debug)]
struct MruCache<K> {
    entries: Vec<(K, String)>,
    capacity: usize,
}

impl<K: Copy + Eq> MruCache<K> {
    fn new(capacity: usize) -> Self {
        MruCache {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn get(&mut self, key: K) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        if index != 0 {
            let entry = self.entries.remove(index);
            self.entries.insert(0, entry);
        }
        Some(self.entries[0].1.clone())
    }

    fn put(&mut self, key: K, value: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(0, (key, value));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Encoder for span and trace identifiers with a bounded memoization
/// cache.
///
/// The default capacity of one entry per id kind covers the common case
/// of encoding the same identifier repeatedly while building a wire
/// span tree.
///
/// # Examples
///
/// ```
/// use trace_wire::id::IdCodec;
///
/// let codec = IdCodec::new();
/// assert_eq!(codec.encode_span_id(42u64.into()), "0x000000000000002a");
/// assert_eq!(
///     codec.encode_trace_id(42u128.into()),
///     "0x0000000000000000000000000000002a"
/// );
/// ```
#[derive(Debug)]
pub struct IdCodec {
    span_cache: Mutex<MruCache<u64>>,
    trace_cache: Mutex<MruCache<u128>>,
}

impl Default for IdCodec {
    fn default() -> Self {
        IdCodec::new()
    }
}

impl IdCodec {
    /// Default cache capacity per identifier kind.
    pub const DEFAULT_CACHE_CAPACITY: usize = 1;

    /// Create a codec with the default single-entry cache.
    pub fn new() -> Self {
        IdCodec::with_cache_capacity(Self::DEFAULT_CACHE_CAPACITY)
    }

    /// Create a codec caching up to `capacity` encoded values per id
    /// kind. A capacity of zero disables caching.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        IdCodec {
            span_cache: Mutex::new(MruCache::new(capacity)),
            trace_cache: Mutex::new(MruCache::new(capacity)),
        }
    }

    /// Encode a span id to its `0x`-prefixed 16-digit hex wire form.
    pub fn encode_span_id(&self, span_id: SpanId) -> String {
        let key = span_id.to_u64();
        if let Ok(mut cache) = self.span_cache.lock() {
            if let Some(encoded) = cache.get(key) {
                return encoded;
            }
            let encoded = format!("0x{span_id}");
            cache.put(key, encoded.clone());
            return encoded;
        }
        // Poisoned lock: recompute rather than fail.
        wire_debug!(name: "id_codec.span_cache_unavailable");
        format!("0x{span_id}")
    }

    /// Encode a trace id to its `0x`-prefixed 32-digit hex wire form.
    pub fn encode_trace_id(&self, trace_id: TraceId) -> String {
        let key = trace_id.to_u128();
        if let Ok(mut cache) = self.trace_cache.lock() {
            if let Some(encoded) = cache.get(key) {
                return encoded;
            }
            let encoded = format!("0x{trace_id}");
            cache.put(key, encoded.clone());
            return encoded;
        }
        wire_debug!(name: "id_codec.trace_cache_unavailable");
        format!("0x{trace_id}")
    }

    /// Drop all cached encodings. Intended for tests that need
    /// deterministic cache state.
    pub fn reset(&self) {
        if let Ok(mut cache) = self.span_cache.lock() {
            cache.clear();
        }
        if let Ok(mut cache) = self.trace_cache.lock() {
            cache.clear();
        }
    }
}

thread_local! {
    /// Store random number generator for each thread
    static CURRENT_RNG: RefCell<rngs::SmallRng> = RefCell::new(rngs::SmallRng::from_os_rng());
}

/// Generate a fresh request id: 32 lowercase hex characters.
pub fn generate_request_id() -> String {
    CURRENT_RNG.with(|rng| format!("{:032x}", rng.borrow_mut().random::<u128>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn span_id_test_data() -> Vec<(SpanId, &'static str)> {
        vec![
            (SpanId(0), "0x0000000000000000"),
            (SpanId(42), "0x000000000000002a"),
            (SpanId(5508496025762705295), "0x4c721bf33e3caf8f"),
            (SpanId(u64::MAX), "0xffffffffffffffff"),
        ]
    }

    #[rustfmt::skip]
    fn trace_id_test_data() -> Vec<(TraceId, &'static str)> {
        vec![
            (TraceId(0), "0x00000000000000000000000000000000"),
            (TraceId(42), "0x0000000000000000000000000000002a"),
            (TraceId(126642714606581564793456114182061442190), "0x5f467fe7bf42676c05e20ba4a90e448e"),
            (TraceId(u128::MAX), "0xffffffffffffffffffffffffffffffff"),
        ]
    }

    fn is_wire_hex(encoded: &str, digits: usize) -> bool {
        match encoded.strip_prefix("0x") {
            Some(rest) => {
                rest.len() == digits
                    && rest
                        .bytes()
                        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            }
            None => false,
        }
    }

    #[test]
    fn encode_span_id_wire_form() {
        let codec = IdCodec::new();
        for (id, expected) in span_id_test_data() {
            let encoded = codec.encode_span_id(id);
            assert_eq!(encoded, expected);
            assert!(is_wire_hex(&encoded, 16));
        }
    }

    #[test]
    fn encode_trace_id_wire_form() {
        let codec = IdCodec::new();
        for (id, expected) in trace_id_test_data() {
            let encoded = codec.encode_trace_id(id);
            assert_eq!(encoded, expected);
            assert!(is_wire_hex(&encoded, 32));
        }
    }

    #[test]
    fn span_id_round_trip() {
        let codec = IdCodec::new();
        for (id, _) in span_id_test_data() {
            let encoded = codec.encode_span_id(id);
            assert_eq!(decode_span_id(&encoded).unwrap(), id);
            assert_eq!(decode_id(&encoded).unwrap(), id.to_u64() as u128);
        }
    }

    #[test]
    fn trace_id_round_trip() {
        let codec = IdCodec::new();
        for (id, _) in trace_id_test_data() {
            let encoded = codec.encode_trace_id(id);
            assert_eq!(decode_trace_id(&encoded).unwrap(), id);
            assert_eq!(decode_id(&encoded).unwrap(), id.to_u128());
        }
    }

    #[test]
    fn decode_accepts_unprefixed_hex() {
        assert_eq!(decode_id("2a").unwrap(), 42);
        assert_eq!(decode_span_id("000000000000002a").unwrap(), SpanId(42));
    }

    #[test]
    fn decode_rejects_invalid_hex() {
        for input in ["not_hex", "", "0x", "0xzz", "12 34"] {
            let err = decode_id(input).unwrap_err();
            assert!(matches!(err, TraceWireError::InvalidId { .. }), "{input}");
        }
    }

    #[test]
    fn repeated_encodes_are_identical() {
        let codec = IdCodec::new();
        let id = SpanId::from(0xdeadbeefu64);
        let first = codec.encode_span_id(id);
        for _ in 0..3 {
            assert_eq!(codec.encode_span_id(id), first);
        }
    }

    #[test]
    fn single_entry_cache_evicts_previous_id() {
        let codec = IdCodec::new();
        // Alternating ids churn the single-entry cache but never change
        // the encoded output.
        for _ in 0..3 {
            assert_eq!(codec.encode_span_id(SpanId(1)), "0x0000000000000001");
            assert_eq!(codec.encode_span_id(SpanId(2)), "0x0000000000000002");
        }
    }

    #[test]
    fn zero_capacity_disables_caching_without_breaking_encoding() {
        let codec = IdCodec::with_cache_capacity(0);
        assert_eq!(codec.encode_span_id(SpanId(42)), "0x000000000000002a");
        assert_eq!(codec.encode_span_id(SpanId(42)), "0x000000000000002a");
    }

    #[test]
    fn reset_clears_cached_entries() {
        let codec = IdCodec::with_cache_capacity(4);
        let encoded = codec.encode_trace_id(TraceId(7));
        codec.reset();
        assert_eq!(codec.encode_trace_id(TraceId(7)), encoded);
    }

    #[test]
    fn mru_cache_promotes_on_hit() {
        let mut cache = MruCache::new(2);
        cache.put(1u64, "one".to_string());
        cache.put(2u64, "two".to_string());
        assert_eq!(cache.get(1), Some("one".to_string()));
        // 2 is now least recently used and gets evicted.
        cache.put(3u64, "three".to_string());
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(1), Some("one".to_string()));
    }

    #[test]
    fn generated_request_ids_are_hex_and_unique() {
        let first = generate_request_id();
        let second = generate_request_id();
        assert_eq!(first.len(), 32);
        assert!(first.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }
}
