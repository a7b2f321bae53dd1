//! End-to-end checks of the normalization steps a trace goes through
//! before export: name deduplication, identifier encoding, and
//! attribute serialization.

use serde_json::json;
use trace_wire::encoder::{Integrations, TraceValueEncoder, Version};
use trace_wire::id::{decode_span_id, decode_trace_id, IdCodec, SpanId, TraceId};
use trace_wire::span::attribute_key;
use trace_wire::value::{CapturedValue, ModelExport, Record};
use trace_wire::{deduplicate_span_names, Span};

fn sample_trace() -> Vec<Span> {
    let trace_id = TraceId::from(0x5f46_7fe7_bf42_676c_05e2_0ba4_a90e_448e_u128);
    let root = Span::new("predict", trace_id, SpanId::from(1u64));
    let retrieve_a = Span::new("retrieve", trace_id, SpanId::from(2u64)).with_parent(root.span_id());
    let retrieve_b = Span::new("retrieve", trace_id, SpanId::from(3u64)).with_parent(root.span_id());
    vec![root, retrieve_a, retrieve_b]
}

#[test]
fn trace_is_normalized_before_export() {
    let mut spans = sample_trace();
    let encoder = TraceValueEncoder::with_integrations(
        Integrations::none().with_data_validation(Version::new(2, 1, 0)),
    );
    let codec = IdCodec::new();

    // Attribute payloads are serialized through the value encoder.
    let mut fields = serde_json::Map::new();
    fields.insert("prompt".to_string(), json!("hello"));
    let model = ModelExport::new("Request", fields.clone()).with_structured(fields);
    spans[0].set_attribute_value(
        attribute_key::INPUTS,
        &CapturedValue::ValidatedModel(model),
        &encoder,
    );
    spans[0].set_attribute(attribute_key::REQUEST_ID, "\"req-42\"");

    // Duplicate names are resolved in place.
    deduplicate_span_names(&mut spans);
    let names: Vec<&str> = spans.iter().map(|span| span.name()).collect();
    assert_eq!(names, vec!["predict", "retrieve_1", "retrieve_2"]);
    assert_eq!(spans[1].original_name(), "retrieve");

    // Identifiers render to the canonical wire form and round-trip.
    for span in &spans {
        let wire_span_id = codec.encode_span_id(span.span_id());
        let wire_trace_id = codec.encode_trace_id(span.trace_id());
        assert!(wire_span_id.starts_with("0x") && wire_span_id.len() == 18);
        assert!(wire_trace_id.starts_with("0x") && wire_trace_id.len() == 34);
        assert_eq!(decode_span_id(&wire_span_id).unwrap(), span.span_id());
        assert_eq!(decode_trace_id(&wire_trace_id).unwrap(), span.trace_id());
    }

    // Stored attributes decode back to the values the encoder produced.
    assert_eq!(
        spans[0].attribute(attribute_key::INPUTS),
        Some(json!({"prompt": "hello"}))
    );
    assert_eq!(
        spans[0].attribute(attribute_key::REQUEST_ID),
        Some(json!("req-42"))
    );
}

#[test]
fn encoder_is_total_over_mixed_payloads() {
    let encoder = TraceValueEncoder::with_integrations(Integrations::none());
    let payload = CapturedValue::List(vec![
        CapturedValue::from(1),
        CapturedValue::Record(Record::new(
            "Score",
            vec![("value".to_string(), CapturedValue::from(0.5))],
        )),
        CapturedValue::Record(Record::unconvertible("Mystery")),
        CapturedValue::from(json!({"k": null})),
    ]);
    assert_eq!(
        encoder.encode(&payload),
        json!([1, {"value": 0.5}, "Mystery", {"k": null}])
    );
}
