use criterion::{criterion_group, criterion_main, Criterion};
use trace_wire::id::{IdCodec, SpanId, TraceId};

fn criterion_benchmark(c: &mut Criterion) {
    let cached = IdCodec::new();
    let uncached = IdCodec::with_cache_capacity(0);
    let span_id = SpanId::from(0x4c72_1bf3_3e3c_af8f_u64);
    let trace_id = TraceId::from(0x5f46_7fe7_bf42_676c_05e2_0ba4_a90e_448e_u128);

    c.bench_function("encode_span_id_cached", |b| {
        b.iter(|| cached.encode_span_id(span_id))
    });
    c.bench_function("encode_span_id_uncached", |b| {
        b.iter(|| uncached.encode_span_id(span_id))
    });
    c.bench_function("encode_trace_id_cached", |b| {
        b.iter(|| cached.encode_trace_id(trace_id))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
