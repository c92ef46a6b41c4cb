//! Benchmark: full compilation (lex, parse, validate, generate) of a
//! synthetic schema, plus the parse stage alone for comparison.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netidl::{compile, parse};

/// Build a schema with `messages` packet types spread over a few namespaces,
/// each inheriting a shared header and carrying a handful of fields and one
/// repeated group.
fn synthetic_schema(messages: usize) -> String {
    let mut src = String::new();
    src.push_str("@type uint16 seq_t;\n");
    src.push_str("enum channel { control, telemetry, bulk };\n");
    src.push_str("base hdr {\n\tseq_t seq;\n\tuint8 flags;\n};\n");
    for ns in 0..4 {
        src.push_str(&format!("namespace ns{} {{\n", ns));
        for m in 0..messages / 4 {
            src.push_str(&format!("\tmessage pkt{}_{} : hdr {{\n", ns, m));
            src.push_str("\t\tint32 x;\n");
            src.push_str("\t\tint32 y;\n");
            src.push_str("\t\tuint8 payload[32];\n");
            src.push_str("\t\tlist extras {\n\t\t\tuint32 key;\n\t\t\tuint32 val;\n\t\t};\n");
            src.push_str("\t};\n");
        }
        src.push_str("};\n");
    }
    src
}

fn bench_compile(c: &mut Criterion) {
    for &n in &[16usize, 128, 512] {
        let src = synthetic_schema(n);
        let generated = compile(&src).expect("schema compiles");
        eprintln!(
            "compile bench: {} messages, {} source bytes, {} generated bytes",
            n,
            src.len(),
            generated.len()
        );

        c.bench_function(&format!("compile_{}_messages", n), |b| {
            b.iter(|| compile(black_box(&src)).expect("compile"));
        });

        c.bench_function(&format!("parse_{}_messages", n), |b| {
            b.iter(|| parse(black_box(&src)).expect("parse"));
        });
    }
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
