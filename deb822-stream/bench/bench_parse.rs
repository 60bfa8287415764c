use criterion::{criterion_group, criterion_main, Criterion};
use deb822_stream::Document;

fn synthetic_packages(stanzas: usize) -> String {
    let mut out = String::new();
    for i in 0..stanzas {
        out.push_str(&format!(
            "Package: pkg{i}\n\
             Version: 1.{i}\n\
             Architecture: amd64\n\
             Filename: pool/main/p/pkg{i}/pkg{i}_1.{i}_amd64.deb\n\
             Size: {}\n\
             SHA256: e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
             Description: synthetic package number {i}\n \
             with a continuation line\n\n",
            1024 + i
        ));
    }
    out
}

fn parse_stream_benchmark(c: &mut Criterion) {
    let data = synthetic_packages(1000);

    c.bench_function("parse_stream_1000_stanzas", |b| {
        b.iter(|| {
            let count = Document::read(data.as_bytes())
                .collect::<Result<Vec<_>, _>>()
                .unwrap()
                .len();
            assert_eq!(count, 1000);
        });
    });
}

criterion_group!(benches, parse_stream_benchmark);
criterion_main!(benches);
