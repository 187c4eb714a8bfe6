use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mongoconf::auth::{derive_credentials, derive_credentials_with_salt, ScramMechanism};

/// Credential derivation at the mandated iteration counts
fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("scram");
    group.sample_size(20);

    group.bench_function("sha1_fixed_salt", |b| {
        b.iter(|| {
            let creds = derive_credentials_with_salt(
                ScramMechanism::Sha1,
                black_box("user"),
                black_box("pencil"),
                "MDEyMzQ1Njc4OWFiY2RlZg==",
            )
            .unwrap();
            black_box(creds);
        });
    });

    group.bench_function("sha256_random_salt", |b| {
        b.iter(|| {
            let creds =
                derive_credentials(black_box("SCRAM-SHA-256"), "user", "pencil").unwrap();
            black_box(creds);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_derive);

criterion_main!(benches);
