use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mongoconf::core::{Process, ReplicaSet, ShardingConfig};
use mongoconf::lifecycle::{self, ALL_PROCESSES};
use mongoconf::AutomationConfig;

/// Sharded cluster "bench" with `shards` three-member shards, a config RS and two mongos
fn create_sharded_config(shards: usize) -> AutomationConfig {
    let mut config = AutomationConfig::default();
    let mut port = 27000u16;
    let mut add_rs = |config: &mut AutomationConfig, id: String| {
        let names: Vec<String> = (0..3).map(|i| format!("{}_{}", id, i)).collect();
        for name in &names {
            config
                .processes
                .push(Process::new_mongod(name.clone(), "bench-host".to_string(), port));
            port += 1;
        }
        config.replica_sets.push(ReplicaSet::new(&id, names.iter()));
        id
    };

    let shard_ids: Vec<String> = (0..shards)
        .map(|i| add_rs(&mut config, format!("shard_{}", i)))
        .collect();
    let config_rs = add_rs(&mut config, "configRS".to_string());
    for i in 0..2u16 {
        config.processes.push(Process::new_mongos(
            format!("bench_mongos_{}", i),
            "router-host".to_string(),
            30000 + i,
            "bench".to_string(),
        ));
    }
    config
        .sharding
        .push(ShardingConfig::new("bench", &config_rs, shard_ids.iter()));
    config
}

/// Cascade cost against cluster size
fn bench_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");

    for shards in [1, 10, 100].iter() {
        let base = create_sharded_config(*shards);

        group.bench_with_input(BenchmarkId::new("restart_all", shards), &base, |b, base| {
            b.iter(|| {
                let mut config = base.clone();
                lifecycle::restart(&mut config, "bench", ALL_PROCESSES, None).unwrap();
                black_box(config);
            });
        });

        // one process in the last shard, a worst case for the filter scan
        let target = format!("bench-host:{}", 27000 + (*shards as u16) * 3 - 1);
        group.bench_with_input(
            BenchmarkId::new("shutdown_filtered", shards),
            &base,
            |b, base| {
                b.iter(|| {
                    let mut config = base.clone();
                    lifecycle::shutdown(&mut config, "bench", &[target.as_str()]).unwrap();
                    black_box(config);
                });
            },
        );
    }

    group.finish();
}

/// Document load/save cost
fn bench_document_serde(c: &mut Criterion) {
    let mut group = c.benchmark_group("document");
    let json = create_sharded_config(50).to_json().unwrap();

    group.bench_function("from_json", |b| {
        b.iter(|| {
            let config = AutomationConfig::from_json(black_box(&json)).unwrap();
            black_box(config);
        });
    });

    let config = AutomationConfig::from_json(&json).unwrap();
    group.bench_function("to_json", |b| {
        b.iter(|| black_box(config.to_json().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_cascade, bench_document_serde);

criterion_main!(benches);
