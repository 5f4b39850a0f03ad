use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reid_balance::filename::DatasetKind;
use reid_balance::matrix::SimilarityMatrix;
use reid_balance::{Identity, ImageRecord};

const DIM: usize = 32;

fn random_identities(n: usize, images: usize) -> Vec<Identity> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..n as i64)
        .map(|number| {
            let records = (0..images as u32)
                .map(|frame| {
                    let features = (0..DIM).map(|_| rng.random::<f32>()).collect();
                    ImageRecord::new(format!("ID{number}_CAM1_FRAME{frame}.jpeg"), 1, frame)
                        .with_features(Some(features))
                })
                .collect();
            Identity::with_images(number, DatasetKind::AispReid, records)
        })
        .collect()
}

fn benchmark_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("相似度矩阵");
    for n in [100, 500] {
        let identities = random_identities(n, 8);
        // 预先计算中心特征，只测量矩阵构建
        identities.iter().for_each(|i| {
            i.centroid_features();
        });
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_with_input(BenchmarkId::new("构建", n), &identities, |b, identities| {
            b.iter(|| {
                SimilarityMatrix::build(
                    black_box(identities).iter().map(|i| (i.number(), i.centroid_features())),
                )
            })
        });
    }
    group.finish();
}

fn benchmark_centroid(c: &mut Criterion) {
    let identities = random_identities(1, 256);
    let mut group = c.benchmark_group("中心特征");
    group.bench_function("中位数", |b| {
        b.iter(|| black_box(identities[0].clone()).centroid_features().map(<[f32]>::len))
    });
    group.finish();
}

criterion_group!(benches, benchmark_similarity, benchmark_centroid);
criterion_main!(benches);
