//! # Delegate-Ledger Benchmarks
//!
//! Hot paths of block processing:
//!
//! | Area | Operation | Runs per block |
//! |------|-----------|----------------|
//! | Rounds | Fee split over the active set | once per round |
//! | Slots | Per-round delegate shuffle | once per ranking lookup |
//! | Transactions | Bytes, id, sign, verify | once per transaction |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;

use dl_02_slots::shuffle_for_round;
use dl_03_transactions::signing;
use dl_04_rounds::RoundChanges;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Address, Amount, PublicKey, Transaction, TransactionAsset};

// ============================================================================
// Rounds
// ============================================================================

fn bench_round_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("rounds");
    let mut rng = rand::thread_rng();

    for delegates in [11u64, 51, 101] {
        let rewards: Vec<Amount> = (0..delegates)
            .map(|_| Amount::new(rng.gen_range(0..500_000_000)))
            .collect();
        let fees = Amount::new(rng.gen_range(0..10_000_000_000));

        group.throughput(Throughput::Elements(delegates));
        group.bench_with_input(
            BenchmarkId::new("fee_split", delegates),
            &delegates,
            |b, &delegates| {
                b.iter(|| {
                    let changes =
                        RoundChanges::new(1, fees, rewards.clone(), delegates).unwrap();
                    let count = usize::try_from(delegates).unwrap();
                    for index in 0..count {
                        black_box(changes.at(index).unwrap());
                    }
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// Slots
// ============================================================================

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("slots");
    let delegates: Vec<PublicKey> = (0..101u8).map(|i| PublicKey::new([i; 32])).collect();

    group.bench_function("shuffle_101", |b| {
        let mut round = 0u64;
        b.iter(|| {
            round += 1;
            black_box(shuffle_for_round(round, delegates.clone()))
        })
    });
    group.finish();
}

// ============================================================================
// Transactions
// ============================================================================

fn bench_transactions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transactions");
    group.measurement_time(Duration::from_secs(5));

    let keypair = Ed25519KeyPair::from_secret("bench sender").unwrap();
    let mut tx = Transaction::new(TransactionAsset::Send, keypair.public_key(), 100);
    tx.recipient_id = Some(Address::new(12_345));
    tx.amount = Amount::new(100_000_000);
    tx.fee = Amount::new(10_000_000);
    let signature = signing::sign(&keypair, &tx);
    tx.signature = Some(signature);

    group.bench_function("bytes", |b| b.iter(|| black_box(tx.to_bytes(false, false))));
    group.bench_function("id", |b| b.iter(|| black_box(tx.compute_id())));
    group.bench_function("sign", |b| b.iter(|| black_box(signing::sign(&keypair, &tx))));
    group.bench_function("verify", |b| {
        b.iter(|| {
            black_box(signing::verify_signature(
                &tx,
                &keypair.public_key(),
                &signature,
            ))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_round_changes,
    bench_shuffle,
    bench_transactions
);
criterion_main!(benches);
