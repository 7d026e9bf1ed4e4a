#[macro_use]
extern crate criterion;
extern crate ogst;

use criterion::Criterion;
use ogst::SuffixTree;

// A handful of short, overlapping DNA-like reads, repeated to build up a
// run long enough to be worth timing. Stands in for the teacher benchmark's
// `benches/resources/codon_sequences.txt` payload, which isn't part of this
// pack.
const READS: &[&[u8]] = &[
    b"ACGTACGGTTCAGGGTCAATGGTCCA",
    b"TTGGCAACGTACGGTTCAGGGTCCTA",
    b"GGTCCAATGGTCCAACGTACGGTTCA",
    b"CAGGGTCAATGGTCCAACGTTCAGGG",
];

fn setup() -> Vec<(String, Vec<u8>)> {
    let mut sequences = Vec::new();
    for round in 0..64 {
        for (i, read) in READS.iter().enumerate() {
            sequences.push((format!("read{}", round * READS.len() + i), read.to_vec()));
        }
    }
    sequences
}

fn compute(sequences: Vec<(String, Vec<u8>)>) {
    let mut tree = SuffixTree::new();
    for (seq_id, symbols) in sequences {
        tree.extend_all(&seq_id, symbols);
    }
}

fn benchmark(c: &mut Criterion) {
    c.bench_function("extend many short sequences", move |b| {
        b.iter_with_large_setup(setup, compute);
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark
}

criterion_main!(benches);
