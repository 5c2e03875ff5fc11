use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradesheet_core::answer_key::parse_answer_key_str;
use gradesheet_core::normalize::normalize;
use gradesheet_core::segment::segment;

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    let labeled = "Q1: Paris\nQ2) Machine learning\n3. Photosynthesis\nQ4 - true\n";
    let unlabeled = "Paris\nMachine learning\nPhotosynthesis\ntrue\nfalse\n";
    let noisy = "Name: Alice\r\n\r\nQ.1 Paris\r\n\r\n\r\n2) AI\u{2014}ML\r\nQ3: x\r\n";

    let large = {
        let mut s = String::new();
        for i in 1..=200 {
            s.push_str(&format!("Q{i}: answer number {i} with a few words\n"));
        }
        s
    };

    group.bench_function("labeled", |b| b.iter(|| segment(black_box(labeled))));
    group.bench_function("unlabeled", |b| b.iter(|| segment(black_box(unlabeled))));
    group.bench_function("noisy_normalized", |b| {
        b.iter(|| segment(&normalize(black_box(noisy))))
    });
    group.bench_function("200_lines", |b| b.iter(|| segment(black_box(&large))));

    group.finish();
}

fn bench_answer_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("answer_key");

    for n in [5usize, 50, 200] {
        let csv = generate_key_csv(n);
        group.bench_function(format!("{n}_rows"), |b| {
            b.iter(|| parse_answer_key_str(black_box(&csv), black_box("bench.csv")))
        });
    }

    group.finish();
}

fn generate_key_csv(n: usize) -> String {
    let mut s = String::from("\u{feff}Question ID;Correct Answer;Points;Question Type\n");
    for i in 1..=n {
        s.push_str(&format!("{i};Answer {i};2;{}\n", if i % 3 == 0 { "S" } else { "O" }));
    }
    s
}

criterion_group!(benches, bench_segment, bench_answer_key);
criterion_main!(benches);
