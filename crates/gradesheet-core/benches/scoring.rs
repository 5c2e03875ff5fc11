use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gradesheet_core::answer_key::parse_answer_key_str;
use gradesheet_core::model::{KeyEntry, QuestionType};
use gradesheet_core::scoring::{extract_keywords, grade, score_subjective, ScoringConfig};
use gradesheet_core::segment::{into_answers, segment};

fn bench_subjective(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_subjective");
    let config = ScoringConfig::default();

    let short = KeyEntry {
        expected_answer: "Machine Learning is a subset of AI".into(),
        marks: 5.0,
        question_type: QuestionType::Subjective,
    };
    let long = KeyEntry {
        expected_answer: "Photosynthesis converts light energy into chemical energy stored in \
                          glucose, using chlorophyll in the chloroplasts, carbon dioxide from \
                          the air and water absorbed through the roots, releasing oxygen"
            .into(),
        marks: 10.0,
        question_type: QuestionType::Subjective,
    };
    let answer = "Plants use chlorophyll to turn light into chemical energy, taking in carbon \
                  dioxide and water and giving off oxygen as glucose is made.";

    group.bench_function("short_key", |b| {
        b.iter(|| score_subjective(black_box("AI includes Machine Learning"), &short, &config))
    });

    group.bench_function("long_key", |b| {
        b.iter(|| score_subjective(black_box(answer), &long, &config))
    });

    group.bench_function("extract_keywords", |b| {
        b.iter(|| extract_keywords(black_box(&long.expected_answer)))
    });

    group.finish();
}

fn bench_grade_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade");
    let config = ScoringConfig::default();

    for n in [10usize, 100] {
        let key = parse_answer_key_str(&generate_key_csv(n), "bench.csv").unwrap();
        let sheet = generate_sheet(n);
        let answers = into_answers(&segment(&sheet));

        group.bench_function(format!("{n}_questions"), |b| {
            b.iter(|| grade(black_box(&answers), black_box(&key), &config))
        });
    }

    group.finish();
}

fn generate_key_csv(n: usize) -> String {
    let mut s = String::from("QID,Answer,Marks,Type\n");
    for i in 1..=n {
        if i % 2 == 0 {
            s.push_str(&format!("Q{i},Option {i},1,O\n"));
        } else {
            s.push_str(&format!(
                "Q{i},\"Explain the water cycle with evaporation and condensation {i}\",5,S\n"
            ));
        }
    }
    s
}

fn generate_sheet(n: usize) -> String {
    let mut s = String::new();
    for i in 1..=n {
        if i % 2 == 0 {
            s.push_str(&format!("Q{i}: option {i}\n"));
        } else {
            s.push_str(&format!("Q{i}: water evaporation then condensation\n"));
        }
    }
    s
}

criterion_group!(benches, bench_subjective, bench_grade_sheet);
criterion_main!(benches);
