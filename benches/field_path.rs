use criterion::{
    black_box, criterion_group, criterion_main, measurement::WallTime, BatchSize, BenchmarkGroup,
    Criterion, SamplingMode,
};
use field_path::{parse_field_path, serialize_field_path, FieldPath, QuoteMode};

const PATHS: &[&str] = &[
    "a",
    "a.b[3].c",
    r#"`work phone`."cell phone"[].number"#,
    r"a\.b\[4\].AB.c4 \`p",
];

fn parse_bench(c: &mut Criterion) {
    let mut group: BenchmarkGroup<WallTime> = c.benchmark_group("field_path::parse");
    group.sampling_mode(SamplingMode::Auto);

    for path in PATHS {
        group.bench_function(*path, move |b| {
            b.iter(|| {
                let parsed = black_box(parse_field_path(black_box(path))).unwrap();
                assert!(parsed.depth() > 0);
            })
        });
    }

    let long = vec!["segment"; 256].join(".");
    group.bench_function("256 segments", move |b| {
        b.iter(|| black_box(parse_field_path(black_box(&long))).unwrap())
    });
}

fn serialize_bench(c: &mut Criterion) {
    let mut group: BenchmarkGroup<WallTime> = c.benchmark_group("field_path::serialize");
    group.sampling_mode(SamplingMode::Auto);

    for mode in [QuoteMode::Natural, QuoteMode::Quoted, QuoteMode::Json] {
        group.bench_function(format!("{mode:?}"), move |b| {
            b.iter_batched(
                || parse_field_path(PATHS[2]).unwrap(),
                |path: FieldPath| black_box(serialize_field_path(&path, mode)),
                BatchSize::SmallInput,
            )
        });
    }
}

fn compare_bench(c: &mut Criterion) {
    let mut group: BenchmarkGroup<WallTime> = c.benchmark_group("field_path::compare");
    group.sampling_mode(SamplingMode::Auto);

    let lower = parse_field_path("work phone.cell phone[2].number").unwrap();
    let upper = parse_field_path(r#"WORK PHONE."Cell Phone"[2].NUMBER"#).unwrap();
    group.bench_function("eq ignoring case", move |b| {
        b.iter(|| assert_eq!(black_box(&lower), black_box(&upper)))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = parse_bench, serialize_bench, compare_bench
);
criterion_main!(benches);
