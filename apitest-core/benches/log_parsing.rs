use apitest_core::parser::{HttpMethod, StatusCode};
use apitest_core::runner::parse_log;
use apitest_core::test_gen::naming::example_context;
use apitest_core::test_gen::{Direction, TestFunctionName};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn synthetic_log(tests: usize) -> String {
    let mut log = String::from("   Compiling api-test-suite v0.1.0\n     Running tests/api_tests.rs\n");
    for i in 0..tests {
        let Some(context) = example_context(&format!("example {}", i)) else { continue };
        let name = TestFunctionName::new(
            &format!("/stores/{{store_id}}/widgets/{}", i % 50),
            if i % 3 == 0 { HttpMethod::Post } else { HttpMethod::Get },
            Direction::Response(StatusCode::Code(200)),
            context,
        );
        if i % 10 == 0 {
            log.push_str(&format!("api_test_suite::paths::stores::{} ... error: missing field `id`\n", name.encode()));
        } else {
            log.push_str(&format!("api_test_suite::paths::stores::{} ... passed (0.001 seconds)\n", name.encode()));
        }
    }
    log
}

fn bench_log_parsing(c: &mut Criterion) {
    let log = synthetic_log(5_000);

    c.bench_function("parse_log_5000", |b| {
        b.iter(|| parse_log(black_box(&log)));
    });

    let encoded: Vec<String> = log
        .lines()
        .filter_map(|line| line.split(" ... ").next())
        .filter(|name| name.contains("test_"))
        .map(str::to_string)
        .collect();

    c.bench_function("decode_names", |b| {
        b.iter(|| {
            for name in &encoded {
                let _ = TestFunctionName::decode(black_box(name));
            }
        });
    });
}

criterion_group!(benches, bench_log_parsing);
criterion_main!(benches);
