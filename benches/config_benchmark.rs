use cascade::cfg::{ClassLoader, Config, FormatterLoader, OptionsMap};
use cascade::log::{LogLevel, LogRecord, Registry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use std::sync::Arc;

/// 含 n 个 handler 的配置，全部写入 NullHandler 避免 I/O
fn pipeline_config(handlers: usize) -> Value {
    let mut handler_map = serde_json::Map::new();
    let mut ids = Vec::new();
    for i in 0..handlers {
        let id = format!("h{}", i);
        handler_map.insert(
            id.clone(),
            json!({"class": "NullHandler", "level": "info", "formatter": "line", "processors": ["tags"]}),
        );
        ids.push(id);
    }

    json!({
        "formatters": {"line": {"format": "%channel%.%level_name%: %message%\n", "allow_inline_line_breaks": true}},
        "processors": {"tags": {"class": "TagProcessor", "tags": ["bench"]}},
        "handlers": handler_map,
        "loggers": {"bench": {"handlers": ids}}
    })
}

fn options(value: Value) -> OptionsMap {
    cascade::cfg::options_from_json(value).unwrap()
}

fn benchmark_class_loader(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_loader");

    // 解析规则命中缓存后的单次加载
    group.bench_function("line_formatter", |b| {
        let source = options(json!({"format": "%message%", "allow_inline_line_breaks": true}));
        b.iter(|| black_box(FormatterLoader::new(source.clone()).unwrap().load().unwrap()))
    });

    group.bench_function("nested_handler", |b| {
        let source = options(json!({
            "class": "FilterHandler",
            "handler": {"class": "NullHandler"},
            "min_level_or_list": "warning"
        }));
        b.iter(|| black_box(ClassLoader::new(source.clone()).unwrap().load().unwrap()))
    });

    group.finish();
}

fn benchmark_config_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_pass");

    for handlers in [1, 10, 50].iter() {
        let config = pipeline_config(*handlers);
        group.throughput(Throughput::Elements(*handlers as u64));
        group.bench_with_input(BenchmarkId::from_parameter(handlers), &config, |b, config| {
            let registry = Arc::new(Registry::new());
            b.iter(|| black_box(Config::apply(config.clone(), registry.clone()).unwrap()))
        });
    }

    group.finish();
}

fn benchmark_configured_logger(c: &mut Criterion) {
    let registry = Arc::new(Registry::new());
    Config::apply(pipeline_config(3), registry.clone()).unwrap();
    let logger = registry.get("bench").unwrap();

    let mut group = c.benchmark_group("configured_logger");

    group.bench_function("handled", |b| {
        b.iter(|| black_box(logger.log(LogRecord::new("bench", LogLevel::Error, "handled")).unwrap()))
    });

    group.bench_function("below_level", |b| {
        b.iter(|| black_box(logger.debug(black_box("skipped")).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_class_loader,
    benchmark_config_pass,
    benchmark_configured_logger
);
criterion_main!(benches);
