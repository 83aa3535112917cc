//! Performance benchmarks for the conversion engine.
//!
//! - Resolution: cold discovery against cached lookups
//! - Conversion: scalar text parsing, operators, arrays
//! - Population: whole-object population through a property table
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use morph::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };
    let view = frame_view.lock();
    println!(
        "\n=== Profiling Summary ({} frames recorded) ===\n",
        view.recent_frames().count()
    );
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::with_primitives();
    let celsius = TypeHash::from_name("Celsius");
    registry
        .register_type(TypeEntry::class("Celsius", TypeKind::Value).with_operator(
            ConversionOperator::implicit(primitives::DOUBLE, celsius, move |v| match v {
                Value::Double(d) => Ok(Value::native(celsius, d)),
                other => Err(InvalidValue::mismatch("double", other.kind_name())),
            }),
        ))
        .unwrap();
    registry
        .register_enum("Level", &[("Low", 0), ("Medium", 1), ("High", 2)])
        .unwrap();
    Arc::new(registry)
}

fn convert(engine: &Engine, value: Value, target: &DataType) -> Value {
    engine
        .convert(value, target, None, &ConversionContext::empty(), None)
        .unwrap()
}

/// Cold discovery (fresh cache per iteration) against cache hits.
fn resolution_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let registry = registry();
    let string = DataType::named(primitives::STRING);
    let int = DataType::named(primitives::INT32);
    let celsius = DataType::named(TypeHash::from_name("Celsius"));
    let double = DataType::named(primitives::DOUBLE);

    let mut group = c.benchmark_group("resolve");

    group.bench_function("cold_descriptor_converter", |b| {
        b.iter_batched(
            || Engine::new(Arc::clone(&registry)),
            |engine| black_box(engine.resolve(&string, &int)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("cold_operator", |b| {
        b.iter_batched(
            || Engine::new(Arc::clone(&registry)),
            |engine| black_box(engine.resolve(&double, &celsius)),
            BatchSize::SmallInput,
        );
    });

    let warm = Engine::new(Arc::clone(&registry));
    warm.resolve(&string, &int);
    group.bench_function("cached", |b| {
        b.iter(|| black_box(warm.resolve(black_box(&string), black_box(&int))));
    });

    group.bench_function("unresolved", |b| {
        let bool_ty = DataType::named(primitives::BOOL);
        b.iter(|| black_box(warm.resolve(&bool_ty, &celsius)));
    });

    group.finish();
}

fn conversion_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let engine = Engine::new(registry());
    let int = DataType::named(primitives::INT32);
    let level = DataType::named(TypeHash::from_name("Level"));
    let celsius = DataType::named(TypeHash::from_name("Celsius"));

    let mut group = c.benchmark_group("convert");

    group.bench_function("identity", |b| {
        b.iter(|| black_box(convert(&engine, Value::Int32(7), &int)));
    });

    group.bench_function("text_to_int", |b| {
        b.iter(|| black_box(convert(&engine, Value::from("12345"), &int)));
    });

    group.bench_function("text_to_enum", |b| {
        b.iter(|| black_box(convert(&engine, Value::from("medium"), &level)));
    });

    group.bench_function("operator", |b| {
        b.iter(|| black_box(convert(&engine, Value::Double(21.5), &celsius)));
    });

    let items: Vec<Value> = (0..1024).map(|i| Value::from(i.to_string().as_str())).collect();
    let source = Value::Array(ArrayValue::vector(DataType::named(primitives::STRING), items));
    let target = DataType::array_of(int.clone(), 1);
    group.throughput(Throughput::Elements(1024));
    group.bench_function("array_1024", |b| {
        b.iter_batched(
            || source.clone(),
            |value| {
                let out = convert(&engine, value, &target);
                end_profiling_frame();
                black_box(out)
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

#[derive(Default)]
struct Settings {
    port: u16,
    verbose: bool,
    ratio: f64,
    level: i64,
    name: Option<String>,
}

fn population_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let registry = registry();
    let level = TypeHash::from_name("Level");
    let engine = Engine::new(Arc::clone(&registry));
    let bag = PropertyTable::<Settings>::new()
        .typed("Port", |s: &mut Settings, v: u16| s.port = v)
        .typed("Verbose", |s: &mut Settings, v: bool| s.verbose = v)
        .typed("Ratio", |s: &mut Settings, v: f64| s.ratio = v)
        .field("Level", DataType::named(level), move |s: &mut Settings, v| {
            s.level = enum_value(&v, level)?;
            Ok(())
        })
        .typed("Name", |s: &mut Settings, v: Option<String>| s.name = v);

    let fields = [
        ("port", "8080"),
        ("verbose", "true"),
        ("ratio", "0.75"),
        ("level", "High"),
        ("name", "primary"),
    ];

    let mut group = c.benchmark_group("populate");
    group.throughput(Throughput::Elements(fields.len() as u64));
    group.bench_function("five_fields", |b| {
        b.iter(|| {
            let mut settings = Settings::default();
            engine
                .populate(
                    &mut settings,
                    &bag,
                    fields.iter().map(|(k, v)| (*k, Value::from(*v))),
                )
                .unwrap();
            end_profiling_frame();
            black_box((
                settings.port,
                settings.verbose,
                settings.ratio,
                settings.level,
                settings.name,
            ))
        });
    });
    group.finish();

    print_profiling_stats();
}

criterion_group!(
    benches,
    resolution_benchmarks,
    conversion_benchmarks,
    population_benchmarks
);

criterion_main!(benches);
