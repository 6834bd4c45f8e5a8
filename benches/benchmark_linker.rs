/// Benchmark runner for the linking layer.
///
/// Compares call sites that cache their guarded invocation against call
/// sites that went megamorphic and relink on every execution.

extern crate just_linker;

use just_linker::runner::bootstrap::{bind_callable, bootstrap};
use just_linker::runner::ds::function_object::ScriptFunction;
use just_linker::runner::ds::host::{HostClass, HostObject};
use just_linker::runner::ds::object::{JsObject, ScriptObject};
use just_linker::runner::ds::value::{JsNumberType, JsValue};
use just_linker::runner::environment::{LookupContext, ScriptEnvironment};
use just_linker::runner::linker::config::LinkerConfig;
use just_linker::runner::linker::{LinkerCallSite, MethodSignature, StaticType};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Workload {
    name: &'static str,
    encoding: &'static str,
    args: Vec<Vec<JsValue>>,
    iterations: u32,
}

fn lookup(threshold: usize) -> LookupContext {
    let mut config = LinkerConfig::new();
    config.unstable_relink_threshold = threshold;
    LookupContext::new(Arc::new(ScriptEnvironment::new().with_config(config)))
}

fn site(lookup: &LookupContext, w: &Workload) -> Arc<LinkerCallSite> {
    let arity = w.args[0].len();
    bootstrap(lookup, w.encoding, MethodSignature::generic(arity), 0)
        .expect(&format!("Failed to bootstrap workload: {}", w.name))
}

/// Run a workload and return the execution time.
fn run_benchmark(lookup: &LookupContext, w: &Workload) -> Duration {
    let site = site(lookup, w);
    let start = Instant::now();
    for _ in 0..w.iterations {
        for args in &w.args {
            let _ = site.invoke(args);
        }
    }
    start.elapsed()
}

/// Make a call site megamorphic before timing it.
fn run_benchmark_uncached(w: &Workload) -> Duration {
    let lookup = lookup(0);
    let site = site(&lookup, w);
    let _ = site.invoke(&[JsValue::Null]);
    let _ = site.invoke(&[JsValue::from(0)]);
    let start = Instant::now();
    for _ in 0..w.iterations {
        for args in &w.args {
            let _ = site.invoke(args);
        }
    }
    start.elapsed()
}

fn object_with_x(x: i64) -> JsValue {
    let o = ScriptObject::new();
    o.define_own_property("x", JsValue::from(x));
    o.into_value()
}

fn workloads() -> Vec<Workload> {
    let point = Arc::new(HostClass::new("Point").add_field_property("x", StaticType::Int));
    let add = ScriptFunction::native("add", false, |_, args| match (&args[0], &args[1]) {
        (JsValue::Number(a), JsValue::Number(b)) => Ok(JsValue::float(a.as_f64() + b.as_f64())),
        _ => Ok(JsValue::Undefined),
    })
    .into_value();
    let add_ten = bind_callable(&add, JsValue::Undefined, vec![JsValue::from(10)]).unwrap();

    vec![
        Workload {
            name: "Script property (mono)",
            encoding: "GET:PROPERTY:x",
            args: vec![vec![object_with_x(1)]],
            iterations: 20000,
        },
        Workload {
            name: "Script property (poly)",
            encoding: "GET:PROPERTY:x",
            args: (0..4).map(|i| vec![object_with_x(i)]).collect(),
            iterations: 5000,
        },
        Workload {
            name: "String length",
            encoding: "GET:PROPERTY:length",
            args: vec![vec![JsValue::from("benchmark")]],
            iterations: 20000,
        },
        Workload {
            name: "Bean property",
            encoding: "GET:PROPERTY:x",
            args: vec![vec![HostObject::new(point).with_field("x", JsValue::from(3)).into_value()]],
            iterations: 20000,
        },
        Workload {
            name: "Bound call",
            encoding: "CALL",
            args: vec![vec![add_ten, JsValue::Undefined, JsValue::from(5)]],
            iterations: 20000,
        },
    ]
}

fn main() {
    println!("=======================================================");
    println!("  Just Linker - Call Site Benchmarks");
    println!("  Cached Guarded Invocation vs Relink Every Call");
    println!("=======================================================\n");

    let cached_lookup = LookupContext::public();
    let workloads = workloads();

    println!("{:<30} {:>14} {:>14} {:>10}", "Benchmark", "Cached", "Uncached", "Speedup");
    println!("{}", "-".repeat(70));

    let mut total_cached = Duration::ZERO;
    let mut total_uncached = Duration::ZERO;

    for w in &workloads {
        let cached = run_benchmark(&cached_lookup, w);
        let uncached = run_benchmark_uncached(w);
        total_cached += cached;
        total_uncached += uncached;

        let speedup = uncached.as_secs_f64() / cached.as_secs_f64();
        println!("{:<30} {:>12.2?} {:>12.2?} {:>9.2}x", w.name, cached, uncached, speedup);
    }

    println!("{}", "-".repeat(70));
    let total_speedup = total_uncached.as_secs_f64() / total_cached.as_secs_f64();
    println!(
        "{:<30} {:>12.2?} {:>12.2?} {:>9.2}x",
        "TOTAL", total_cached, total_uncached, total_speedup
    );

    // Verify correctness
    println!("\n=======================================================");
    println!("  Correctness Verification");
    println!("=======================================================\n");

    let expected: Vec<i64> = vec![1, 3, 9, 3, 15];
    println!("{:<30} {:>10} {:>8} {:>8}", "Test", "Expected", "Cached", "Uncached");
    println!("{}", "-".repeat(60));

    for (w, expected) in workloads.iter().zip(expected) {
        let last = &w.args[w.args.len() - 1];
        let cached = site(&cached_lookup, w).invoke(last);
        let uncached_lookup = lookup(0);
        let uncached = site(&uncached_lookup, w).invoke(last);

        let value = |r: Result<JsValue, _>| match r {
            Ok(JsValue::Number(JsNumberType::Integer(n))) => n,
            _ => -1,
        };
        let (c, u) = (value(cached), value(uncached));
        let c_status = if c == expected { "✓" } else { "✗" };
        let u_status = if u == expected { "✓" } else { "✗" };
        println!(
            "{:<30} {:>10} {:>4} {:>3} {:>4} {:>3}",
            w.name, expected, c_status, c, u_status, u
        );
    }
}
