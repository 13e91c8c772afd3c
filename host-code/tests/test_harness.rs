// tests/test_harness.rs — warm-up discipline, ordering and failure handling.

use blurbench::{
    BenchError, Harness, HarnessConfig, ImageDescriptor, KernelFailure, KernelRegistry,
    PixelBuffer,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

fn harness() -> Harness {
    Harness::new(&HarnessConfig::default()).unwrap()
}

/// Registry of identity variants that count their invocations
fn counting_registry(names: &[&str]) -> (KernelRegistry, Vec<Arc<AtomicUsize>>) {
    let mut registry = KernelRegistry::new();
    let mut counters = Vec::new();
    for &name in names {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = Arc::clone(&counter);
        registry
            .register(name, move |input: &[u8], _: &ImageDescriptor| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(input.to_vec())
            })
            .unwrap();
        counters.push(counter);
    }
    (registry, counters)
}

#[test]
fn one_result_per_variant_in_order() {
    let (registry, _) = counting_registry(&["first", "second", "third", "fourth"]);
    let descriptor = ImageDescriptor::new(2, 2, 1).unwrap();
    let results = harness().run(&registry, &[1, 2, 3, 4], &descriptor).unwrap();

    let names: Vec<_> = results.iter().map(|r| r.variant_name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third", "fourth"]);
    for result in &results {
        assert!(result.elapsed_seconds >= 0.);
        assert!(result.cpu_seconds >= 0.);
        assert_eq!(result.output, vec![1, 2, 3, 4]);
    }
}

#[test]
fn first_variant_runs_twice_others_once() {
    let (registry, counters) = counting_registry(&["prod", "serial", "parallel"]);
    let descriptor = ImageDescriptor::new(1, 1, 1).unwrap();
    harness().run(&registry, &[0], &descriptor).unwrap();

    let calls: Vec<_> = counters.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(calls, [2, 1, 1]);
}

#[test]
fn single_variant_is_warmed_up_and_timed() {
    let (registry, counters) = counting_registry(&["only"]);
    let descriptor = ImageDescriptor::new(1, 1, 1).unwrap();
    let results = harness().run(&registry, &[5], &descriptor).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(counters[0].load(Ordering::SeqCst), 2);
}

#[test]
fn every_variant_sees_the_pristine_input() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = KernelRegistry::new();
    for name in ["a", "b", "c"] {
        let seen = Arc::clone(&seen);
        registry
            .register(name, move |input: &[u8], _: &ImageDescriptor| {
                seen.lock().unwrap().push(input.to_vec());
                Ok(input.iter().map(|v| v.wrapping_add(1)).collect())
            })
            .unwrap();
    }
    let descriptor = ImageDescriptor::new(3, 1, 1).unwrap();
    harness().run(&registry, &[7, 8, 9], &descriptor).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert!(seen.iter().all(|input| input == &[7, 8, 9]));
}

#[test]
fn failing_variant_aborts_the_run() {
    let later_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = KernelRegistry::new();
    registry
        .register("ok", |input: &[u8], _: &ImageDescriptor| Ok(input.to_vec()))
        .unwrap();
    registry
        .register("broken", |_: &[u8], _: &ImageDescriptor| -> Result<PixelBuffer, KernelFailure> {
            Err("kernel launch failed".into())
        })
        .unwrap();
    let calls = Arc::clone(&later_calls);
    registry
        .register("after", move |input: &[u8], _: &ImageDescriptor| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(input.to_vec())
        })
        .unwrap();

    let descriptor = ImageDescriptor::new(1, 1, 1).unwrap();
    let err = harness().run(&registry, &[0], &descriptor).unwrap_err();
    match err {
        BenchError::KernelExecution { variant, source } => {
            assert_eq!(variant, "broken");
            assert_eq!(source.to_string(), "kernel launch failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(later_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failing_warm_up_aborts_before_timing() {
    let mut registry = KernelRegistry::new();
    registry
        .register("prod", |_: &[u8], _: &ImageDescriptor| -> Result<PixelBuffer, KernelFailure> {
            Err("no device".into())
        })
        .unwrap();
    let descriptor = ImageDescriptor::new(1, 1, 1).unwrap();
    let err = harness().run(&registry, &[0], &descriptor).unwrap_err();
    assert!(matches!(err, BenchError::KernelExecution { variant, .. } if variant == "prod"));
}

#[test]
fn blur5_variants_agree_on_a_real_image() {
    use rand::{distributions::Standard, prelude::*};

    let descriptor = ImageDescriptor::new(64, 48, 3).unwrap();
    let input: Vec<u8> = rand::thread_rng()
        .sample_iter(Standard)
        .take(descriptor.len())
        .collect();
    let results = harness()
        .run(&KernelRegistry::with_blur5_variants(), &input, &descriptor)
        .unwrap();
    let outcomes = blurbench::compare_against(&results[0], &results).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|(_, outcome)| outcome.equal));
}
