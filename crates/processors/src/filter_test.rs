//! Filter processor tests

use sluice_core::{Batch, Processor, Record};

use crate::{FilterAction, FilterConfig, FilterProcessor, MatchMode};

fn batch_of(payloads: &[&'static str]) -> Batch {
    payloads.iter().map(|p| Record::from(*p)).collect()
}

#[test]
fn test_empty_pattern_rejected() {
    let err = FilterProcessor::new(FilterConfig::default());
    assert!(err.is_err());
}

#[test]
fn test_keep_contains() {
    let filter = FilterProcessor::new(FilterConfig::new("error")).unwrap();
    let batch = batch_of(&["an error line", "all good", "error: disk full"]);

    let out = filter.execute(batch).unwrap();

    assert_eq!(out.count(), 2);
    assert_eq!(filter.records_dropped(), 1);
}

#[test]
fn test_drop_contains() {
    let filter = FilterProcessor::new(
        FilterConfig::new("healthz").with_action(FilterAction::Drop),
    )
    .unwrap();
    let batch = batch_of(&["GET /healthz", "GET /login", "GET /healthz"]);

    let out = filter.execute(batch).unwrap();

    assert_eq!(out.count(), 1);
    assert_eq!(out.records()[0].payload().as_ref(), b"GET /login");
    assert_eq!(filter.records_dropped(), 2);
}

#[test]
fn test_starts_with_mode() {
    let filter = FilterProcessor::new(
        FilterConfig::new("warn").with_mode(MatchMode::StartsWith),
    )
    .unwrap();
    let batch = batch_of(&["warn: low disk", "info: warn used mid-line"]);

    let out = filter.execute(batch).unwrap();

    assert_eq!(out.count(), 1);
    assert_eq!(out.records()[0].payload().as_ref(), b"warn: low disk");
}

#[test]
fn test_empty_batch_flows_through() {
    let filter = FilterProcessor::new(FilterConfig::new("x")).unwrap();
    let out = filter.execute(Batch::empty()).unwrap();
    assert!(out.is_empty());
    assert_eq!(filter.records_dropped(), 0);
}

#[test]
fn test_filter_is_always_shutdown_ready() {
    let filter = FilterProcessor::new(FilterConfig::new("x")).unwrap();
    filter.prepare_for_shutdown();
    assert!(filter.is_ready_for_shutdown());
}
