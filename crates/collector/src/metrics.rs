use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

pub static FETCH_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "activity_fetch_requests_total",
        "Activity requests issued to the backend grouped by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("activity fetch requests")
});

pub static FETCH_LATENCY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "activity_fetch_latency_seconds",
        "Latency of activity requests in seconds",
        &["kind"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("activity fetch latency")
});

pub static FETCH_ITEMS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "activity_items_normalized_total",
        "Activity records produced by normalization per kind",
        &["kind"]
    )
    .expect("activity items normalized")
});

pub static SHAPE_MISSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "activity_shape_misses_total",
        "Payloads where no candidate key held an item array",
        &["kind"]
    )
    .expect("activity shape misses")
});

pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "activity_batches_total",
        "Activity batches grouped by outcome",
        &["outcome"]
    )
    .expect("activity batches")
});
