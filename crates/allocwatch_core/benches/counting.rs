//! Benchmarks for the allocation counter and revision scanning.
//!
//! Run with: cargo bench -p `allocwatch_core`

#![expect(clippy::expect_used, reason = "benchmarks use expect for setup code")]

use std::hint::black_box;

use allocwatch_core::prelude::*;
use chrono::{TimeZone, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

/// Typical C with no allocation calls (the common case for most files).
const PLAIN_C: &str = r"
static int parse_header(const char *buf, size_t len, struct header *out)
{
    if (len < sizeof(*out))
        return -1;
    memcpy(out, buf, sizeof(*out));
    out->flags = ntohl(out->flags);
    return 0;
}
";

/// C with a mix of real calls and lookalike identifiers.
const ALLOCATING_C: &str = r"
struct node *node_new(size_t n)
{
    struct node *node = malloc(sizeof(*node));
    node->items = calloc (n, sizeof(*node->items));
    size_t usable = malloc_usable_size(node);
    node->items = realloc(node->items, 2 * n);
    return node;
}
";

/// Mentions the names without calling them; the exact stage rejects these.
const NEAR_MISSES: &str = r"
/* malloc calloc realloc are wrapped by xmalloc and my_calloc */
#define ALLOC_FN malloc
extern void *(*hook)(size_t) = my_realloc;
";

fn bench_counter_creation(c: &mut Criterion) {
    c.bench_function("counter_default_family", |b| {
        b.iter(|| black_box(PatternCounter::with_default_family().expect("default family")));
    });
}

fn bench_count(c: &mut Criterion) {
    let counter = PatternCounter::with_default_family().expect("default family");

    let mut group = c.benchmark_group("count");
    for (name, content) in [("plain", PLAIN_C), ("allocating", ALLOCATING_C), ("near_misses", NEAR_MISSES)] {
        let large = content.repeat(1000);
        group.throughput(Throughput::Bytes(large.len() as u64));

        group.bench_function(name, |b| b.iter(|| counter.count(black_box(&large))));
    }
    group.finish();
}

fn bench_coarse_gate(c: &mut Criterion) {
    let counter = PatternCounter::with_default_family().expect("default family");
    let large = PLAIN_C.repeat(1000);

    let mut group = c.benchmark_group("coarse_gate");
    group.throughput(Throughput::Bytes(large.len() as u64));

    group.bench_function("staged", |b| b.iter(|| counter.count(black_box(&large))));
    group.bench_function("exact_only", |b| b.iter(|| counter.count_exact(black_box(&large))));
    group.finish();
}

fn bench_series(c: &mut Criterion) {
    let counter = PatternCounter::with_default_family().expect("default family");
    let filter = PathFilter::new(["src"], ["c", "h"]);

    let mut history = InMemoryHistory::new();
    for i in 0..200 {
        let a = ALLOCATING_C.repeat(i % 7 + 1);
        history = history.with_revision(
            &format!("rev{i:04}"),
            Utc.timestamp_opt(i64::try_from(i).expect("small index") * 60, 0)
                .single()
                .expect("valid timestamp"),
            [("src/alloc.c", a.as_str()), ("src/parse.c", PLAIN_C), ("src/notes.h", NEAR_MISSES)],
        );
    }
    let revisions = history.list_revisions().expect("in-memory revisions");
    let scanner = RevisionScanner::new(&history, &filter, &counter);

    let mut group = c.benchmark_group("series");
    group.bench_function("sequential", |b| {
        b.iter(|| Aggregator::new().build_series(black_box(&revisions), |r| scanner.count(&r.id)));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| Aggregator::new().build_series_parallel(black_box(&revisions), || (), |_, r| scanner.count(&r.id)));
    });
    group.finish();
}

criterion_group!(benches, bench_counter_creation, bench_count, bench_coarse_gate, bench_series);

criterion_main!(benches);
