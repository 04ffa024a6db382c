mod common;

use std::time::Duration;

use common::local_group::run_group;
use rowblock_gemm::benchmark::VERIFY_TOLERANCE;
use rowblock_gemm::{BenchConfig, BenchReport, Benchmark, BoundaryCorners, Error, ErrorKind};

fn run_benchmark(config: BenchConfig, p: usize) -> Vec<Result<Option<BenchReport>, Error>> {
    run_group(p, |comm| Benchmark::new(comm, config)?.run()).results
}

#[test]
fn test_distributed_run_reports_on_coordinator_only() {
    let results = run_benchmark(BenchConfig::new(10, 3), 3);

    let mut results = results.into_iter();
    let report = results.next().unwrap().unwrap().expect("coordinator report");
    for other in results {
        assert!(other.unwrap().is_none());
    }

    assert_eq!(report.n, 10);
    assert_eq!(report.iters, 3);
    assert_eq!(report.ranks, 3);
    assert!(report.verified(), "relative error {}", report.relative_error());
}

#[test]
fn test_corners_n4_across_group_sizes() {
    for p in 1..=6 {
        let results = run_benchmark(BenchConfig::new(4, 1), p);
        let report = results.into_iter().next().unwrap().unwrap().unwrap();
        assert_eq!(report.corners.top_left, 4.0, "P={}", p);
        assert_eq!(report.corners.top_right, 1.0, "P={}", p);
        assert_eq!(report.corners.bottom_left, 16.0, "P={}", p);
        assert_eq!(report.corners.bottom_right, 4.0, "P={}", p);
    }
}

#[test]
fn test_results_independent_of_group_size() {
    let n = 13;
    let reference = BoundaryCorners::expected(n);
    for p in [1, 2, 5, 13, 16] {
        let results = run_benchmark(BenchConfig::new(n, 2), p);
        let report = results.into_iter().next().unwrap().unwrap().unwrap();
        assert!(
            report.corners.max_relative_error(&reference) <= VERIFY_TOLERANCE,
            "P={}",
            p
        );
    }
}

#[test]
fn test_memory_guard_stops_every_rank() {
    let config = BenchConfig::new(64, 1).with_memory_limit(8 * 64 * 64 - 1);
    let results = run_benchmark(config, 4);
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
        assert!(matches!(err, Error::MemoryBudget { n: 64, .. }));
    }
}

#[test]
fn test_message_limit_stops_every_rank() {
    let config = BenchConfig::new(46341, 1).with_memory_limit(u64::MAX);
    let run = run_group(3, |comm| Benchmark::new(comm, config)?.run());
    assert_eq!(run.pending, 0);
    for result in run.results {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { n: 46341, .. }));
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }
}

#[test]
fn test_memory_limit_exactly_fits() {
    let config = BenchConfig::new(64, 1).with_memory_limit(8 * 64 * 64);
    let results = run_benchmark(config, 2);
    assert!(results.into_iter().all(|r| r.is_ok()));
}

#[test]
fn test_invalid_config_is_rejected_before_communication() {
    let results = run_benchmark(BenchConfig::new(0, 1), 3);
    for result in results {
        assert!(matches!(result, Err(Error::InvalidDimension(0))));
    }

    let results = run_benchmark(BenchConfig::new(8, 0), 2);
    for result in results {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidIterations(0)));
        assert_eq!(err.exit_code(), 1);
    }
}

fn report_with(n: usize, elapsed: Duration) -> BenchReport {
    BenchReport {
        n,
        iters: 1,
        ranks: 1,
        elapsed,
        corners: BoundaryCorners::expected(n),
    }
}

#[test]
fn test_report_metrics() {
    let report = report_with(1000, Duration::from_millis(500));
    assert_eq!(report.flops(), 2e9);
    assert!((report.gflops() - 4.0).abs() < 1e-12);
    assert!((report.elapsed_ms() - 500.0).abs() < 1e-9);
    assert!(report.verified());
}

#[test]
fn test_report_zero_elapsed() {
    let report = report_with(8, Duration::ZERO);
    assert_eq!(report.gflops(), 0.0);
}

#[test]
fn test_report_flags_wrong_corners() {
    let mut report = report_with(4, Duration::from_millis(1));
    report.corners.bottom_right = 5.0;
    assert!(!report.verified());
    assert!((report.relative_error() - 0.25).abs() < 1e-12);
}
