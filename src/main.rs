use std::process::ExitCode;

use clap::Parser;
use rowblock_gemm::comm::MpiComm;
use rowblock_gemm::config::Cli;
use rowblock_gemm::logging::init_logging;
use rowblock_gemm::{Benchmark, GroupComm};
use tracing::{error, info};

fn main() -> ExitCode {
    let Some(universe) = mpi::initialize() else {
        eprintln!("Error: failed to initialize MPI");
        return ExitCode::from(1);
    };
    let comm = MpiComm::new(universe.world());

    let ctx = match comm.context() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    // Every rank parses the same argv, so all of them agree on failure
    // without talking to each other.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if ctx.is_coordinator() {
                let _ = e.print();
            }
            return ExitCode::from(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = init_logging(&ctx, &cli.log_level) {
        eprintln!("[rank {}] {}", ctx.rank, e);
        return ExitCode::from(e.exit_code() as u8);
    }
    let _span = tracing::info_span!("rank", rank = ctx.rank).entered();

    let result = cli
        .bench_config()
        .and_then(|config| Benchmark::new(&comm, config))
        .and_then(|bench| bench.run());

    match result {
        Ok(_) => {
            if ctx.is_coordinator() {
                info!("benchmark finished");
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            comm.abort(e.exit_code())
        }
        Err(e) => {
            if ctx.is_coordinator() {
                error!("{}", e);
            }
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
