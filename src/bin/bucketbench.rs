//! bucketbench binary
//!
//! Runs one benchmark and prints one result line on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use bucketbench::config::{WalSyncStrategy, DEFAULT_BUCKETS, DEFAULT_ITERATIONS};
use bucketbench::storage::DEFAULT_STORAGE;
use bucketbench::{bench, BenchConfig, Driver, EngineConfig, OperationRegistry, StorageRegistry};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

/// Concurrent multi-bucket key-value storage benchmark
#[derive(Parser, Debug)]
#[command(name = "bucketbench")]
#[command(about = "Throughput benchmark for pluggable key-value storage backends")]
#[command(version)]
struct Args {
    /// Iterations per bucket
    #[arg(long = "iter", default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Number of buckets (one concurrent worker each)
    #[arg(long, default_value_t = DEFAULT_BUCKETS)]
    buckets: usize,

    /// Backend to benchmark
    #[arg(long, default_value = DEFAULT_STORAGE)]
    storage: String,

    /// Operation: PutUnique | PutDuplicate | PutIf | Range | Has | Del | Get
    #[arg(long, default_value = bench::PUT_UNIQUE)]
    operation: String,

    /// Directory under which the run workspace is created (default: system temp dir)
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Reference engine: memtable size limit in MB before flush
    #[arg(long, default_value_t = 64)]
    memtable_mb: usize,

    /// Reference engine: WAL sync strategy
    #[arg(long, value_enum, default_value_t = WalSync::Never)]
    wal_sync: WalSync,

    /// Reference engine: records between fsyncs with `--wal-sync every-n`
    #[arg(long, default_value_t = 100)]
    wal_sync_count: usize,

    /// Print registered storages and operations, then exit
    #[arg(long)]
    list: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum WalSync {
    Never,
    EveryWrite,
    EveryN,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let strategy = match self.wal_sync {
            WalSync::Never => WalSyncStrategy::Never,
            WalSync::EveryWrite => WalSyncStrategy::EveryWrite,
            WalSync::EveryN => WalSyncStrategy::EveryNEntries {
                count: self.wal_sync_count.max(1),
            },
        };
        EngineConfig::builder()
            .wal_sync_strategy(strategy)
            .memtable_size_limit(self.memtable_mb * 1024 * 1024)
            .build()
    }

    fn bench_config(&self) -> BenchConfig {
        let mut builder = BenchConfig::builder()
            .iterations(self.iterations)
            .buckets(self.buckets)
            .storage(&self.storage)
            .operation(&self.operation);
        if let Some(root) = &self.workspace {
            builder = builder.workspace_root(root);
        }
        builder.build()
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,bucketbench=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let storages = StorageRegistry::with_builtin(args.engine_config());
    let operations = OperationRegistry::with_builtin();

    if args.list {
        println!("storages: {}", storages.names().join(", "));
        println!("operations: {}", operations.names().join(", "));
        return ExitCode::SUCCESS;
    }

    tracing::debug!("bucketbench v{}", bucketbench::VERSION);

    let driver = Driver::new(&storages, &operations);
    match driver.run(&args.bench_config()) {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_unknown_name() => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("benchmark failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
