//! tablefix CLI
//!
//! Runs a backfill or repair rule against a JSON snapshot of the two
//! collections. Everything here is glue: argument parsing, logging setup,
//! snapshot load/save, and the final summary print.

use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tablefix::storage::snapshot;
use tablefix::{
    BackfillCodes, BatchSink, Config, DocumentSource, Engine, EngineConfig, MappingStore, Mode,
    RepairOwner, Rule,
};

fn print_usage() {
    println!("tablefix - idempotent backfill/repair over a table snapshot");
    println!();
    println!("USAGE:");
    println!("    tablefix <MODE> <SNAPSHOT> [OPTIONS]");
    println!();
    println!("MODES:");
    println!("    backfill-codes            Ensure a codes/{{CODE}} mapping per coded table");
    println!("    repair-owner              Assign an owner to tables missing one");
    println!();
    println!("OPTIONS:");
    println!("    --uid <USER_UID>          Owner to assign (required for repair-owner)");
    println!("    --dry-run                 Count everything, persist nothing");
    println!("    --page-size <N>           Documents per page [default: 500]");
    println!("    --out <PATH>              Write the mutated snapshot here instead of in-place");
    println!("    -h, --help                Print help information");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("tablefix v{}", env!("CARGO_PKG_VERSION"));
    println!("Loading snapshot: {}", config.snapshot.display());

    let store = match snapshot::load(&config.snapshot) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("failed to load snapshot: {e}");
            process::exit(1);
        }
    };

    let engine = Engine::with_config(
        Arc::clone(&store) as Arc<dyn DocumentSource>,
        Arc::clone(&store) as Arc<dyn MappingStore>,
        Arc::clone(&store) as Arc<dyn BatchSink>,
        EngineConfig {
            page_size: config.page_size,
            dry_run: config.dry_run,
        },
    );

    let repair_rule;
    let rule: &dyn Rule = match config.mode {
        Mode::BackfillCodes => &BackfillCodes,
        Mode::RepairOwner => {
            // Presence is enforced by argument parsing.
            let uid = config.uid.as_deref().unwrap_or_default();
            repair_rule = RepairOwner::new(uid);
            &repair_rule
        }
    };

    let report = match engine.run(rule) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("run aborted: {e}");
            process::exit(1);
        }
    };

    if !config.dry_run {
        let out = config.out.as_deref().unwrap_or(&config.snapshot);
        if let Err(e) = snapshot::save(&store, out) {
            eprintln!("failed to write snapshot: {e}");
            process::exit(1);
        }
        println!("Snapshot written: {}", out.display());
    }

    println!("Done.");
    match serde_json::to_string_pretty(&report) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("failed to render summary: {e}");
            process::exit(1);
        }
    }
}
