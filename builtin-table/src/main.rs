///
/// builtin-table CLI - inspect the builtin table for a target
///
/// - builtin-table list: every builtin with its strategy and signature
/// - builtin-table show <name>: one builtin in detail
///

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use builtin_table::{BuiltinConfig, BuiltinEntry, BuiltinRegistry, BuiltinStrategy};

#[derive(Parser)]
#[command(name = "builtin-table")]
#[command(author, version, about = "Inspect the builtin function table", long_about = None)]
struct Cli {
    /// Read target settings from a TOML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target triple (overrides the config file; defaults to the host)
    #[arg(long, global = true)]
    target: Option<String>,

    /// Register long-double variants
    #[arg(long, global = true)]
    extended_precision: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered builtins
    List {
        /// Only builtins lowered this way (intrinsic, library_call, inlined)
        #[arg(long)]
        strategy: Option<String>,
    },

    /// Show a single builtin
    Show {
        /// Source-level builtin name
        name: String,
    },
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    symbol: &'a str,
    strategy: BuiltinStrategy,
    signature: Vec<String>,
    result: Option<String>,
    available: bool,
    callable_bound: bool,
}

impl<'a> EntryView<'a> {
    fn new(entry: &'a BuiltinEntry) -> Self {
        Self {
            name: entry.name(),
            symbol: entry.backend_symbol(),
            strategy: entry.strategy(),
            signature: entry.signature_types().iter().map(|t| t.to_string()).collect(),
            result: entry.result_type().map(|t| t.to_string()),
            available: entry
                .library_function()
                .map_or(true, |status| status.is_available()),
            callable_bound: entry.cached_callable().is_some(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let registry = build_registry(&cli);

    match &cli.command {
        Commands::List { strategy } => list(&registry, strategy.as_deref(), cli.json),
        Commands::Show { name } => show(&registry, name, cli.json),
    }
}

fn build_registry(cli: &Cli) -> BuiltinRegistry {
    let mut config = match &cli.config {
        Some(path) => match BuiltinConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config: {}", e);
                std::process::exit(1);
            }
        },
        None => BuiltinConfig::default(),
    };
    if let Some(target) = &cli.target {
        config.target.triple = Some(target.clone());
    }
    if cli.extended_precision {
        config.builtins.extended_precision = true;
    }

    match config.build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_strategy(s: &str) -> Option<BuiltinStrategy> {
    [
        BuiltinStrategy::Intrinsic,
        BuiltinStrategy::LibraryCall,
        BuiltinStrategy::Inlined,
    ]
    .into_iter()
    .find(|strategy| strategy.as_str() == s)
}

fn list(registry: &BuiltinRegistry, strategy: Option<&str>, json: bool) {
    let filter = match strategy.map(|s| (s, parse_strategy(s))) {
        None => None,
        Some((_, Some(strategy))) => Some(strategy),
        Some((s, None)) => {
            eprintln!(
                "Unknown strategy '{}' (expected intrinsic, library_call or inlined)",
                s
            );
            std::process::exit(2);
        }
    };

    let views: Vec<EntryView<'_>> = registry
        .iter()
        .map(|(_, entry)| entry)
        .filter(|entry| filter.map_or(true, |s| entry.strategy() == s))
        .map(EntryView::new)
        .collect();

    if json {
        print_json(&views);
        return;
    }

    println!("Target: {}", registry.types().target());
    for view in &views {
        println!(
            "  {:<34} {:<13} {:<24} ({}){}",
            view.name,
            view.strategy.as_str(),
            view.symbol,
            view.signature.join(", "),
            if view.available { "" } else { "  [unavailable]" }
        );
    }
    let summary: Vec<String> = registry
        .strategy_counts()
        .iter()
        .map(|(strategy, n)| format!("{} {}", n, strategy.as_str()))
        .collect();
    println!("{} builtins ({})", views.len(), summary.join(", "));
}

fn show(registry: &BuiltinRegistry, name: &str, json: bool) {
    let Some(entry) = registry.lookup(name) else {
        eprintln!("No builtin named '{}' for {}", name, registry.types().target());
        std::process::exit(1);
    };
    let view = EntryView::new(entry);

    if json {
        print_json(&view);
        return;
    }

    println!("{}", view.name);
    println!("  strategy:  {}", view.strategy);
    println!("  symbol:    {}", view.symbol);
    println!("  signature: ({})", view.signature.join(", "));
    if let Some(result) = &view.result {
        println!("  result:    {}", result);
    }
    if !view.available {
        println!("  not provided by the runtime library of this target");
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
