//! psan suite CLI
//!
//! Entry point for the `psan-suite` command-line tool.

use clap::{Args, Parser, Subcommand};
use psan_suite_config::config::parse_overrides;
use psan_suite_config::logging::init_tracing;
use psan_suite_config::{resolve_suite, ExecutionConfig, LoadedFacts, SuiteResolution};
use std::path::PathBuf;
use std::process;

/// Local overrides picked up from the working directory when present
const DEFAULT_LOCAL_CONFIG: &str = "psan.local.toml";

#[derive(Parser)]
#[command(name = "psan-suite")]
#[command(about = "Resolve PredictiveSanitizer test-suite configuration", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FactArgs {
    /// Site config generated into the build tree
    #[arg(long, short = 's')]
    site: Option<PathBuf>,

    /// Local overrides (default: psan.local.toml, skipped if absent)
    #[arg(long, short = 'l')]
    local: Option<PathBuf>,

    /// Override a fact, e.g. --set host_os=Darwin (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Add a root feature (repeatable or comma-separated)
    #[arg(long = "feature", value_delimiter = ',')]
    features: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve execution configs for the suite and its sub-suites
    Resolve {
        #[command(flatten)]
        facts: FactArgs,

        /// Only print this scope (root, Darwin, Linux, libdispatch)
        #[arg(long)]
        scope: Option<String>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Also write the JSON output to this file
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Show a test command after substitution
    Expand {
        #[command(flatten)]
        facts: FactArgs,

        /// Scope whose substitutions to apply
        #[arg(long, default_value = "root")]
        scope: String,

        /// The command to expand (after --)
        #[arg(last = true, required = true)]
        cmd: Vec<String>,
    },

    /// Check that every required fact is present
    Verify {
        #[command(flatten)]
        facts: FactArgs,
    },

    /// Print the merged facts and where they came from
    Facts {
        #[command(flatten)]
        facts: FactArgs,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            facts,
            scope,
            human,
            out,
        } => run_resolve(&facts, scope.as_deref(), human, out),
        Commands::Expand { facts, scope, cmd } => run_expand(&facts, &scope, &cmd),
        Commands::Verify { facts } => run_verify(&facts),
        Commands::Facts { facts } => run_facts(&facts),
    }
}

fn load_facts(args: &FactArgs) -> LoadedFacts {
    let overrides = match parse_overrides(&args.set) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Invalid override: {}", e);
            process::exit(2);
        }
    };

    let local = args
        .local
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_CONFIG));

    match LoadedFacts::build(args.site.as_deref(), Some(local.as_path()), overrides) {
        Ok(loaded) => loaded.with_features(args.features.iter().cloned()),
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    }
}

fn resolve_or_exit(args: &FactArgs) -> SuiteResolution {
    let loaded = load_facts(args);
    match resolve_suite(&loaded.facts) {
        Ok(resolution) => resolution,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn select_scope<'a>(resolution: &'a SuiteResolution, scope: &str) -> &'a ExecutionConfig {
    match resolution.get(scope) {
        Some(config) => config,
        None => {
            eprintln!("Unknown scope '{}'.", scope);
            eprintln!(
                "Available scopes: {}",
                resolution
                    .configs
                    .iter()
                    .map(|c| c.scope.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            process::exit(1);
        }
    }
}

fn run_resolve(args: &FactArgs, scope: Option<&str>, human: bool, out: Option<PathBuf>) {
    let resolution = resolve_or_exit(args);

    let configs: Vec<&ExecutionConfig> = match scope {
        Some(name) => vec![select_scope(&resolution, name)],
        None => resolution.configs.iter().collect(),
    };

    let json = if configs.len() == 1 {
        serde_json::to_string_pretty(configs[0])
    } else {
        serde_json::to_string_pretty(&configs)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = out {
        if let Err(e) = std::fs::write(&path, &json) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
        eprintln!("Wrote {}", path.display());
    }

    if human {
        for config in configs {
            println!("{}", config.to_human());
        }
    } else {
        println!("{}", json);
    }
}

fn run_expand(args: &FactArgs, scope: &str, cmd: &[String]) {
    let resolution = resolve_or_exit(args);
    let config = select_scope(&resolution, scope);

    if config.unsupported {
        eprintln!(
            "Warning: scope '{}' is unsupported on this host: {}",
            config.scope,
            config.unsupported_reasons.join("; ")
        );
    }

    println!("{}", config.substitutions.expand(&cmd.join(" ")));
}

fn run_verify(args: &FactArgs) {
    let loaded = load_facts(args);
    let missing = loaded.facts.missing_attributes();

    if !missing.is_empty() {
        eprintln!("Missing required attributes:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
        eprintln!();
        eprintln!("Add them to the site config or pass --set <name>=<value>.");
        process::exit(1);
    }

    println!("Configuration valid");
    println!();
    for source in &loaded.sources {
        match &source.path {
            Some(path) => println!("  Source: {:?} {}", source.origin, path),
            None => println!("  Source: {:?}", source.origin),
        }
    }
    if let Some(host) = &loaded.facts.host_os {
        println!("  Host OS: {}", host);
    }
    if let Some(compiler) = &loaded.facts.compiler_id {
        println!("  Compiler: {}", compiler);
    }
    let features: Vec<_> = loaded.facts.available_features.iter().collect();
    if !features.is_empty() {
        println!("  Features: {}", features.join(", "));
    }
}

fn run_facts(args: &FactArgs) {
    let loaded = load_facts(args);
    match loaded.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing facts: {}", e);
            process::exit(1);
        }
    }
}
