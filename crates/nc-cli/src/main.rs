use anyhow::Context;
use clap::{Parser, Subcommand};
use nc_core::{
    ChainConfig, ChainHook, ChainKeyword, ChainRejection, ChainRequest, ChainValidator,
    ConfigLoader, ResolvedChain, TableFamily, compatibility_matrix,
};
use nc_nft::{ChainRenderer, SkippedChain};
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nftchain")]
#[command(version, about = "nftables base chain resolution", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve priority and type for a single base chain
    Resolve {
        #[arg(long, default_value = "inet")]
        family: String,
        /// Chain keyword: filter, mangle, raw, conntrack, natdest, natsource, security, selinux
        #[arg(long)]
        chain: String,
        #[arg(long)]
        hook: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a chain configuration file or directory
    Check {
        #[arg(short, long, default_value = "chains.yaml")]
        file: String,
    },
    /// Render a chain configuration as an nftables JSON document
    Render {
        #[arg(short, long, default_value = "chains.yaml")]
        file: String,
        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show which chain keywords are valid at which hooks for a family
    Matrix {
        #[arg(long, default_value = "inet")]
        family: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            family,
            chain,
            hook,
            json,
        } => handle_resolve(&family, &chain, &hook, json)?,
        Commands::Check { file } => handle_check(&file)?,
        Commands::Render { file, output } => handle_render(&file, output.as_deref())?,
        Commands::Matrix { family } => handle_matrix(&family),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_resolve(family: &str, chain: &str, hook: &str, json: bool) -> anyhow::Result<()> {
    // the rejection is reported once, through the returned error or the JSON body
    match ChainRequest::parse(family, chain, hook).evaluate() {
        Ok(resolved) if json => {
            println!("{}", serde_json::to_string_pretty(&resolved_json(&resolved))?);
        }
        Ok(resolved) => display_resolved(&resolved),
        Err(rejection) if json => {
            let body = rejection_json(family, chain, hook, &rejection);
            println!("{}", serde_json::to_string_pretty(&body)?);
            anyhow::bail!("Chain rejected");
        }
        Err(rejection) => anyhow::bail!("Chain rejected: {}", rejection),
    }

    Ok(())
}

fn resolved_json(resolved: &ResolvedChain) -> serde_json::Value {
    serde_json::json!({
        "family": resolved.family,
        "family_code": resolved.family_code(),
        "chain": resolved.keyword,
        "hook": resolved.hook,
        "hook_number": resolved.hook_number(),
        "type": resolved.chain_type,
        "priority": resolved.priority,
        "prio": resolved.priority_value(),
    })
}

fn rejection_json(
    family: &str,
    chain: &str,
    hook: &str,
    rejection: &ChainRejection,
) -> serde_json::Value {
    serde_json::json!({
        "rejected": true,
        "family": family,
        "chain": chain,
        "hook": hook,
        "reason": rejection.to_string(),
    })
}

fn display_resolved(resolved: &ResolvedChain) {
    println!("✅ Base chain resolved");
    println!(
        "   Family:   {} (code {})",
        resolved.family,
        resolved.family_code()
    );
    println!(
        "   Hook:     {} (number {})",
        resolved.hook,
        resolved.hook_number()
    );
    println!("   Type:     {}", resolved.chain_type);
    println!("   Priority: {}", resolved.priority);
}

fn load_config(file: &str) -> anyhow::Result<ChainConfig> {
    let path = Path::new(file);
    eprintln!("🔍 Loading chain configuration from {}", file);
    ConfigLoader::new().load(path)
}

fn handle_check(file: &str) -> anyhow::Result<()> {
    let config = load_config(file)?;
    let warnings = ChainValidator::new(&config).validate();

    if warnings.is_empty() {
        println!(
            "✅ {} chains in {} tables passed validation",
            config.chain_count(),
            config.tables.len()
        );
        return Ok(());
    }

    println!("\n⚠️  Validation warnings/errors found:\n");
    let mut has_errors = false;
    for warning in &warnings {
        let icon = if warning.is_error() { "❌" } else { "⚠️ " };
        println!("{} {}", icon, warning);
        has_errors |= warning.is_error();
    }

    if has_errors {
        anyhow::bail!("Chain validation failed. Please fix the errors above.");
    }

    Ok(())
}

fn handle_render(file: &str, output: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(file)?;
    let rendered = ChainRenderer::new().render(&config)?;

    report_skipped(&rendered.skipped);

    match output {
        Some(path) => {
            std::fs::write(path, &rendered.payload)
                .with_context(|| format!("Failed to write ruleset to {}", path))?;
            println!(
                "📋 Wrote {} tables and {} chains to {}",
                rendered.tables, rendered.chains, path
            );
        }
        None => println!("{}", rendered.payload),
    }

    Ok(())
}

fn report_skipped(skipped: &[SkippedChain]) {
    for chain in skipped {
        warn!(
            table = %chain.table,
            chain = %chain.chain,
            "skipped chain: {}",
            chain.reason
        );
    }
}

fn handle_matrix(family: &str) {
    let family = TableFamily::resolve(family);
    let matrix = compatibility_matrix(family);

    println!("📋 Base chains for the {} family (priority/type)\n", family);

    print!("{:<12}", "");
    for hook in ChainHook::ALL {
        print!("{:<22}", hook.as_str());
    }
    println!();

    for keyword in ChainKeyword::ALL {
        print!("{:<12}", keyword.as_str());
        for entry in matrix.iter().filter(|e| e.keyword == keyword) {
            let cell = match &entry.outcome {
                Ok(resolved) => format!("{}/{}", resolved.priority.name(), resolved.chain_type),
                Err(_) => "-".to_string(),
            };
            print!("{:<22}", cell);
        }
        println!();
    }
}
