//! Ferry CLI Tool
//!
//! Command line interface for checking Ferry configuration and selection

use anyhow::Result;
use clap::{Parser, Subcommand};
use ferry_core::{Config, Discovery};
use ferry_loadbalance::{Filter, SelectOptions, Strategy};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ferry-cli")]
#[command(about = "A CLI tool for Ferry service selection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    ValidateConfig {
        /// Path to configuration file
        #[arg(short, long, default_value = "ferry.toml")]
        config: String,
    },
    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "ferry_example.toml")]
        output: String,
        /// Include wrappers and filters
        #[arg(long)]
        advanced: bool,
    },
    /// Run selections for a service and print the chosen nodes
    Select {
        /// Path to configuration file
        #[arg(short, long, default_value = "ferry.toml")]
        config: String,
        /// Service name to select for
        #[arg(short, long)]
        service: String,
        /// Number of selections
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
        /// Pin selections with a shard key
        #[arg(long)]
        shard_key: Option<String>,
        /// Only select nodes with matching metadata (key=value)
        #[arg(short, long)]
        metadata: Vec<String>,
        /// Only select services exposing this endpoint
        #[arg(short, long)]
        endpoint: Option<String>,
    },
    /// List services known to the discovery source
    ListServices {
        /// Path to configuration file
        #[arg(short, long, default_value = "ferry.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => {
            println!("Validating configuration file: {}", config);
            match ferry_core::config::loader::load_config_from_path(&config) {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("  - discovery: {:?}", cfg.discovery.kind);
                    println!("  - {} services configured", cfg.discovery.services.len());
                    println!("  - {} static nodes configured", cfg.discovery.nodes.len());
                    println!("  - strategy: {:?}", cfg.selector.strategy);
                    println!("  - {} default filters", cfg.selector.filters.len());
                    println!("  - wrappers: {:?}", cfg.wrappers.order);
                }
                Err(e) => {
                    eprintln!("❌ Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::GenerateConfig { output, advanced } => {
            println!("Generating configuration file: {}", output);
            generate_config_file(&output, advanced)?;
            println!("✅ Configuration file generated successfully");
        }
        Commands::Select {
            config,
            service,
            count,
            shard_key,
            metadata,
            endpoint,
        } => {
            let cfg = ferry_core::config::loader::load_config_from_path(&config)?;
            let opts = build_select_options(shard_key, &metadata, endpoint)?;
            run_selections(cfg, &service, count, opts).await?;
        }
        Commands::ListServices { config } => {
            let cfg = ferry_core::config::loader::load_config_from_path(&config)?;
            list_services(cfg).await?;
        }
    }

    Ok(())
}

/// 把命令行参数转换为单次选择参数
fn build_select_options(
    shard_key: Option<String>,
    metadata: &[String],
    endpoint: Option<String>,
) -> Result<SelectOptions> {
    let mut opts = SelectOptions::new();
    if let Some(key) = shard_key {
        opts = opts.with_strategy(Strategy::shard(key));
    }
    if let Some(endpoint) = endpoint {
        opts = opts.with_filter(Filter::endpoint(endpoint));
    }
    for pair in metadata {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid metadata '{}', expected key=value", pair);
        };
        opts = opts.with_filter(Filter::metadata(key, value));
    }
    Ok(opts)
}

/// 执行多次选择并统计每个节点被选中的次数
async fn run_selections(cfg: Config, service: &str, count: usize, opts: SelectOptions) -> Result<()> {
    let discovery = ferry_relay::build_discovery(&cfg.discovery);
    tracing::debug!("Using {} discovery for service '{}'", discovery.kind(), service);
    let selector = Arc::new(ferry_relay::build_selector(discovery, &cfg.selector));

    println!("Selecting '{}' {} times using {} strategy", service, count, selector);

    let mut picks: BTreeMap<String, usize> = BTreeMap::new();
    for i in 0..count {
        match selector.select(service, opts.clone()).await {
            Ok(mut next) => {
                let node = next.next()?;
                println!("  {:>3}. {} ({})", i + 1, node.id, node.address);
                *picks.entry(node.id).or_insert(0) += 1;
            }
            Err(e) => {
                eprintln!("❌ Selection failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    println!("\nDistribution:");
    for (id, hits) in &picks {
        let share = *hits as f64 / count.max(1) as f64 * 100.0;
        println!("  {}: {} ({:.1}%)", id, hits, share);
    }

    Ok(())
}

/// 列出发现源中的服务
async fn list_services(cfg: Config) -> Result<()> {
    let discovery = ferry_relay::build_discovery(&cfg.discovery);
    let services = discovery.list_services().await?;

    if services.is_empty() {
        println!("No services listed by {} discovery", discovery.kind());
        return Ok(());
    }

    println!("Services ({} discovery):", discovery.kind());
    for service in &services {
        let version = if service.version.is_empty() {
            "-"
        } else {
            service.version.as_str()
        };
        println!("  {} {} ({} nodes)", service.name, version, service.nodes.len());
        if !service.endpoints.is_empty() {
            println!("    endpoints: {}", service.endpoints.join(", "));
        }
        for node in &service.nodes {
            if node.metadata.is_empty() {
                println!("    - {} {}", node.id, node.address);
            } else {
                let metadata: BTreeMap<_, _> = node.metadata.iter().collect();
                println!(
                    "    - {} {} {}",
                    node.id,
                    node.address,
                    serde_json::to_string(&metadata)?
                );
            }
        }
    }

    Ok(())
}

/// 生成配置文件
fn generate_config_file(output_path: &str, advanced: bool) -> Result<()> {
    let config_content = if advanced {
        r#"# Ferry Advanced Configuration File
# This configuration includes filters and the wrapper chain

[discovery]
kind = "memory"
cache_ttl_seconds = 30

[[discovery.services]]
name = "greeter"
version = "1.0.0"
endpoints = ["Greeter.Hello"]

[[discovery.services.nodes]]
id = "greeter-1"
address = "10.0.0.1:8080"
metadata = { datacenter = "eu-1" }

[[discovery.services]]
name = "greeter"
version = "1.1.0"
endpoints = ["Greeter.Hello", "Greeter.Goodbye"]

[[discovery.services.nodes]]
id = "greeter-2"
address = "10.0.0.2:8080"
metadata = { datacenter = "eu-1" }

[[discovery.services.nodes]]
id = "greeter-3"
address = "10.0.0.3:8080"
metadata = { datacenter = "us-1" }

[selector]
strategy = "round_robin"
filters = [{ kind = "latest_version" }]

[client]
retries = 2
request_timeout_seconds = 5

[wrappers]
# First wrapper listed is the outermost
order = ["rate_limit", "shard", "metadata_match"]
shard_keys = ["tenant"]
metadata_match_key = "datacenter"
rate_limit_endpoints = ["Greeter.Hello"]

[wrappers.rate_limit]
requests_per_second = 100.0
burst = 20
"#
    } else {
        r#"# Ferry Configuration File

[discovery]
kind = "memory"

[[discovery.services]]
name = "greeter"
version = "1.0.0"

[[discovery.services.nodes]]
id = "greeter-1"
address = "10.0.0.1:8080"

[[discovery.services.nodes]]
id = "greeter-2"
address = "10.0.0.2:8080"

[selector]
strategy = "round_robin"
"#
    };

    std::fs::write(output_path, config_content)?;
    Ok(())
}
