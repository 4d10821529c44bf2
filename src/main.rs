// Main entry point for teamcity-bdd

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use teamcity_bdd::cli::{Cli, Commands};
use teamcity_bdd::commands::{
    handle_completion, handle_encode, handle_replay, handle_subscriptions,
};
use teamcity_bdd::config::{self, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    teamcity_bdd::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("Failed to open log file")?;

    if cli.verbose {
        info!("Starting teamcity-bdd v{}", env!("CARGO_PKG_VERSION"));
    }

    // Load configuration from file (if exists)
    let loaded = Config::load();
    if let Some((_, path)) = &loaded {
        info!("Loaded configuration from {}", path.display());
    }

    if cli.config {
        show_config(loaded.as_ref());
        return Ok(());
    }

    if let Some(config_file) = cli.init_config {
        let toml_content = Config::default().to_toml();
        std::fs::write(&config_file, toml_content)?;
        println!("Configuration file created: {}", config_file.display());
        println!("\nYou can now edit the file to customize your settings.");
        return Ok(());
    }

    if let Some(shell_type) = cli.completion {
        return handle_completion(&shell_type);
    }

    let config = loaded.map(|(config, _)| config).unwrap_or_default();

    match &cli.command {
        Some(Commands::Replay(args)) => handle_replay(args, config),
        Some(Commands::Subscriptions(args)) => handle_subscriptions(args, &config),
        Some(Commands::Encode(args)) => handle_encode(args, config),
        None => {
            eprintln!("No command given. Use 'teamcity-bdd --help' for usage.");
            std::process::exit(2);
        }
    }
}

fn show_config(loaded: Option<&(Config, std::path::PathBuf)>) {
    println!("Current configuration:");

    match loaded {
        Some((cfg, path)) => {
            println!("\n  Configuration file loaded: {}", path.display());
            print_formatter(cfg);
        }
        None => {
            println!("\n  No configuration file loaded");
            println!(
                "  Create one with: teamcity-bdd --init-config {}",
                config::CONFIG_FILE_NAME
            );
            print_formatter(&Config::default());
        }
    }

    println!("\n  Environment variables:");
    match std::env::var(config::ENV_TEAMCITY_BDD_SCHEMA) {
        Ok(schema) => println!("    {}: {}", config::ENV_TEAMCITY_BDD_SCHEMA, schema),
        Err(_) => println!("    {}: not set", config::ENV_TEAMCITY_BDD_SCHEMA),
    }

    println!("\nConfiguration precedence:");
    println!("  1. Command-line arguments (highest)");
    println!("  2. Configuration file");
    println!("  3. Environment variables");
    println!("  4. Built-in defaults (lowest)");
}

fn print_formatter(cfg: &Config) {
    let f = &cfg.formatter;
    println!("    Name: {}", f.name);
    println!("    Schema: {}", f.effective_schema());
    println!("    Escape: {}", f.escape);
    println!("    Leading newline: {}", f.leading_newline);
    println!("    Output: {}", f.sink_target());
    if let Some(ref flow_id) = f.flow_id {
        println!("    Flow id: {}", flow_id);
    }
    println!(
        "    Timestamps: {}",
        if f.timestamps { "enabled" } else { "disabled" }
    );
    for (name, value) in &cfg.parameters {
        println!("    Parameter {}: {}", name, value);
    }
}
