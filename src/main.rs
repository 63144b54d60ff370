use anyhow::Result;
use clap::Parser;
use scenario_engine::cli::commands::{cmd_demo, cmd_format};
use scenario_engine::cli::config::{
    AppConfig, Cli, Commands, DEFAULT_CONFIG_FILE, LoggingConfig, merge_run_config, read_config,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging depends on the config file, so its warnings are reported once
    // the subscriber is up.
    let loaded = read_config(cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE));
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    init_tracing(&config.logging, cli.verbose);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "using default configuration");
    }

    match cli.command {
        Commands::Demo {
            format,
            output,
            parallel,
            stop_on_ignored,
            repeated_keyword,
        } => {
            let run = merge_run_config(
                &config.run,
                format,
                output,
                parallel,
                stop_on_ignored,
                repeated_keyword,
            );
            let all_passed = cmd_demo(&run, cli.verbose)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Format {
            template,
            keyword,
            params,
        } => {
            println!("{}", cmd_format(&template, &keyword, &params)?);
        }
    }

    Ok(())
}

/// RUST_LOG wins, then -v flags, then the configured filter.
fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let fallback = match verbose {
        0 => logging.filter.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
