use anyhow::{Context, Result, bail};
use clap::Parser as ClapParser;
use markweave_config::Config;
use markweave_engine::{Parser, extensions, parsing::snapshot, render};
use std::{
    io::{self, Read},
    path::PathBuf,
};

/// Parse markdown and print HTML or the parsed tree.
#[derive(Debug, ClapParser)]
#[command(name = "markweave", version)]
struct Cli {
    /// Markdown file to read; stdin when omitted
    file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/markweave/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable an extension on top of the configured ones (repeatable)
    #[arg(short = 'e', long = "ext", value_name = "NAME")]
    extensions: Vec<String>,

    /// Record source spans on every node
    #[arg(short, long)]
    positions: bool,

    /// Print the tree outline instead of HTML
    #[arg(short, long)]
    outline: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// List the built-in extensions and exit
    #[arg(long)]
    list_extensions: bool,

    /// Write the effective settings back to the config file and exit
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if cli.list_extensions {
        for name in extensions::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = load_config(&cli)?;
    if cli.save_config {
        save_config(&cli, &config)?;
        return Ok(());
    }

    let input = read_input(&cli)?;
    print!("{}", run(&cli, &config, &input)?);
    Ok(())
}

/// The config named on the command line, or the user's default one, with
/// command-line overrides applied.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.clone());
            match Config::load_from_path(&path)? {
                Some(config) => config,
                None => bail!("Config file not found: {}", path.display()),
            }
        }
        None => {
            let config = Config::load()?;
            if config.is_none() {
                log::debug!(
                    "no config at {}, using defaults",
                    Config::config_path().display()
                );
            }
            config.unwrap_or_default()
        }
    };

    for name in &cli.extensions {
        config.enable(name);
    }
    if cli.positions {
        config.parse.track_positions = true;
    }
    Ok(config)
}

fn save_config(cli: &Cli, config: &Config) -> Result<()> {
    // Validate the names before persisting them.
    config.registry()?;
    match &cli.config {
        Some(path) => {
            let path = Config::expand_path(path).unwrap_or_else(|| path.clone());
            config
                .save_to_path(&path)
                .with_context(|| format!("Failed to save config to {}", path.display()))?;
            log::info!("saved config to {}", path.display());
        }
        None => {
            config.save().context("Failed to save config")?;
            log::info!("saved config to {}", Config::config_path().display());
        }
    }
    Ok(())
}

/// The input text. Invalid UTF-8 sequences become U+FFFD rather than
/// failing the run.
fn read_input(cli: &Cli) -> Result<String> {
    let bytes = match &cli.file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("Failed to read stdin")?;
            input
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run(cli: &Cli, config: &Config, input: &str) -> Result<String> {
    let registry = config.registry().context("Failed to build parser")?;
    let options = config.options()?;
    log::info!(
        "parsing {} bytes with extensions [{}]",
        input.len(),
        config.extensions.join(", ")
    );

    let doc = Parser::new(&registry, options).parse_str(input);
    Ok(if cli.outline {
        snapshot::outline(&doc)
    } else {
        render(&doc)
    })
}
