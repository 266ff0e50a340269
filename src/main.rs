use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kiosk::config::{load_and_validate_config, KioskConfig, ThemeChoice};
use kiosk::game::preset_by_name;
use kiosk::render::{parse_hash, run_render, RenderArgs};
use kiosk::source::SourceSpec;
use kiosk::theme::Theme;

fn version_string() -> &'static str {
    match option_env!("KIOSK_GIT_HASH") {
        Some(hash) => {
            Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
        }
        None => env!("CARGO_PKG_VERSION"),
    }
}

#[derive(Debug, Parser)]
#[command(name = "kiosk")]
#[command(version = version_string())]
#[command(about = "Terminal portfolio: ASCII backdrop, command shell, jump mini-game")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the interactive portfolio (the default).
    Run {
        /// Config file (default: ./kiosk.yaml if present).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the theme: dark, light, auto.
        #[arg(long)]
        theme: Option<String>,
        /// Override the frame source, e.g. clip:pulse or image:back.png.
        #[arg(long)]
        source: Option<String>,
        /// Override the game preset: floaty, arcade.
        #[arg(long)]
        preset: Option<String>,
    },
    /// Render backdrop frames headlessly and print their hashes.
    Render {
        #[arg(long, default_value = "clip:drift")]
        source: String,
        #[arg(long, default_value_t = 80)]
        cols: u32,
        #[arg(long, default_value_t = 24)]
        rows: u32,
        #[arg(long, default_value_t = 1)]
        frames: u32,
        /// dark or light.
        #[arg(long, default_value = "dark")]
        theme: String,
        #[arg(long, default_value_t = 3.0)]
        zoom: f32,
        /// Suppress the frame text, print hashes only.
        #[arg(long)]
        quiet: bool,
        /// Write frame/sequence hashes as JSON to this path.
        #[arg(long)]
        sidecar: Option<PathBuf>,
        /// Fail unless the sequence hash matches, e.g. 0xdeadbeef.
        #[arg(long)]
        expected_hash: Option<String>,
    },
    /// List the built-in frame sources.
    Sources,
    /// Validate a config file and report what it resolves to.
    Check {
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        config: None,
        theme: None,
        source: None,
        preset: None,
    });

    match command {
        Commands::Run {
            config,
            theme,
            source,
            preset,
        } => run_interactive(config, theme, source, preset),
        Commands::Render {
            source,
            cols,
            rows,
            frames,
            theme,
            zoom,
            quiet,
            sidecar,
            expected_hash,
        } => {
            kiosk::logging::init_stderr_logging();
            let theme = Theme::from_keyword(&theme)
                .ok_or_else(|| anyhow::anyhow!("invalid theme '{theme}' (allowed: dark, light)"))?;
            run_render(RenderArgs {
                source: SourceSpec::parse(&source)?,
                cols,
                rows,
                frames,
                theme,
                zoom,
                quiet,
                sidecar,
                expected_hash: expected_hash.as_deref().map(parse_hash).transpose()?,
            })
        }
        Commands::Sources => {
            print!("{}", kiosk::source::render_source_list());
            Ok(())
        }
        Commands::Check { config } => run_check(config),
    }
}

fn run_interactive(
    config_path: Option<PathBuf>,
    theme: Option<String>,
    source: Option<String>,
    preset: Option<String>,
) -> Result<()> {
    let mut config = load_and_validate_config(config_path.as_deref())?;
    apply_overrides(&mut config, theme, source, preset)?;

    // Interactive mode owns the terminal; logs go to a file. A failure
    // here downgrades to an unlogged session rather than aborting.
    if let Err(error) = kiosk::logging::init_file_logging(&kiosk::store::log_file_path()) {
        eprintln!("warning: logging disabled: {error}");
    }

    kiosk::app::run(config)
}

fn apply_overrides(
    config: &mut KioskConfig,
    theme: Option<String>,
    source: Option<String>,
    preset: Option<String>,
) -> Result<()> {
    if let Some(theme) = theme {
        config.theme = ThemeChoice::from_keyword(&theme)?;
    }
    if let Some(source) = source {
        config.source = SourceSpec::parse(&source)?;
    }
    if let Some(name) = preset {
        config.preset = preset_by_name(&name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown game preset '{name}' (allowed: {})",
                kiosk::game::PRESETS
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;
    }
    Ok(())
}

fn run_check(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_and_validate_config(config_path.as_deref())?;
    let resolved = config.theme.resolve();
    println!(
        "OK: theme={:?} (resolves to {}), source={}, preset={}, cover={}",
        config.theme,
        resolved.as_str(),
        config.source.describe(),
        config.preset.name,
        config
            .cover
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<source frame 0>".to_owned()),
    );
    Ok(())
}
