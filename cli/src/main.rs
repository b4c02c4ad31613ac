//! gigsheets CLI - PDF song sheets from YAML gig files

mod status;
mod update;
mod watch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use gigsheets::config::{self, Config, DEFAULT_VARIANT};
use gigsheets::generate::{generate_with_context, BatchEvent, BatchReport, GenerationContext};
use gigsheets::render::{to_json_value, JsonFormat};
use gigsheets::GenerateOptions;

use watch::{ChangeWatcher, WatchTarget};

const COMMIT: &str = match option_env!("GIGSHEETS_COMMIT") {
    Some(commit) => commit,
    None => "none",
};

const BUILD_DATE: &str = match option_env!("GIGSHEETS_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "gigsheets")]
#[command(version)]
#[command(about = "Generate PDF song sheets from YAML configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate PDF song sheets from configuration and gig files
    Generate {
        /// Path to config YAML file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Watch for changes and regenerate automatically
        #[arg(short, long)]
        watch: bool,

        /// Spacing between images in mm (default: 5.0, or value from config)
        #[arg(short, long, allow_negative_numbers = true)]
        spacing: Option<f64>,

        /// Image variant to use for every song that has it
        #[arg(short, long, value_name = "NAME")]
        image_override: Option<String>,

        /// Override output folder path from config file
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also generate _all.pdf containing every song from config
        #[arg(short, long)]
        all_songs: bool,

        /// Enable debug logging
        #[arg(short, long)]
        debug: bool,

        /// Print the layout plan as JSON instead of writing PDFs
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate JSON Schema for gig YAML files from config
    GenerateSchema {
        /// Path to config YAML file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output JSON Schema file path
        #[arg(short, long, default_value = "gig-schema.json")]
        output: PathBuf,

        /// Watch config file for changes and regenerate schema automatically
        #[arg(short, long)]
        watch: bool,
    },

    /// Validate that all images in the config file exist
    ValidateConfig {
        /// Path to config YAML file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Add unreferenced images from the image folder to the config file
        #[arg(short, long)]
        add_missing: bool,

        /// Sort songs alphabetically by nickname
        #[arg(short, long)]
        sort: bool,
    },

    /// Check for and apply updates
    Update {
        /// Check for an update without applying
        #[arg(long)]
        check_only: bool,

        /// Apply any update without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

impl Commands {
    fn debug(&self) -> bool {
        matches!(self, Commands::Generate { debug: true, .. })
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.debug());

    let update_rx = match cli.command {
        Commands::Update { .. } => None,
        _ => update::start_periodic_check(),
    };

    let result = match cli.command {
        Commands::Generate {
            config,
            watch,
            spacing,
            image_override,
            output,
            all_songs,
            debug,
            dry_run,
        } => {
            let mut options = GenerateOptions::new(config)
                .with_spacing(spacing)
                .with_all_songs(all_songs)
                .with_dry_run(dry_run)
                .with_debug(debug);
            if let Some(variant) = image_override {
                options = options.with_image_override(variant);
            }
            if let Some(dir) = output {
                options = options.with_output(dir);
            }
            if watch {
                cmd_generate_watch(&options)
            } else {
                cmd_generate(&options)
            }
        }
        Commands::GenerateSchema {
            config,
            output,
            watch,
        } => cmd_generate_schema(&config, &output, watch),
        Commands::ValidateConfig {
            config,
            add_missing,
            sort,
        } => cmd_validate_config(&config, add_missing, sort),
        Commands::Update { check_only, yes } => update::run_update(check_only, yes),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Some(result) = update_rx.as_ref().and_then(update::try_get_update_result) {
        update::print_update_notification(&result);
    }

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_batch(context: &GenerationContext) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let pb = if context.options.dry_run {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    let bar_style =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-");
    pb.set_message("Generating PDFs...");

    let extra = u64::from(context.options.all_songs);
    let report = generate_with_context(context, &mut |event: BatchEvent<'_>| match event {
        BatchEvent::Discovered { count, dir } => {
            pb.println(format!("Found {} gig file(s) in {}", count, dir.display()));
            pb.set_style(bar_style.clone());
            pb.set_length(count as u64 + extra);
        }
        BatchEvent::NoGigs { dir } => {
            pb.println(format!(
                "{} No gig files found in {}",
                "!".yellow().bold(),
                dir.display()
            ));
            pb.set_length(extra);
        }
        BatchEvent::Generated(outcome) => {
            if outcome.written {
                let warnings = if outcome.errors > 0 {
                    format!(" ({} unresolved)", outcome.errors).yellow().to_string()
                } else {
                    String::new()
                };
                pb.println(format!(
                    "{} Successfully generated PDF: {}{}",
                    "✓".green().bold(),
                    outcome.output.display(),
                    warnings
                ));
            }
            pb.inc(1);
        }
        BatchEvent::Failed(failure) => {
            pb.println(format!(
                "{} {}: {}",
                "✗".red().bold(),
                failure.source.display(),
                failure.message
            ));
            pb.inc(1);
        }
    });
    pb.finish_and_clear();

    Ok(report?)
}

fn cmd_generate(options: &GenerateOptions) -> CmdResult {
    let context = GenerationContext::load(options)?;
    let report = run_batch(&context)?;

    if options.dry_run {
        println!("{}", to_json_value(&report.plans(), JsonFormat::Pretty)?);
    } else if !report.is_success() {
        println!(
            "{} {} gig(s) failed",
            "Warning:".yellow().bold(),
            report.failures.len()
        );
    }
    Ok(())
}

fn cmd_generate_watch(options: &GenerateOptions) -> CmdResult {
    println!("Initial PDF generation...");
    if let Err(e) = cmd_generate(options) {
        log::error!("Error during initial generation: {}", e);
    }

    let config = Config::load(&options.config_path)?;
    let paths = config.paths(&options.config_path, options.output_override.as_deref());

    let watcher = ChangeWatcher::new(vec![
        WatchTarget::File(options.config_path.clone()),
        WatchTarget::Dir(paths.gigs_dir.clone()),
    ])?;

    println!();
    println!("{}", "Watching for changes...".cyan().bold());
    println!("  Config: {}", options.config_path.display());
    println!("  Gigs:   {}", paths.gigs_dir.display());
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());

    while let Some(changed) = watcher.next_change() {
        let name = changed
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| changed.display().to_string());
        println!();
        println!(
            "[{}] Change detected in: {}",
            chrono::Local::now().format("%H:%M:%S"),
            name
        );
        println!("Regenerating PDFs...");

        match cmd_generate(options) {
            Ok(()) => println!("{} PDFs regenerated successfully", "✓".green().bold()),
            Err(e) => log::error!("Error generating PDFs: {}", e),
        }
    }

    Ok(())
}

fn write_schema_once(config_path: &Path, output: &Path) -> CmdResult {
    let config = Config::load(config_path)?;
    config::write_schema(&config::gig_schema(&config), output)?;
    println!(
        "{} Successfully generated JSON Schema: {}",
        "✓".green().bold(),
        output.display()
    );
    Ok(())
}

fn cmd_generate_schema(config_path: &Path, output: &Path, watch: bool) -> CmdResult {
    write_schema_once(config_path, output)?;

    if !watch {
        let abs = std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf());
        println!("To use in VS Code, add this to your settings.json:");
        println!("\"yaml.schemas\": {{\n  \"{}\": \"*.yaml\"\n}}", abs.display());
        return Ok(());
    }

    let watcher = ChangeWatcher::new(vec![WatchTarget::File(config_path.to_path_buf())])?;
    println!(
        "Watching {} for changes... (press Ctrl+C to stop)",
        config_path.display()
    );

    while let Some(changed) = watcher.next_change() {
        println!();
        println!(
            "Detected change in {}, regenerating schema...",
            changed.display()
        );
        if let Err(e) = write_schema_once(config_path, output) {
            log::error!("Error regenerating schema: {}", e);
        }
    }

    Ok(())
}

fn cmd_validate_config(config_path: &Path, add_missing: bool, sort: bool) -> CmdResult {
    let mut config = Config::load(config_path)?;
    let image_dir = config.paths(config_path, None).image_dir;

    if !image_dir.is_dir() {
        return Err(format!("Image folder does not exist: {}", image_dir.display()).into());
    }

    let report = config::validate(&config, &image_dir);

    println!("{}", "Validation Results".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if !report.valid.is_empty() {
        println!();
        println!("Valid images ({}):", report.valid.len());
        for check in &report.valid {
            println!("  {} {}", "✓".green(), check);
        }
    }

    if !report.missing.is_empty() {
        println!();
        println!("Missing images ({}):", report.missing.len());
        for check in &report.missing {
            println!("  {} {}", "✗".red(), check);
        }
    }

    let mut changed = false;

    if add_missing {
        println!();
        println!("Scanning for images to add...");
        let added = config::add_missing(&mut config, &image_dir)?;
        if added.is_empty() {
            println!("No new images found to add.");
        } else {
            println!();
            println!("Adding {} new songs to config:", added.len());
            for song in &added {
                let images = song
                    .variants()
                    .iter()
                    .map(|(variant, file)| {
                        if variant == DEFAULT_VARIANT {
                            file.clone()
                        } else {
                            format!("{}={}", variant, file)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("  {} {} -> {}", "+".green(), song.nickname, images);
            }
            changed = true;
        }
    }

    if sort {
        println!();
        if config::sort_songs(&mut config) {
            println!("Sorting songs alphabetically by nickname...");
            changed = true;
        } else {
            println!("Songs are already sorted alphabetically.");
        }
    }

    if changed {
        config.save(config_path)?;
        println!();
        println!(
            "{} Successfully updated config file: {}",
            "✓".green().bold(),
            config_path.display()
        );
    }

    if report.is_valid() {
        println!();
        println!("{} All images in config exist!", "✓".green().bold());
    } else if !add_missing {
        println!();
        println!(
            "Use {} to automatically add missing images from the image folder.",
            "--add-missing".cyan()
        );
        return Err(format!("Validation failed: {} missing images", report.missing.len()).into());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} version {}", "gigsheets".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Built from commit: {}", COMMIT);
    println!("Built on: {}", BUILD_DATE);
    println!();
    println!(
        "Repository: {}",
        "https://github.com/stuartleeks/gig-sheets".dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["gigsheets", "generate"]).unwrap();
        let Commands::Generate {
            config,
            spacing,
            dry_run,
            ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(config, PathBuf::from("config.yaml"));
        assert_eq!(spacing, None);
        assert!(!dry_run);
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from([
            "gigsheets", "generate", "-c", "band/config.yaml", "-s", "2.5", "-i", "acoustic",
            "-o", "print", "-a", "-d",
        ])
        .unwrap();
        assert!(cli.command.debug());
        let Commands::Generate {
            spacing,
            image_override,
            output,
            all_songs,
            ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(spacing, Some(2.5));
        assert_eq!(image_override.as_deref(), Some("acoustic"));
        assert_eq!(output, Some(PathBuf::from("print")));
        assert!(all_songs);
    }

    #[test]
    fn test_negative_spacing_parses() {
        let cli = Cli::try_parse_from(["gigsheets", "generate", "-s", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Generate {
                spacing: Some(s),
                ..
            } if s < 0.0
        ));
    }

    #[test]
    fn test_schema_defaults() {
        let cli = Cli::try_parse_from(["gigsheets", "generate-schema", "-w"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::GenerateSchema { ref output, watch: true, .. }
                if output == &PathBuf::from("gig-schema.json")
        ));
    }

    #[test]
    fn test_update_flags() {
        let cli = Cli::try_parse_from(["gigsheets", "update", "--check-only", "-y"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Update {
                check_only: true,
                yes: true
            }
        ));
    }
}
