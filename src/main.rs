use clap::{Parser, Subcommand};
use keyword_gallery::{config, generate, output, process, scan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "keyword-gallery")]
#[command(about = "Static photo gallery organised by embedded keywords")]
#[command(long_about = "\
Static photo gallery organised by embedded keywords

Reads the IPTC keywords, location and capture date of every photo in a
directory and writes a static site: a tag cloud, one thumbnail page per
keyword, and one page per photo.

Input structure:

  images/
  ├── config.toml          # Site config (optional)
  ├── IMG_0001.jpg
  ├── IMG_0002.JPG
  └── beach.png

Metadata is read with exiftool by default. Set extractor.backend = \"native\"
in config.toml to use the built-in IPTC reader instead.

Run 'keyword-gallery gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing the photos
    #[arg(long, default_value = "images", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "output", global = true)]
    output: PathBuf,

    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → process → generate (default)
    Build {
        /// Disable the thumbnail cache and re-encode every thumbnail
        #[arg(long)]
        no_cache: bool,
    },
    /// List photos, keywords and tags without writing anything
    Scan {
        /// Print the manifest as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Validate config and metadata without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "keyword_gallery=debug".to_string()
        } else {
            "keyword_gallery=warn".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Build { no_cache: false }) {
        Command::Build { no_cache } => build(&cli.source, &cli.output, !no_cache)?,
        Command::Scan { json } => {
            let manifest = scan::scan(&cli.source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_scan_output(&manifest);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest);
            let unreadable = process::check_images(&manifest, &cli.source);
            for image in &unreadable {
                eprintln!("{}: {}", image.filename, image.error);
            }
            if !unreadable.is_empty() {
                return Err(format!("{} photo(s) cannot be decoded", unreadable.len()).into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

fn build(
    source: &Path,
    output_dir: &Path,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Stage 1: Scanning {}", source.display());
    let manifest = scan::scan(source)?;
    output::print_scan_output(&manifest);

    println!("==> Stage 2: Processing images");
    let summary = process::process(&manifest, source, output_dir, use_cache, |event| {
        for line in output::format_process_event(event) {
            println!("{}", line);
        }
    })?;
    println!("Cache: {}", summary.cache);

    println!("==> Stage 3: Generating HTML → {}", output_dir.display());
    let generated = generate::generate(&manifest, output_dir)?;
    output::print_generate_output(&generated);

    println!("==> Build complete: {}", output_dir.display());
    Ok(())
}
