//! mdpress command-line interface.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use mdpress::{ExportEvent, ExportObserver, Mdpress, PageGeometry};

#[derive(Parser, Debug)]
#[command(
    name = "mdpress",
    version,
    about = "Convert markdown to a paginated PDF",
    long_about = "Converts a markdown file (or stdin) into a styled, multi-page PDF. \
                  Sections are bounded by headings and never split a heading from \
                  the content that follows it."
)]
struct Args {
    /// Input markdown file, or '-' for stdin
    input: String,

    /// Output PDF path (defaults to the input name with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page size
    #[arg(long, value_enum, default_value_t = PageSize::A4)]
    page_size: PageSize,

    /// Page margin in millimeters
    #[arg(long, default_value_t = 10.0)]
    margin: f32,

    /// Gap between sections in millimeters
    #[arg(long, default_value_t = 5.0)]
    gap: f32,

    /// Rasterization scale (2.0 doubles pixel density)
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// Layout width in CSS pixels
    #[arg(long, default_value_t = 794)]
    layout_width: u32,

    /// Treat single newlines as paragraph text instead of hard breaks
    #[arg(long)]
    no_breaks: bool,

    /// Skip HTML sanitization (trusted input only)
    #[arg(long)]
    no_sanitize: bool,

    /// Document title (defaults to the output filename stem)
    #[arg(long)]
    title: Option<String>,

    /// Document author
    #[arg(long)]
    author: Option<String>,

    /// Print the layout report as JSON instead of writing a PDF
    #[arg(long)]
    layout_json: bool,

    /// Suppress the progress bar and status output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PageSize {
    A4,
    Letter,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = read_input(&args.input)?;

    let (dir, filename) = output_target(args);
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| filename.trim_end_matches(".pdf").to_string());

    let mut builder = Mdpress::new()
        .with_geometry(page_geometry(args))
        .with_scale(args.scale)
        .with_layout_width(args.layout_width)
        .with_hard_breaks(!args.no_breaks)
        .with_title(title);
    if args.no_sanitize {
        builder = builder.without_sanitizer();
    }
    if let Some(author) = &args.author {
        builder = builder.with_author(author.clone());
    }

    let mut pipeline = builder.build()?;

    if args.layout_json {
        let doc = pipeline.run(&markdown)?;
        println!("{}", doc.to_layout_json(true)?);
        return Ok(());
    }

    let mut observer = ProgressObserver::new(args.quiet);
    let receipt = pipeline.export_to_dir_observed(&markdown, &dir, &filename, &mut observer)?;
    observer.finish();

    if !args.quiet {
        println!(
            "{} {} ({} pages, {} bytes)",
            "created".green().bold(),
            dir.join(&receipt.filename).display(),
            receipt.page_count,
            receipt.bytes_written
        );
    }
    Ok(())
}

fn read_input(input: &str) -> Result<String, Box<dyn std::error::Error>> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

/// Split the output argument into (directory, filename). Without an
/// explicit output, the PDF lands next to the input file.
fn output_target(args: &Args) -> (PathBuf, String) {
    if let Some(output) = &args.output {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        return (dir, name);
    }

    if args.input == "-" {
        return (PathBuf::from("."), "document".to_string());
    }
    let input = Path::new(&args.input);
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = input
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    (dir, name)
}

fn page_geometry(args: &Args) -> PageGeometry {
    let base = match args.page_size {
        PageSize::A4 => PageGeometry::a4(),
        PageSize::Letter => PageGeometry::letter(),
    };
    base.with_margin(args.margin).with_gap(args.gap)
}

/// Drives the progress bar from pipeline events.
struct ProgressObserver {
    bar: Option<ProgressBar>,
    quiet: bool,
}

impl ProgressObserver {
    fn new(quiet: bool) -> Self {
        Self { bar: None, quiet }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl ExportObserver for ProgressObserver {
    fn on_event(&mut self, event: &ExportEvent) {
        if self.quiet {
            return;
        }
        match event {
            ExportEvent::Sectionized { section_count } => {
                let bar = ProgressBar::new(*section_count as u64);
                bar.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} rasterizing [{bar:30.cyan/blue}] {pos}/{len}",
                    )
                    .expect("static template")
                    .progress_chars("=>-"),
                );
                self.bar = Some(bar);
            }
            ExportEvent::SectionRasterized { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ExportEvent::Composed { page_count } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("{} pages", page_count));
                }
            }
            _ => {}
        }
    }
}
