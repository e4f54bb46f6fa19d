//! Icon generation utility for MouseCross.
//!
//! Renders the app icon and packages it per platform:
//! - flat PNGs at every size
//! - ICO for Windows
//! - ICNS for macOS
//!
//! It also draws the DMG window background used by the macOS installer.

use clap::{Parser, Subcommand, ValueEnum};
use icon_core::ico_export::ICO_SIZES;
use icon_core::packager::all_packagers;
use icon_core::pipeline::{self, ArtifactStatus, ExportEvent, ExportPlan, ExportReport};
use icon_core::{
    dmg_background, icns_export, DmgBackground, GlyphStyle, PackagerChoice, SourceImage,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "icon-gen")]
#[command(about = "Generate platform icon bundles for MouseCross")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every icon artifact (PNG, ICO, ICNS) into the output directory
    Generate {
        /// SVG or raster source; defaults to the built-in crosshair
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = pipeline::DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Look of the built-in crosshair (ignored with --source)
        #[arg(long, value_enum, default_value_t = Style::Canonical)]
        style: Style,

        /// How to assemble the ICNS container
        #[arg(long, value_enum, default_value_t = Packager::Auto)]
        packager: Packager,

        /// Do not write flat PNG files
        #[arg(long)]
        no_png: bool,

        /// Do not write the ICO file
        #[arg(long)]
        no_ico: bool,

        /// Do not write the ICNS file
        #[arg(long)]
        no_icns: bool,
    },
    /// Render one size to a PNG file
    Render {
        /// Edge length in pixels
        size: u32,
        /// Output PNG file
        output: PathBuf,
        /// SVG or raster source; defaults to the built-in crosshair
        #[arg(short, long)]
        source: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Style::Canonical)]
        style: Style,
    },
    /// Convert an image to Windows ICO format
    Ico {
        /// Input SVG or raster file
        input: PathBuf,
        /// Output ICO file
        output: PathBuf,
        /// Frame sizes (comma-separated, at most 256)
        #[arg(long, value_delimiter = ',', default_values_t = ICO_SIZES.to_vec())]
        sizes: Vec<u32>,
    },
    /// Convert an image to macOS ICNS format
    Icns {
        /// Input SVG or raster file
        input: PathBuf,
        /// Output ICNS file
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Packager::Auto)]
        packager: Packager,
    },
    /// Report which ICNS packagers work on this machine
    Doctor,
    /// Draw the DMG window background and its @2x variant
    DmgBackground {
        /// Output directory
        #[arg(short, long, default_value = dmg_background::DEFAULT_OUT_DIR)]
        out_dir: PathBuf,

        /// Line drawn near the bottom of the window
        #[arg(long, default_value = dmg_background::DEFAULT_INSTRUCTION)]
        instruction: String,

        /// Line drawn at the top of the window
        #[arg(long, default_value = dmg_background::DEFAULT_BRAND)]
        brand: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Style {
    /// Transparent canvas, dark disc, red crosshair
    Canonical,
    /// Opaque rounded square with corner ticks
    Framed,
}

impl Style {
    fn glyph(self) -> GlyphStyle {
        match self {
            Style::Canonical => GlyphStyle::canonical(),
            Style::Framed => GlyphStyle::framed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Packager {
    Auto,
    Iconutil,
    Native,
    None,
}

impl From<Packager> for PackagerChoice {
    fn from(packager: Packager) -> Self {
        match packager {
            Packager::Auto => PackagerChoice::Auto,
            Packager::Iconutil => PackagerChoice::Iconutil,
            Packager::Native => PackagerChoice::Native,
            Packager::None => PackagerChoice::None,
        }
    }
}

/// Whether every requested artifact was produced.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Complete,
    Partial,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            source,
            out_dir,
            style,
            packager,
            no_png,
            no_ico,
            no_icns,
        } => {
            let plan = ExportPlan {
                pngs: !no_png,
                ico: !no_ico,
                icns: !no_icns,
                ..ExportPlan::new(out_dir)
            };
            generate(source.as_deref(), style, packager, &plan)
        }
        Commands::Render {
            size,
            output,
            source,
            style,
        } => render_one(source.as_deref(), style, size, &output),
        Commands::Ico {
            input,
            output,
            sizes,
        } => convert_to_ico(&input, &output, &sizes),
        Commands::Icns {
            input,
            output,
            packager,
        } => convert_to_icns(&input, &output, packager),
        Commands::Doctor => doctor(),
        Commands::DmgBackground {
            out_dir,
            instruction,
            brand,
        } => draw_dmg_background(&out_dir, DmgBackground { instruction, brand }),
    };

    match result {
        Ok(Outcome::Complete) => {}
        Ok(Outcome::Partial) => process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_source(path: Option<&Path>, style: Style) -> Result<SourceImage, Box<dyn Error>> {
    match path {
        Some(path) => Ok(SourceImage::load(path)?),
        None => Ok(SourceImage::Glyph(style.glyph())),
    }
}

fn print_event(event: ExportEvent) {
    match event {
        ExportEvent::Rendered { size, index, total } => {
            println!("  [{}/{}] rendered {}x{}", index + 1, total, size, size);
        }
        ExportEvent::RenderFailed { size, reason } => {
            println!("  [--] {}x{} FAILED: {}", size, size, reason);
        }
        ExportEvent::Wrote { path } => println!("Created {}", path.display()),
        ExportEvent::Incomplete { path, missing } => {
            println!("Created {} (missing sizes: {:?})", path.display(), missing);
        }
        ExportEvent::NotProduced { artifact, reason } => {
            println!("Not produced {}: {}", artifact, reason);
        }
        ExportEvent::Skipped { artifact } => println!("Skipped {}", artifact),
    }
}

fn outcome_of(complete: bool) -> Outcome {
    if complete {
        Outcome::Complete
    } else {
        Outcome::Partial
    }
}

fn print_summary(report: &ExportReport) {
    if report.is_complete() {
        println!("\nIcon generation complete!");
        return;
    }

    let problems = report.render_failures.len()
        + report
            .artifacts
            .iter()
            .filter(|a| !a.status.is_success())
            .count();
    eprintln!("\nIcon generation finished with {} problem(s):", problems);
    for failure in &report.render_failures {
        eprintln!("  - {}x{}: {}", failure.size, failure.size, failure.reason);
    }
    for artifact in report.artifacts.iter().filter(|a| !a.status.is_success()) {
        eprintln!("  - {}: {}", artifact.name, describe(&artifact.status));
    }
}

fn describe(status: &ArtifactStatus) -> String {
    match status {
        ArtifactStatus::Produced { path } => format!("written to {}", path.display()),
        ArtifactStatus::Incomplete { missing, .. } => format!("missing sizes {:?}", missing),
        ArtifactStatus::NotProduced { reason } => reason.clone(),
        ArtifactStatus::Skipped => "skipped".to_string(),
    }
}

fn generate(
    source: Option<&Path>,
    style: Style,
    packager: Packager,
    plan: &ExportPlan,
) -> Result<Outcome, Box<dyn Error>> {
    let source = load_source(source, style)?;
    let packager = PackagerChoice::from(packager).select();
    log::debug!("export plan: {:?}", plan);

    println!(
        "Generating icons from {} source into {} (ICNS via {})...",
        source.kind(),
        plan.out_dir.display(),
        packager.name()
    );

    let report = pipeline::export(&source, plan, packager.as_ref(), print_event)?;
    print_summary(&report);
    Ok(outcome_of(report.is_complete()))
}

fn render_one(
    source: Option<&Path>,
    style: Style,
    size: u32,
    output: &Path,
) -> Result<Outcome, Box<dyn Error>> {
    let source = load_source(source, style)?;
    let image = source.render(size)?;
    image.save_with_format(output, image::ImageFormat::Png)?;
    println!("Created {}", output.display());
    Ok(Outcome::Complete)
}

/// Convert an existing image to ICO with multiple sizes.
fn convert_to_ico(input: &Path, output: &Path, sizes: &[u32]) -> Result<Outcome, Box<dyn Error>> {
    let source = SourceImage::load(input)?;
    let (bundle, failures) = pipeline::render_bundle(&source, sizes, print_event);

    let status = pipeline::export_ico(&bundle, sizes, output);
    let complete = failures.is_empty() && status.is_success();
    match status {
        ArtifactStatus::NotProduced { reason } => return Err(reason.into()),
        other => println!("{}: {}", output.display(), describe(&other)),
    }
    Ok(outcome_of(complete))
}

/// Convert an existing image to ICNS through the selected packager.
fn convert_to_icns(
    input: &Path,
    output: &Path,
    packager: Packager,
) -> Result<Outcome, Box<dyn Error>> {
    let source = SourceImage::load(input)?;
    let (bundle, failures) =
        pipeline::render_bundle(&source, &icns_export::required_sizes(), print_event);

    let packager = PackagerChoice::from(packager).select();
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| pipeline::BASE_NAME.to_string());

    let status = pipeline::export_icns(&bundle, &stem, packager.as_ref(), output);
    let complete = failures.is_empty() && status.is_success();
    println!("{}: {}", output.display(), describe(&status));
    Ok(outcome_of(complete))
}

fn doctor() -> Result<Outcome, Box<dyn Error>> {
    println!("ICNS packagers:");
    for packager in all_packagers() {
        let state = if packager.is_available() {
            "available"
        } else {
            "not available"
        };
        println!("  {:<10} {}", packager.name(), state);
    }
    println!("\n'auto' uses: {}", PackagerChoice::Auto.select().name());
    Ok(Outcome::Complete)
}

fn draw_dmg_background(
    out_dir: &Path,
    background: DmgBackground,
) -> Result<Outcome, Box<dyn Error>> {
    let files = background.write(out_dir)?;
    println!("Created DMG background: {}", files.standard.display());
    println!("Created high-DPI DMG background: {}", files.hidpi.display());
    Ok(Outcome::Complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["icon-gen", "generate"]).unwrap();
        match cli.command {
            Commands::Generate {
                source,
                out_dir,
                style,
                packager,
                no_png,
                no_ico,
                no_icns,
            } => {
                assert!(source.is_none());
                assert_eq!(out_dir, PathBuf::from("resources/icons"));
                assert_eq!(style, Style::Canonical);
                assert_eq!(packager, Packager::Auto);
                assert!(!no_png && !no_ico && !no_icns);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn ico_sizes_parse_from_list() {
        let cli = Cli::try_parse_from(["icon-gen", "ico", "in.png", "out.ico", "--sizes", "16,32"])
            .unwrap();
        match cli.command {
            Commands::Ico { sizes, .. } => assert_eq!(sizes, vec![16, 32]),
            _ => panic!("expected ico"),
        }
    }

    #[test]
    fn ico_sizes_default_to_standard_set() {
        let cli = Cli::try_parse_from(["icon-gen", "ico", "in.png", "out.ico"]).unwrap();
        match cli.command {
            Commands::Ico { sizes, .. } => assert_eq!(sizes, ICO_SIZES.to_vec()),
            _ => panic!("expected ico"),
        }
    }

    #[test]
    fn packager_flag_maps_to_choice() {
        assert_eq!(PackagerChoice::from(Packager::None), PackagerChoice::None);
        assert_eq!(PackagerChoice::from(Packager::Native), PackagerChoice::Native);
    }

    #[test]
    fn style_maps_to_glyph() {
        assert_eq!(Style::Framed.glyph(), GlyphStyle::framed());
        assert_eq!(Style::Canonical.glyph(), GlyphStyle::canonical());
    }

    #[test]
    fn render_writes_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("icon.png");
        let outcome = render_one(None, Style::Canonical, 48, &output).unwrap();
        assert_eq!(outcome, Outcome::Complete);
        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (48, 48));
    }

    #[test]
    fn dmg_background_defaults() {
        let cli = Cli::try_parse_from(["icon-gen", "dmg-background"]).unwrap();
        match cli.command {
            Commands::DmgBackground {
                out_dir,
                instruction,
                brand,
            } => {
                assert_eq!(out_dir, PathBuf::from("deployment/macos"));
                assert_eq!(instruction, "Drag MouseCross to the Applications folder");
                assert_eq!(brand, "MouseCross - Visual Mouse Locator");
            }
            _ => panic!("expected dmg-background"),
        }
    }

    #[test]
    fn dmg_background_writes_both_resolutions() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = draw_dmg_background(dir.path(), DmgBackground::default()).unwrap();
        assert_eq!(outcome, Outcome::Complete);

        let standard = image::open(dir.path().join("dmg_background.png")).unwrap();
        assert_eq!((standard.width(), standard.height()), (640, 400));
        let hidpi = image::open(dir.path().join("dmg_background@2x.png")).unwrap();
        assert_eq!((hidpi.width(), hidpi.height()), (1280, 800));
    }
}
