// ============================================================================
// RasterEdit CLI — headless editing via command-line arguments
// ============================================================================
//
// Usage examples:
//   RasterEdit -i photo.jpg --op select:10,10,80,60 --op effect:sepia
//   RasterEdit -i photo.png -c drag:90,70,10,10 -c crop -c scale:200, -o small.png
//   RasterEdit -i "shots/*.jpg" -c select:0,0,50,50 -c delete --output-dir out/
//   RasterEdit -i photo.png -c select:0,0,40,40 --histogram hist.png
//
// Operations run in the order given, each one to completion, on one session
// per input file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::command::{Command, parse_op};
use crate::error::EditError;
use crate::io::{DEFAULT_EXPORT_NAME, DEFAULT_LOAD_SCALE, LoadOptions, load_image, save_png, save_session};
use crate::ops::histogram::{HISTOGRAM_HEIGHT, HISTOGRAM_WIDTH};
use crate::ops::text::{DEFAULT_FONT_FAMILY, load_font_file, load_system_font};
use crate::ops::transform::{Interpolation, check_surface_size};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// RasterEdit headless image editor.
///
/// Select rectangles, crop, apply colour effects, white out regions, stamp
/// text and rescale, then export the result as PNG.
#[derive(Parser, Debug)]
#[command(
    name = "RasterEdit",
    about = "Rectangular-selection raster editor",
    long_about = "Apply selection-based edits to image files without a GUI.\n\n\
                  Operations (--op, applied in order):\n  \
                  drag:SX,SY,CX,CY   select:X,Y,W,H   down:X,Y   move:X,Y   up\n  \
                  deselect   crop   delete   restore\n  \
                  effect:grayscale|sepia|invert\n  \
                  scale:W,   scale:,H\n  \
                  text:X,Y,SIZE,#RRGGBB,TEXT"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    /// Files that are not images are skipped.
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Operation to apply; repeat for several, they run in order.
    #[arg(short = 'c', long = "op", value_name = "OP")]
    pub ops: Vec<String>,

    /// Output PNG path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (files keep their stem, .png).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Loaded images are shown at 1/N of their native size.
    #[arg(long, default_value_t = DEFAULT_LOAD_SCALE, value_name = "N")]
    pub load_scale: f32,

    /// Resampling filter used for loading and scaling.
    #[arg(long, default_value_t = Interpolation::default(), value_name = "FILTER")]
    pub interpolation: Interpolation,

    /// Font file for text operations. Defaults to a system sans-serif face.
    #[arg(long, value_name = "FONT.ttf")]
    pub font: Option<PathBuf>,

    /// Write the histogram chart of the active selection after all operations.
    #[arg(long, value_name = "FILE")]
    pub histogram: Option<PathBuf>,

    /// Histogram chart size.
    #[arg(long, value_name = "WxH", value_parser = parse_size,
          default_value_t = SizeArg(HISTOGRAM_WIDTH, HISTOGRAM_HEIGHT))]
    pub histogram_size: SizeArg,

    /// Write the surface with the selection outline after all operations.
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// `WIDTHxHEIGHT` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeArg(pub u32, pub u32);

impl std::fmt::Display for SizeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}

fn parse_size(s: &str) -> Result<SizeArg, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{}'", s))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err("histogram size must be non-zero".into());
    }
    check_surface_size(w as u64, h as u64).map_err(|e| e.to_string())?;
    Ok(SizeArg(w, h))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    // Parse every operation up front so a typo fails before any file is touched.
    let commands = match parse_ops(&args.ops) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let font = if let Some(path) = &args.font {
        match load_font_file(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("error: could not load font '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    } else if commands.iter().any(|c| matches!(c, Command::AddText(_))) {
        load_system_font(DEFAULT_FONT_FAMILY)
    } else {
        None
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let options = LoadOptions {
        scale_divisor: args.load_scale,
        interpolation: args.interpolation,
    };
    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();
        let output_path = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            multi,
        );

        let job = Job {
            input: input_path,
            output: &output_path,
            commands: &commands,
            options: &options,
            font: font.clone(),
            multi,
            args: &args,
        };
        match job.run() {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(EditError::UnsupportedFileType(path)) => {
                // Not an image: skipped, not a failure.
                log_warn!("skipping non-image input {}", path.display());
                if args.verbose {
                    println!("  skipped (not an image)");
                }
            }
            Err(e) if e.is_user_input() => {
                // The operation list was rejected; the input itself is fine.
                log_warn!("{}: {}", input_path.display(), e);
                eprintln!("  rejected: {}", e);
                any_failure = true;
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

struct Job<'a> {
    input: &'a Path,
    output: &'a Path,
    commands: &'a [Command],
    options: &'a LoadOptions,
    font: Option<ab_glyph::FontArc>,
    multi: bool,
    args: &'a CliArgs,
}

impl Job<'_> {
    fn run(self) -> Result<(), EditError> {
        // -- Step 1: Load ----------------------------------------------------
        let mut session = load_image(self.input, self.options)?;
        if let Some(font) = self.font {
            session = session.with_font(font);
        }

        // -- Step 2: Apply operations ----------------------------------------
        session.run(self.commands.iter().cloned())?;

        // -- Step 3: Save ----------------------------------------------------
        save_session(&session, self.output)?;

        if let Some(path) = &self.args.histogram {
            let SizeArg(w, h) = self.args.histogram_size;
            save_png(&session.render_histogram(w, h), &sibling_path(path, self.input, self.multi))?;
        }
        if let Some(path) = &self.args.preview {
            save_png(&session.render_preview(), &sibling_path(path, self.input, self.multi))?;
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_ops(ops: &[String]) -> Result<Vec<Command>, EditError> {
    let mut commands = Vec::new();
    for op in ops {
        commands.extend(parse_op(op)?);
    }
    Ok(commands)
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, single-file input)
/// 2. `--output-dir` (input stem + `.png`)
/// 3. Single input: `edited-image.png` in the current directory
/// 4. Batch without a directory: `<stem>_edited.png` next to the input
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    multi: bool,
) -> PathBuf {
    if let Some(out) = output {
        return out.to_path_buf();
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    if let Some(dir) = output_dir {
        return dir.join(format!("{}.png", stem));
    }
    if !multi {
        return PathBuf::from(DEFAULT_EXPORT_NAME);
    }
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}_edited.png", stem))
}

/// In batch mode side outputs get the input stem as a prefix so files don't
/// overwrite each other.
fn sibling_path(requested: &Path, input: &Path, multi: bool) -> PathBuf {
    if !multi && !requested.is_dir() {
        return requested.to_path_buf();
    }
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = requested
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.png".to_string());
    if requested.is_dir() {
        return requested.join(format!("{}_{}", stem, name));
    }
    let parent = requested.parent().unwrap_or(Path::new(""));
    parent.join(format!("{}_{}", stem, name))
}
