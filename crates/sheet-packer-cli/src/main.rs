use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use sheet_packer_core::config::{Background, PackMode, SortOrder};
use sheet_packer_core::{InputImage, Meta, PackedLayout, PackerConfig, pack_images};
use tracing::{error, info};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-packer",
    about = "Pack images into a single sprite sheet or collage",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into a sheet (PNG + metadata)
    Pack(PackArgs),
    /// Layout-only export (no PNG): compute placements and export JSON
    Layout(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Sheet base name (files will be name.png/.json)
    #[arg(short, long, default_value = "sheet", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Grow the canvas on demand (default unless a bin size is given)
    #[arg(long, default_value_t = false, conflicts_with_all = ["max_width", "max_height"], help_heading = "Layout")]
    grow: bool,
    /// Fixed bin width (requires --max-height)
    #[arg(long, requires = "max_height", help_heading = "Layout")]
    max_width: Option<u32>,
    /// Fixed bin height (requires --max-width)
    #[arg(long, requires = "max_width", help_heading = "Layout")]
    max_height: Option<u32>,
    /// Sort order: max_side|none
    #[arg(long, default_value = "max_side", help_heading = "Layout")]
    sort_order: String,

    // Render
    /// Background: transparent | white | black | #rrggbb | #rrggbbaa
    #[arg(long, default_value = "transparent", help_heading = "Render")]
    background: String,

    // Export
    /// Layout-only: compute placements and export metadata (no PNG)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    layout_only: bool,
    /// Metadata format: json-array | json (alias) | json-hash
    #[arg(long, default_value = "json-array", help_heading = "Export")]
    metadata: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => {
            let mut a = args.clone();
            a.layout_only = true;
            run_pack(&a, false)
        }
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig {
        mode: resolve_mode(cli.grow, cli.max_width, cli.max_height),
        sort_order: parse_sort_order(&cli.sort_order)?,
        background: parse_background(&cli.background)?,
    };
    // Config file overrides layout options en bloc
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_packer_config(cfg)?
    } else {
        cfg
    };
    cfg.validate()?;
    Ok(cfg)
}

fn resolve_mode(grow: bool, max_width: Option<u32>, max_height: Option<u32>) -> PackMode {
    match (grow, max_width, max_height) {
        (false, Some(w), Some(h)) => PackMode::fixed(w, h),
        _ => PackMode::Grow,
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    info!(count = inputs.len(), "loaded input images");
    if inputs.is_empty() {
        anyhow::bail!("no decodable images found under {}", cli.input.display());
    }

    let meta = Meta::from_config(&cfg);

    // layout-only branch
    if cli.layout_only {
        let items: Vec<(String, u32, u32)> = inputs
            .iter()
            .map(|inp| (inp.key.clone(), inp.image.width(), inp.image.height()))
            .collect();
        let layout = sheet_packer_core::pack_layout(items, &cfg)?;
        log_stats(&layout);
        if !cli.dry_run {
            write_metadata(cli, &layout, &meta)?;
            if let Some(stats_path) = &cli.export_stats {
                write_stats(stats_path, &layout)?;
            }
        }
        return Ok(());
    }

    let out = pack_images(inputs, cfg)?;
    log_stats(&out.layout);

    if !cli.dry_run {
        let png_path = cli.out_dir.join(format!("{}.png", cli.name));
        out.rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote sheet");

        write_metadata(cli, &out.layout, &meta)?;
        if let Some(stats_path) = &cli.export_stats {
            write_stats(stats_path, &out.layout)?;
        }
    }
    Ok(())
}

fn log_stats(layout: &PackedLayout) {
    let stats = layout.stats();
    info!(
        images = stats.num_placements,
        width = layout.canvas_width,
        height = layout.canvas_height,
        used_area = stats.used_area,
        canvas_area = stats.canvas_area,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
}

fn write_metadata(cli: &PackArgs, layout: &PackedLayout, meta: &Meta) -> anyhow::Result<()> {
    // Accept "json" as an alias of "json-array"
    let json_value = match cli.metadata.as_str() {
        "json-array" | "json" => sheet_packer_core::to_json_array(layout, meta),
        "json-hash" => sheet_packer_core::to_json_hash(layout, meta),
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    let json_path = cli.out_dir.join(format!("{}.json", cli.name));
    let json = serde_json::to_string_pretty(&json_value)?;
    fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
    info!(?json_path, images = layout.placements.len(), "layout written");
    Ok(())
}

fn write_stats(stats_path: &Path, layout: &PackedLayout) -> anyhow::Result<()> {
    let stats = layout.stats();
    let value = serde_json::json!({
        "width": layout.canvas_width,
        "height": layout.canvas_height,
        "images": stats.num_placements,
        "used_area": stats.used_area,
        "canvas_area": stats.canvas_area,
        "occupancy": stats.occupancy,
    });
    fs::write(stats_path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("write {}", stats_path.display()))?;
    info!(?stats_path, "stats exported");
    Ok(())
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

fn parse_background(s: &str) -> anyhow::Result<Background> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown background: {}", s))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // sorted so the catalog order, and with it the layout, is reproducible
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_image(p) {
            Ok(img) => {
                let key = p.to_string_lossy().replace('\\', "/");
                list.push(InputImage { key, image: img });
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    /// "grow" or "fixed"
    mode: Option<String>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    sort_order: Option<String>,
    background: Option<String>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        let (cur_w, cur_h) = match cfg.mode {
            PackMode::Fixed {
                max_width,
                max_height,
            } => (Some(max_width), Some(max_height)),
            PackMode::Grow => (None, None),
        };
        let width = self.max_width.or(cur_w);
        let height = self.max_height.or(cur_h);
        match self.mode.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("grow") => cfg.mode = PackMode::Grow,
            Some("fixed") | None if width.is_some() || height.is_some() => {
                let (Some(w), Some(h)) = (width, height) else {
                    anyhow::bail!("fixed mode needs both max_width and max_height");
                };
                cfg.mode = PackMode::fixed(w, h);
            }
            Some("fixed") => anyhow::bail!("fixed mode needs both max_width and max_height"),
            None => {}
            Some(other) => anyhow::bail!("unknown mode: {}", other),
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.background {
            cfg.background = parse_background(&v)?;
        }
        Ok(cfg)
    }
}
