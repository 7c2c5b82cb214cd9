use crate::config::load_config;
use crate::layout::compute_layout;
use crate::render::{render_svg, write_output_svg};
use crate::workflow::build_diagram;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

pub const PNG_FILENAME: &str = "chart.png";
pub const SVG_FILENAME: &str = "chart.svg";

#[derive(Parser, Debug)]
#[command(
    name = "reconflow",
    version,
    about = "Renders the FastRecon workflow sankey chart (chart.svg and/or chart.png, per --format)"
)]
pub struct Args {
    /// Directory the chart files are written to
    #[arg(short = 'd', long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,

    /// Which chart files to write
    #[arg(short = 'f', long = "format", value_enum, default_value = "both")]
    pub format: OutputFormat,

    /// Config JSON file (theme/layout/render overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Both,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    generate(&args)
}

/// The whole pipeline: build the literal diagram, validate it, lay it
/// out, render SVG, and write the requested files. Outputs are
/// overwritten unconditionally.
pub fn generate(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let diagram = build_diagram();
    diagram.validate()?;

    let layout = compute_layout(&diagram, &config.theme, &config.layout);
    let svg = render_svg(&layout, &config.theme);

    if matches!(args.format, OutputFormat::Svg | OutputFormat::Both) {
        let path = args.out_dir.join(SVG_FILENAME);
        write_output_svg(&svg, &path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if matches!(args.format, OutputFormat::Png | OutputFormat::Both) {
        let path = args.out_dir.join(PNG_FILENAME);
        write_png(&svg, &path, (config.render.width, config.render.height))
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, path: &Path, fallback_size: (f32, f32)) -> Result<()> {
    crate::render::write_output_png(svg, path, fallback_size)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _path: &Path, _fallback_size: (f32, f32)) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the 'png' feature; rerun with --format svg"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_write_both_formats_to_cwd() {
        let args = Args::parse_from(["reconflow"]);
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.format, OutputFormat::Both);
        assert!(args.config.is_none());
    }

    #[test]
    fn format_flag_parses_value_enum() {
        let args = Args::parse_from(["reconflow", "--format", "svg"]);
        assert_eq!(args.format, OutputFormat::Svg);
    }

    #[test]
    fn about_text_points_at_the_format_flag() {
        use clap::CommandFactory;
        let about = Args::command().get_about().map(ToString::to_string);
        let about = about.unwrap_or_default();
        assert!(about.contains("--format"), "about: {about}");
    }
}
