use crate::layout::{SankeyLayout, SankeyNode};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &SankeyLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">",
    ));

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        width / 2.0,
        theme.title_font_size * 1.8,
        theme.font_family,
        theme.title_font_size,
        theme.text_color,
        escape_xml(&layout.title)
    ));

    // Ribbons go under the node rectangles.
    for link in &layout.links {
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
            ribbon_path(link.start, link.end),
            theme.link_color,
            link.thickness
        ));
    }

    for node in &layout.nodes {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            node.x,
            node.y,
            node.width,
            node.height,
            node.color,
            theme.node_border_color,
            theme.node_border_width
        ));
        svg.push_str(&node_label_svg(node, theme));
    }

    svg.push_str("</svg>");
    svg
}

/// Horizontal cubic ribbon between two anchor midpoints, control points
/// at the horizontal midpoint. Stroked at the link thickness.
fn ribbon_path(start: (f32, f32), end: (f32, f32)) -> String {
    let mid_x = (start.0 + end.0) / 2.0;
    format!(
        "M {:.2} {:.2} C {mid_x:.2} {:.2}, {mid_x:.2} {:.2}, {:.2} {:.2}",
        start.0, start.1, start.1, end.1, end.0, end.1
    )
}

fn node_label_svg(node: &SankeyNode, theme: &Theme) -> String {
    let gap = 6.0;
    let (x, anchor) = if node.label_on_left {
        (node.x - gap, "end")
    } else {
        (node.x + node.width + gap, "start")
    };
    // Vertically centered on the node, nudged down to the baseline.
    let y = node.y + node.height / 2.0 + theme.font_size * 0.35;
    format!(
        "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(&node.label)
    )
}

pub fn write_output_svg(svg: &str, output: &Path) -> Result<()> {
    std::fs::write(output, svg)?;
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, fallback_size: (f32, f32)) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(fallback_size.0, fallback_size.1)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::workflow::build_diagram;

    fn workflow_svg() -> String {
        let diagram = build_diagram();
        let theme = Theme::fastrecon();
        let layout = compute_layout(&diagram, &theme, &LayoutConfig::default());
        render_svg(&layout, &theme)
    }

    #[test]
    fn svg_contains_title_and_every_label() {
        let svg = workflow_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("FastRecon Workflow"));
        for label in crate::workflow::LABELS {
            assert!(svg.contains(label), "missing label {label}");
        }
    }

    #[test]
    fn svg_draws_one_rect_per_node_plus_background() {
        let svg = workflow_svg();
        let rects = svg.matches("<rect").count();
        assert_eq!(rects, 29 + 1);
        let ribbons = svg.matches("<path").count();
        assert_eq!(ribbons, 81);
    }

    #[test]
    fn ribbons_use_the_translucent_link_color() {
        let svg = workflow_svg();
        assert_eq!(
            svg.matches("stroke=\"rgba(31, 184, 205, 0.2)\"").count(),
            81
        );
    }

    #[test]
    fn escape_xml_handles_markup_characters() {
        assert_eq!(escape_xml("a<b&c>\"d'"), "a&lt;b&amp;c&gt;&quot;d&apos;");
    }

    #[test]
    fn ribbon_path_is_a_single_cubic() {
        let d = ribbon_path((0.0, 10.0), (100.0, 30.0));
        assert!(d.starts_with("M 0.00 10.00 C 50.00 10.00, 50.00 30.00, 100.00 30.00"));
    }
}
