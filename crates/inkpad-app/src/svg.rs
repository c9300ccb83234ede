//! SVG rendering backend.

use inkpad_core::Renderer;
use kurbo::{BezPath, Cap, Join, Size, Stroke};

/// Renderer that builds an SVG document from the last frame.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    size: Size,
    elements: Vec<String>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `<path>` elements in the current frame.
    pub fn path_count(&self) -> usize {
        self.elements.len()
    }

    /// The current frame as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.size.width,
            h = self.size.height
        );
        svg.push('\n');
        for element in &self.elements {
            svg.push_str("  ");
            svg.push_str(element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl Renderer for SvgRenderer {
    fn clear(&mut self, size: Size) {
        self.size = size;
        self.elements.clear();
    }

    fn stroke_path(&mut self, path: &BezPath, style: &Stroke, color: &str) {
        self.elements.push(format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="{}" stroke-linejoin="{}"/>"#,
            path.to_svg(),
            escape_attr(color),
            style.width,
            cap_name(style.start_cap),
            join_name(style.join)
        ));
    }
}

fn cap_name(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Square => "square",
        Cap::Round => "round",
    }
}

fn join_name(join: Join) -> &'static str {
    match join {
        Join::Bevel => "bevel",
        Join::Miter => "miter",
        Join::Round => "round",
    }
}

/// Colors come from remote peers verbatim.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
