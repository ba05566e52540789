//! Clickable-element extraction from `uiautomator dump` XML.

use regex::Regex;
use std::sync::LazyLock;

/// Returned when a dump has no clickable element with text or a description.
pub const NO_CLICKABLE_ELEMENTS: &str = "No clickable elements found with text or description";

static BOUNDS_POINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+),(\d+)\]").expect("valid bounds regex"));

/// A clickable node that carries text or a content description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickableElement {
    pub text: Option<String>,
    pub content_desc: Option<String>,
    /// Raw `bounds` attribute, e.g. "[0,0][100,200]".
    pub bounds: String,
    pub center: Option<(u64, u64)>,
}

impl ClickableElement {
    fn describe(&self) -> String {
        let mut info = String::from("Clickable element:");
        if let Some(ref text) = self.text {
            info.push_str(&format!("\n  Text: {text}"));
        }
        if let Some(ref desc) = self.content_desc {
            info.push_str(&format!("\n  Description: {desc}"));
        }
        info.push_str(&format!("\n  Bounds: {}", self.bounds));
        if let Some((x, y)) = self.center {
            info.push_str(&format!("\n  Center: ({x}, {y})"));
        }
        info
    }
}

/// Midpoint of a `[x1,y1][x2,y2]` bounds string, floor-divided.
///
/// `None` unless the string holds exactly two coordinate pairs.
pub fn bounds_center(bounds: &str) -> Option<(u64, u64)> {
    let points: Vec<(u64, u64)> = BOUNDS_POINT
        .captures_iter(bounds)
        .map(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
        .collect::<Option<_>>()?;

    match points.as_slice() {
        [(x1, y1), (x2, y2)] => Some((midpoint(*x1, *x2), midpoint(*y1, *y2))),
        _ => None,
    }
}

/// `floor((a + b) / 2)` without overflowing.
fn midpoint(a: u64, b: u64) -> u64 {
    a / 2 + b / 2 + (a % 2 + b % 2) / 2
}

/// Every `node` with `clickable="true"` and non-empty text or content-desc.
pub fn parse_clickable_elements(xml: &str) -> Result<Vec<ClickableElement>, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;

    let elements = doc
        .root_element()
        .descendants()
        .skip(1)
        .filter(|n| n.has_tag_name("node") && n.attribute("clickable") == Some("true"))
        .filter_map(|n| {
            let text = n.attribute("text").filter(|t| !t.is_empty());
            let content_desc = n.attribute("content-desc").filter(|d| !d.is_empty());
            if text.is_none() && content_desc.is_none() {
                return None;
            }
            let bounds = n.attribute("bounds").unwrap_or_default().to_string();
            Some(ClickableElement {
                text: text.map(str::to_string),
                content_desc: content_desc.map(str::to_string),
                center: bounds_center(&bounds),
                bounds,
            })
        })
        .collect();

    Ok(elements)
}

/// Render elements as blank-line-separated blocks, or the sentinel when empty.
pub fn format_ui_layout(elements: &[ClickableElement]) -> String {
    if elements.is_empty() {
        return NO_CLICKABLE_ELEMENTS.to_string();
    }
    elements
        .iter()
        .map(ClickableElement::describe)
        .collect::<Vec<_>>()
        .join("\n\n")
}
