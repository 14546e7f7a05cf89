/// Locomotive detail document parsing
///
/// Turns one per-locomotive XML file into a flat `LocomotiveDetail`.
/// This is a pure transform over the provided text.

use roxmltree::{Document, Node};

use super::defaults::{attr_or, parsing_options, text_content, FIELD_DEFAULTS};
use crate::error::{Result, RosterError};
use crate::state::data::{FunctionLabel, LocomotiveDetail};

/// Parse a locomotive detail document
///
/// # Arguments
/// * `file_name` - Name of the document, used in error messages
/// * `text` - Raw XML text
///
/// # Returns
/// * `Err(MalformedDocument)` if there is no `locomotive` element
pub fn parse_detail(file_name: &str, text: &str) -> Result<LocomotiveDetail> {
    let doc = Document::parse_with_options(text, parsing_options())
        .map_err(|e| RosterError::malformed(file_name, e.to_string()))?;

    let loco = find_first(&doc, "locomotive")
        .ok_or_else(|| RosterError::malformed(file_name, "no locomotive element"))?;

    let dcc_address = find_first(&doc, "dcclocoaddress")
        .map(|node| attr_or(node, "number", FIELD_DEFAULTS.dcc_address))
        .unwrap_or_else(|| FIELD_DEFAULTS.dcc_address.to_string());

    let decoder_label = find_first(&doc, "decoder")
        .map(|node| {
            let model = node.attribute("model").unwrap_or("");
            let family = node.attribute("family").unwrap_or("");
            decoder_label(model, family)
        })
        .unwrap_or_else(|| FIELD_DEFAULTS.decoder_label.to_string());

    Ok(LocomotiveDetail {
        id: attr_or(loco, "id", FIELD_DEFAULTS.id),
        manufacturer: attr_or(loco, "mfg", FIELD_DEFAULTS.manufacturer),
        road_name: attr_or(loco, "roadName", FIELD_DEFAULTS.road_name),
        model: attr_or(loco, "model", FIELD_DEFAULTS.model),
        dcc_address,
        decoder_label,
        functions: function_labels(&doc),
    })
}

/// Resolve the display label for a decoder
///
/// Order matters: the generic "Diesel"/"Steam" models show their family,
/// then Digitrax ("D...") and ESU ("Lok...") models get a vendor prefix.
pub fn decoder_label(model: &str, family: &str) -> String {
    if model == "Diesel" || model == "Steam" {
        family.to_string()
    } else if model.starts_with('D') {
        format!("Digitrax {}", model)
    } else if model.starts_with("Lok") {
        format!("ESU {}", model)
    } else {
        model.to_string()
    }
}

/// Collect every function label, sorted ascending by number
fn function_labels(doc: &Document<'_>) -> Vec<FunctionLabel> {
    let mut functions: Vec<FunctionLabel> = doc
        .descendants()
        .filter(|n| n.has_tag_name("functionlabel"))
        .map(|node| {
            let raw_number = node.attribute("num").unwrap_or("").to_string();
            let text = text_content(node);
            let label = if text.trim().is_empty() {
                FIELD_DEFAULTS.function_label.to_string()
            } else {
                text.trim().to_string()
            };

            FunctionLabel {
                number: parse_leading_int(&raw_number).unwrap_or(0),
                raw_number,
                label,
            }
        })
        .collect();

    // Stable, so duplicate numbers keep document order
    functions.sort_by_key(|f| f.number);
    functions
}

/// First element with the given tag name anywhere in the document
fn find_first<'a, 'input>(doc: &'a Document<'input>, tag: &str) -> Option<Node<'a, 'input>> {
    doc.descendants().find(|n| n.has_tag_name(tag))
}

/// Parse an integer prefix the way a lenient number field reads ("12a" -> 12)
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl LocomotiveDetail {
    /// "<mfg> - <road> <model>" line shown under the id
    pub fn headline(&self) -> String {
        format!("{} - {} {}", self.manufacturer, self.road_name, self.model)
            .trim_end()
            .to_string()
    }

    /// One display line per function, or a single placeholder line
    pub fn function_lines(&self) -> Vec<String> {
        if self.functions.is_empty() {
            return vec!["No functions defined.".to_string()];
        }

        self.functions
            .iter()
            .map(|f| format!("F{} {}", f.raw_number, f.label))
            .collect()
    }
}
