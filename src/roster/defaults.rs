/// Default values for optional roster fields
///
/// Every fallback used while parsing roster documents lives in this one
/// table so the parsers never carry inline defaults of their own.
pub struct FieldDefaults {
    pub id: &'static str,
    pub file_name: &'static str,
    pub manufacturer: &'static str,
    pub road_name: &'static str,
    pub model: &'static str,
    pub dcc_address: &'static str,
    pub decoder_label: &'static str,
    pub function_label: &'static str,
    /// Road name shown on a roster card when the manifest has none
    pub card_road_name: &'static str,
}

pub const FIELD_DEFAULTS: FieldDefaults = FieldDefaults {
    id: "",
    file_name: "",
    manufacturer: "Unknown Mfg",
    road_name: "",
    model: "",
    dcc_address: "Unknown",
    decoder_label: "Unknown Decoder",
    function_label: "Unlabeled",
    card_road_name: "Unknown Road",
};

/// Read an attribute, falling back when it is absent or empty
pub fn attr_or(node: roxmltree::Node<'_, '_>, name: &str, default: &str) -> String {
    match node.attribute(name) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// Concatenated text of a node and all of its descendants
pub fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Parse options shared by every roster document
///
/// JMRI files sometimes carry a DOCTYPE, which roxmltree rejects by default.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
