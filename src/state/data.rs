/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the roster parser, the grouping engine and the UI layer.

/// Name of the implicit catch-all group
pub const OTHER_GROUP: &str = "Other";

/// One key/value metadata pair attached to a roster entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipFlag {
    pub key: String,
    pub value: String,
}

impl MembershipFlag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A locomotive as listed in roster.xml (used for grouping and cards)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocomotiveSummary {
    /// Roster-scoped unique id (e.g., "UP 844")
    pub id: String,
    /// Detail document for this locomotive (e.g., "UP_844.xml")
    pub file_name: String,
    pub road_name: String,
    pub model: String,
    /// Metadata pairs in document order
    pub membership_flags: Vec<MembershipFlag>,
}

/// The parsed roster manifest: declared groups plus every locomotive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterManifest {
    /// Group names in declaration order
    pub group_names: Vec<String>,
    /// Locomotives in manifest order
    pub locomotives: Vec<LocomotiveSummary>,
}

/// One entry of a decoder's function map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLabel {
    /// Numeric value of the `num` attribute (0 when unparseable)
    pub number: i64,
    /// The `num` attribute as written in the document
    pub raw_number: String,
    pub label: String,
}

/// Full details for one locomotive, parsed from its own XML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocomotiveDetail {
    pub id: String,
    pub manufacturer: String,
    pub road_name: String,
    pub model: String,
    /// DCC address number or "Unknown"
    pub dcc_address: String,
    /// Display label derived from the decoder model/family
    pub decoder_label: String,
    /// Sorted ascending by number
    pub functions: Vec<FunctionLabel>,
}

/// A named bucket of roster entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    /// Members in manifest order
    pub members: Vec<LocomotiveSummary>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }
}

/// A stored locomotive photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub locomotive_id: String,
    /// Image file bytes exactly as picked by the user
    pub image_blob: Vec<u8>,
}
