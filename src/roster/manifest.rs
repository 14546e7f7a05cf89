/// Roster manifest parsing and the grouping engine
///
/// roster.xml declares the group taxonomy (`rosterGroup/group`) and lists
/// every locomotive with its `keyvaluepair` metadata. A pair whose key is
/// `RosterGroup:<name>` and whose value is "yes" puts the locomotive in
/// that group. Locomotives in no declared group land in "Other".

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use super::defaults::{attr_or, parsing_options, text_content, FIELD_DEFAULTS};
use crate::error::RosterError;
use crate::state::data::{Group, LocomotiveSummary, MembershipFlag, RosterManifest, OTHER_GROUP};

/// Key prefix that marks a membership flag
pub const GROUP_KEY_PREFIX: &str = "RosterGroup:";

impl MembershipFlag {
    /// The group this flag puts its locomotive in, if it is a "yes" flag
    pub fn group_name(&self) -> Option<&str> {
        let name = self.key.strip_prefix(GROUP_KEY_PREFIX)?;
        if self.value.eq_ignore_ascii_case("yes") {
            Some(name)
        } else {
            None
        }
    }
}

impl LocomotiveSummary {
    /// Road name as shown on a roster card
    pub fn display_road(&self) -> &str {
        if self.road_name.is_empty() {
            FIELD_DEFAULTS.card_road_name
        } else {
            &self.road_name
        }
    }
}

impl RosterManifest {
    /// Parse roster.xml
    ///
    /// Never fails: an unreadable manifest or one without a group taxonomy
    /// is logged and degrades to an empty taxonomy and/or empty roster.
    pub fn parse(text: &str) -> Self {
        let doc = match Document::parse_with_options(text, parsing_options()) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("⚠️  {}", RosterError::malformed("roster.xml", e.to_string()));
                return RosterManifest::default();
            }
        };

        let group_names = declared_groups(&doc);
        let locomotives: Vec<LocomotiveSummary> = doc
            .descendants()
            .filter(|n| n.has_tag_name("locomotive"))
            .map(summary_from_node)
            .collect();

        if locomotives.is_empty() {
            warn!("⚠️  {}", RosterError::malformed("roster.xml", "no locomotive elements"));
        }

        debug!(
            "Parsed roster: {} groups declared, {} locomotives",
            group_names.len(),
            locomotives.len()
        );

        RosterManifest {
            group_names,
            locomotives,
        }
    }
}

/// Group names from every `group` element under a `rosterGroup` element
fn declared_groups(doc: &Document<'_>) -> Vec<String> {
    let taxonomy: Vec<Node<'_, '_>> = doc
        .descendants()
        .filter(|n| n.has_tag_name("rosterGroup"))
        .collect();

    if taxonomy.is_empty() {
        warn!("⚠️  {}", RosterError::malformed("roster.xml", "no rosterGroup section"));
    }

    taxonomy
        .into_iter()
        .flat_map(|section| section.descendants().filter(|n| n.has_tag_name("group")))
        .map(|n| text_content(n).trim().to_string())
        .collect()
}

fn summary_from_node(node: Node<'_, '_>) -> LocomotiveSummary {
    let membership_flags = node
        .descendants()
        .filter(|n| n.has_tag_name("keyvaluepair"))
        .map(|pair| {
            let child_text = |tag: &str| {
                pair.children()
                    .find(|c| c.has_tag_name(tag))
                    .map(text_content)
                    .unwrap_or_default()
            };
            MembershipFlag::new(child_text("key"), child_text("value"))
        })
        .collect();

    LocomotiveSummary {
        id: attr_or(node, "id", FIELD_DEFAULTS.id),
        file_name: attr_or(node, "fileName", FIELD_DEFAULTS.file_name),
        road_name: attr_or(node, "roadName", FIELD_DEFAULTS.road_name),
        model: attr_or(node, "model", FIELD_DEFAULTS.model),
        membership_flags,
    }
}

/// Sort the roster into groups
///
/// Buckets are created in declaration order, one per distinct name, with
/// "Other" appended last unless the manifest already declares it. A
/// locomotive is appended to every bucket it flags; one with no matching
/// flag goes to "Other". Empty buckets are dropped from the result.
pub fn group_roster(manifest: &RosterManifest) -> Vec<Group> {
    let mut buckets: Vec<Group> = Vec::new();
    for name in manifest.group_names.iter().map(String::as_str).chain([OTHER_GROUP]) {
        if !buckets.iter().any(|g| g.name == name) {
            buckets.push(Group::new(name));
        }
    }

    for loco in &manifest.locomotives {
        let mut assigned = false;

        for name in loco.membership_flags.iter().filter_map(MembershipFlag::group_name) {
            if let Some(bucket) = buckets.iter_mut().find(|g| g.name == name) {
                bucket.members.push(loco.clone());
                assigned = true;
            }
        }

        if !assigned {
            if let Some(other) = buckets.iter_mut().find(|g| g.name == OTHER_GROUP) {
                other.members.push(loco.clone());
            }
        }
    }

    buckets.retain(|g| !g.members.is_empty());
    buckets
}

/// Parse roster.xml and group it in one step
#[cfg(test)]
pub fn build_groups(manifest_text: &str) -> Vec<Group> {
    group_roster(&RosterManifest::parse(manifest_text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<roster-config>
  <roster>
    <locomotive id="UP 844" fileName="UP_844.xml" roadName="Union Pacific" model="FEF-3">
      <attributepairs>
        <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
        <keyvaluepair><key>RosterGroup:Passenger</key><value>YES</value></keyvaluepair>
      </attributepairs>
    </locomotive>
    <locomotive id="BNSF 5350" fileName="BNSF_5350.xml" roadName="BNSF" model="SD70MAC">
      <attributepairs>
        <keyvaluepair><key>RosterGroup:Diesel</key><value>yes</value></keyvaluepair>
      </attributepairs>
    </locomotive>
    <locomotive id="Switcher" fileName="Switcher.xml" model="SW1500">
      <attributepairs>
        <keyvaluepair><key>RosterGroup:Steam</key><value>no</value></keyvaluepair>
        <keyvaluepair><key>Owner</key><value>yes</value></keyvaluepair>
      </attributepairs>
    </locomotive>
    <locomotive id="GN 2584" fileName="GN_2584.xml" roadName="Great Northern">
      <attributepairs>
        <keyvaluepair><key>RosterGroup:Steam</key><value>Yes</value></keyvaluepair>
      </attributepairs>
    </locomotive>
  </roster>
  <rosterGroup>
    <group>Diesel</group>
    <group>Steam</group>
    <group>Passenger</group>
    <group>Museum</group>
  </rosterGroup>
</roster-config>"#;

    fn member_ids(group: &Group) -> Vec<&str> {
        group.members.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_parse_manifest() {
        let manifest = RosterManifest::parse(ROSTER);

        assert_eq!(manifest.group_names, vec!["Diesel", "Steam", "Passenger", "Museum"]);
        assert_eq!(manifest.locomotives.len(), 4);

        let first = &manifest.locomotives[0];
        assert_eq!(first.file_name, "UP_844.xml");
        assert_eq!(first.membership_flags.len(), 2);
        assert_eq!(first.membership_flags[0].group_name(), Some("Steam"));
    }

    #[test]
    fn test_groups_in_declaration_order_with_other_last() {
        let groups = build_groups(ROSTER);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();

        // Museum is declared but empty, so it is omitted
        assert_eq!(names, vec!["Diesel", "Steam", "Passenger", "Other"]);
    }

    #[test]
    fn test_multi_group_membership_appears_in_each() {
        let groups = build_groups(ROSTER);

        assert_eq!(member_ids(&groups[1]), vec!["UP 844", "GN 2584"]);
        assert_eq!(member_ids(&groups[2]), vec!["UP 844"]);
    }

    #[test]
    fn test_unflagged_locomotive_only_in_other() {
        let groups = build_groups(ROSTER);
        let other = groups.last().unwrap();

        assert_eq!(other.name, OTHER_GROUP);
        assert_eq!(member_ids(other), vec!["Switcher"]);
        let elsewhere = groups[..groups.len() - 1]
            .iter()
            .any(|g| g.members.iter().any(|m| m.id == "Switcher"));
        assert!(!elsewhere);
    }

    #[test]
    fn test_every_locomotive_is_rendered() {
        let manifest = RosterManifest::parse(ROSTER);
        let groups = group_roster(&manifest);

        for loco in &manifest.locomotives {
            assert!(groups.iter().any(|g| g.members.contains(loco)), "{} dropped", loco.id);
        }
    }

    #[test]
    fn test_empty_declared_group_does_not_disturb_others() {
        let mut manifest = RosterManifest::parse(ROSTER);
        let before = group_roster(&manifest);

        manifest.group_names.insert(0, "Narrow Gauge".to_string());
        let after = group_roster(&manifest);

        assert_eq!(before, after);
    }

    #[test]
    fn test_undeclared_group_flag_falls_to_other() {
        let text = r#"<roster-config><roster>
            <locomotive id="A" fileName="A.xml">
              <keyvaluepair><key>RosterGroup:Logging</key><value>yes</value></keyvaluepair>
            </locomotive>
        </roster><rosterGroup><group>Steam</group></rosterGroup></roster-config>"#;
        let groups = build_groups(text);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, OTHER_GROUP);
        assert_eq!(member_ids(&groups[0]), vec!["A"]);
    }

    #[test]
    fn test_missing_taxonomy_puts_everything_in_other() {
        let text = r#"<roster-config><roster>
            <locomotive id="A" fileName="A.xml">
              <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
            </locomotive>
            <locomotive id="B" fileName="B.xml"/>
        </roster></roster-config>"#;
        let groups = build_groups(text);

        assert_eq!(groups.len(), 1);
        assert_eq!(member_ids(&groups[0]), vec!["A", "B"]);
    }

    #[test]
    fn test_unparseable_manifest_yields_no_groups() {
        assert!(build_groups("<roster-config><roster>").is_empty());
        assert!(build_groups("<roster-config/>").is_empty());
    }

    #[test]
    fn test_declared_other_keeps_its_position_and_flag() {
        let text = r#"<roster-config><roster>
            <locomotive id="A" fileName="A.xml">
              <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
              <keyvaluepair><key>RosterGroup:Other</key><value>yes</value></keyvaluepair>
            </locomotive>
            <locomotive id="B" fileName="B.xml"/>
            <locomotive id="C" fileName="C.xml">
              <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
            </locomotive>
        </roster><rosterGroup>
            <group>Other</group><group>Steam</group><group>Steam</group>
        </rosterGroup></roster-config>"#;
        let groups = build_groups(text);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();

        assert_eq!(names, vec!["Other", "Steam"]);
        assert_eq!(member_ids(&groups[0]), vec!["A", "B"]);
        assert_eq!(member_ids(&groups[1]), vec!["A", "C"]);
    }

    #[test]
    fn test_missing_file_name_uses_default() {
        let manifest = RosterManifest::parse(
            r#"<roster-config><roster><locomotive id="A"/></roster></roster-config>"#,
        );

        assert_eq!(manifest.locomotives[0].file_name, FIELD_DEFAULTS.file_name);
    }

    #[test]
    fn test_card_road_default() {
        let manifest = RosterManifest::parse(ROSTER);

        assert_eq!(manifest.locomotives[0].display_road(), "Union Pacific");
        assert_eq!(manifest.locomotives[2].display_road(), "Unknown Road");
    }
}
