/// View-model for the roster grid
///
/// Built once per load from the grouped roster. Cards expose their actions
/// keyed by locomotive id / file name, so the widgets never format ids
/// into handlers themselves.

use crate::roster::filter::{FilterIndex, FilterOutcome};
use crate::state::data::{Group, LocomotiveDetail};

/// Something a user can do on a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    /// Open the detail panel for a detail document
    ShowDetails(String),
    /// Pick and store a photo for a locomotive id
    AttachPhoto(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    /// "<road> <model>" line under the id
    pub subtitle: String,
    pub file_name: String,
}

impl CardView {
    pub fn details_action(&self) -> CardAction {
        CardAction::ShowDetails(self.file_name.clone())
    }

    pub fn photo_action(&self) -> CardAction {
        CardAction::AttachPhoto(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub name: String,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Default)]
pub struct RosterView {
    pub sections: Vec<SectionView>,
    index: FilterIndex,
}

impl RosterView {
    pub fn from_groups(groups: &[Group]) -> Self {
        let sections = groups
            .iter()
            .map(|group| SectionView {
                name: group.name.clone(),
                cards: group
                    .members
                    .iter()
                    .map(|loco| CardView {
                        id: loco.id.clone(),
                        subtitle: format!("{} {}", loco.display_road(), loco.model)
                            .trim_end()
                            .to_string(),
                        file_name: loco.file_name.clone(),
                    })
                    .collect(),
            })
            .collect();

        RosterView {
            sections,
            index: FilterIndex::from_groups(groups),
        }
    }

    pub fn filter(&self, query: &str) -> FilterOutcome {
        self.index.apply(query)
    }

    /// Total cards, counting a locomotive once per group it appears in
    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// Distinct locomotive ids in render order
    pub fn locomotive_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for card in self.sections.iter().flat_map(|s| &s.cards) {
            if !ids.contains(&card.id) {
                ids.push(card.id.clone());
            }
        }
        ids
    }
}

/// Contents of the detail panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailModal {
    Loaded(LocomotiveDetail),
    /// The detail document was missing or unreadable
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::manifest::build_groups;

    const ROSTER: &str = r#"<roster-config><roster>
        <locomotive id="UP 844" fileName="UP_844.xml" roadName="Union Pacific" model="FEF-3">
          <keyvaluepair><key>RosterGroup:Steam</key><value>yes</value></keyvaluepair>
          <keyvaluepair><key>RosterGroup:Passenger</key><value>yes</value></keyvaluepair>
        </locomotive>
        <locomotive id="Switcher" fileName="Switcher.xml"/>
    </roster><rosterGroup><group>Steam</group><group>Passenger</group></rosterGroup></roster-config>"#;

    #[test]
    fn test_sections_follow_groups() {
        let view = RosterView::from_groups(&build_groups(ROSTER));
        let names: Vec<&str> = view.sections.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["Steam", "Passenger", "Other"]);
        assert_eq!(view.entry_count(), 3);
        assert_eq!(view.locomotive_ids(), vec!["UP 844", "Switcher"]);
    }

    #[test]
    fn test_card_text_and_actions() {
        let view = RosterView::from_groups(&build_groups(ROSTER));
        let card = &view.sections[0].cards[0];

        assert_eq!(card.subtitle, "Union Pacific FEF-3");
        assert_eq!(card.details_action(), CardAction::ShowDetails("UP_844.xml".into()));
        assert_eq!(card.photo_action(), CardAction::AttachPhoto("UP 844".into()));

        let other = &view.sections[2].cards[0];
        assert_eq!(other.subtitle, "Unknown Road");
    }

    #[test]
    fn test_filter_through_view() {
        let view = RosterView::from_groups(&build_groups(ROSTER));
        let outcome = view.filter("switch");

        assert_eq!(outcome.group_visible, vec![false, false, true]);
        assert_eq!(view.filter("").visible_count, view.entry_count());
    }
}
