/// Free-text filtering of roster cards
///
/// A plain scan on every keystroke: an entry is visible when its text
/// contains the query (case-insensitive), and a group is visible when
/// at least one of its entries is.

use crate::state::data::{Group, LocomotiveSummary};

/// Lower-cased searchable text for every card, per group
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    groups: Vec<Vec<String>>,
}

/// Visibility after applying a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// `entry_visible[group][card]`
    pub entry_visible: Vec<Vec<bool>>,
    pub group_visible: Vec<bool>,
    pub visible_count: usize,
}

impl FilterOutcome {
    pub fn is_entry_visible(&self, group: usize, card: usize) -> bool {
        self.entry_visible
            .get(group)
            .and_then(|cards| cards.get(card))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_group_visible(&self, group: usize) -> bool {
        self.group_visible.get(group).copied().unwrap_or(false)
    }
}

/// Label of the details button every card carries
pub const DETAILS_BUTTON_LABEL: &str = "Details & Functions";

/// Text a card shows for `loco`: id, road name, model and its button label
pub fn card_text(loco: &LocomotiveSummary) -> String {
    format!(
        "{} {} {} {}",
        loco.id,
        loco.display_road(),
        loco.model,
        DETAILS_BUTTON_LABEL
    )
}

impl FilterIndex {
    pub fn from_groups(groups: &[Group]) -> Self {
        FilterIndex {
            groups: groups
                .iter()
                .map(|g| g.members.iter().map(|m| card_text(m).to_lowercase()).collect())
                .collect(),
        }
    }

    /// Total number of entries (cards) in the index
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn apply(&self, query: &str) -> FilterOutcome {
        let query = query.to_lowercase();

        let entry_visible: Vec<Vec<bool>> = self
            .groups
            .iter()
            .map(|texts| texts.iter().map(|t| t.contains(&query)).collect())
            .collect();

        let group_visible = entry_visible
            .iter()
            .map(|cards: &Vec<bool>| cards.iter().any(|&v| v))
            .collect();

        let visible_count = entry_visible.iter().flatten().filter(|&&v| v).count();

        FilterOutcome {
            entry_visible,
            group_visible,
            visible_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loco(id: &str, road: &str, model: &str) -> LocomotiveSummary {
        LocomotiveSummary {
            id: id.to_string(),
            file_name: format!("{id}.xml"),
            road_name: road.to_string(),
            model: model.to_string(),
            membership_flags: Vec::new(),
        }
    }

    fn groups() -> Vec<Group> {
        vec![
            Group {
                name: "Steam".to_string(),
                members: vec![loco("UP 844", "Union Pacific", "FEF-3"), loco("GN 2584", "Great Northern", "S-2")],
            },
            Group {
                name: "Other".to_string(),
                members: vec![loco("BNSF 5350", "BNSF", "SD70MAC")],
            },
        ]
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let index = FilterIndex::from_groups(&groups());
        let outcome = index.apply("");

        assert_eq!(outcome.visible_count, index.len());
        assert_eq!(outcome.visible_count, 3);
        assert_eq!(outcome.group_visible, vec![true, true]);
    }

    #[test]
    fn test_case_insensitive_match() {
        let index = FilterIndex::from_groups(&groups());
        let outcome = index.apply("union");

        assert_eq!(outcome.visible_count, 1);
        assert!(outcome.is_entry_visible(0, 0));
        assert!(!outcome.is_entry_visible(0, 1));
    }

    #[test]
    fn test_group_hidden_when_no_cards_match() {
        let index = FilterIndex::from_groups(&groups());
        let outcome = index.apply("sd70");

        assert!(!outcome.is_group_visible(0));
        assert!(outcome.is_group_visible(1));
        assert_eq!(outcome.visible_count, 1);
    }

    #[test]
    fn test_clearing_query_restores_groups() {
        let index = FilterIndex::from_groups(&groups());
        assert_eq!(index.apply("zzz").visible_count, 0);

        let restored = index.apply("");
        assert_eq!(restored.group_visible, vec![true, true]);
        assert_eq!(restored.visible_count, 3);
    }

    #[test]
    fn test_button_label_is_part_of_card_text() {
        let index = FilterIndex::from_groups(&groups());

        assert_eq!(index.apply("details").visible_count, 3);
        assert_eq!(index.apply("& functions").group_visible, vec![true, true]);
    }

    #[test]
    fn test_missing_road_searchable_by_default_text() {
        let index = FilterIndex::from_groups(&[Group {
            name: "Other".to_string(),
            members: vec![loco("Switcher", "", "SW1500")],
        }]);

        assert_eq!(index.apply("unknown road").visible_count, 1);
    }
}
