//! Fixed competition → station → card → punch template.

use crate::domain::error::DomainResult;
use crate::domain::node::TreeNode;
use crate::domain::record::{RecordPath, RecordSpec};

pub const COMPETITION_TAG: &str = "competition";
pub const NAME_ATTR: &str = "name";
pub const STATION_TAG: &str = "SIstation";
pub const CARD_TAG: &str = "SIcard";
pub const PUNCH_TAG: &str = "Punch";
pub const NR_ATTR: &str = "Nr";
pub const TIME_ATTR: &str = "Time";

/// Fresh root for a competition.
pub fn competition_root(name: &str) -> DomainResult<TreeNode> {
    TreeNode::new(COMPETITION_TAG, [(NAME_ATTR, name)])
}

/// Record path for one punch, relative to the competition root.
///
/// `other_info` becomes the fan-out below the `Punch` node; empty specs in it
/// are ignored.
pub fn punch_path(
    station: impl ToString,
    card: impl ToString,
    time: impl ToString,
    other_info: Vec<RecordSpec>,
) -> RecordPath {
    let punch = RecordSpec::new(PUNCH_TAG).attr(TIME_ATTR, time).sub(other_info);
    let card = RecordSpec::new(CARD_TAG).attr(NR_ATTR, card).sub(punch);
    RecordSpec::new(STATION_TAG).attr(NR_ATTR, station).sub(card).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merge::insert;

    #[test]
    fn test_punch_path_builds_four_levels() {
        let mut root = competition_root("Test Race").unwrap();
        insert(&mut root, &punch_path(97, "920407", "2017-11-10 17:23:13", vec![])).unwrap();

        let station = &root.children()[0];
        let card = &station.children()[0];
        let punch = &card.children()[0];
        assert_eq!((station.tag(), station.attribute(NR_ATTR)), (STATION_TAG, Some("97")));
        assert_eq!((card.tag(), card.attribute(NR_ATTR)), (CARD_TAG, Some("920407")));
        assert_eq!(punch.attribute(TIME_ATTR), Some("2017-11-10 17:23:13"));
        assert!(punch.is_leaf());
        assert_eq!(root.depth(), 4);
    }
}
