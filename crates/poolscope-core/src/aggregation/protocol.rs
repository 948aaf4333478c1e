use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::AprRecord;

/// Set of protocols shown on the APR chart. An empty selection shows every
/// protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSelection {
    selected: BTreeSet<String>,
}

impl ProtocolSelection {
    pub fn new<I, S>(protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: protocols.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds `protocol` if absent, removes it otherwise. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, protocol: &str) -> bool {
        if self.selected.remove(protocol) {
            false
        } else {
            self.selected.insert(protocol.to_owned());
            true
        }
    }

    pub fn select_all<I, S>(&mut self, available: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = available.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, protocol: &str) -> bool {
        self.selected.contains(protocol)
    }

    pub fn matches(&self, protocol: &str) -> bool {
        self.selected.is_empty() || self.selected.contains(protocol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

pub fn filter_by_protocol<'a>(
    records: &'a [AprRecord],
    selection: &ProtocolSelection,
) -> Vec<&'a AprRecord> {
    records
        .iter()
        .filter(|record| selection.matches(&record.protocol))
        .collect()
}

/// Protocol names present in `records`, sorted.
pub fn distinct_protocols(records: &[AprRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.protocol.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UtcDateTime;

    fn record(protocol: &str) -> AprRecord {
        AprRecord::new(
            0,
            UtcDateTime::parse("2024-05-01").expect("valid"),
            1.0,
            protocol,
            "",
        )
        .expect("valid record")
    }

    #[test]
    fn empty_selection_matches_everything() {
        let records = vec![record("aero"), record("velo")];
        let selection = ProtocolSelection::default();

        assert_eq!(filter_by_protocol(&records, &selection).len(), 2);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let records = vec![record("aero"), record("velo"), record("aero")];
        let mut selection = ProtocolSelection::default();

        assert!(selection.toggle("aero"));
        assert_eq!(filter_by_protocol(&records, &selection).len(), 2);
        assert!(!selection.toggle("aero"));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_and_clear() {
        let records = vec![record("velo"), record("aero"), record("velo")];
        let protocols = distinct_protocols(&records);
        assert_eq!(protocols, vec!["aero", "velo"]);

        let mut selection = ProtocolSelection::default();
        selection.select_all(protocols);
        assert!(selection.is_selected("velo"));
        assert_eq!(selection.iter().count(), 2);

        selection.clear();
        assert!(!selection.is_selected("velo"));
        assert!(selection.matches("velo"));
    }
}
