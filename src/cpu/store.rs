
use std::collections::{BTreeMap, BTreeSet};

/// Everything recovered by a decode run: rendered instructions keyed by the
/// address they start at, and the set of addresses used as labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Disassembly {
    entries: BTreeMap<u16, String>,
    labels: BTreeSet<u16>,
}

impl Disassembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the rendered instruction at `address`, replacing any previous one.
    pub fn record(&mut self, address: u16, text: String) {
        self.entries.insert(address, text);
    }

    pub fn mark_label(&mut self, address: u16) {
        self.labels.insert(address);
    }

    pub fn get(&self, address: u16) -> Option<&str> {
        self.entries.get(&address).map(String::as_str)
    }

    pub fn is_label(&self, address: u16) -> bool {
        self.labels.contains(&address)
    }

    /// Instructions in address order.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &str)> + '_ {
        self.entries.iter().map(|(&address, text)| (address, text.as_str()))
    }

    /// Labels in address order.
    pub fn labels(&self) -> impl Iterator<Item = u16> + '_ {
        self.labels.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_overwrites() {
        let mut store = Disassembly::new();
        store.record(0x200, "LD V0, 0x00".to_string());
        store.record(0x200, "LD V1, 0x01".to_string());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0x200), Some("LD V1, 0x01"));
        assert_eq!(store.get(0x202), None);
    }

    #[test]
    fn labels_are_a_set() {
        let mut store = Disassembly::new();
        store.mark_label(0x204);
        store.mark_label(0x202);
        store.mark_label(0x204);

        assert_eq!(store.labels().collect::<Vec<_>>(), vec![0x202, 0x204]);
        assert!(store.is_label(0x202));
        assert!(!store.is_label(0x200));
        assert!(store.is_empty());
    }

    #[test]
    fn entries_iterate_in_address_order() {
        let mut store = Disassembly::new();
        store.record(0x204, "C".to_string());
        store.record(0x200, "A".to_string());
        store.record(0x202, "B".to_string());

        let entries = store.entries().collect::<Vec<_>>();
        assert_eq!(entries, vec![(0x200, "A"), (0x202, "B"), (0x204, "C")]);
    }
}
