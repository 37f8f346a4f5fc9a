// src/board/registry.rs

use alloc::collections::BTreeMap;
use alloc::rc::Rc;

use crate::common::ResponseHeader;
use crate::signal::DataSignal;

/// Board-scoped identity cache: at most one live signal per header.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    signals: BTreeMap<ResponseHeader, Rc<DataSignal>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, header: &ResponseHeader) -> Option<&Rc<DataSignal>> {
        self.signals.get(header)
    }

    pub fn contains(&self, header: &ResponseHeader) -> bool {
        self.signals.contains_key(header)
    }

    /// Inserts `signal` under its own header, returning the signal it replaced.
    pub fn insert(&mut self, signal: Rc<DataSignal>) -> Option<Rc<DataSignal>> {
        self.signals.insert(*signal.header(), signal)
    }

    pub fn remove(&mut self, header: &ResponseHeader) -> Option<Rc<DataSignal>> {
        self.signals.remove(header)
    }

    /// Cached signal for `header`, or the one built by `create` (inserted first).
    /// The flag is `true` when a new signal was created.
    pub fn get_or_insert_with<F>(&mut self, header: ResponseHeader, create: F) -> (Rc<DataSignal>, bool)
    where
        F: FnOnce() -> DataSignal,
    {
        if let Some(existing) = self.signals.get(&header) {
            return (Rc::clone(existing), false);
        }
        let signal = Rc::new(create());
        self.signals.insert(header, Rc::clone(&signal));
        (signal, true)
    }

    /// Removes and returns every entry matching `predicate`.
    pub fn drain_where<P>(&mut self, mut predicate: P) -> alloc::vec::Vec<Rc<DataSignal>>
    where
        P: FnMut(&DataSignal) -> bool,
    {
        let headers: alloc::vec::Vec<ResponseHeader> = self
            .signals
            .iter()
            .filter(|(_, sig)| predicate(sig))
            .map(|(h, _)| *h)
            .collect();
        headers
            .iter()
            .filter_map(|h| self.signals.remove(h))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<DataSignal>> {
        self.signals.values()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DecodeSpec;

    fn signal(header: ResponseHeader) -> DataSignal {
        DataSignal::new(header, DecodeSpec::id_signal())
    }

    #[test]
    fn test_get_or_insert_reuses_identity() {
        let mut registry = SignalRegistry::new();
        let header = ResponseHeader::with_id(0x01, 0x01, 1);

        let (first, created) = registry.get_or_insert_with(header, || signal(header));
        assert!(created);
        let (second, created) = registry.get_or_insert_with(header, || panic!("must not rebuild"));
        assert!(!created);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_absent_and_zero_id_entries_are_separate() {
        let mut registry = SignalRegistry::new();
        let absent = ResponseHeader::new(0x11, 0x11);
        let zero = absent.sub_channel(0);
        let (a, _) = registry.get_or_insert_with(absent, || signal(absent));
        let (z, _) = registry.get_or_insert_with(zero, || signal(zero));
        assert!(!Rc::ptr_eq(&a, &z));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&zero).unwrap().header(), &zero);
    }

    #[test]
    fn test_drain_where_removes_matching_only() {
        let mut registry = SignalRegistry::new();
        for id in 0..4u8 {
            registry.insert(Rc::new(signal(ResponseHeader::with_id(0x09, 0x03, id))));
        }
        registry.insert(Rc::new(signal(ResponseHeader::new(0x01, 0x01))));

        let drained = registry.drain_where(|s| s.module_id() == 0x09);
        assert_eq!(drained.len(), 4);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&ResponseHeader::new(0x01, 0x01)));
        assert!(registry.remove(&ResponseHeader::new(0x01, 0x01)).is_some());
        assert!(registry.is_empty());
    }
}
