//! Exact-match resolution for typed input.
//!
//! Called on every keystroke by the caller. A hit means the typed text is a
//! complete, known name inside the current parent scope and can be committed
//! without an explicit click. A miss is `None`, never an error.

use super::store::LocationStore;
use super::types::{Level, ResolvedEntity};

/// Resolves typed text to a single entity at one hierarchy level.
pub struct ExactMatchResolver<'a> {
    store: &'a LocationStore,
}

impl<'a> ExactMatchResolver<'a> {
    pub fn new(store: &'a LocationStore) -> Self {
        Self { store }
    }

    /// Find the first entity at `level` whose name equals `typed` after
    /// trimming and lower-casing.
    ///
    /// `parent` restricts the scan: a district for settlements, a settlement
    /// for wards, a ward for plots. It is ignored for districts. Without a
    /// parent the whole level is scanned in store order.
    pub fn resolve(
        &self,
        level: Level,
        typed: &str,
        parent: Option<u32>,
    ) -> Option<ResolvedEntity> {
        let needle = normalize(typed);
        if needle.is_empty() {
            return None;
        }
        let is = |name: &str| normalize(name) == needle;

        match level {
            Level::District => self
                .store
                .districts()
                .iter()
                .find(|d| is(&d.name))
                .cloned()
                .map(ResolvedEntity::District),
            Level::Settlement => self
                .store
                .settlements()
                .iter()
                .filter(|s| parent.map_or(true, |p| s.district_id == p))
                .find(|s| is(&s.name))
                .cloned()
                .map(ResolvedEntity::Settlement),
            Level::Ward => self
                .store
                .wards()
                .iter()
                .filter(|w| parent.map_or(true, |p| w.settlement_id == p))
                .find(|w| is(&w.name))
                .cloned()
                .map(ResolvedEntity::Ward),
            Level::Plot => self
                .store
                .plots()
                .iter()
                .filter(|p| parent.map_or(true, |id| p.ward_id == id))
                .find(|p| is(&p.full_address))
                .cloned()
                .map(ResolvedEntity::Plot),
        }
    }
}

/// Trim and lower-case.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::store::tests::store;

    #[test]
    fn test_mixed_case_settlement() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        let hit = r.resolve(Level::Settlement, "GABORONE", None).unwrap();
        assert_eq!(hit.level(), Level::Settlement);
        assert_eq!(hit.name(), "Gaborone");
        match hit {
            ResolvedEntity::Settlement(st) => assert_eq!(st.id, 101),
            other => panic!("unexpected entity: {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_trimmed() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        assert_eq!(r.resolve(Level::District, "  kweneng ", None).unwrap().name(), "Kweneng");
    }

    #[test]
    fn test_partial_name_is_none() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        assert!(r.resolve(Level::Settlement, "gabor", None).is_none());
        assert!(r.resolve(Level::Settlement, "", None).is_none());
        assert!(r.resolve(Level::Settlement, "   ", None).is_none());
    }

    #[test]
    fn test_parent_scope_filters() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        // Gaborone is in South-East (9), not Central (1).
        assert!(r.resolve(Level::Settlement, "gaborone", Some(1)).is_none());
        assert!(r.resolve(Level::Settlement, "gaborone", Some(9)).is_some());
    }

    #[test]
    fn test_shared_ward_name_resolved_by_scope() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        let in_mogoditshane = r.resolve(Level::Ward, "block 8", Some(107)).unwrap();
        let in_gaborone = r.resolve(Level::Ward, "Block 8", Some(101)).unwrap();
        match (in_mogoditshane, in_gaborone) {
            (ResolvedEntity::Ward(a), ResolvedEntity::Ward(b)) => {
                assert_eq!(a.id, 1011);
                assert_eq!(b.id, 1004);
            }
            other => panic!("unexpected entities: {other:?}"),
        }
    }

    #[test]
    fn test_unscoped_shared_name_takes_store_order() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        let first = s.wards().iter().find(|w| w.name == "Block 8").unwrap().id;
        match r.resolve(Level::Ward, "block 8", None).unwrap() {
            ResolvedEntity::Ward(w) => assert_eq!(w.id, first),
            other => panic!("unexpected entity: {other:?}"),
        }
    }

    #[test]
    fn test_district_ignores_parent() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        assert!(r.resolve(Level::District, "central", Some(12345)).is_some());
    }

    #[test]
    fn test_plot_by_full_address() {
        let s = store();
        let r = ExactMatchResolver::new(&s);
        let hit = r.resolve(Level::Plot, "plot 771, monarch, francistown", Some(1016)).unwrap();
        assert_eq!(hit.level(), Level::Plot);
        assert!(r.resolve(Level::Plot, "plot 771, monarch, francistown", Some(1004)).is_none());
    }
}
