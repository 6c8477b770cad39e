//! Cascading District → Settlement → Ward selection.
//!
//! [`Selection`] is an immutable snapshot with pure transitions. The
//! [`CascadeController`] owns the current snapshot, looks up parents for
//! inference and emits one [`LocationSelection`] per transition.

use super::resolver::ExactMatchResolver;
use super::store::LocationStore;
use super::types::{District, Level, ResolvedEntity, Settlement, Ward};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The consolidated value handed to listing and search forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub state: String,
    pub city: String,
    pub ward: String,
}

/// A selection triple. A set child always has its full parent chain set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub district: Option<District>,
    pub settlement: Option<Settlement>,
    pub ward: Option<Ward>,
}

impl Selection {
    /// Select a district and drop everything below it.
    pub fn with_district(&self, district: District) -> Self {
        Self { district: Some(district), settlement: None, ward: None }
    }

    /// Select a settlement under `parent` and drop the ward.
    ///
    /// The district is replaced unless it already is `parent`.
    pub fn with_settlement(&self, settlement: Settlement, parent: District) -> Self {
        let district = match &self.district {
            Some(d) if d.id == settlement.district_id => d.clone(),
            _ => parent,
        };
        Self { district: Some(district), settlement: Some(settlement), ward: None }
    }

    /// Select a ward under `settlement` and `district`, replacing any
    /// settlement or district it does not belong to.
    pub fn with_ward(&self, ward: Ward, settlement: Settlement, district: District) -> Self {
        let keeps_parent = self.settlement.as_ref().is_some_and(|s| s.id == ward.settlement_id);
        if keeps_parent {
            return Self { ward: Some(ward), ..self.clone() };
        }
        Self { district: Some(district), settlement: Some(settlement), ward: Some(ward) }
    }

    /// Snapshot as the flat value the forms consume.
    pub fn to_event(&self) -> LocationSelection {
        LocationSelection {
            state: self.district.as_ref().map(|d| d.name.clone()).unwrap_or_default(),
            city: self.settlement.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            ward: self.ward.as_ref().map(|w| w.name.clone()).unwrap_or_default(),
        }
    }

    /// Id of the parent scope used for the next level down.
    pub fn parent_for(&self, level: Level) -> Option<u32> {
        match level {
            Level::District => None,
            Level::Settlement => self.district.as_ref().map(|d| d.id),
            Level::Ward => self.settlement.as_ref().map(|s| s.id),
            Level::Plot => self.ward.as_ref().map(|w| w.id),
        }
    }
}

type Listener = Box<dyn FnMut(&LocationSelection) + Send>;

/// Long-lived controller over the selection triple.
pub struct CascadeController {
    store: Arc<LocationStore>,
    current: Selection,
    listeners: Vec<Listener>,
}

impl CascadeController {
    pub fn new(store: Arc<LocationStore>) -> Self {
        Self { store, current: Selection::default(), listeners: Vec::new() }
    }

    /// Register a listener for post-transition snapshots.
    pub fn subscribe(&mut self, listener: impl FnMut(&LocationSelection) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn selection(&self) -> &Selection {
        &self.current
    }

    pub fn set_district(&mut self, district: &District) -> LocationSelection {
        let next = self.current.with_district(district.clone());
        self.commit(next)
    }

    /// Select a settlement, inferring its district when none (or another one)
    /// is selected. Returns `None` if the settlement's district is unknown to
    /// the store; the state is left untouched in that case.
    pub fn set_settlement(&mut self, settlement: &Settlement) -> Option<LocationSelection> {
        let parent = self.store.district_of(settlement)?.clone();
        let next = self.current.with_settlement(settlement.clone(), parent);
        Some(self.commit(next))
    }

    /// Select a ward, inferring settlement and district when needed.
    pub fn set_ward(&mut self, ward: &Ward) -> Option<LocationSelection> {
        let settlement = self.store.settlement_of(ward)?.clone();
        let district = self.store.district_of(&settlement)?.clone();
        let next = self.current.with_ward(ward.clone(), settlement, district);
        Some(self.commit(next))
    }

    pub fn clear(&mut self) -> LocationSelection {
        self.commit(Selection::default())
    }

    /// Auto-commit typed text when it exactly names an entity inside the
    /// current parent scope. Returns the emitted event on a hit.
    pub fn type_text(&mut self, level: Level, text: &str) -> Option<LocationSelection> {
        let parent = self.current.parent_for(level);
        let hit = ExactMatchResolver::new(&self.store).resolve(level, text, parent)?;
        tracing::debug!(%level, name = hit.name(), "exact match auto-commit");
        match hit {
            ResolvedEntity::District(d) => Some(self.set_district(&d)),
            ResolvedEntity::Settlement(s) => self.set_settlement(&s),
            ResolvedEntity::Ward(w) => self.set_ward(&w),
            ResolvedEntity::Plot(_) => None,
        }
    }

    fn commit(&mut self, next: Selection) -> LocationSelection {
        self.current = next;
        let event = self.current.to_event();
        for listener in &mut self.listeners {
            listener(&event);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn controller() -> CascadeController {
        CascadeController::new(Arc::new(LocationStore::builtin().unwrap()))
    }

    fn district(c: &CascadeController, name: &str) -> District {
        c.store.districts().iter().find(|d| d.name == name).unwrap().clone()
    }

    fn settlement(c: &CascadeController, name: &str) -> Settlement {
        c.store.settlements().iter().find(|s| s.name == name).unwrap().clone()
    }

    #[test]
    fn test_initial_state_empty() {
        let c = controller();
        assert_eq!(c.selection(), &Selection::default());
        assert_eq!(c.selection().to_event(), LocationSelection::default());
    }

    #[test]
    fn test_new_district_invalidates_children() {
        let mut c = controller();
        let se = district(&c, "South-East");
        let central = district(&c, "Central");
        let gaborone = settlement(&c, "Gaborone");

        c.set_district(&se);
        c.set_settlement(&gaborone).unwrap();
        let event = c.set_district(&central);

        assert!(c.selection().settlement.is_none());
        assert!(c.selection().ward.is_none());
        assert_eq!(event, LocationSelection { state: "Central".into(), city: String::new(), ward: String::new() });
    }

    #[test]
    fn test_settlement_infers_district() {
        let mut c = controller();
        let francistown = settlement(&c, "Francistown");
        let event = c.set_settlement(&francistown).unwrap();
        assert_eq!(event.state, "North-East");
        assert_eq!(event.city, "Francistown");
        assert_eq!(c.selection().district.as_ref().unwrap().id, francistown.district_id);
    }

    #[test]
    fn test_settlement_from_other_district_replaces_district() {
        let mut c = controller();
        let central = district(&c, "Central");
        c.set_district(&central);
        let event = c.set_settlement(&settlement(&c, "Maun")).unwrap();
        assert_eq!(event.state, "North-West");
    }

    #[test]
    fn test_new_settlement_clears_ward() {
        let mut c = controller();
        let ward = c.store.ward(1004).unwrap().clone();
        c.set_ward(&ward).unwrap();
        assert!(c.selection().ward.is_some());

        c.set_settlement(&settlement(&c, "Tlokweng")).unwrap();
        assert!(c.selection().ward.is_none());
        assert_eq!(c.selection().district.as_ref().unwrap().name, "South-East");
    }

    #[test]
    fn test_ward_infers_full_chain() {
        let mut c = controller();
        let ward = c.store.ward(1019).unwrap().clone();
        let event = c.set_ward(&ward).unwrap();
        assert_eq!(
            event,
            LocationSelection { state: "North-East".into(), city: "Francistown".into(), ward: "Block 5".into() }
        );
    }

    #[test]
    fn test_ward_keeps_matching_parents() {
        let mut c = controller();
        let gaborone = settlement(&c, "Gaborone");
        c.set_settlement(&gaborone).unwrap();
        let before = c.selection().clone();
        let broadhurst = c.store.ward(1005).unwrap().clone();
        c.set_ward(&broadhurst).unwrap();
        assert_eq!(c.selection().settlement, before.settlement);
        assert_eq!(c.selection().district, before.district);
        assert_eq!(c.selection().ward.as_ref().unwrap().name, "Broadhurst");
    }

    #[test]
    fn test_clear() {
        let mut c = controller();
        c.set_settlement(&settlement(&c, "Kasane")).unwrap();
        assert_eq!(c.clear(), LocationSelection::default());
        assert_eq!(c.selection(), &Selection::default());
    }

    #[test]
    fn test_one_event_per_transition() {
        let mut c = controller();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        c.subscribe(move |e| sink.lock().unwrap().push(e.clone()));

        c.set_settlement(&settlement(&c, "Gaborone")).unwrap();
        let block8 = c.store.ward(1004).unwrap().clone();
        c.set_ward(&block8).unwrap();
        c.clear();

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], LocationSelection { state: "South-East".into(), city: "Gaborone".into(), ward: String::new() });
        assert_eq!(events[1].ward, "Block 8");
        assert_eq!(events[2], LocationSelection::default());
    }

    #[test]
    fn test_type_text_respects_scope() {
        let mut c = controller();
        let central = district(&c, "Central");
        c.set_district(&central);
        assert!(c.type_text(Level::Settlement, "gaborone").is_none());
        assert_eq!(c.selection().district.as_ref().unwrap().name, "Central");

        let se = district(&c, "South-East");
        c.set_district(&se);
        let event = c.type_text(Level::Settlement, "GABORONE").unwrap();
        assert_eq!(event.city, "Gaborone");
    }

    #[test]
    fn test_type_text_ward_under_selected_settlement() {
        let mut c = controller();
        c.type_text(Level::Settlement, "Mogoditshane").unwrap();
        let event = c.type_text(Level::Ward, "block 8").unwrap();
        assert_eq!(event.city, "Mogoditshane");
        assert_eq!(c.selection().ward.as_ref().unwrap().id, 1011);
    }

    #[test]
    fn test_type_text_partial_does_nothing() {
        let mut c = controller();
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        c.subscribe(move |_| *sink.lock().unwrap() += 1);
        assert!(c.type_text(Level::District, "kwen").is_none());
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn test_pure_transitions_leave_source_untouched() {
        let c = controller();
        let start = Selection::default();
        let next = start.with_district(district(&c, "Chobe"));
        assert!(start.district.is_none());
        assert_eq!(next.to_event().state, "Chobe");
        assert_eq!(next.parent_for(Level::Settlement), Some(2));
        assert_eq!(next.parent_for(Level::Ward), None);
    }
}
