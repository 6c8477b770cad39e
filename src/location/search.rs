//! Ranked name search across all four hierarchy levels.
//!
//! Match classes: exact > prefix > substring, all case-insensitive. Each
//! level is ranked and capped on its own; non-district hits carry their full
//! parent chain so callers never need a follow-up lookup.

use super::store::LocationStore;
use super::types::{
    District, DistrictId, Level, LocationError, Plot, SearchType, Settlement, SettlementId, Ward,
};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Shortest accepted query, in characters after trimming.
pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// How a name matched the query. Orders best-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
}

/// Classify a lower-cased name against a lower-cased query.
pub fn classify(name_key: &str, query_key: &str) -> Option<MatchKind> {
    if name_key == query_key {
        Some(MatchKind::Exact)
    } else if name_key.starts_with(query_key) {
        Some(MatchKind::Prefix)
    } else if name_key.contains(query_key) {
        Some(MatchKind::Substring)
    } else {
        None
    }
}

/// Clamp a requested per-type limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

#[derive(Debug, Serialize)]
pub struct DistrictHit<'a> {
    #[serde(flatten)]
    pub district: &'a District,
    pub match_kind: MatchKind,
}

#[derive(Debug, Serialize)]
pub struct SettlementHit<'a> {
    #[serde(flatten)]
    pub settlement: &'a Settlement,
    pub district: &'a District,
    pub match_kind: MatchKind,
}

#[derive(Debug, Serialize)]
pub struct WardHit<'a> {
    #[serde(flatten)]
    pub ward: &'a Ward,
    pub settlement: &'a Settlement,
    pub district: &'a District,
    pub match_kind: MatchKind,
}

#[derive(Debug, Serialize)]
pub struct PlotHit<'a> {
    #[serde(flatten)]
    pub plot: &'a Plot,
    pub ward: &'a Ward,
    pub settlement: &'a Settlement,
    pub district: &'a District,
    pub match_kind: MatchKind,
}

/// Search results grouped by level, each group capped independently.
#[derive(Debug, Default, Serialize)]
pub struct GroupedResults<'a> {
    pub districts: Vec<DistrictHit<'a>>,
    pub settlements: Vec<SettlementHit<'a>>,
    pub wards: Vec<WardHit<'a>>,
    pub plots: Vec<PlotHit<'a>>,
}

impl GroupedResults<'_> {
    pub fn total(&self) -> usize {
        self.districts.len() + self.settlements.len() + self.wards.len() + self.plots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// The caller's current parent selection, used to pull in-scope children
/// ahead of global matches of the same class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchScope {
    pub district_id: Option<DistrictId>,
    pub settlement_id: Option<SettlementId>,
}

impl SearchScope {
    pub fn is_empty(&self) -> bool {
        self.district_id.is_none() && self.settlement_id.is_none()
    }
}

struct Candidate<'a, T> {
    item: &'a T,
    id: u32,
    kind: MatchKind,
    in_scope: bool,
}

/// Lower-cased name keys over a [`LocationStore`].
pub struct SearchIndex {
    store: Arc<LocationStore>,
    districts: HashMap<u32, String>,
    settlements: HashMap<u32, String>,
    wards: HashMap<u32, String>,
    plots: HashMap<u32, String>,
}

impl SearchIndex {
    pub fn new(store: Arc<LocationStore>) -> Self {
        let districts = store.districts().iter().map(|d| (d.id, d.name.to_lowercase())).collect();
        let settlements =
            store.settlements().iter().map(|s| (s.id, s.name.to_lowercase())).collect();
        let wards = store.wards().iter().map(|w| (w.id, w.name.to_lowercase())).collect();
        let plots = store.plots().iter().map(|p| (p.id, p.full_address.to_lowercase())).collect();
        Self { store, districts, settlements, wards, plots }
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    /// Ranked search over the requested levels.
    pub fn search(
        &self,
        query: &str,
        kind: SearchType,
        limit: usize,
    ) -> Result<GroupedResults<'_>, LocationError> {
        self.search_scoped(query, kind, limit, SearchScope::default())
    }

    /// Ranked search merging the children of the selected parent with the
    /// global scan. Entities reachable through both paths appear once.
    pub fn search_scoped(
        &self,
        query: &str,
        kind: SearchType,
        limit: usize,
        scope: SearchScope,
    ) -> Result<GroupedResults<'_>, LocationError> {
        let trimmed = query.trim();
        let len = trimmed.chars().count();
        if len < MIN_QUERY_CHARS {
            return Err(LocationError::QueryTooShort { len, min: MIN_QUERY_CHARS });
        }
        let q = trimmed.to_lowercase();
        let limit = clamp_limit(limit);
        let store = &*self.store;
        let mut out = GroupedResults::default();

        if kind.includes(Level::District) {
            let scoped: Vec<&District> =
                scope.district_id.and_then(|id| store.district(id)).into_iter().collect();
            out.districts = rank(
                &self.districts,
                &q,
                scoped,
                store.districts(),
                |d| d.id,
                limit,
                |a, b| b.population.cmp(&a.population).then_with(|| a.name.cmp(&b.name)),
            )
            .into_iter()
            .map(|c| DistrictHit { district: c.item, match_kind: c.kind })
            .collect();
        }

        if kind.includes(Level::Settlement) {
            out.settlements = rank(
                &self.settlements,
                &q,
                self.scoped_settlements(scope),
                store.settlements(),
                |s| s.id,
                limit,
                |a, b| {
                    b.is_major
                        .cmp(&a.is_major)
                        .then(b.population.cmp(&a.population))
                        .then_with(|| a.name.cmp(&b.name))
                },
            )
            .into_iter()
            .filter_map(|c| {
                Some(SettlementHit {
                    settlement: c.item,
                    district: store.district_of(c.item)?,
                    match_kind: c.kind,
                })
            })
            .collect();
        }

        if kind.includes(Level::Ward) {
            out.wards = rank(
                &self.wards,
                &q,
                self.scoped_wards(scope),
                store.wards(),
                |w| w.id,
                limit,
                // Wards without a population figure sort after those with one.
                |a, b| b.population.cmp(&a.population).then_with(|| a.name.cmp(&b.name)),
            )
            .into_iter()
            .filter_map(|c| {
                let settlement = store.settlement_of(c.item)?;
                Some(WardHit {
                    ward: c.item,
                    settlement,
                    district: store.district_of(settlement)?,
                    match_kind: c.kind,
                })
            })
            .collect();
        }

        if kind.includes(Level::Plot) {
            out.plots = rank(
                &self.plots,
                &q,
                self.scoped_plots(scope),
                store.plots(),
                |p| p.id,
                limit,
                |a, b| a.full_address.cmp(&b.full_address),
            )
            .into_iter()
            .filter_map(|c| {
                let ward = store.ward(c.item.ward_id)?;
                let settlement = store.settlement(c.item.settlement_id)?;
                Some(PlotHit {
                    plot: c.item,
                    ward,
                    settlement,
                    district: store.district_of(settlement)?,
                    match_kind: c.kind,
                })
            })
            .collect();
        }

        Ok(out)
    }

    fn scoped_settlements(&self, scope: SearchScope) -> Vec<&Settlement> {
        match scope.district_id {
            Some(id) => self.store.settlements_in(id).map(|l| l.settlements).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn scoped_wards(&self, scope: SearchScope) -> Vec<&Ward> {
        if let Some(id) = scope.settlement_id {
            return self.store.wards_in(id).map(|l| l.wards).unwrap_or_default();
        }
        self.scoped_settlements(scope)
            .into_iter()
            .flat_map(|s| self.store.wards_in(s.id).map(|l| l.wards).unwrap_or_default())
            .collect()
    }

    fn scoped_plots(&self, scope: SearchScope) -> Vec<&Plot> {
        self.scoped_wards(scope)
            .into_iter()
            .flat_map(|w| self.store.plots_in(w.id).unwrap_or_default())
            .collect()
    }
}

/// Classify, de-duplicate by id, order and cap one level's candidates.
///
/// Order: match class, then in-scope first, then the level's tie-break,
/// then id.
fn rank<'a, T>(
    keys: &HashMap<u32, String>,
    query: &str,
    scoped: Vec<&'a T>,
    global: &'a [T],
    id_of: fn(&T) -> u32,
    limit: usize,
    tie_break: impl Fn(&T, &T) -> Ordering,
) -> Vec<Candidate<'a, T>> {
    let mut seen: HashMap<u32, usize> = HashMap::new();
    let mut out: Vec<Candidate<'a, T>> = Vec::new();

    let paths = scoped
        .into_iter()
        .map(|item| (item, true))
        .chain(global.iter().map(|item| (item, false)));
    for (item, in_scope) in paths {
        let id = id_of(item);
        if let Some(&pos) = seen.get(&id) {
            out[pos].in_scope |= in_scope;
            continue;
        }
        let Some(kind) = keys.get(&id).and_then(|k| classify(k, query)) else {
            continue;
        };
        seen.insert(id, out.len());
        out.push(Candidate { item, id, kind, in_scope });
    }

    out.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then(b.in_scope.cmp(&a.in_scope))
            .then_with(|| tie_break(a.item, b.item))
            .then(a.id.cmp(&b.id))
    });
    out.truncate(limit);
    out
}
