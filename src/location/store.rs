//! Read-only store over the four entity collections.
//!
//! Construction validates every parent reference; after that all lookups are
//! pure projections of immutable data.

use super::dataset::{Dataset, DatasetSource};
use super::types::{
    District, DistrictId, Level, LocationError, Plot, PlotId, Settlement, SettlementId, Ward,
    WardId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A district with its settlements.
#[derive(Debug, Serialize)]
pub struct DistrictSettlements<'a> {
    pub district: &'a District,
    pub settlements: Vec<&'a Settlement>,
}

/// A settlement with its parent district and its wards.
#[derive(Debug, Serialize)]
pub struct SettlementWards<'a> {
    pub settlement: &'a Settlement,
    pub district: &'a District,
    pub wards: Vec<&'a Ward>,
}

/// Entity counts plus provenance, for health checks.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub districts: usize,
    pub settlements: usize,
    pub wards: usize,
    pub plots: usize,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

/// The location hierarchy.
pub struct LocationStore {
    districts: Vec<District>,
    settlements: Vec<Settlement>,
    wards: Vec<Ward>,
    plots: Vec<Plot>,
    district_idx: HashMap<DistrictId, usize>,
    settlement_idx: HashMap<SettlementId, usize>,
    ward_idx: HashMap<WardId, usize>,
    plot_idx: HashMap<PlotId, usize>,
    settlements_by_district: HashMap<DistrictId, Vec<usize>>,
    wards_by_settlement: HashMap<SettlementId, Vec<usize>>,
    plots_by_ward: HashMap<WardId, Vec<usize>>,
    source: DatasetSource,
    loaded_at: DateTime<Utc>,
}

impl LocationStore {
    /// Build a store from the compiled-in dataset.
    pub fn builtin() -> Result<Self, LocationError> {
        Self::new(Dataset::builtin(), DatasetSource::Builtin)
    }

    /// Validate a dataset and index it.
    ///
    /// Fails on duplicate ids, dangling parent references, out-of-range
    /// coordinates, or a plot whose `settlement_id` disagrees with its ward.
    pub fn new(dataset: Dataset, source: DatasetSource) -> Result<Self, LocationError> {
        let Dataset { mut districts, mut settlements, mut wards, mut plots } = dataset;

        districts.sort_by(|a, b| a.code.cmp(&b.code).then(a.id.cmp(&b.id)));
        settlements.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        wards.sort_by(|a, b| {
            a.ward_number
                .cmp(&b.ward_number)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.id.cmp(&b.id))
        });
        plots.sort_by(|a, b| a.full_address.cmp(&b.full_address).then(a.id.cmp(&b.id)));

        let district_idx = index_ids(Level::District, districts.iter().map(|d| d.id))?;
        let settlement_idx = index_ids(Level::Settlement, settlements.iter().map(|s| s.id))?;
        let ward_idx = index_ids(Level::Ward, wards.iter().map(|w| w.id))?;
        let plot_idx = index_ids(Level::Plot, plots.iter().map(|p| p.id))?;

        let mut settlements_by_district: HashMap<DistrictId, Vec<usize>> = HashMap::new();
        for (i, s) in settlements.iter().enumerate() {
            if !district_idx.contains_key(&s.district_id) {
                return Err(LocationError::Integrity(format!(
                    "settlement {} ('{}') references unknown district {}",
                    s.id, s.name, s.district_id
                )));
            }
            check_coords(Level::Settlement, s.id, s.latitude, s.longitude)?;
            settlements_by_district.entry(s.district_id).or_default().push(i);
        }

        let mut wards_by_settlement: HashMap<SettlementId, Vec<usize>> = HashMap::new();
        for (i, w) in wards.iter().enumerate() {
            if !settlement_idx.contains_key(&w.settlement_id) {
                return Err(LocationError::Integrity(format!(
                    "ward {} ('{}') references unknown settlement {}",
                    w.id, w.name, w.settlement_id
                )));
            }
            wards_by_settlement.entry(w.settlement_id).or_default().push(i);
        }

        let mut plots_by_ward: HashMap<WardId, Vec<usize>> = HashMap::new();
        for (i, p) in plots.iter().enumerate() {
            let ward = ward_idx.get(&p.ward_id).map(|&wi| &wards[wi]).ok_or_else(|| {
                LocationError::Integrity(format!(
                    "plot {} references unknown ward {}",
                    p.id, p.ward_id
                ))
            })?;
            if ward.settlement_id != p.settlement_id {
                return Err(LocationError::Integrity(format!(
                    "plot {} has settlement {} but its ward {} belongs to settlement {}",
                    p.id, p.settlement_id, ward.id, ward.settlement_id
                )));
            }
            check_coords(Level::Plot, p.id, p.latitude, p.longitude)?;
            plots_by_ward.entry(p.ward_id).or_default().push(i);
        }

        tracing::debug!(
            %source,
            districts = districts.len(),
            settlements = settlements.len(),
            wards = wards.len(),
            plots = plots.len(),
            "location store built"
        );

        Ok(Self {
            districts,
            settlements,
            wards,
            plots,
            district_idx,
            settlement_idx,
            ward_idx,
            plot_idx,
            settlements_by_district,
            wards_by_settlement,
            plots_by_ward,
            source,
            loaded_at: Utc::now(),
        })
    }

    /// All districts, ordered by code.
    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    /// All settlements, ordered by name.
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// All wards, ordered by ward number then name.
    pub fn wards(&self) -> &[Ward] {
        &self.wards
    }

    /// All plots, ordered by address.
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn district(&self, id: DistrictId) -> Option<&District> {
        self.district_idx.get(&id).map(|&i| &self.districts[i])
    }

    pub fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlement_idx.get(&id).map(|&i| &self.settlements[i])
    }

    pub fn ward(&self, id: WardId) -> Option<&Ward> {
        self.ward_idx.get(&id).map(|&i| &self.wards[i])
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plot_idx.get(&id).map(|&i| &self.plots[i])
    }

    /// Parent district of a settlement. Always present once the store is built.
    pub fn district_of(&self, settlement: &Settlement) -> Option<&District> {
        self.district(settlement.district_id)
    }

    /// Parent settlement of a ward.
    pub fn settlement_of(&self, ward: &Ward) -> Option<&Settlement> {
        self.settlement(ward.settlement_id)
    }

    /// Settlements of a district; `NotFound` if the district is unknown.
    pub fn settlements_in(
        &self,
        district_id: DistrictId,
    ) -> Result<DistrictSettlements<'_>, LocationError> {
        let district = self
            .district(district_id)
            .ok_or(LocationError::NotFound { level: Level::District, id: district_id })?;
        Ok(DistrictSettlements {
            district,
            settlements: children(&self.settlements_by_district, &self.settlements, district_id),
        })
    }

    /// Wards of a settlement together with the settlement's district.
    pub fn wards_in(
        &self,
        settlement_id: SettlementId,
    ) -> Result<SettlementWards<'_>, LocationError> {
        let settlement = self
            .settlement(settlement_id)
            .ok_or(LocationError::NotFound { level: Level::Settlement, id: settlement_id })?;
        let district = self.district_of(settlement).ok_or_else(|| {
            LocationError::Integrity(format!("settlement {} lost its district", settlement.id))
        })?;
        Ok(SettlementWards {
            settlement,
            district,
            wards: children(&self.wards_by_settlement, &self.wards, settlement_id),
        })
    }

    /// Plots of a ward.
    pub fn plots_in(&self, ward_id: WardId) -> Result<Vec<&Plot>, LocationError> {
        if self.ward(ward_id).is_none() {
            return Err(LocationError::NotFound { level: Level::Ward, id: ward_id });
        }
        Ok(children(&self.plots_by_ward, &self.plots, ward_id))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            districts: self.districts.len(),
            settlements: self.settlements.len(),
            wards: self.wards.len(),
            plots: self.plots.len(),
            source: self.source.to_string(),
            loaded_at: self.loaded_at,
        }
    }
}

fn children<'a, T>(
    by_parent: &HashMap<u32, Vec<usize>>,
    items: &'a [T],
    parent: u32,
) -> Vec<&'a T> {
    by_parent
        .get(&parent)
        .map(|idx| idx.iter().map(|&i| &items[i]).collect())
        .unwrap_or_default()
}

fn index_ids(
    level: Level,
    ids: impl Iterator<Item = u32>,
) -> Result<HashMap<u32, usize>, LocationError> {
    let mut idx = HashMap::new();
    let mut seen = HashSet::new();
    for (i, id) in ids.enumerate() {
        if !seen.insert(id) {
            return Err(LocationError::Integrity(format!("duplicate {} id {}", level, id)));
        }
        idx.insert(id, i);
    }
    Ok(idx)
}

fn check_coords(level: Level, id: u32, lat: f64, lng: f64) -> Result<(), LocationError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(LocationError::Integrity(format!(
            "{} {} has invalid coordinates ({}, {})",
            level, id, lat, lng
        )));
    }
    Ok(())
}
