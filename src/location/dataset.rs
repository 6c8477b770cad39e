//! Reference dataset: the built-in Botswana hierarchy and JSON file loading.
//!
//! The built-in tables are compiled into the binary so the subsystem works
//! with no files present. A JSON file with the same four collections can
//! replace them at startup.

use super::types::{District, LocationError, Plot, Settlement, Ward};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The four raw entity collections, before integrity checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub districts: Vec<District>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
    #[serde(default)]
    pub wards: Vec<Ward>,
    #[serde(default)]
    pub plots: Vec<Plot>,
}

/// Where a dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Dataset {
    /// The compiled-in Botswana reference data.
    pub fn builtin() -> Self {
        Self {
            districts: BUILTIN_DISTRICTS
                .iter()
                .map(|d| District {
                    id: d.id,
                    code: d.code.to_string(),
                    name: d.name.to_string(),
                    kind: "district".to_string(),
                    region: d.region.to_string(),
                    population: d.population,
                    area_km2: d.area_km2,
                })
                .collect(),
            settlements: BUILTIN_SETTLEMENTS
                .iter()
                .map(|s| Settlement {
                    id: s.id,
                    district_id: s.district,
                    name: s.name.to_string(),
                    kind: s.kind.to_string(),
                    population: s.population,
                    is_major: s.is_major,
                    latitude: s.lat,
                    longitude: s.lng,
                    post_code: None,
                })
                .collect(),
            wards: BUILTIN_WARDS
                .iter()
                .map(|w| Ward {
                    id: w.id,
                    settlement_id: w.settlement,
                    name: w.name.to_string(),
                    ward_number: w.number,
                    constituency: w.constituency.to_string(),
                    population: w.population,
                })
                .collect(),
            plots: BUILTIN_PLOTS
                .iter()
                .map(|p| Plot {
                    id: p.id,
                    ward_id: p.ward,
                    settlement_id: p.settlement,
                    full_address: p.address.to_string(),
                    latitude: p.lat,
                    longitude: p.lng,
                })
                .collect(),
        }
    }

    /// Parse a dataset from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a dataset file. Read and parse failures are returned, never
    /// replaced by the built-in data.
    pub fn load_from(path: &Path) -> Result<Self, LocationError> {
        let data = fs::read_to_string(path).map_err(|e| LocationError::Dataset {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&data).map_err(|e| LocationError::Dataset {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

// ─── Built-in tables ────────────────────────────────────────────

struct BuiltinDistrict {
    id: u32,
    code: &'static str,
    name: &'static str,
    region: &'static str,
    population: u64,
    area_km2: f64,
}

struct BuiltinSettlement {
    id: u32,
    district: u32,
    name: &'static str,
    kind: &'static str,
    population: u64,
    is_major: bool,
    lat: f64,
    lng: f64,
}

struct BuiltinWard {
    id: u32,
    settlement: u32,
    name: &'static str,
    number: u32,
    constituency: &'static str,
    population: Option<u64>,
}

struct BuiltinPlot {
    id: u32,
    ward: u32,
    settlement: u32,
    address: &'static str,
    lat: f64,
    lng: f64,
}

const BUILTIN_DISTRICTS: &[BuiltinDistrict] = &[
    BuiltinDistrict { id: 1, code: "CE", name: "Central", region: "Central", population: 576_064, area_km2: 147_730.0 },
    BuiltinDistrict { id: 2, code: "CH", name: "Chobe", region: "North", population: 23_347, area_km2: 20_800.0 },
    BuiltinDistrict { id: 3, code: "GH", name: "Ghanzi", region: "West", population: 43_355, area_km2: 117_910.0 },
    BuiltinDistrict { id: 4, code: "KG", name: "Kgalagadi", region: "South-West", population: 50_752, area_km2: 105_200.0 },
    BuiltinDistrict { id: 5, code: "KL", name: "Kgatleng", region: "South", population: 91_660, area_km2: 7_960.0 },
    BuiltinDistrict { id: 6, code: "KW", name: "Kweneng", region: "South", population: 304_549, area_km2: 31_100.0 },
    BuiltinDistrict { id: 7, code: "NE", name: "North-East", region: "North", population: 60_264, area_km2: 5_120.0 },
    BuiltinDistrict { id: 8, code: "NW", name: "North-West", region: "North", population: 152_284, area_km2: 129_930.0 },
    BuiltinDistrict { id: 9, code: "SE", name: "South-East", region: "South", population: 85_014, area_km2: 1_780.0 },
    BuiltinDistrict { id: 10, code: "SO", name: "Southern", region: "South", population: 197_767, area_km2: 28_470.0 },
];

const BUILTIN_SETTLEMENTS: &[BuiltinSettlement] = &[
    // South-East
    BuiltinSettlement { id: 101, district: 9, name: "Gaborone", kind: "city", population: 231_592, is_major: true, lat: -24.6282, lng: 25.9231 },
    BuiltinSettlement { id: 102, district: 9, name: "Tlokweng", kind: "village", population: 36_323, is_major: false, lat: -24.6667, lng: 25.9667 },
    BuiltinSettlement { id: 103, district: 9, name: "Ramotswa", kind: "village", population: 30_000, is_major: false, lat: -24.8717, lng: 25.8697 },
    BuiltinSettlement { id: 104, district: 9, name: "Lobatse", kind: "town", population: 29_007, is_major: true, lat: -25.2244, lng: 25.6806 },
    BuiltinSettlement { id: 105, district: 9, name: "Otse", kind: "village", population: 6_000, is_major: false, lat: -25.0167, lng: 25.7333 },
    // Kweneng
    BuiltinSettlement { id: 106, district: 6, name: "Molepolole", kind: "village", population: 66_466, is_major: true, lat: -24.4067, lng: 25.4951 },
    BuiltinSettlement { id: 107, district: 6, name: "Mogoditshane", kind: "village", population: 58_079, is_major: false, lat: -24.6269, lng: 25.8656 },
    BuiltinSettlement { id: 108, district: 6, name: "Gabane", kind: "village", population: 14_842, is_major: false, lat: -24.6667, lng: 25.7833 },
    BuiltinSettlement { id: 109, district: 6, name: "Thamaga", kind: "village", population: 21_471, is_major: false, lat: -24.6700, lng: 25.5400 },
    BuiltinSettlement { id: 110, district: 6, name: "Letlhakeng", kind: "village", population: 7_229, is_major: false, lat: -24.0944, lng: 25.0297 },
    // North-East
    BuiltinSettlement { id: 111, district: 7, name: "Francistown", kind: "city", population: 98_961, is_major: true, lat: -21.1700, lng: 27.5078 },
    BuiltinSettlement { id: 112, district: 7, name: "Masunga", kind: "village", population: 5_000, is_major: false, lat: -20.6244, lng: 27.4486 },
    BuiltinSettlement { id: 113, district: 7, name: "Tati Siding", kind: "village", population: 7_000, is_major: false, lat: -21.2500, lng: 27.4700 },
    // Central
    BuiltinSettlement { id: 114, district: 1, name: "Serowe", kind: "village", population: 50_820, is_major: true, lat: -22.3875, lng: 26.7108 },
    BuiltinSettlement { id: 115, district: 1, name: "Palapye", kind: "village", population: 37_256, is_major: true, lat: -22.5461, lng: 27.1251 },
    BuiltinSettlement { id: 116, district: 1, name: "Mahalapye", kind: "village", population: 43_289, is_major: true, lat: -23.1041, lng: 26.8142 },
    BuiltinSettlement { id: 117, district: 1, name: "Selebi-Phikwe", kind: "town", population: 49_411, is_major: true, lat: -21.9789, lng: 27.8434 },
    BuiltinSettlement { id: 118, district: 1, name: "Letlhakane", kind: "village", population: 22_911, is_major: false, lat: -21.4167, lng: 25.5833 },
    BuiltinSettlement { id: 119, district: 1, name: "Orapa", kind: "town", population: 9_531, is_major: false, lat: -21.3115, lng: 25.3774 },
    BuiltinSettlement { id: 120, district: 1, name: "Bobonong", kind: "village", population: 19_838, is_major: false, lat: -21.9667, lng: 28.4333 },
    BuiltinSettlement { id: 121, district: 1, name: "Tonota", kind: "village", population: 20_000, is_major: false, lat: -21.4417, lng: 27.4614 },
    // North-West
    BuiltinSettlement { id: 122, district: 8, name: "Maun", kind: "village", population: 60_263, is_major: true, lat: -19.9833, lng: 23.4167 },
    BuiltinSettlement { id: 123, district: 8, name: "Shakawe", kind: "village", population: 6_990, is_major: false, lat: -18.3650, lng: 21.8436 },
    BuiltinSettlement { id: 124, district: 8, name: "Gumare", kind: "village", population: 7_000, is_major: false, lat: -19.3667, lng: 22.1500 },
    // Chobe
    BuiltinSettlement { id: 125, district: 2, name: "Kasane", kind: "town", population: 9_000, is_major: true, lat: -17.8167, lng: 25.1500 },
    BuiltinSettlement { id: 126, district: 2, name: "Kazungula", kind: "village", population: 4_000, is_major: false, lat: -17.7950, lng: 25.2600 },
    // Ghanzi
    BuiltinSettlement { id: 127, district: 3, name: "Ghanzi", kind: "town", population: 14_809, is_major: true, lat: -21.6961, lng: 21.6461 },
    BuiltinSettlement { id: 128, district: 3, name: "Charles Hill", kind: "village", population: 3_000, is_major: false, lat: -22.3167, lng: 20.0833 },
    // Kgalagadi
    BuiltinSettlement { id: 129, district: 4, name: "Tsabong", kind: "village", population: 8_939, is_major: true, lat: -26.0500, lng: 22.4000 },
    BuiltinSettlement { id: 130, district: 4, name: "Hukuntsi", kind: "village", population: 4_000, is_major: false, lat: -23.9973, lng: 21.7800 },
    // Kgatleng
    BuiltinSettlement { id: 131, district: 5, name: "Mochudi", kind: "village", population: 44_815, is_major: true, lat: -24.4167, lng: 26.1500 },
    BuiltinSettlement { id: 132, district: 5, name: "Oodi", kind: "village", population: 5_000, is_major: false, lat: -24.5600, lng: 26.0200 },
    BuiltinSettlement { id: 133, district: 5, name: "Artesia", kind: "village", population: 3_000, is_major: false, lat: -24.0000, lng: 26.3000 },
    // Southern
    BuiltinSettlement { id: 134, district: 10, name: "Kanye", kind: "village", population: 47_007, is_major: true, lat: -24.9667, lng: 25.3333 },
    BuiltinSettlement { id: 135, district: 10, name: "Jwaneng", kind: "town", population: 18_008, is_major: true, lat: -24.6017, lng: 24.7281 },
    BuiltinSettlement { id: 136, district: 10, name: "Moshupa", kind: "village", population: 20_000, is_major: false, lat: -24.7667, lng: 25.4167 },
];

const BUILTIN_WARDS: &[BuiltinWard] = &[
    // Gaborone
    BuiltinWard { id: 1001, settlement: 101, name: "Block 3", number: 1, constituency: "Gaborone Central", population: Some(9_000) },
    BuiltinWard { id: 1002, settlement: 101, name: "Block 5", number: 2, constituency: "Gaborone Central", population: Some(8_500) },
    BuiltinWard { id: 1003, settlement: 101, name: "Block 6", number: 3, constituency: "Gaborone North", population: Some(7_200) },
    BuiltinWard { id: 1004, settlement: 101, name: "Block 8", number: 4, constituency: "Gaborone North", population: Some(12_000) },
    BuiltinWard { id: 1005, settlement: 101, name: "Broadhurst", number: 5, constituency: "Gaborone North", population: Some(25_000) },
    BuiltinWard { id: 1006, settlement: 101, name: "Extension 2", number: 6, constituency: "Gaborone Central", population: None },
    BuiltinWard { id: 1007, settlement: 101, name: "Village", number: 7, constituency: "Gaborone South", population: Some(15_000) },
    BuiltinWard { id: 1008, settlement: 101, name: "Gaborone West", number: 8, constituency: "Gaborone Bonnington South", population: Some(30_000) },
    BuiltinWard { id: 1009, settlement: 101, name: "Phakalane", number: 9, constituency: "Gaborone North", population: Some(8_000) },
    BuiltinWard { id: 1010, settlement: 101, name: "Old Naledi", number: 10, constituency: "Gaborone South", population: Some(20_000) },
    // Mogoditshane
    BuiltinWard { id: 1011, settlement: 107, name: "Block 8", number: 1, constituency: "Mogoditshane", population: Some(7_000) },
    BuiltinWard { id: 1012, settlement: 107, name: "Ledumang", number: 2, constituency: "Mogoditshane", population: None },
    BuiltinWard { id: 1013, settlement: 107, name: "Mmopane Block 1", number: 3, constituency: "Mogoditshane", population: None },
    // Tlokweng
    BuiltinWard { id: 1014, settlement: 102, name: "Tlokweng Centre", number: 1, constituency: "Tlokweng", population: Some(11_000) },
    // Francistown
    BuiltinWard { id: 1015, settlement: 111, name: "Area W", number: 1, constituency: "Francistown East", population: Some(6_000) },
    BuiltinWard { id: 1016, settlement: 111, name: "Monarch", number: 2, constituency: "Francistown South", population: Some(14_000) },
    BuiltinWard { id: 1017, settlement: 111, name: "Somerset East", number: 3, constituency: "Francistown East", population: None },
    BuiltinWard { id: 1018, settlement: 111, name: "Gerald Estates", number: 4, constituency: "Francistown West", population: Some(5_500) },
    BuiltinWard { id: 1019, settlement: 111, name: "Block 5", number: 5, constituency: "Francistown West", population: Some(9_800) },
    BuiltinWard { id: 1020, settlement: 111, name: "Satellite", number: 6, constituency: "Francistown West", population: None },
    // Maun
    BuiltinWard { id: 1021, settlement: 122, name: "Boseja", number: 1, constituency: "Maun East", population: Some(10_000) },
    BuiltinWard { id: 1022, settlement: 122, name: "Disaneng", number: 2, constituency: "Maun West", population: None },
    BuiltinWard { id: 1023, settlement: 122, name: "Sedie", number: 3, constituency: "Maun East", population: Some(8_000) },
    // Molepolole
    BuiltinWard { id: 1024, settlement: 106, name: "Borakalalo", number: 1, constituency: "Molepolole North", population: None },
    BuiltinWard { id: 1025, settlement: 106, name: "Ntloolengwae", number: 2, constituency: "Molepolole South", population: None },
    // Lobatse
    BuiltinWard { id: 1026, settlement: 104, name: "Peleng", number: 1, constituency: "Lobatse", population: Some(9_000) },
    BuiltinWard { id: 1027, settlement: 104, name: "Woodhall", number: 2, constituency: "Lobatse", population: Some(4_000) },
];

const BUILTIN_PLOTS: &[BuiltinPlot] = &[
    BuiltinPlot { id: 10001, ward: 1004, settlement: 101, address: "Plot 2871, Block 8, Gaborone", lat: -24.6150, lng: 25.9350 },
    BuiltinPlot { id: 10002, ward: 1005, settlement: 101, address: "Plot 10231, Broadhurst, Gaborone", lat: -24.6300, lng: 25.9400 },
    BuiltinPlot { id: 10003, ward: 1008, settlement: 101, address: "Plot 17950, Gaborone West, Gaborone", lat: -24.6545, lng: 25.9086 },
    BuiltinPlot { id: 10004, ward: 1011, settlement: 107, address: "Plot 5540, Block 8, Mogoditshane", lat: -24.6350, lng: 25.8700 },
    BuiltinPlot { id: 10005, ward: 1019, settlement: 111, address: "Plot 1203, Block 5, Francistown", lat: -21.1650, lng: 27.5000 },
    BuiltinPlot { id: 10006, ward: 1016, settlement: 111, address: "Plot 771, Monarch, Francistown", lat: -21.1900, lng: 27.5100 },
    BuiltinPlot { id: 10007, ward: 1021, settlement: 122, address: "Plot 389, Boseja, Maun", lat: -19.9900, lng: 23.4300 },
    BuiltinPlot { id: 10008, ward: 1009, settlement: 101, address: "Plot 45012, Phakalane, Gaborone", lat: -24.5650, lng: 25.9630 },
    BuiltinPlot { id: 10009, ward: 1026, settlement: 104, address: "Plot 2201, Peleng, Lobatse", lat: -25.2300, lng: 25.6700 },
];
