//! Location subsystem for the property marketplace.
//!
//! A static District → Settlement → Ward → Plot hierarchy with parent-scoped
//! lookups, ranked search, exact-match resolution, cascading selection and
//! distance math.

pub mod cascade;
pub mod dataset;
pub mod geo;
pub mod resolver;
pub mod search;
pub mod sequence;
pub mod store;
pub mod types;

pub use cascade::{CascadeController, LocationSelection, Selection};
pub use dataset::{Dataset, DatasetSource};
pub use geo::{
    format_coords, haversine, project_to_box, Bounds, BoxPoint, DistanceEngine, BOTSWANA_BOUNDS,
};
pub use resolver::ExactMatchResolver;
pub use search::{GroupedResults, MatchKind, SearchIndex, SearchScope, DEFAULT_LIMIT};
pub use sequence::RequestSequencer;
pub use store::LocationStore;
pub use types::{District, Level, LocationError, Plot, ResolvedEntity, SearchType, Settlement, Ward};
