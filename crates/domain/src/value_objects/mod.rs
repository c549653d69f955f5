//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod history_entry_id;
mod poi_category;
mod user_id;

pub use geo_location::GeoLocation;
pub use history_entry_id::HistoryEntryId;
pub use poi_category::PoiCategory;
pub use user_id::UserId;
