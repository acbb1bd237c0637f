pub mod cloud_cover;
pub mod flags;
pub mod grid;
pub mod observation;
pub mod protocol;

pub use cloud_cover::{
    bin_cloud_fraction, category_to_midpoint, fraction_to_category, CloudCover, MidpointTable,
};
pub use flags::{FlagCode, FlagSet};
pub use grid::{GridDescriptor, GridIndex, GriddedField};
pub use observation::{ObservationRecord, ObservationRecordBuilder, Origin, RawValue};
pub use protocol::Protocol;
