pub mod batch_checker;
pub mod coincidence;
pub mod filters;
pub mod flag_summary;
pub mod quality_rules;

pub use batch_checker::BatchChecker;
pub use coincidence::{
    filter_within_time_range, CoincidenceMatcher, CoincidenceSummary, GridCoincidenceResolver,
};
pub use filters::{filter_by_datetime, filter_by_flags, filter_by_hour, filter_flagged};
pub use flag_summary::{all_attributes, value_counts, FlagSummary};
pub use quality_rules::{BoundingBoxLand, LandClassifier, LatLonBox, QualityRules};
