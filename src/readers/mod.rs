pub mod csv_reader;
pub mod geojson_reader;
pub mod patch_reader;

pub use csv_reader::CsvReader;
pub use geojson_reader::GeoJsonReader;
pub use patch_reader::{PatchOutcome, PatchReader, PatchValueKind};
