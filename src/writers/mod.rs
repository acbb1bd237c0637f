pub mod patch_writer;

pub use patch_writer::PatchWriter;
