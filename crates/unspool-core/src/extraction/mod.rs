//! Tar extraction engine and directory fix-up.

pub mod dirs;
pub mod engine;

pub(crate) use dirs::create_dirs;
pub use dirs::DirFixup;
pub use dirs::DirFixups;
pub use engine::ExtractionEngine;
pub use engine::extract_tar;
