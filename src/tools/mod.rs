mod auto_save;
mod curation_list;
mod file_system;
mod list_store;
#[cfg(test)]
mod memory_fs;
mod path_classifier;
mod path_validator;

pub use auto_save::{AutoSaveScheduler, AutoSaveState};
pub use curation_list::{CurationList, DEFAULT_LIST_NAME};
pub use file_system::{FileSystem, LocalFs};
pub use list_store::{LIST_EXTENSION, ListStore, validate_list_name};
#[cfg(test)]
pub use memory_fs::MemoryFs;
pub use path_classifier::PathClassifier;
pub use path_validator::{normalize_user_path, validate_directory_exists};
