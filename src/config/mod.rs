pub mod load;
pub mod save;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    BucketRule, BucketRuleTable, Config, DEFAULT_AUTO_SAVE_SECONDS, ImageTypeTable, Language,
    MAX_RECENT_PATHS, STORAGE_FOLDER_NAME, UserSettings,
};
