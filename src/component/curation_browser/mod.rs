//! 圖片瀏覽與標記元件
//!
//! 逐張瀏覽資料夾中的圖片，把選中的圖片加入具名清單，並可定時自動儲存

mod image_browser;
mod main;
mod session;

pub use image_browser::ImageBrowser;
pub use main::CurationBrowser;
pub use session::CurationSession;
