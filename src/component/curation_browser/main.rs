use super::image_browser::ImageBrowser;
use super::session::CurationSession;
use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Config, UserSettings};
use crate::error::CurationError;
use crate::tools::{
    AutoSaveScheduler, ListStore, LocalFs, normalize_user_path, validate_directory_exists,
};
use anyhow::{Context, Result};
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowserAction {
    AddFolder,
    Next,
    Previous,
    AddToList,
    RemoveFromList,
    Export,
    ToggleAutoSave,
    NewList,
    SwitchList,
    Back,
}

const ACTIONS: [BrowserAction; 10] = [
    BrowserAction::Next,
    BrowserAction::Previous,
    BrowserAction::AddToList,
    BrowserAction::RemoveFromList,
    BrowserAction::AddFolder,
    BrowserAction::Export,
    BrowserAction::ToggleAutoSave,
    BrowserAction::NewList,
    BrowserAction::SwitchList,
    BrowserAction::Back,
];

impl BrowserAction {
    fn label(self) -> String {
        let label = match self {
            Self::AddFolder => t!("browser.opt_add_folder"),
            Self::Next => t!("browser.opt_next"),
            Self::Previous => t!("browser.opt_previous"),
            Self::AddToList => t!("browser.opt_add"),
            Self::RemoveFromList => t!("browser.opt_remove"),
            Self::Export => t!("browser.opt_export"),
            Self::ToggleAutoSave => t!("browser.opt_toggle_auto_save"),
            Self::NewList => t!("browser.opt_new_list"),
            Self::SwitchList => t!("browser.opt_switch_list"),
            Self::Back => t!("browser.opt_back"),
        };
        label.to_string()
    }
}

/// 畫面上方顯示的單行訊息
enum Notice {
    Info(String),
    Warning(String),
}

fn lock_session(session: &Mutex<CurationSession>) -> MutexGuard<'_, CurationSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 瀏覽圖片並標記到清單的元件
pub struct CurationBrowser {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl CurationBrowser {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 執行期間更新過的設定（最近使用的資料夾）
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.config.settings
    }

    pub fn run(&mut self, term: &Term) -> Result<()> {
        let storage_directory = self.config.settings.storage_directory();
        let session = CurationSession::open(ListStore::local(&storage_directory))
            .with_context(|| format!("無法開啟清單資料夾 {}", storage_directory.display()))?;
        info!("清單資料夾: {}", storage_directory.display());

        let session = Arc::new(Mutex::new(session));
        let auto_save_session = Arc::clone(&session);
        let mut scheduler =
            AutoSaveScheduler::start(self.config.settings.auto_save_period(), move || {
                Ok(lock_session(&auto_save_session).auto_save_tick()?)
            });

        let mut browser = ImageBrowser::new(Arc::new(LocalFs), self.config.image_types.clone());
        let mut notice: Option<Notice> = None;

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，離開瀏覽");
                break;
            }

            term.clear_screen()?;
            Self::print_header(&lock_session(&session), &browser, &scheduler);
            match notice.take() {
                Some(Notice::Info(message)) => println!("{}", style(message).green()),
                Some(Notice::Warning(message)) => println!("{}", style(message).yellow()),
                None => println!(),
            }

            let options: Vec<String> = ACTIONS.iter().map(|action| action.label()).collect();
            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("browser.prompt"))
                .items(&options)
                .default(0)
                .interact_on_opt(term)?;

            let Some(action) = selection.map(|index| ACTIONS[index]) else {
                break; // ESC
            };

            notice = match action {
                BrowserAction::Back => break,
                BrowserAction::AddFolder => self.add_folder(&mut browser)?,
                BrowserAction::Next => {
                    browser.next();
                    None
                }
                BrowserAction::Previous => {
                    browser.previous();
                    None
                }
                BrowserAction::AddToList => {
                    Some(Self::add_current(&mut lock_session(&session), &browser))
                }
                BrowserAction::RemoveFromList => {
                    Some(Self::remove_current(&mut lock_session(&session), &browser))
                }
                BrowserAction::Export => Some(Self::export(&mut lock_session(&session))),
                BrowserAction::ToggleAutoSave => {
                    scheduler.toggle();
                    None
                }
                BrowserAction::NewList => Self::new_list(term, &session)?,
                BrowserAction::SwitchList => Self::switch_list(term, &session)?,
            };
        }

        scheduler.stop();
        Self::offer_save(&mut lock_session(&session))?;
        Ok(())
    }

    fn print_header(
        session: &CurationSession,
        browser: &ImageBrowser,
        scheduler: &AutoSaveScheduler,
    ) {
        println!("{}", style(t!("browser.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());
        println!();

        let working_count = session.active_list().map_or(0, |list| list.len());
        println!(
            "  {} {} ({})",
            style(t!("browser.active_list")).dim(),
            style(session.active_name()).cyan(),
            t!(
                "browser.counts",
                working = working_count,
                saved = session.persisted_count()
            )
        );

        let auto_save = if scheduler.is_enabled() {
            let last_saved = scheduler
                .last_saved()
                .map_or_else(|| "--:--:--".to_string(), |time| time.format("%H:%M:%S").to_string());
            format!("AS: on | {last_saved}")
        } else {
            "AS: off".to_string()
        };
        println!("  {}", style(auto_save).dim());

        match browser.status_line() {
            Some(status) => {
                let marker = browser
                    .current_entry()
                    .filter(|entry| {
                        session
                            .active_list()
                            .is_ok_and(|list| list.contains(entry))
                    })
                    .map_or("", |_| " ★");
                println!("  {}{}", style(status).bold(), style(marker).yellow());
            }
            None => println!("  {}", style(t!("browser.no_images")).dim()),
        }
    }

    fn add_folder(&mut self, browser: &mut ImageBrowser) -> Result<Option<Notice>> {
        let Some(input) = self.prompt_folder()? else {
            return Ok(None);
        };
        let folder = normalize_user_path(&input);

        if let Err(e) = validate_directory_exists(&folder) {
            return Ok(Some(Notice::Warning(e.to_string())));
        }

        let folder_string = folder.to_string_lossy().into_owned();
        add_recent_path(&mut self.config.settings.recent_folders, &folder_string);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存路徑歷史: {e}");
        }

        let count = browser.add_folder(folder);
        Ok(Some(Notice::Info(
            t!("browser.folder_added", path = &folder_string, count = count).to_string(),
        )))
    }

    fn prompt_folder(&self) -> Result<Option<String>> {
        let recent_folders = &self.config.settings.recent_folders;

        if recent_folders.is_empty() {
            let path: String = Input::new()
                .with_prompt(t!("browser.folder_prompt"))
                .interact_text()?;
            return Ok(Some(path));
        }

        let mut options: Vec<String> = recent_folders
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).is_dir() { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("common.new_path").to_string());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("common.select_path"))
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_folders.len() => Ok(Some(recent_folders[idx].clone())),
            Some(_) => {
                let path: String = Input::new()
                    .with_prompt(t!("browser.folder_prompt"))
                    .interact_text()?;
                Ok(Some(path))
            }
        }
    }

    fn add_current(session: &mut CurationSession, browser: &ImageBrowser) -> Notice {
        let Some(entry) = browser.current_entry() else {
            return Notice::Warning(t!("browser.no_image_selected").to_string());
        };

        match session.add_current(&entry) {
            Ok(count) => Notice::Info(
                t!("browser.added", list = session.active_name(), count = count).to_string(),
            ),
            Err(CurationError::DuplicateEntry(_)) => {
                Notice::Warning(t!("browser.already_in_list").to_string())
            }
            Err(e) => Notice::Warning(e.to_string()),
        }
    }

    fn remove_current(session: &mut CurationSession, browser: &ImageBrowser) -> Notice {
        let Some(entry) = browser.current_entry() else {
            return Notice::Warning(t!("browser.no_image_selected").to_string());
        };

        match session.remove_current(&entry) {
            Ok(count) => Notice::Info(
                t!("browser.removed", list = session.active_name(), count = count).to_string(),
            ),
            Err(CurationError::NotFound(_)) => {
                Notice::Warning(t!("browser.not_in_list").to_string())
            }
            Err(e) => {
                warn!("移除後儲存失敗: {e}");
                Notice::Warning(e.to_string())
            }
        }
    }

    fn export(session: &mut CurationSession) -> Notice {
        match session.export_active() {
            Ok(()) => Notice::Info(
                t!(
                    "browser.exported",
                    list = session.active_name(),
                    count = session.persisted_count()
                )
                .to_string(),
            ),
            Err(CurationError::EmptyList(_)) => {
                Notice::Warning(t!("browser.export_empty").to_string())
            }
            Err(e) => {
                warn!("匯出清單失敗: {e}");
                Notice::Warning(e.to_string())
            }
        }
    }

    fn new_list(term: &Term, session: &Mutex<CurationSession>) -> Result<Option<Notice>> {
        let name: String = Input::new()
            .with_prompt(t!("browser.new_list_prompt"))
            .allow_empty(true)
            .interact_text_on(term)?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let notice = match lock_session(session).create_list(name) {
            Ok(()) => Notice::Info(t!("browser.list_created", list = name).to_string()),
            Err(e) => Notice::Warning(e.to_string()),
        };
        Ok(Some(notice))
    }

    fn switch_list(term: &Term, session: &Mutex<CurationSession>) -> Result<Option<Notice>> {
        // 選單顯示期間不持有鎖，自動儲存仍可進行
        let (names, default_index) = {
            let session = lock_session(session);
            let names: Vec<String> = session
                .list_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let default_index = names
                .iter()
                .position(|name| name == session.active_name())
                .unwrap_or(0);
            (names, default_index)
        };

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("browser.switch_prompt"))
            .items(&names)
            .default(default_index)
            .interact_on_opt(term)?;

        let Some(index) = selection else {
            return Ok(None);
        };

        let name = &names[index];
        let notice = match lock_session(session).switch_list(name) {
            Ok(count) => Notice::Info(t!("browser.switched", list = name, count = count).to_string()),
            Err(e) => Notice::Warning(e.to_string()),
        };
        Ok(Some(notice))
    }

    fn offer_save(session: &mut CurationSession) -> Result<()> {
        if !session.has_unsaved_changes() {
            return Ok(());
        }

        let confirm = Confirm::new()
            .with_prompt(t!("browser.save_on_exit"))
            .default(true)
            .interact()?;
        if !confirm {
            info!("離開時放棄未儲存的變更");
            return Ok(());
        }

        let saved = session.save_pending()?;
        println!(
            "{}",
            style(t!("browser.saved_lists", count = saved)).green()
        );
        Ok(())
    }
}
