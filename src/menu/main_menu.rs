use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::{run_curation_browser, run_list_materializer};
use crate::tools::normalize_user_path;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_browse"),
        t!("main_menu.opt_materialize"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_curation_browser(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_list_materializer(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_auto_save"),
            t!("settings.opt_storage"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_auto_save_menu(term, config)?,
            Some(1) => show_storage_menu(term, config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 自動儲存週期設定
fn show_auto_save_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.auto_save.title")).cyan().bold());
    println!(
        "\n{} {}",
        style(t!("settings.auto_save.current")).dim(),
        config.settings.auto_save_interval_secs
    );
    println!();

    let seconds: u64 = Input::new()
        .with_prompt(t!("settings.auto_save.prompt"))
        .default(config.settings.auto_save_interval_secs)
        .validate_with(|input: &u64| -> Result<(), String> {
            if (1..=3600).contains(input) {
                Ok(())
            } else {
                Err(t!("settings.auto_save.invalid").to_string())
            }
        })
        .interact_text_on(term)?;

    if seconds != config.settings.auto_save_interval_secs {
        config.settings.auto_save_interval_secs = seconds;
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), seconds);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 清單存放資料夾設定，留空則回到預設位置
fn show_storage_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.storage.title")).cyan().bold());
    println!(
        "\n{} {}",
        style(t!("settings.storage.current")).dim(),
        config.settings.storage_directory().display()
    );
    println!("{}", style(t!("settings.storage.hint")).dim());
    println!();

    let input: String = Input::new()
        .with_prompt(t!("settings.storage.prompt"))
        .allow_empty(true)
        .interact_text_on(term)?;

    let normalized = normalize_user_path(&input);
    let storage_directory =
        (!normalized.as_os_str().is_empty()).then(|| normalized.to_string_lossy().into_owned());

    if storage_directory != config.settings.storage_directory {
        config.settings.storage_directory = storage_directory;
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            config.settings.storage_directory().display()
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = [Language::EnUs, Language::ZhTw];

    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
