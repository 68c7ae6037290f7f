use crate::component::{CurationBrowser, ListMaterializer};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_curation_browser(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut browser = CurationBrowser::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = browser.run(term) {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
    }
    config.settings = browser.settings().clone();

    pause(term)?;
    Ok(())
}

pub fn run_list_materializer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut materializer = ListMaterializer::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = materializer.run() {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
    }
    config.settings = materializer.settings().clone();

    pause(term)?;
    Ok(())
}
