use anyhow::{Context as _, Result};
use phonecheck_config::{AppConfig, PageConfig, PageLocation};
use phonecheck_source::StaticPage;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod expected;
pub mod extract;
pub mod normalize;
pub mod verify;

pub struct Context<'a> {
    pub json: bool,
    pub config: &'a AppConfig,
}

impl Context<'_> {
    pub fn expected_path(&self, custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(|| self.config.expected_csv.clone())
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub fn open_page(ctx: &Context<'_>, page: &PageConfig) -> Result<StaticPage> {
    match &page.location {
        PageLocation::File(path) => open_file_page(&page.name, path),
        PageLocation::Url(url) => fetch_url_page(ctx, &page.name, url.as_str()),
    }
}

pub fn open_file_page(name: &str, path: &Path) -> Result<StaticPage> {
    StaticPage::from_file(name, path).with_context(|| format!("open page {}", path.display()))
}

#[cfg(feature = "http")]
pub fn fetch_url_page(ctx: &Context<'_>, name: &str, url: &str) -> Result<StaticPage> {
    phonecheck_source::html::fetch_page(name, url, ctx.config.user_agent.as_deref())
        .with_context(|| format!("fetch page {url}"))
}

#[cfg(not(feature = "http"))]
pub fn fetch_url_page(_ctx: &Context<'_>, _name: &str, url: &str) -> Result<StaticPage> {
    Err(anyhow::anyhow!(
        "cannot fetch {url}: phonecheck was built without the http feature"
    ))
}
