//! Chrome driver over the DevTools protocol
//!
//! Each launch starts its own browser process with a throwaway user data
//! directory, so scenarios never share cookies or storage.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserDriver, ElementState, Launcher};
use crate::error::{AcceptanceError, Result};
use crate::locator::{Locator, Query};

/// Find a Chrome binary: `CHROME_PATH` first, then Chrome for Testing as
/// installed by Puppeteer. `None` lets chromiumoxide auto-detect.
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CHROME_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let home = std::env::var("HOME").ok()?;
    let cache = Path::new(&home).join(".cache/puppeteer/chrome");
    let mut versions: Vec<PathBuf> = std::fs::read_dir(&cache)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    versions.sort_by(|a, b| b.cmp(a));

    versions.into_iter().find_map(|version| {
        [
            "chrome-linux64/chrome",
            "chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
            "chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing",
        ]
        .iter()
        .map(|rel| version.join(rel))
        .find(|p| p.exists())
    })
}

fn unique_user_data_dir() -> PathBuf {
    static LAUNCH_ID: AtomicU64 = AtomicU64::new(0);

    let launch_id = LAUNCH_ID.fetch_add(1, Ordering::SeqCst);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "todolist-acceptance-{}-{}-{}",
        std::process::id(),
        launch_id,
        timestamp
    ))
}

/// Launches one Chrome process per scenario.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
    executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            executable: find_chrome(),
        }
    }
}

#[async_trait]
impl Launcher for ChromeLauncher {
    type Driver = ChromeDriver;

    async fn launch(&self) -> Result<ChromeDriver> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            debug!(executable = %path.display(), "using Chrome executable");
            builder = builder.chrome_executable(path);
        }

        let user_data_dir = unique_user_data_dir();
        builder = builder.user_data_dir(&user_data_dir);

        let config = builder.build().map_err(AcceptanceError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AcceptanceError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "browser handler error");
                    break;
                }
            }
        });

        let opened = browser.new_page("about:blank").await;
        let page = match opened {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                if let Some(Err(kill)) = browser.kill().await {
                    warn!(error = %kill, "could not kill browser after failed launch");
                }
                handler.abort();
                if let Err(remove) = remove_user_data_dir(&user_data_dir) {
                    warn!(error = %remove, dir = %user_data_dir.display(), "could not remove user data dir");
                }
                return Err(AcceptanceError::Launch(e.to_string()));
            }
        };
        info!(headless = self.headless, "launched Chrome");

        Ok(ChromeDriver {
            browser,
            page,
            handler,
            user_data_dir,
            closed: false,
        })
    }
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
    closed: bool,
}

/// Remove a profile directory; a directory that is already gone is fine.
fn remove_user_data_dir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl ChromeDriver {
    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    /// First element matching `locator`, resolved through DevTools so the
    /// handle that is inspected is the handle that gets clicked.
    async fn resolve(&self, locator: &Locator) -> Result<Option<Element>> {
        // DOM.getSearchResults rejects an empty range, so check for a match first.
        let present = self
            .page
            .evaluate(presence_script(locator))
            .await?
            .into_value::<bool>()
            .map_err(|e| AcceptanceError::Browser(format!("unreadable presence check: {}", e)))?;
        if !present {
            return Ok(None);
        }

        let mut found = match locator.query() {
            Query::XPath(xpath) => self.page.find_xpaths(xpath).await?,
            Query::Css(css) => self.page.find_elements(css).await?,
        };
        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(found.swap_remove(0)))
    }
}

/// JavaScript expression evaluating to the element or `null`.
fn js_lookup(locator: &Locator) -> String {
    match locator.query() {
        Query::XPath(xpath) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            js_string(&xpath)
        ),
        Query::Css(css) => format!("document.querySelector({})", js_string(&css)),
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn presence_script(locator: &Locator) -> String {
    format!("({}) !== null", js_lookup(locator))
}

/// Called on the element itself. Mirrors Selenium's notion of displayed:
/// rendered, not hidden, non-empty box. Returns a JSON string because
/// `Runtime.callFunctionOn` hands objects back by reference.
const STATE_FN: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    const visible = style.display !== "none"
        && style.visibility !== "hidden"
        && rect.width > 0
        && rect.height > 0;
    return JSON.stringify({ present: true, visible, enabled: !this.disabled });
}"#;

#[async_trait]
impl BrowserDriver for ChromeDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await?
            .ok_or_else(|| AcceptanceError::Browser("page has no URL".into()))
    }

    async fn element_state(&self, locator: &Locator) -> Result<ElementState> {
        let Some(element) = self.resolve(locator).await? else {
            return Ok(ElementState::ABSENT);
        };
        let raw = element
            .call_js_fn(STATE_FN, false)
            .await?
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_owned))
            .ok_or_else(|| AcceptanceError::Browser("element state script returned nothing".into()))?;
        serde_json::from_str(&raw)
            .map_err(|e| AcceptanceError::Browser(format!("unreadable element state: {}", e)))
    }

    async fn find_element(&self, locator: &Locator) -> Result<Element> {
        self.resolve(locator)
            .await?
            .ok_or_else(|| AcceptanceError::LocatorNotFound {
                target: locator.to_string(),
            })
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<()> {
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Every step below runs even when an earlier one fails; the first
        // error is returned afterwards.
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            warn!(error = %e, "graceful close failed, killing browser");
            if let Some(Err(kill)) = self.browser.kill().await {
                warn!(error = %kill, "could not kill browser");
            }
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        let removed = remove_user_data_dir(&self.user_data_dir);

        closed?;
        removed?;
        info!("closed Chrome");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_lookup_xpath_is_quoted() {
        let lookup = js_lookup(&Locator::xpath("//*[@id=\"root\"]/div[2]"));
        assert_eq!(
            lookup,
            r#"document.evaluate("//*[@id=\"root\"]/div[2]", document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"#
        );
    }

    #[test]
    fn test_js_lookup_test_id_uses_query_selector() {
        let lookup = js_lookup(&Locator::test_id("sign-up-submit"));
        assert_eq!(
            lookup,
            r#"document.querySelector("[data-testid=\"sign-up-submit\"]")"#
        );
    }

    #[test]
    fn test_presence_script_compares_lookup_to_null() {
        let script = presence_script(&Locator::css("#root"));
        assert_eq!(script, r##"(document.querySelector("#root")) !== null"##);
    }

    #[test]
    fn test_remove_user_data_dir() {
        let dir = unique_user_data_dir();
        std::fs::create_dir_all(dir.join("Default")).unwrap();
        std::fs::write(dir.join("Default/Preferences"), "{}").unwrap();

        remove_user_data_dir(&dir).unwrap();
        assert!(!dir.exists());

        // Already gone: still fine, so a second cleanup is harmless.
        remove_user_data_dir(&dir).unwrap();
    }

    #[test]
    fn test_remove_user_data_dir_surfaces_other_errors() {
        let file = unique_user_data_dir();
        std::fs::write(&file, "not a directory").unwrap();

        let err = remove_user_data_dir(&file).unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);
        assert!(matches!(AcceptanceError::from(err), AcceptanceError::Io(_)));
        std::fs::remove_file(&file).unwrap();
    }

    #[test]
    fn test_user_data_dirs_are_unique() {
        assert_ne!(unique_user_data_dir(), unique_user_data_dir());
    }
}
