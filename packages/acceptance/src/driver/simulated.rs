//! In-memory browser
//!
//! [`SimulatedBrowser`] models the pages of the todolist application closely
//! enough to run every step without Chrome: elements render after a delay
//! (as they do after client-side hydration), clicks navigate or reveal other
//! elements, and every navigation, click and keystroke is written to a shared
//! [`Journal`] that tests can inspect after the session is gone.
//!
//! Timing uses `tokio::time`, so tests on a paused clock are deterministic.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use super::{BrowserDriver, ElementState, Launcher};
use crate::config::AcceptanceConfig;
use crate::error::{AcceptanceError, Result};
use crate::locator::Locator;
use crate::ui;

/// One observable browser interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    Click(String),
    SendKeys { element: String, text: String },
    Quit,
}

/// Shared, append-only record of [`Action`]s.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Action>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not hide recorded actions, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<Action>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, action: Action) {
        self.lock().push(action);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().clone()
    }

    /// Names of clicked elements, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// `(element, text)` for every keystroke batch, in order.
    pub fn keystrokes(&self) -> Vec<(String, String)> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::SendKeys { element, text } => Some((element, text)),
                _ => None,
            })
            .collect()
    }
}

/// What clicking an element does.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClickEffect {
    #[default]
    Nothing,
    /// Client-side route change to an absolute URL
    Navigate(String),
    /// Start rendering the named elements on the same page
    Reveal(Vec<&'static str>),
}

/// Blueprint of one element on a simulated page.
#[derive(Debug, Clone)]
pub struct SimElement {
    pub name: &'static str,
    pub locator: Locator,
    pub render_delay: Duration,
    pub revealed_by_click: bool,
    pub hidden: bool,
    pub enabled: bool,
    pub on_click: ClickEffect,
}

impl SimElement {
    /// A visible, enabled element present as soon as the page loads.
    pub fn new(name: &'static str, locator: Locator) -> Self {
        Self {
            name,
            locator,
            render_delay: Duration::ZERO,
            revealed_by_click: false,
            hidden: false,
            enabled: true,
            on_click: ClickEffect::Nothing,
        }
    }

    /// Appear this long after the page load (or reveal).
    pub fn render_after(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Absent until another element's click reveals it.
    pub fn revealed_later(mut self) -> Self {
        self.revealed_by_click = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = effect;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimPage {
    pub elements: Vec<SimElement>,
}

impl SimPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: SimElement) -> Self {
        self.elements.push(element);
        self
    }
}

/// URL to page model. Unknown URLs load as empty pages.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSite {
    pages: HashMap<String, SimPage>,
}

impl SimulatedSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, page: SimPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// The todolist landing page and hosted login / sign-up page.
    ///
    /// Elements only answer to the positional XPaths and link text the live
    /// application exposes; it has no `data-testid` attributes yet.
    pub fn todolist(config: &AcceptanceConfig) -> Self {
        let form_field = |name: &'static str, xpath: &'static str| {
            SimElement::new(name, Locator::xpath(xpath))
                .render_after(Duration::from_millis(200))
                .revealed_later()
        };

        let landing = SimPage::new().with(
            SimElement::new(ui::GET_STARTED_NAME, Locator::xpath(ui::GET_STARTED_XPATH))
                .render_after(Duration::from_millis(300))
                .on_click(ClickEffect::Navigate(config.login_sign_up_url.clone())),
        );

        let login = SimPage::new()
            .with(
                SimElement::new(ui::SIGN_UP_LINK_NAME, Locator::link_text(ui::SIGN_UP_LINK_TEXT))
                    .on_click(ClickEffect::Reveal(vec![
                        ui::USERNAME_NAME,
                        ui::FIRST_NAME_NAME,
                        ui::LAST_NAME_NAME,
                        ui::EMAIL_NAME,
                        ui::PASSWORD_NAME,
                        ui::SUBMIT_NAME,
                    ])),
            )
            .with(form_field(ui::USERNAME_NAME, ui::USERNAME_XPATH))
            .with(form_field(ui::FIRST_NAME_NAME, ui::FIRST_NAME_XPATH))
            .with(form_field(ui::LAST_NAME_NAME, ui::LAST_NAME_XPATH))
            .with(form_field(ui::EMAIL_NAME, ui::EMAIL_XPATH))
            .with(form_field(ui::PASSWORD_NAME, ui::PASSWORD_XPATH))
            .with(
                form_field(ui::SUBMIT_NAME, ui::SUBMIT_XPATH)
                    .on_click(ClickEffect::Reveal(vec![ui::ACCOUNT_MESSAGE_NAME])),
            )
            .with(
                SimElement::new(ui::ACCOUNT_MESSAGE_NAME, Locator::xpath(ui::ACCOUNT_MESSAGE_XPATH))
                    .render_after(Duration::from_millis(500))
                    .revealed_later(),
            );

        Self::new()
            .with_page(config.landing_url.clone(), landing)
            .with_page(config.login_sign_up_url.clone(), login)
    }
}

/// Handle to an element on the page that was loaded when it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimElementRef {
    load_id: u64,
    index: usize,
    name: &'static str,
}

impl fmt::Display for SimElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
struct BrowserState {
    url: String,
    load_id: u64,
    loaded_at: Instant,
    revealed_at: HashMap<usize, Instant>,
    values: HashMap<usize, String>,
    closed: bool,
}

pub struct SimulatedBrowser {
    site: Arc<SimulatedSite>,
    journal: Journal,
    state: Mutex<BrowserState>,
}

impl SimulatedBrowser {
    pub fn new(site: Arc<SimulatedSite>, journal: Journal) -> Self {
        Self {
            site,
            journal,
            state: Mutex::new(BrowserState {
                url: "about:blank".to_string(),
                load_id: 0,
                loaded_at: Instant::now(),
                revealed_at: HashMap::new(),
                values: HashMap::new(),
                closed: false,
            }),
        }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Current text of an input, by element name.
    pub fn value_of(&self, name: &str) -> Option<String> {
        let state = self.state.lock().ok()?;
        let page = self.site.pages.get(&state.url)?;
        let index = page.elements.iter().position(|e| e.name == name)?;
        state.values.get(&index).cloned()
    }

    fn state(&self) -> Result<MutexGuard<'_, BrowserState>> {
        let state = self
            .state
            .lock()
            .map_err(|e| AcceptanceError::Browser(format!("simulated browser lock poisoned: {e}")))?;
        if state.closed {
            return Err(AcceptanceError::Browser("browser has been closed".into()));
        }
        Ok(state)
    }

    fn load(&self, state: &mut BrowserState, url: &str) {
        state.url = url.to_string();
        state.load_id += 1;
        state.loaded_at = Instant::now();
        state.revealed_at.clear();
        state.values.clear();
    }

    fn page<'a>(&'a self, state: &BrowserState) -> Option<&'a SimPage> {
        self.site.pages.get(&state.url)
    }

    fn rendered(state: &BrowserState, index: usize, element: &SimElement) -> bool {
        let since = if element.revealed_by_click {
            match state.revealed_at.get(&index) {
                Some(at) => *at,
                None => return false,
            }
        } else {
            state.loaded_at
        };
        Instant::now() >= since + element.render_delay
    }

    /// First rendered element answering to `locator`.
    fn lookup(&self, state: &BrowserState, locator: &Locator) -> Option<(usize, &SimElement)> {
        self.page(state)?
            .elements
            .iter()
            .enumerate()
            .find(|(index, e)| e.locator == *locator && Self::rendered(state, *index, e))
    }

    fn resolve<'a>(&'a self, state: &BrowserState, element: &SimElementRef) -> Result<&'a SimElement> {
        let stale = || AcceptanceError::Browser(format!("stale element reference: {}", element));
        if element.load_id != state.load_id {
            return Err(stale());
        }
        self.page(state)
            .and_then(|p| p.elements.get(element.index))
            .ok_or_else(stale)
    }
}

#[async_trait]
impl BrowserDriver for SimulatedBrowser {
    type Element = SimElementRef;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state()?;
        self.load(&mut state, url);
        self.journal.record(Action::Navigate(url.to_string()));
        debug!(url, "simulated navigation");
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state()?.url.clone())
    }

    async fn element_state(&self, locator: &Locator) -> Result<ElementState> {
        let state = self.state()?;
        Ok(match self.lookup(&state, locator) {
            Some((_, e)) => ElementState {
                present: true,
                visible: !e.hidden,
                enabled: e.enabled,
            },
            None => ElementState::ABSENT,
        })
    }

    async fn find_element(&self, locator: &Locator) -> Result<SimElementRef> {
        let state = self.state()?;
        self.lookup(&state, locator)
            .map(|(index, e)| SimElementRef {
                load_id: state.load_id,
                index,
                name: e.name,
            })
            .ok_or_else(|| AcceptanceError::LocatorNotFound {
                target: locator.to_string(),
            })
    }

    async fn click(&self, element: &SimElementRef) -> Result<()> {
        let mut state = self.state()?;
        let sim = self.resolve(&state, element)?;
        if sim.hidden || !sim.enabled {
            return Err(AcceptanceError::Browser(format!(
                "element not interactable: {}",
                element
            )));
        }
        let effect = sim.on_click.clone();
        self.journal.record(Action::Click(element.name.to_string()));

        match effect {
            ClickEffect::Nothing => {}
            ClickEffect::Navigate(url) => self.load(&mut state, &url),
            ClickEffect::Reveal(names) => {
                let now = Instant::now();
                let indices: Vec<usize> = self
                    .page(&state)
                    .map(|p| {
                        p.elements
                            .iter()
                            .enumerate()
                            .filter(|(_, e)| names.contains(&e.name))
                            .map(|(i, _)| i)
                            .collect()
                    })
                    .unwrap_or_default();
                for index in indices {
                    state.revealed_at.entry(index).or_insert(now);
                }
            }
        }
        Ok(())
    }

    async fn send_keys(&self, element: &SimElementRef, text: &str) -> Result<()> {
        let mut state = self.state()?;
        self.resolve(&state, element)?;
        state
            .values
            .entry(element.index)
            .or_default()
            .push_str(text);
        self.journal.record(Action::SendKeys {
            element: element.name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn quit(&mut self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| AcceptanceError::Browser(format!("simulated browser lock poisoned: {e}")))?;
        if !state.closed {
            state.closed = true;
            self.journal.record(Action::Quit);
        }
        Ok(())
    }
}

/// Hands out [`SimulatedBrowser`]s that share one site and one journal.
#[derive(Debug, Clone)]
pub struct SimulatedLauncher {
    site: Arc<SimulatedSite>,
    journal: Journal,
    launches: Arc<AtomicUsize>,
    failure: Option<String>,
}

impl SimulatedLauncher {
    pub fn new(site: SimulatedSite) -> Self {
        Self {
            site: Arc::new(site),
            journal: Journal::new(),
            launches: Arc::new(AtomicUsize::new(0)),
            failure: None,
        }
    }

    /// Make every launch fail, as if no browser were installed.
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for SimulatedLauncher {
    type Driver = SimulatedBrowser;

    async fn launch(&self) -> Result<SimulatedBrowser> {
        if let Some(reason) = &self.failure {
            return Err(AcceptanceError::Launch(reason.clone()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(SimulatedBrowser::new(self.site.clone(), self.journal.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "http://localhost:8080/";

    fn browser(page: SimPage) -> SimulatedBrowser {
        let site = SimulatedSite::new().with_page(PAGE, page);
        SimulatedBrowser::new(Arc::new(site), Journal::new())
    }

    #[test]
    fn test_journal_survives_poisoned_lock() {
        let journal = Journal::new();
        journal.record(Action::Navigate(PAGE.to_string()));

        let shared = journal.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.0.lock().unwrap();
            panic!("poison the journal");
        })
        .join();
        assert!(result.is_err());
        assert!(journal.0.is_poisoned());

        journal.record(Action::Click("submit".to_string()));
        assert_eq!(
            journal.actions(),
            vec![
                Action::Navigate(PAGE.to_string()),
                Action::Click("submit".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_element_renders_after_delay() {
        let locator = Locator::css("#late");
        let browser = browser(
            SimPage::new().with(
                SimElement::new("late", locator.clone()).render_after(Duration::from_secs(2)),
            ),
        );
        browser.navigate(PAGE).await.unwrap();

        assert_eq!(browser.element_state(&locator).await.unwrap(), ElementState::ABSENT);
        assert!(matches!(
            browser.find_element(&locator).await,
            Err(AcceptanceError::LocatorNotFound { .. })
        ));

        tokio::time::advance(Duration::from_secs(2)).await;
        let state = browser.element_state(&locator).await.unwrap();
        assert!(state.present && state.visible && state.enabled);
        assert!(browser.find_element(&locator).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_reveals_elements() {
        let button = Locator::css("button");
        let message = Locator::css("p");
        let browser = browser(
            SimPage::new()
                .with(SimElement::new("button", button.clone()).on_click(ClickEffect::Reveal(vec!["message"])))
                .with(SimElement::new("message", message.clone()).revealed_later()),
        );
        browser.navigate(PAGE).await.unwrap();
        assert!(!browser.element_state(&message).await.unwrap().present);

        let element = browser.find_element(&button).await.unwrap();
        browser.click(&element).await.unwrap();
        assert!(browser.element_state(&message).await.unwrap().present);
        assert_eq!(browser.journal().clicks(), vec!["button".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_navigation_makes_handles_stale() {
        let link = Locator::link_text("Go");
        let browser = browser(SimPage::new().with(
            SimElement::new("go", link.clone())
                .on_click(ClickEffect::Navigate("http://localhost:8080/next".into())),
        ));
        browser.navigate(PAGE).await.unwrap();

        let element = browser.find_element(&link).await.unwrap();
        browser.click(&element).await.unwrap();
        assert_eq!(browser.current_url().await.unwrap(), "http://localhost:8080/next");

        let err = browser.click(&element).await.unwrap_err();
        assert!(err.to_string().contains("stale"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_keys_appends() {
        let input = Locator::css("input");
        let browser = browser(SimPage::new().with(SimElement::new("input", input.clone())));
        browser.navigate(PAGE).await.unwrap();

        let element = browser.find_element(&input).await.unwrap();
        browser.send_keys(&element, "tes").await.unwrap();
        browser.send_keys(&element, "t").await.unwrap();
        assert_eq!(browser.value_of("input").as_deref(), Some("test"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_element_cannot_be_clicked() {
        let locator = Locator::css("button");
        let browser = browser(SimPage::new().with(SimElement::new("button", locator.clone()).hidden()));
        browser.navigate(PAGE).await.unwrap();

        let state = browser.element_state(&locator).await.unwrap();
        assert!(state.present && !state.visible);
        let element = browser.find_element(&locator).await.unwrap();
        assert!(browser.click(&element).await.is_err());
    }

    #[tokio::test]
    async fn test_quit_closes_and_is_idempotent() {
        let mut browser = browser(SimPage::new());
        browser.quit().await.unwrap();
        browser.quit().await.unwrap();
        assert!(browser.current_url().await.is_err());
        assert_eq!(browser.journal().actions(), vec![Action::Quit]);
    }

    #[tokio::test]
    async fn test_failing_launcher() {
        let launcher = SimulatedLauncher::new(SimulatedSite::new()).failing("no chrome");
        assert!(matches!(launcher.launch().await, Err(AcceptanceError::Launch(_))));
        assert_eq!(launcher.launch_count(), 0);
    }
}
