//! Browser driver abstraction
//!
//! Steps talk to the browser only through [`BrowserDriver`], so the same
//! step code drives a real Chrome ([`chrome`]) or the in-memory model of the
//! application ([`simulated`]).

pub mod chrome;
pub mod simulated;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AcceptanceConfig, DriverKind};
use crate::error::{AcceptanceError, Result};
use crate::locator::Locator;

pub use chrome::{ChromeDriver, ChromeLauncher};
pub use simulated::{Action, Journal, SimulatedBrowser, SimulatedLauncher, SimulatedSite};

/// Snapshot of an element as seen by a wait condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub present: bool,
    pub visible: bool,
    pub enabled: bool,
}

impl ElementState {
    pub const ABSENT: ElementState = ElementState {
        present: false,
        visible: false,
        enabled: false,
    };
}

/// Operations the steps need from a browser.
///
/// `find_element` is an immediate lookup and fails with
/// [`AcceptanceError::LocatorNotFound`]; `element_state` never fails for an
/// absent element, which is what lets waits poll it.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    async fn element_state(&self, locator: &Locator) -> Result<ElementState>;

    async fn find_element(&self, locator: &Locator) -> Result<Self::Element>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<()>;

    /// Close the browser. Calling it twice is not an error.
    async fn quit(&mut self) -> Result<()>;
}

/// Produces a fresh driver for each scenario.
#[async_trait]
pub trait Launcher: Send + Sync {
    type Driver: BrowserDriver;

    async fn launch(&self) -> Result<Self::Driver>;
}

/// Either driver, chosen at runtime from [`DriverKind`].
pub enum AnyDriver {
    Chrome(ChromeDriver),
    Simulated(SimulatedBrowser),
}

pub enum AnyElement {
    Chrome(chromiumoxide::Element),
    Simulated(simulated::SimElementRef),
}

fn foreign_element() -> AcceptanceError {
    AcceptanceError::Browser("element handle belongs to a different driver".into())
}

#[async_trait]
impl BrowserDriver for AnyDriver {
    type Element = AnyElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        match self {
            AnyDriver::Chrome(d) => d.navigate(url).await,
            AnyDriver::Simulated(d) => d.navigate(url).await,
        }
    }

    async fn current_url(&self) -> Result<String> {
        match self {
            AnyDriver::Chrome(d) => d.current_url().await,
            AnyDriver::Simulated(d) => d.current_url().await,
        }
    }

    async fn element_state(&self, locator: &Locator) -> Result<ElementState> {
        match self {
            AnyDriver::Chrome(d) => d.element_state(locator).await,
            AnyDriver::Simulated(d) => d.element_state(locator).await,
        }
    }

    async fn find_element(&self, locator: &Locator) -> Result<AnyElement> {
        match self {
            AnyDriver::Chrome(d) => d.find_element(locator).await.map(AnyElement::Chrome),
            AnyDriver::Simulated(d) => d.find_element(locator).await.map(AnyElement::Simulated),
        }
    }

    async fn click(&self, element: &AnyElement) -> Result<()> {
        match (self, element) {
            (AnyDriver::Chrome(d), AnyElement::Chrome(e)) => d.click(e).await,
            (AnyDriver::Simulated(d), AnyElement::Simulated(e)) => d.click(e).await,
            _ => Err(foreign_element()),
        }
    }

    async fn send_keys(&self, element: &AnyElement, text: &str) -> Result<()> {
        match (self, element) {
            (AnyDriver::Chrome(d), AnyElement::Chrome(e)) => d.send_keys(e, text).await,
            (AnyDriver::Simulated(d), AnyElement::Simulated(e)) => d.send_keys(e, text).await,
            _ => Err(foreign_element()),
        }
    }

    async fn quit(&mut self) -> Result<()> {
        match self {
            AnyDriver::Chrome(d) => d.quit().await,
            AnyDriver::Simulated(d) => d.quit().await,
        }
    }
}

/// Launcher for [`AnyDriver`].
pub enum AnyLauncher {
    Chrome(ChromeLauncher),
    Simulated(SimulatedLauncher),
}

impl AnyLauncher {
    /// Pick the launcher named by `config.driver`.
    ///
    /// The simulated site is built from the configured URLs so redirect
    /// assertions line up with the page registry.
    pub fn from_config(config: &AcceptanceConfig) -> Self {
        match config.driver {
            DriverKind::Chrome => AnyLauncher::Chrome(ChromeLauncher::new(config.headless)),
            DriverKind::Simulated => {
                AnyLauncher::Simulated(SimulatedLauncher::new(SimulatedSite::todolist(config)))
            }
        }
    }
}

#[async_trait]
impl Launcher for AnyLauncher {
    type Driver = AnyDriver;

    async fn launch(&self) -> Result<AnyDriver> {
        match self {
            AnyLauncher::Chrome(l) => l.launch().await.map(AnyDriver::Chrome),
            AnyLauncher::Simulated(l) => l.launch().await.map(AnyDriver::Simulated),
        }
    }
}
