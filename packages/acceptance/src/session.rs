//! Per-scenario browser session
//!
//! A [`Session`] is created with the scenario and holds at most one driver.
//! The driver is exclusively owned here: nothing else keeps a handle to it,
//! and it is closed by [`Session::close`] when the scenario ends.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AcceptanceConfig;
use crate::driver::{BrowserDriver, Launcher};
use crate::error::{AcceptanceError, Result};
use crate::wait::Wait;

pub struct Session<L: Launcher> {
    config: Arc<AcceptanceConfig>,
    launcher: L,
    wait: Wait,
    driver: Option<L::Driver>,
}

impl<L: Launcher> Session<L> {
    pub fn new(config: Arc<AcceptanceConfig>, launcher: L) -> Self {
        let wait = Wait::new(config.wait_timeout, config.poll_interval);
        Self {
            config,
            launcher,
            wait,
            driver: None,
        }
    }

    pub fn config(&self) -> &AcceptanceConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn wait(&self) -> &Wait {
        &self.wait
    }

    pub fn is_started(&self) -> bool {
        self.driver.is_some()
    }

    /// Launch a fresh browser, closing any previous one first.
    pub async fn start(&mut self) -> Result<()> {
        if self.driver.is_some() {
            debug!("replacing existing browser session");
            self.close().await?;
        }
        let driver = self.launcher.launch().await?;
        self.driver = Some(driver);
        info!("browser session started");
        Ok(())
    }

    /// The active driver.
    pub fn driver(&self) -> Result<&L::Driver> {
        self.driver.as_ref().ok_or(AcceptanceError::SessionNotStarted)
    }

    /// Quit the driver if one is running. Safe to call repeatedly.
    pub async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(mut driver) => {
                let result = driver.quit().await;
                if let Err(e) = &result {
                    warn!(error = %e, "browser did not close cleanly");
                } else {
                    info!("browser session closed");
                }
                result
            }
            None => Ok(()),
        }
    }
}

impl<L: Launcher> fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("landing_url", &self.config.landing_url)
            .field("wait", &self.wait)
            .field("started", &self.driver.is_some())
            .finish()
    }
}
