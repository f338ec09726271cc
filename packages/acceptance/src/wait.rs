//! Bounded polling waits
//!
//! Used before touching elements that the application renders
//! asynchronously. A wait polls every candidate locator of a [`Target`]
//! until the condition holds or the timeout elapses; there is no retry
//! beyond the bound.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
use crate::driver::{BrowserDriver, ElementState};
use crate::error::{AcceptanceError, Result};
use crate::locator::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Attached to the DOM
    Present,
    /// Present and displayed
    Visible,
    /// Visible and enabled
    Clickable,
}

impl Condition {
    pub fn is_met(self, state: ElementState) -> bool {
        match self {
            Condition::Present => state.present,
            Condition::Visible => state.present && state.visible,
            Condition::Clickable => state.present && state.visible && state.enabled,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present => write!(f, "present"),
            Condition::Visible => write!(f, "visible"),
            Condition::Clickable => write!(f, "clickable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Wait {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

impl Wait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Poll until `target` satisfies `condition`, then return the element.
    ///
    /// Absence is polled through; any other driver error ends the wait
    /// immediately.
    pub async fn until<D: BrowserDriver>(
        &self,
        driver: &D,
        target: &Target,
        condition: Condition,
    ) -> Result<D::Element> {
        let started = Instant::now();
        let deadline = started + self.timeout;

        loop {
            for (index, locator) in target.candidates.iter().enumerate() {
                if !condition.is_met(driver.element_state(locator).await?) {
                    continue;
                }
                match driver.find_element(locator).await {
                    Ok(element) => {
                        if index > 0 {
                            warn!(target_name = target.name, %locator, "waited on fallback locator");
                        }
                        debug!(
                            target_name = target.name,
                            %condition,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "wait satisfied"
                        );
                        return Ok(element);
                    }
                    // Detached between state check and lookup; poll again.
                    Err(AcceptanceError::LocatorNotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(AcceptanceError::WaitTimeout {
                    target: target.to_string(),
                    condition: condition.to_string(),
                    timeout: self.timeout,
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
