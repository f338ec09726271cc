//! Step handlers for the landing, login and sign-up flows
//!
//! Each handler drives the session's browser through one step. Success is
//! the absence of an error; any error aborts the scenario.

use tracing::{info, instrument};

use crate::driver::{BrowserDriver, Launcher};
use crate::error::Result;
use crate::session::Session;
use crate::ui::{self, SignUpDetails};
use crate::wait::Condition;

/// "a new user,": start a fresh browser for the scenario.
#[instrument(skip_all)]
pub async fn given_new_user<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    session.start().await
}

/// "they visit the landing page"
#[instrument(skip_all)]
pub async fn visit_landing_page<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let url = session.config().landing_url.clone();
    info!(url = %url, "visiting landing page");
    session.driver()?.navigate(&url).await
}

/// "select “Get Started“ button,": wait until clickable, then click.
#[instrument(skip_all)]
pub async fn select_get_started<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let driver = session.driver()?;
    let button = session
        .wait()
        .until(driver, &ui::get_started_button(), Condition::Clickable)
        .await?;
    driver.click(&button).await
}

/// "the user should be redirected to the {page_name} page."
#[instrument(skip(session))]
pub async fn assert_redirected<L: Launcher>(session: &mut Session<L>, page_name: &str) -> Result<()> {
    let current_url = session.driver()?.current_url().await?;
    session.config().pages.assert_redirected(page_name, &current_url)?;
    info!(page = page_name, url = %current_url, "redirect confirmed");
    Ok(())
}

/// "they visit the login page"
#[instrument(skip_all)]
pub async fn visit_login_page<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let url = session.config().login_sign_up_url.clone();
    info!(url = %url, "visiting login page");
    session.driver()?.navigate(&url).await
}

/// "select the “Sign Up“ button": immediate lookup by link text, no wait.
#[instrument(skip_all)]
pub async fn select_sign_up<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let driver = session.driver()?;
    let link = ui::sign_up_link().locate(driver).await?;
    driver.click(&link).await
}

/// "provide valid information,"
///
/// Waits for the username field only; the remaining fields are expected to
/// have rendered with it and are looked up immediately. All five are located
/// before anything is typed, and the form is submitted exactly once.
#[instrument(skip_all)]
pub async fn provide_valid_information<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let details = SignUpDetails::valid();
    let driver = session.driver()?;
    let [username, first_name, last_name, email, password] = details.fields();

    let mut inputs = Vec::with_capacity(5);
    inputs.push((
        session
            .wait()
            .until(driver, &username.0, Condition::Visible)
            .await?,
        username.1,
    ));
    for (target, value) in [first_name, last_name, email, password] {
        inputs.push((target.locate(driver).await?, value));
    }

    for (input, value) in &inputs {
        driver.send_keys(input, value).await?;
    }
    info!(fields = inputs.len(), "sign-up form filled");

    let submit = ui::sign_up_submit().locate(driver).await?;
    driver.click(&submit).await
}

/// "they should be able to create an account."
///
/// Only checks that the form's message paragraph appears. The same
/// paragraph carries "account already exists", so this passes for either
/// outcome; it does not read the message text.
#[instrument(skip_all)]
pub async fn assert_account_created<L: Launcher>(session: &mut Session<L>) -> Result<()> {
    let driver = session.driver()?;
    session
        .wait()
        .until(driver, &ui::account_message(), Condition::Present)
        .await?;
    info!("account message present");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{AcceptanceConfig, DEFAULT_LANDING_URL};
    use crate::driver::simulated::{Action, ClickEffect, SimElement, SimPage, SimulatedLauncher, SimulatedSite};
    use crate::error::AcceptanceError;
    use crate::locator::Locator;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    const LOGIN: &str = "https://todolist.auth.example.com/login?client_id=abc";

    fn config() -> AcceptanceConfig {
        AcceptanceConfig::new(DEFAULT_LANDING_URL, LOGIN)
    }

    fn todolist_session() -> Session<SimulatedLauncher> {
        let config = config();
        let launcher = SimulatedLauncher::new(SimulatedSite::todolist(&config));
        Session::new(Arc::new(config), launcher)
    }

    fn session_with(site: SimulatedSite) -> Session<SimulatedLauncher> {
        Session::new(Arc::new(config()), SimulatedLauncher::new(site))
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_started_redirects_to_login() {
        let mut session = todolist_session();
        given_new_user(&mut session).await.unwrap();
        visit_landing_page(&mut session).await.unwrap();
        select_get_started(&mut session).await.unwrap();
        assert_redirected(&mut session, "login_sign_up").await.unwrap();

        let journal = session.launcher().journal();
        assert_eq!(
            journal.actions(),
            vec![
                Action::Navigate(DEFAULT_LANDING_URL.to_string()),
                Action::Click(ui::GET_STARTED_NAME.to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_started_clicks_only_after_render() {
        let site = SimulatedSite::new().with_page(
            DEFAULT_LANDING_URL,
            SimPage::new().with(
                SimElement::new(ui::GET_STARTED_NAME, Locator::xpath(ui::GET_STARTED_XPATH))
                    .render_after(Duration::from_secs(4))
                    .on_click(ClickEffect::Navigate(LOGIN.to_string())),
            ),
        );
        let mut session = session_with(site);
        given_new_user(&mut session).await.unwrap();
        visit_landing_page(&mut session).await.unwrap();

        let started = Instant::now();
        select_get_started(&mut session).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert_eq!(session.launcher().journal().clicks().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_started_times_out() {
        let mut session = session_with(SimulatedSite::new());
        given_new_user(&mut session).await.unwrap();
        visit_landing_page(&mut session).await.unwrap();

        let err = select_get_started(&mut session).await.unwrap_err();
        assert!(matches!(err, AcceptanceError::WaitTimeout { .. }));
        assert!(session.launcher().journal().clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_mismatch_fails() {
        let mut session = todolist_session();
        given_new_user(&mut session).await.unwrap();
        visit_landing_page(&mut session).await.unwrap();

        let err = assert_redirected(&mut session, "login_sign_up").await.unwrap_err();
        assert!(matches!(err, AcceptanceError::AssertionFailed(_)));

        let err = assert_redirected(&mut session, "settings").await.unwrap_err();
        assert!(matches!(err, AcceptanceError::UnknownPage(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_up_flow() {
        let mut session = todolist_session();
        given_new_user(&mut session).await.unwrap();
        visit_login_page(&mut session).await.unwrap();
        select_sign_up(&mut session).await.unwrap();
        provide_valid_information(&mut session).await.unwrap();
        assert_account_created(&mut session).await.unwrap();

        let journal = session.launcher().journal();
        assert_eq!(
            journal.keystrokes(),
            vec![
                (ui::USERNAME_NAME.to_string(), "test".to_string()),
                (ui::FIRST_NAME_NAME.to_string(), "User".to_string()),
                (ui::LAST_NAME_NAME.to_string(), "Test".to_string()),
                (ui::EMAIL_NAME.to_string(), "teste@gmail.com".to_string()),
                (ui::PASSWORD_NAME.to_string(), "Teste-122".to_string()),
            ]
        );
        assert_eq!(
            journal.clicks(),
            vec![ui::SIGN_UP_LINK_NAME.to_string(), ui::SUBMIT_NAME.to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_up_link_is_not_awaited() {
        let site = SimulatedSite::new().with_page(
            LOGIN,
            SimPage::new().with(
                SimElement::new(ui::SIGN_UP_LINK_NAME, Locator::link_text("Sign up"))
                    .render_after(Duration::from_millis(100)),
            ),
        );
        let mut session = session_with(site);
        given_new_user(&mut session).await.unwrap();
        visit_login_page(&mut session).await.unwrap();

        let err = select_sign_up(&mut session).await.unwrap_err();
        assert!(matches!(err, AcceptanceError::LocatorNotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_field_types_nothing() {
        // Sign-up form without the email field.
        let field = |name: &'static str, xpath: &'static str| SimElement::new(name, Locator::xpath(xpath));
        let site = SimulatedSite::new().with_page(
            LOGIN,
            SimPage::new()
                .with(field(ui::USERNAME_NAME, ui::USERNAME_XPATH))
                .with(field(ui::FIRST_NAME_NAME, ui::FIRST_NAME_XPATH))
                .with(field(ui::LAST_NAME_NAME, ui::LAST_NAME_XPATH))
                .with(field(ui::PASSWORD_NAME, ui::PASSWORD_XPATH))
                .with(field(ui::SUBMIT_NAME, ui::SUBMIT_XPATH)),
        );
        let mut session = session_with(site);
        given_new_user(&mut session).await.unwrap();
        visit_login_page(&mut session).await.unwrap();

        let err = provide_valid_information(&mut session).await.unwrap_err();
        assert!(err.to_string().contains(ui::EMAIL_NAME), "{err}");
        let journal = session.launcher().journal();
        assert!(journal.keystrokes().is_empty());
        assert!(journal.clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_username_times_out_before_typing() {
        let field = |name: &'static str, xpath: &'static str| SimElement::new(name, Locator::xpath(xpath));
        let site = SimulatedSite::new().with_page(
            LOGIN,
            SimPage::new()
                .with(field(ui::USERNAME_NAME, ui::USERNAME_XPATH).hidden())
                .with(field(ui::FIRST_NAME_NAME, ui::FIRST_NAME_XPATH))
                .with(field(ui::LAST_NAME_NAME, ui::LAST_NAME_XPATH))
                .with(field(ui::EMAIL_NAME, ui::EMAIL_XPATH))
                .with(field(ui::PASSWORD_NAME, ui::PASSWORD_XPATH))
                .with(field(ui::SUBMIT_NAME, ui::SUBMIT_XPATH)),
        );
        let mut session = session_with(site);
        given_new_user(&mut session).await.unwrap();
        visit_login_page(&mut session).await.unwrap();

        let started = Instant::now();
        let err = provide_valid_information(&mut session).await.unwrap_err();
        assert!(
            matches!(err, AcceptanceError::WaitTimeout { ref target, .. } if target.contains(ui::USERNAME_NAME)),
            "{err}"
        );
        assert!(started.elapsed() >= session.config().wait_timeout);

        let journal = session.launcher().journal();
        assert!(journal.keystrokes().is_empty());
        assert!(journal.clicks().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_message_must_appear() {
        let mut session = todolist_session();
        given_new_user(&mut session).await.unwrap();
        visit_login_page(&mut session).await.unwrap();
        select_sign_up(&mut session).await.unwrap();

        // Form never submitted, so the message never renders.
        let err = assert_account_created(&mut session).await.unwrap_err();
        assert!(matches!(err, AcceptanceError::WaitTimeout { .. }));
    }

    #[tokio::test]
    async fn test_steps_require_a_session() {
        let mut session = todolist_session();
        let err = visit_landing_page(&mut session).await.unwrap_err();
        assert!(matches!(err, AcceptanceError::SessionNotStarted));
    }

    #[tokio::test]
    async fn test_launch_failure_propagates() {
        let config = config();
        let launcher = SimulatedLauncher::new(SimulatedSite::new()).failing("chrome not found");
        let mut session = Session::new(Arc::new(config), launcher);

        let err = given_new_user(&mut session).await.unwrap_err();
        assert!(matches!(err, AcceptanceError::Launch(_)));
        assert!(!session.is_started());
    }
}
