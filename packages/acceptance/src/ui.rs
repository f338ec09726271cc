//! Element catalog for the todolist pages
//!
//! Each function returns a [`Target`] whose first candidate is a stable
//! semantic locator (a `data-testid` the frontend can add without touching
//! layout, or the link's visible text). The positional XPath recorded against
//! the current layout stays as the last resort.

use crate::locator::{Locator, Target};

pub const GET_STARTED_NAME: &str = "get started button";
pub const GET_STARTED_XPATH: &str =
    "//*[@id=\"root\"]/div[2]/main/div/main/section/div/div/div[2]/a/button";

pub const SIGN_UP_LINK_NAME: &str = "sign up link";
pub const SIGN_UP_LINK_TEXT: &str = "Sign up";

pub const USERNAME_NAME: &str = "username input";
pub const USERNAME_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/div[1]/input";

pub const FIRST_NAME_NAME: &str = "first name input";
pub const FIRST_NAME_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/div[2]/div/input";

pub const LAST_NAME_NAME: &str = "last name input";
pub const LAST_NAME_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/div[3]/div/input";

pub const EMAIL_NAME: &str = "email input";
pub const EMAIL_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/div[4]/div/input";

pub const PASSWORD_NAME: &str = "password input";
pub const PASSWORD_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/input[2]";

pub const SUBMIT_NAME: &str = "sign up submit button";
pub const SUBMIT_XPATH: &str = "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/button";

pub const ACCOUNT_MESSAGE_NAME: &str = "account message";
pub const ACCOUNT_MESSAGE_XPATH: &str =
    "/html/body/div[1]/div/div[2]/div[2]/div[3]/div[2]/div/form/p[1]";

pub fn get_started_button() -> Target {
    Target::new(GET_STARTED_NAME, Locator::test_id("get-started"))
        .or(Locator::xpath(GET_STARTED_XPATH))
}

/// Matched by exact link text only.
pub fn sign_up_link() -> Target {
    Target::new(SIGN_UP_LINK_NAME, Locator::link_text(SIGN_UP_LINK_TEXT))
}

pub fn username_input() -> Target {
    Target::new(USERNAME_NAME, Locator::test_id("sign-up-username")).or(Locator::xpath(USERNAME_XPATH))
}

pub fn first_name_input() -> Target {
    Target::new(FIRST_NAME_NAME, Locator::test_id("sign-up-given-name"))
        .or(Locator::xpath(FIRST_NAME_XPATH))
}

pub fn last_name_input() -> Target {
    Target::new(LAST_NAME_NAME, Locator::test_id("sign-up-family-name"))
        .or(Locator::xpath(LAST_NAME_XPATH))
}

pub fn email_input() -> Target {
    Target::new(EMAIL_NAME, Locator::test_id("sign-up-email")).or(Locator::xpath(EMAIL_XPATH))
}

pub fn password_input() -> Target {
    Target::new(PASSWORD_NAME, Locator::test_id("sign-up-password")).or(Locator::xpath(PASSWORD_XPATH))
}

pub fn sign_up_submit() -> Target {
    Target::new(SUBMIT_NAME, Locator::test_id("sign-up-submit")).or(Locator::xpath(SUBMIT_XPATH))
}

/// First paragraph of the sign-up form.
///
/// The form renders both its confirmation and its "user already exists"
/// error here, so presence alone does not say which one appeared.
pub fn account_message() -> Target {
    Target::new(ACCOUNT_MESSAGE_NAME, Locator::test_id("sign-up-message"))
        .or(Locator::xpath(ACCOUNT_MESSAGE_XPATH))
}

/// Values typed into the sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpDetails {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl SignUpDetails {
    /// The fixed account used by "provide valid information,".
    pub fn valid() -> Self {
        Self {
            username: "test".to_string(),
            first_name: "User".to_string(),
            last_name: "Test".to_string(),
            email: "teste@gmail.com".to_string(),
            password: "Teste-122".to_string(),
        }
    }

    /// Field targets paired with their values, in the order they are typed.
    pub fn fields(&self) -> [(Target, &str); 5] {
        [
            (username_input(), self.username.as_str()),
            (first_name_input(), self.first_name.as_str()),
            (last_name_input(), self.last_name.as_str()),
            (email_input(), self.email.as_str()),
            (password_input(), self.password.as_str()),
        ]
    }
}
