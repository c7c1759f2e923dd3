use amperex_core::auth::reset::PasswordReset;
use amperex_core::login_flow::{LoginFlow, LoginPage};
use amperex_core::navigation::Route;

/// Focusable text input on the sign-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        }
    }
}

/// The login machine plus the raw text of its inputs.
#[derive(Debug, Clone)]
pub struct LoginState {
    pub flow: LoginFlow,
    pub username: String,
    pub password: String,
    pub email: String,
    pub focus: Field,
}

impl LoginState {
    pub fn new(reset: PasswordReset, return_to: Option<Route>) -> Self {
        Self {
            flow: LoginFlow::new(reset, return_to),
            username: String::new(),
            password: String::new(),
            email: String::new(),
            focus: Field::Username,
        }
    }

    pub fn page(&self) -> LoginPage {
        self.flow.page()
    }

    /// The text input receiving keystrokes, if the page has one.
    pub fn active_input_mut(&mut self) -> Option<&mut String> {
        match self.flow.page() {
            LoginPage::Login => Some(match self.focus {
                Field::Username => &mut self.username,
                Field::Password => &mut self.password,
            }),
            LoginPage::ForgotPassword => Some(&mut self.email),
            LoginPage::OtpVerification => None,
        }
    }
}
