//! Login page navigation state machine.
//!
//! The entry route hosts three forms: sign in, forgot password, and OTP
//! verification. [`LoginFlow`] tracks which one is showing, the inputs that
//! survive between forms (reset email, OTP digits), the loading flag, and
//! the inline error.
//!
//! The machine does no I/O. Each input returns the [`FlowCommand`]s the
//! caller must execute (send credentials, wait, write the demo session,
//! leave the page). Commands that produce a result carry the page epoch;
//! the epoch advances on every form change, so a result for a form the user
//! already left is dropped.

use std::time::Duration;

use amperex_types::{Credentials, LoginResponse};

use crate::auth::reset::{OTP_LENGTH, PasswordReset};
use crate::auth::{LOGIN_FAILED_RETRY, login_error_message, refused_login_message};
use crate::navigation::Route;

pub const INVALID_EMAIL: &str = "Please enter a valid email address";

/// Form currently shown on the entry route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPage {
    Login,
    ForgotPassword,
    OtpVerification,
}

impl LoginPage {
    pub fn title(self) -> &'static str {
        match self {
            LoginPage::Login => "Welcome Back",
            LoginPage::ForgotPassword => "Reset Password",
            LoginPage::OtpVerification => "Verify Code",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LoginPage::Login => "Sign in to your AmpereX account",
            LoginPage::ForgotPassword => "Enter your email to reset your password",
            LoginPage::OtpVerification => "Enter the verification code sent to your email",
        }
    }

    /// Label of the primary button.
    pub fn submit_label(self, loading: bool) -> &'static str {
        match (self, loading) {
            (LoginPage::Login, false) => "Login",
            (LoginPage::Login, true) => "Signing in...",
            (LoginPage::ForgotPassword, false) => "Send OTP",
            (LoginPage::ForgotPassword, true) => "Sending OTP...",
            (LoginPage::OtpVerification, false) => "Verify OTP",
            (LoginPage::OtpVerification, true) => "Verifying...",
        }
    }
}

/// Simulated server round trips of the reset branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoStep {
    SendOtp,
    VerifyOtp,
}

/// How the machine was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowExit {
    /// A session is stored; continue to `next`.
    Authenticated { next: Route },
}

/// Work the caller performs on behalf of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    /// Send the credentials to the backend, then report back through
    /// [`LoginFlow::login_finished`].
    Authenticate { epoch: u64, credentials: Credentials },
    /// Sleep, then call [`LoginFlow::delay_elapsed`].
    Delay {
        epoch: u64,
        step: DemoStep,
        duration: Duration,
    },
    /// Store [`demo_session`](crate::auth::reset::demo_session) for `email`.
    StartDemoSession { email: String },
    Exit(FlowExit),
}

/// Result of a login request as the login form sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    /// Error message to show inline.
    Rejected(String),
}

impl LoginOutcome {
    /// Maps an [`AuthService::login`](crate::auth::AuthService::login)
    /// result to what the form displays.
    ///
    /// Only a response that granted a session counts as accepted; a
    /// `success` without a token stored nothing.
    pub fn from_result(result: &anyhow::Result<LoginResponse>) -> Self {
        match result {
            Ok(response) if response.session().is_some() => LoginOutcome::Accepted,
            Ok(response) if response.success => {
                LoginOutcome::Rejected(LOGIN_FAILED_RETRY.to_string())
            }
            Ok(response) => LoginOutcome::Rejected(refused_login_message(response)),
            Err(e) => LoginOutcome::Rejected(login_error_message(e)),
        }
    }
}

/// The entry route's state machine.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    page: LoginPage,
    epoch: u64,
    loading: bool,
    error: Option<String>,
    notice: Option<String>,
    reset_email: String,
    otp: String,
    reset: PasswordReset,
    next: Route,
    exited: Option<FlowExit>,
}

impl LoginFlow {
    /// Starts on the sign-in form. `return_to` is where a successful sign-in
    /// lands when it is a protected route; otherwise the dashboard.
    pub fn new(reset: PasswordReset, return_to: Option<Route>) -> Self {
        Self {
            page: LoginPage::Login,
            epoch: 0,
            loading: false,
            error: None,
            notice: None,
            reset_email: String::new(),
            otp: String::new(),
            reset,
            next: return_to
                .filter(|route| route.is_protected())
                .unwrap_or(Route::Dashboard),
            exited: None,
        }
    }

    pub fn page(&self) -> LoginPage {
        self.page
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn reset_email(&self) -> &str {
        &self.reset_email
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn next_route(&self) -> Route {
        self.next
    }

    /// Changes where a successful sign-in lands. Non-protected routes are
    /// ignored.
    pub fn retarget(&mut self, route: Route) {
        if route.is_protected() {
            self.next = route;
        }
    }

    pub fn exit(&self) -> Option<FlowExit> {
        self.exited
    }

    pub fn title(&self) -> &'static str {
        self.page.title()
    }

    pub fn description(&self) -> &'static str {
        self.page.description()
    }

    pub fn submit_label(&self) -> &'static str {
        self.page.submit_label(self.loading)
    }

    /// Whether the primary button accepts a press right now.
    pub fn can_submit(&self) -> bool {
        if self.loading || self.exited.is_some() {
            return false;
        }
        match self.page {
            LoginPage::OtpVerification => self.otp.len() == OTP_LENGTH,
            LoginPage::Login | LoginPage::ForgotPassword => true,
        }
    }

    fn goto(&mut self, page: LoginPage) {
        tracing::debug!(from = ?self.page, to = ?page, "login page change");
        self.page = page;
        self.epoch += 1;
        self.loading = false;
        self.error = None;
        self.notice = None;
    }

    fn finish(&mut self) -> FlowCommand {
        let exit = FlowExit::Authenticated { next: self.next };
        self.exited = Some(exit);
        FlowCommand::Exit(exit)
    }

    /// Sign-in form submitted.
    pub fn submit_login(&mut self, credentials: Credentials) -> Vec<FlowCommand> {
        if self.page != LoginPage::Login || !self.can_submit() {
            return vec![];
        }
        if let Err(message) = credentials.validate() {
            self.error = Some(message.to_string());
            return vec![];
        }
        self.loading = true;
        self.notice = None;
        vec![FlowCommand::Authenticate {
            epoch: self.epoch,
            credentials,
        }]
    }

    /// Result of a [`FlowCommand::Authenticate`].
    pub fn login_finished(&mut self, epoch: u64, outcome: LoginOutcome) -> Vec<FlowCommand> {
        if epoch != self.epoch || self.page != LoginPage::Login || !self.loading {
            tracing::debug!(epoch, current = self.epoch, "dropping stale login result");
            return vec![];
        }
        self.loading = false;
        match outcome {
            LoginOutcome::Accepted => vec![self.finish()],
            LoginOutcome::Rejected(message) => {
                self.error = Some(message);
                vec![]
            }
        }
    }

    /// "Forgot password?" from the sign-in form.
    pub fn forgot_password(&mut self) {
        if self.page == LoginPage::Login {
            self.goto(LoginPage::ForgotPassword);
        }
    }

    /// Reset-email form submitted.
    pub fn submit_email(&mut self, email: &str) -> Vec<FlowCommand> {
        if self.page != LoginPage::ForgotPassword || !self.can_submit() {
            return vec![];
        }
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            self.error = Some(INVALID_EMAIL.to_string());
            return vec![];
        }
        self.reset_email = email.to_string();
        self.loading = true;
        vec![FlowCommand::Delay {
            epoch: self.epoch,
            step: DemoStep::SendOtp,
            duration: self.reset.delay,
        }]
    }

    pub fn push_otp_digit(&mut self, c: char) {
        if self.page == LoginPage::OtpVerification
            && c.is_ascii_digit()
            && self.otp.len() < OTP_LENGTH
        {
            self.otp.push(c);
        }
    }

    pub fn pop_otp_digit(&mut self) {
        if self.page == LoginPage::OtpVerification {
            self.otp.pop();
        }
    }

    /// Replaces the OTP input, keeping at most six digits.
    pub fn set_otp(&mut self, code: &str) {
        if self.page != LoginPage::OtpVerification {
            return;
        }
        self.otp = code
            .chars()
            .filter(char::is_ascii_digit)
            .take(OTP_LENGTH)
            .collect();
    }

    /// OTP form submitted. Ignored until six digits are entered.
    pub fn submit_otp(&mut self) -> Vec<FlowCommand> {
        if self.page != LoginPage::OtpVerification || !self.can_submit() {
            return vec![];
        }
        self.loading = true;
        self.notice = None;
        vec![FlowCommand::Delay {
            epoch: self.epoch,
            step: DemoStep::VerifyOtp,
            duration: self.reset.delay,
        }]
    }

    /// A [`FlowCommand::Delay`] ran out.
    pub fn delay_elapsed(&mut self, epoch: u64, step: DemoStep) -> Vec<FlowCommand> {
        if epoch != self.epoch || !self.loading {
            tracing::debug!(epoch, current = self.epoch, ?step, "dropping stale timer");
            return vec![];
        }
        match (step, self.page) {
            (DemoStep::SendOtp, LoginPage::ForgotPassword) => {
                self.goto(LoginPage::OtpVerification);
                self.otp.clear();
                vec![]
            }
            (DemoStep::VerifyOtp, LoginPage::OtpVerification) => {
                self.loading = false;
                if self.reset.accepts(&self.otp) {
                    let email = self.reset_email.clone();
                    vec![FlowCommand::StartDemoSession { email }, self.finish()]
                } else {
                    self.error = Some(self.reset.invalid_code_message());
                    vec![]
                }
            }
            _ => vec![],
        }
    }

    /// Back link: OTP form to email form, email form to sign-in form.
    pub fn back(&mut self) {
        match self.page {
            LoginPage::OtpVerification => {
                self.goto(LoginPage::ForgotPassword);
                self.otp.clear();
            }
            LoginPage::ForgotPassword => self.goto(LoginPage::Login),
            LoginPage::Login => {}
        }
    }

    /// "Resend OTP": nothing is sent, the hint is repeated.
    pub fn resend_otp(&mut self) {
        if self.page == LoginPage::OtpVerification {
            self.error = None;
            self.notice = Some(self.reset.resent_notice());
        }
    }
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new(PasswordReset::default(), None)
    }
}
