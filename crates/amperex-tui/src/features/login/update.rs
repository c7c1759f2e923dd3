//! Login page reducer.
//!
//! Keys become [`LoginFlow`](amperex_core::login_flow::LoginFlow) inputs;
//! the flow's commands become UI effects.

use amperex_core::login_flow::{DemoStep, FlowCommand, FlowExit, LoginOutcome, LoginPage};
use amperex_types::Credentials;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::LoginState;
use crate::effects::UiEffect;

pub fn handle_key(login: &mut LoginState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('f') if ctrl => {
            login.flow.forgot_password();
            vec![]
        }
        KeyCode::Char('r') if ctrl => {
            login.flow.resend_otp();
            vec![]
        }
        KeyCode::Esc => {
            login.flow.back();
            vec![]
        }
        KeyCode::Tab | KeyCode::BackTab => {
            if login.page() == LoginPage::Login {
                login.focus = login.focus.next();
            }
            vec![]
        }
        KeyCode::Enter => submit(login),
        KeyCode::Backspace => {
            if login.page() == LoginPage::OtpVerification {
                login.flow.pop_otp_digit();
            } else if let Some(input) = login.active_input_mut() {
                input.pop();
            }
            vec![]
        }
        KeyCode::Char(c) if !ctrl => {
            if login.page() == LoginPage::OtpVerification {
                login.flow.push_otp_digit(c);
            } else if let Some(input) = login.active_input_mut() {
                input.push(c);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn submit(login: &mut LoginState) -> Vec<UiEffect> {
    let commands = match login.page() {
        LoginPage::Login => {
            let credentials = Credentials::new(login.username.trim(), login.password.clone());
            login.flow.submit_login(credentials)
        }
        LoginPage::ForgotPassword => {
            let email = login.email.clone();
            login.flow.submit_email(&email)
        }
        LoginPage::OtpVerification => login.flow.submit_otp(),
    };
    to_effects(commands)
}

pub fn handle_login_finished(
    login: &mut LoginState,
    epoch: u64,
    outcome: LoginOutcome,
) -> Vec<UiEffect> {
    let effects = to_effects(login.flow.login_finished(epoch, outcome));
    if effects.is_empty() && login.flow.error().is_some() {
        login.password.clear();
    }
    effects
}

pub fn handle_delay_elapsed(login: &mut LoginState, epoch: u64, step: DemoStep) -> Vec<UiEffect> {
    to_effects(login.flow.delay_elapsed(epoch, step))
}

fn to_effects(commands: Vec<FlowCommand>) -> Vec<UiEffect> {
    commands
        .into_iter()
        .map(|command| match command {
            FlowCommand::Authenticate { epoch, credentials } => {
                UiEffect::Authenticate { epoch, credentials }
            }
            FlowCommand::Delay {
                epoch,
                step,
                duration,
            } => UiEffect::StartDelay {
                epoch,
                step,
                duration,
            },
            FlowCommand::StartDemoSession { email } => UiEffect::StartDemoSession { email },
            FlowCommand::Exit(FlowExit::Authenticated { next }) => UiEffect::EnterRoute(next),
        })
        .collect()
}
