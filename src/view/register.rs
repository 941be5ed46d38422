use rinja::Template;

use crate::{form::RegisterForm, state::State};

pub const REGISTERED_MESSAGE: &str = "Registration successful! Redirecting...";

pub struct StateOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct Register {
    pub form: RegisterForm,
    pub login_url: String,
    pub states: Vec<StateOption>,
    pub registered: bool,
    pub registered_message: &'static str,
}

impl Register {
    pub fn new(form: RegisterForm, login_url: &str) -> Self {
        let states = State::names()
            .map(|name| StateOption {
                name,
                selected: form.state == name,
            })
            .collect();

        Self {
            form,
            login_url: login_url.to_string(),
            states,
            registered: false,
            registered_message: REGISTERED_MESSAGE,
        }
    }

    pub fn registered(mut self, registered: bool) -> Self {
        self.registered = registered;
        self
    }
}
