use std::borrow::Cow;

use derive_masked::DebugMasked;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrorsKind};

use crate::{registrar::Registration, state::State};

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Fields posted by the registration page. Missing fields deserialize as empty strings.
#[derive(Validate, Serialize, Deserialize, DebugMasked, Display, Clone, Default, PartialEq, Eq)]
#[display("Name: {full_name} Email: {email} Role: {role} State: {state} Password: REDACTED")]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(email(message = "Email provided is not valid"))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(
        min = 1,
        max = 12,
        message = "Aadhar number must be between 1 and 12 characters"
    ))]
    pub aadhar: String,

    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(custom(function = "validate_state"))]
    pub state: String,

    #[validate(length(min = 1, message = "Pincode is required"))]
    pub pincode: String,

    #[masked]
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,

    #[masked]
    confirm_password: String,
}

fn validate_state(state: &str) -> Result<(), ValidationError> {
    if State::is_known(state) {
        return Ok(());
    }

    Err(ValidationError::new("state").with_message(Cow::from("Please select a state")))
}

impl RegisterForm {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_passwords(&mut self, password: &str, confirm_password: &str) -> &mut Self {
        self.password = password.to_string();
        self.confirm_password = confirm_password.to_string();
        self
    }

    /// Copy of the form safe to keep around for re-display.
    pub fn without_passwords(&self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self.clone()
        }
    }

    /// Validation messages for every failing field, ordered by field name.
    pub fn errors(&self) -> Vec<String> {
        let Err(validation) = self.validate() else {
            return vec![];
        };

        let mut fields: Vec<_> = validation.into_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut messages = vec![];
        for (_, info) in fields {
            if let ValidationErrorsKind::Field(errors) = info {
                for error in errors {
                    messages.push(error.to_string());
                }
            }
        }

        messages
    }

    pub fn to_registration(&self) -> Registration {
        Registration {
            email: self.email.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
            phone: self.phone.clone(),
            aadhar: self.aadhar.clone(),
            role: self.role.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
        }
    }
}
