use axum::{
    extract::State,
    http::header::REFRESH,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_messages::Messages;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    context::SignupContext,
    error::SignupError,
    form::{RegisterForm, PASSWORD_MISMATCH},
    registrar,
    view::{self, View},
};

const REGISTRATION_FORM_KEY: &str = "register.form";
const REGISTERED_KEY: &str = "register.registered";

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

type Result<T> = std::result::Result<T, SignupError>;

pub fn routes() -> Router<SignupContext> {
    Router::new().route("/register", get(register_form).post(register))
}

pub async fn register_form(
    State(context): State<SignupContext>,
    session: Session,
) -> Result<Response> {
    let form: RegisterForm = session
        .remove(REGISTRATION_FORM_KEY)
        .await?
        .unwrap_or_default();
    let registered = session
        .remove::<bool>(REGISTERED_KEY)
        .await?
        .unwrap_or(false);

    let view = View::new(&view::Register::new(form, &context.login_url).registered(registered))?
        .with("title", "Register");

    if registered {
        return Ok(([(REFRESH, context.login_refresh())], view).into_response());
    }

    Ok(view.into_response())
}

pub async fn register(
    State(context): State<SignupContext>,
    session: Session,
    mut messages: Messages,
    Form(input): Form<RegisterForm>,
) -> Result<Response> {
    session.remove::<bool>(REGISTERED_KEY).await?;

    if !input.passwords_match() {
        messages.error(PASSWORD_MISMATCH);
        return retry(&session, &input).await;
    }

    let errors = input.errors();
    if !errors.is_empty() {
        for error in errors {
            messages = messages.error(error);
        }
        return retry(&session, &input).await;
    }

    match context.registrar.register(&input.to_registration()).await {
        Ok(()) => {
            info!("Registration accepted ({input})");

            // Errors flashed by an earlier submit no longer apply.
            messages.for_each(drop);

            session
                .remove::<RegisterForm>(REGISTRATION_FORM_KEY)
                .await?;
            session.insert(REGISTERED_KEY, true).await?;

            Ok(Redirect::to("/register").into_response())
        }
        Err(registrar::Error::Rejected(error)) => {
            info!("Registration rejected ({input}): {error}");
            messages.error(error);
            retry(&session, &input).await
        }
        Err(e) => {
            warn!("Error registering user ({input}): {e}");
            messages.error(UNKNOWN_ERROR_MESSAGE);
            retry(&session, &input).await
        }
    }
}

/// Keep what the user typed, minus passwords, and send them back to the form.
async fn retry(session: &Session, input: &RegisterForm) -> Result<Response> {
    session
        .insert(REGISTRATION_FORM_KEY, input.without_passwords())
        .await?;

    Ok(Redirect::to("/register").into_response())
}
