mod layout;
mod register;

pub use layout::*;
pub use register::*;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_messages::Messages;
use rinja::Template;
use std::collections::BTreeMap;

use crate::error::SignupError;

pub const APP_TITLE: &str = "Signup";

#[derive(Clone, Default)]
pub struct ViewData(pub BTreeMap<String, String>);

impl std::ops::DerefMut for ViewData {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl std::ops::Deref for ViewData {
    type Target = BTreeMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A rendered page body waiting to be wrapped in the layout by [`render_view`].
#[derive(Clone)]
pub struct View {
    content: String,
    data: ViewData,
}

#[derive(Clone)]
struct RenderedTemplate(String);

impl View {
    pub fn new(template: &impl Template) -> rinja::Result<Self> {
        Ok(Self {
            content: template.render()?,
            data: ViewData::default(),
        })
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        response
            .extensions_mut()
            .insert(RenderedTemplate(self.content));
        response.extensions_mut().insert(self.data);
        response
    }
}

pub async fn render_view(messages: Messages, response: Response) -> Response {
    let Some(RenderedTemplate(content)) = response.extensions().get::<RenderedTemplate>().cloned()
    else {
        return response;
    };

    let data = response
        .extensions()
        .get::<ViewData>()
        .cloned()
        .unwrap_or_default();

    let layout = Layout {
        title: data
            .get("title")
            .map(|title| format!("{title} | {APP_TITLE}"))
            .unwrap_or_else(|| APP_TITLE.to_string()),
        notices: messages.map(Notice::from).collect(),
        content,
        version_string: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown").to_string(),
    };

    let html = match layout.render() {
        Ok(html) => html,
        Err(e) => return SignupError::from(e).into_response(),
    };

    let (mut parts, _) = response.into_parts();
    parts.extensions.remove::<RenderedTemplate>();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    parts.headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    Response::from_parts(parts, Body::from(html))
}
