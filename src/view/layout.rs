use axum_messages::{Level, Message};
use rinja::Template;

#[derive(Template)]
#[template(path = "layout.html")]
pub struct Layout {
    pub title: String,
    pub notices: Vec<Notice>,
    pub content: String,
    pub version_string: String,
}

/// A flash message ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub class: &'static str,
    pub text: String,
}

impl From<Message> for Notice {
    fn from(message: Message) -> Self {
        let class = match message.level {
            Level::Error => "notice-error",
            Level::Success => "notice-success",
            Level::Warning => "notice-warning",
            _ => "notice-info",
        };

        Self {
            class,
            text: message.message,
        }
    }
}
