use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, REFRESH, SET_COOKIE},
        HeaderMap, Request, StatusCode,
    },
    Router,
};
use signup::{
    app,
    controller::register::UNKNOWN_ERROR_MESSAGE,
    registrar::{self, MemoryRegistrar, Registrar, Registration},
    view::REGISTERED_MESSAGE,
    SignupContext,
};
use tower::ServiceExt as _;
use tower_sessions::cookie::Key;

#[derive(Clone, Default)]
struct RecordingRegistrar {
    calls: Arc<Mutex<Vec<Registration>>>,
    outcome: Option<fn() -> registrar::Error>,
}

impl RecordingRegistrar {
    fn failing(outcome: fn() -> registrar::Error) -> Self {
        Self {
            outcome: Some(outcome),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Registration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registrar for RecordingRegistrar {
    async fn register(&self, registration: &Registration) -> registrar::Result<()> {
        self.calls.lock().unwrap().push(registration.clone());
        match self.outcome {
            Some(outcome) => Err(outcome()),
            None => Ok(()),
        }
    }
}

/// Drives the router like a browser that keeps the session cookie.
struct Browser {
    router: Router,
    cookie: Option<String>,
}

struct Page {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Browser {
    fn new(registrar: impl Registrar + 'static) -> Self {
        let context = SignupContext::new(registrar).with_redirect_delay(Duration::from_secs(2));

        Self {
            router: app(context, Key::generate()),
            cookie: None,
        }
    }

    async fn send(&mut self, mut request: Request<Body>) -> Page {
        if let Some(ref cookie) = self.cookie {
            request
                .headers_mut()
                .insert(COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Page {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn submit(&mut self, fields: &[(&str, &str)]) -> Page {
        let body = fields
            .iter()
            .map(|(name, value)| format!("{name}={}", encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            Request::post("/register")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

fn encode(value: &str) -> String {
    value.replace('@', "%40").replace(' ', "+")
}

fn fields<'a>(password: &'a str, confirm_password: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("fullName", "Asha Rao"),
        ("email", "asha@example.com"),
        ("phone", "9876543210"),
        ("aadhar", "123412341234"),
        ("role", "farmer"),
        ("city", "Mysuru"),
        ("state", "Tamil Nadu"),
        ("pincode", "600001"),
        ("password", password),
        ("confirmPassword", confirm_password),
    ]
}

fn assert_redirects_to_form(page: &Page) {
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.headers.get(LOCATION).unwrap(), "/register");
}

#[tokio::test]
async fn renders_empty_form() {
    let mut browser = Browser::new(RecordingRegistrar::default());

    let page = browser.get("/register").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.headers.get(REFRESH).is_none());
    assert!(page.body.contains("<title>Register | Signup</title>"));
    assert!(page.body.contains("Create Your Account"));
    assert!(page.body.contains("Already have an account? Login"));
    assert_eq!(page.body.matches("<option ").count(), 30);
}

#[tokio::test]
async fn password_mismatch_never_reaches_registrar() {
    let registrar = RecordingRegistrar::default();
    let mut browser = Browser::new(registrar.clone());

    let page = browser.submit(&fields("hunter22", "hunter23")).await;
    assert_redirects_to_form(&page);
    assert!(registrar.calls().is_empty());

    let page = browser.get("/register").await;
    assert!(page.body.contains("Passwords do not match"));
    assert!(page.body.contains(r#"value="Asha Rao""#));
    assert!(page.body.contains(r#"<option value="Tamil Nadu" selected>"#));
    assert!(!page.body.contains("hunter2"));
    assert!(!page.body.contains(REGISTERED_MESSAGE));
    assert!(page.headers.get(REFRESH).is_none());
}

#[tokio::test]
async fn missing_fields_never_reach_registrar() {
    let registrar = RecordingRegistrar::default();
    let mut browser = Browser::new(registrar.clone());

    let page = browser
        .submit(&[("fullName", "Asha Rao"), ("password", "x"), ("confirmPassword", "x")])
        .await;
    assert_redirects_to_form(&page);
    assert!(registrar.calls().is_empty());

    let page = browser.get("/register").await;
    assert!(page.body.contains("Email provided is not valid"));
    assert!(page.body.contains("Pincode is required"));
    assert!(page.body.contains("Please select a state"));
}

#[tokio::test]
async fn success_clears_form_and_sends_to_login_after_delay() {
    let registrar = RecordingRegistrar::default();
    let mut browser = Browser::new(registrar.clone());

    let page = browser.submit(&fields("hunter22", "hunter22")).await;
    assert_redirects_to_form(&page);

    let calls = registrar.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].full_name, "Asha Rao");
    assert_eq!(calls[0].email, "asha@example.com");
    assert_eq!(calls[0].state, "Tamil Nadu");
    assert_eq!(calls[0].password, "hunter22");

    let page = browser.get("/register").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.headers.get(REFRESH).unwrap(), "2; url=/login");
    assert!(page.body.contains(REGISTERED_MESSAGE));
    assert!(!page.body.contains(r#"value="Asha Rao""#));

    // The redirect only fires once.
    let page = browser.get("/register").await;
    assert!(page.headers.get(REFRESH).is_none());
    assert!(!page.body.contains(REGISTERED_MESSAGE));
}

#[tokio::test]
async fn rejection_is_shown_verbatim() {
    let registrar = RecordingRegistrar::failing(|| {
        registrar::Error::Rejected("Aadhar number already linked to another account".into())
    });
    let mut browser = Browser::new(registrar.clone());

    let page = browser.submit(&fields("hunter22", "hunter22")).await;
    assert_redirects_to_form(&page);
    assert_eq!(registrar.calls().len(), 1);

    let page = browser.get("/register").await;
    assert!(page
        .body
        .contains("Aadhar number already linked to another account"));
    assert!(!page.body.contains(REGISTERED_MESSAGE));
    assert!(page.headers.get(REFRESH).is_none());
    assert!(page.body.contains(r#"value="Asha Rao""#));
}

#[tokio::test]
async fn transport_failure_shows_generic_error() {
    let registrar = RecordingRegistrar::failing(|| {
        registrar::Error::UnexpectedStatus(StatusCode::BAD_GATEWAY)
    });
    let mut browser = Browser::new(registrar);

    browser.submit(&fields("hunter22", "hunter22")).await;
    let page = browser.get("/register").await;

    assert!(page.body.contains(UNKNOWN_ERROR_MESSAGE));
    assert!(!page.body.contains("502"));
}

#[tokio::test]
async fn failure_after_success_clears_success_state() {
    let mut browser = Browser::new(MemoryRegistrar::new());

    browser.submit(&fields("hunter22", "hunter22")).await;
    // Same email again, before the success page was ever shown.
    browser.submit(&fields("hunter22", "hunter22")).await;

    let page = browser.get("/register").await;
    assert!(page
        .body
        .contains("A user with the same email already exists"));
    assert!(!page.body.contains(REGISTERED_MESSAGE));
    assert!(page.headers.get(REFRESH).is_none());
}

#[tokio::test]
async fn success_discards_errors_from_earlier_submits() {
    let registrar = RecordingRegistrar::default();
    let mut browser = Browser::new(registrar.clone());

    browser.submit(&fields("hunter22", "hunter23")).await;
    // Resubmitted before the error page was ever shown.
    browser.submit(&fields("hunter22", "hunter22")).await;
    assert_eq!(registrar.calls().len(), 1);

    let page = browser.get("/register").await;
    assert_eq!(page.headers.get(REFRESH).unwrap(), "2; url=/login");
    assert!(page.body.contains(REGISTERED_MESSAGE));
    assert!(!page.body.contains("Passwords do not match"));
    assert!(!page.body.contains("notice-error"));
}
