//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions exposing flash semantics:
//! each value is stored for exactly one subsequent read and discarded when
//! that read happens.

use std::collections::BTreeMap;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{Error, ValidationErrors};

pub(crate) const STATUS_KEY: &str = "status";
pub(crate) const SIGNUP_EMAIL_KEY: &str = "signup_email";
pub(crate) const ERRORS_KEY: &str = "errors";
pub(crate) const OLD_INPUT_KEY: &str = "old_input";

/// Newtype wrapper exposing flash-scoped session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn flash<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to flash session value: {error}")))
    }

    /// Read a flashed value, removing it so the next read sees nothing.
    fn take<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        let value = self
            .0
            .get::<T>(key)
            .map_err(|error| Error::internal(format!("failed to read session value: {error}")))?;
        if value.is_some() {
            let _ = self.0.remove(key);
        }
        Ok(value)
    }

    /// Flash the one-time status flag shown after a redirect.
    pub fn flash_status(&self, status: &str) -> Result<(), Error> {
        self.flash(STATUS_KEY, &status)
    }

    /// Consume the flashed status flag.
    pub fn take_status(&self) -> Result<Option<String>, Error> {
        self.take(STATUS_KEY)
    }

    /// Flash the registered email for display on the next rendered page.
    pub fn flash_signup_email(&self, email: &str) -> Result<(), Error> {
        self.flash(SIGNUP_EMAIL_KEY, &email)
    }

    /// Consume the flashed signup email.
    pub fn take_signup_email(&self) -> Result<Option<String>, Error> {
        self.take(SIGNUP_EMAIL_KEY)
    }

    /// Flash field errors for the form to display after the redirect.
    pub fn flash_errors(&self, errors: &ValidationErrors) -> Result<(), Error> {
        self.flash(ERRORS_KEY, errors)
    }

    /// Consume the flashed field errors.
    pub fn take_errors(&self) -> Result<Option<BTreeMap<String, Vec<String>>>, Error> {
        self.take(ERRORS_KEY)
    }

    /// Flash the submitted values so the form can be re-filled.
    pub fn flash_old_input(&self, values: &BTreeMap<String, String>) -> Result<(), Error> {
        self.flash(OLD_INPUT_KEY, values)
    }

    /// Consume the flashed old input.
    pub fn take_old_input(&self) -> Result<Option<BTreeMap<String, String>>, Error> {
        self.take(OLD_INPUT_KEY)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn flashed_status_is_consumed_on_read() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/flash",
                    web::get().to(|session: SessionContext| async move {
                        session.flash_status("verification-link-sent")?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/read",
                    web::get().to(|session: SessionContext| async move {
                        let status = session.take_status()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(status.unwrap_or_default()))
                    }),
                ),
        )
        .await;

        let flash_res =
            test::call_service(&app, test::TestRequest::get().uri("/flash").to_request()).await;
        assert_eq!(flash_res.status(), StatusCode::OK);
        let cookie = session_cookie(&flash_res);

        let first_read = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/read")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        // The consuming read rewrites the cookie without the flashed entry.
        let updated_cookie = session_cookie(&first_read);
        let body = test::read_body(first_read).await;
        assert_eq!(body, "verification-link-sent");

        let second_read = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/read")
                .cookie(updated_cookie)
                .to_request(),
        )
        .await;
        let body = test::read_body(second_read).await;
        assert!(body.is_empty(), "second read must see nothing");
    }

    #[actix_web::test]
    async fn errors_round_trip_as_a_field_map() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/flash",
                    web::get().to(|session: SessionContext| async move {
                        let mut errors = ValidationErrors::new();
                        errors.push("username", "This username has already been taken.");
                        session.flash_errors(&errors)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/read",
                    web::get().to(|session: SessionContext| async move {
                        let errors = session.take_errors()?;
                        Ok::<_, Error>(HttpResponse::Ok().json(errors))
                    }),
                ),
        )
        .await;

        let flash_res =
            test::call_service(&app, test::TestRequest::get().uri("/flash").to_request()).await;
        let cookie = session_cookie(&flash_res);

        let read_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/read")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let value: serde_json::Value = test::read_body_json(read_res).await;
        assert_eq!(
            value["username"][0],
            "This username has already been taken."
        );
    }
}
