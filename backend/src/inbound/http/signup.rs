//! Signup form handlers.
//!
//! ```text
//! GET  /signup   -> form view model (flashed status, errors, old input)
//! POST /signup   -> validate, create the user, redirect back to /signup
//! ```
//!
//! The `POST` handler never renders anything itself: both outcomes redirect
//! back to the form route with the relevant values flashed for exactly one
//! read, which is where a template collaborator would pick them up.

use std::collections::BTreeMap;

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::signup::fields;
use crate::domain::{RegistrationError, SignupForm};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// One-time status flag flashed after a successful registration.
pub const VERIFICATION_LINK_SENT: &str = "verification-link-sent";

/// Route both handlers redirect back to.
pub const SIGNUP_PATH: &str = "/signup";

/// Raw signup submission for `POST /signup`, form-encoded.
///
/// Every field is optional at the transport layer; the validator decides
/// what is required and reports all failures in one pass.
#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    /// Submitted full name.
    pub full_name: Option<String>,
    /// Requested account handle.
    pub username: Option<String>,
    /// Requested email address.
    pub email: Option<String>,
    /// Parallel email confirmation.
    pub email_confirmation: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Parallel password confirmation.
    pub password_confirmation: Option<String>,
    /// Terms acceptance token; the form sends `accept`.
    pub terms: Option<String>,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional street address.
    pub address: Option<String>,
    /// Optional city.
    pub city: Option<String>,
    /// Optional state or region.
    pub state: Option<String>,
    /// Optional postal code.
    pub zip_code: Option<String>,
}

impl SignupRequest {
    fn to_form(&self) -> SignupForm {
        SignupForm {
            full_name: self.full_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            email_confirmation: self.email_confirmation.clone(),
            password: self.password.clone(),
            password_confirmation: self.password_confirmation.clone(),
            terms: self.terms.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
        }
    }

    /// Submitted values worth re-filling the form with; passwords excluded.
    fn old_input(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        let refillable = [
            (fields::FULL_NAME, &self.full_name),
            (fields::USERNAME, &self.username),
            (fields::EMAIL, &self.email),
            (fields::EMAIL_CONFIRMATION, &self.email_confirmation),
            (fields::TERMS, &self.terms),
            (fields::PHONE_NUMBER, &self.phone_number),
            (fields::ADDRESS, &self.address),
            (fields::CITY, &self.city),
            (fields::STATE, &self.state),
            (fields::ZIP_CODE, &self.zip_code),
        ];
        for (field, value) in refillable {
            if let Some(value) = value {
                values.insert(field.to_owned(), value.clone());
            }
        }
        values
    }
}

/// View model consumed by the form template collaborator.
///
/// Every field reflects a flash value and is therefore present at most once
/// per redirect.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupView {
    /// One-time status flag, e.g. [`VERIFICATION_LINK_SENT`].
    pub status: Option<String>,
    /// Email registered by the immediately preceding submission.
    pub signup_email: Option<String>,
    /// Field errors from the immediately preceding submission.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    /// Old input for re-filling the form; passwords never included.
    pub values: Option<BTreeMap<String, String>>,
}

fn redirect_to_form() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, SIGNUP_PATH))
        .finish()
}

/// Return the signup form view model, consuming any flashed values.
#[get("/signup")]
pub async fn show_signup_form(session: SessionContext) -> ApiResult<web::Json<SignupView>> {
    Ok(web::Json(SignupView {
        status: session.take_status()?,
        signup_email: session.take_signup_email()?,
        errors: session.take_errors()?,
        values: session.take_old_input()?,
    }))
}

/// Handle an incoming registration submission.
#[post("/signup")]
pub async fn submit_signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Form<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    match state.registration.register(request.to_form()).await {
        Ok(user) => {
            session.flash_signup_email(user.email.as_ref())?;
            session.flash_status(VERIFICATION_LINK_SENT)?;
            Ok(redirect_to_form())
        }
        Err(RegistrationError::Validation(errors)) => {
            session.flash_errors(&errors)?;
            session.flash_old_input(&request.old_input())?;
            Ok(redirect_to_form())
        }
        Err(RegistrationError::Infrastructure(error)) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::Value;

    use super::*;
    use crate::domain::RegistrationService;
    use crate::domain::ports::{
        InMemoryUserRepository, PasswordHashError, PasswordHasher, RegistrationNotifier,
    };
    use crate::domain::registration::RegistrationEvent;

    struct StubHasher;

    impl PasswordHasher for StubHasher {
        fn hash(&self, plaintext: &str) -> Result<String, PasswordHashError> {
            Ok(format!("hashed:{plaintext}"))
        }
    }

    struct DiscardingNotifier;

    impl RegistrationNotifier for DiscardingNotifier {
        fn notify(&self, _event: RegistrationEvent) {}
    }

    fn test_state(repo: Arc<InMemoryUserRepository>) -> web::Data<HttpState> {
        let service =
            RegistrationService::new(repo, Arc::new(StubHasher), Arc::new(DiscardingNotifier));
        web::Data::new(HttpState::new(Arc::new(service)))
    }

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(show_signup_form)
            .service(submit_signup)
    }

    fn valid_request() -> Vec<(&'static str, &'static str)> {
        vec![
            ("full_name", "Jane Doe"),
            ("username", "janedoe1"),
            ("email", "jane@example.com"),
            ("email_confirmation", "jane@example.com"),
            ("password", "secret123"),
            ("password_confirmation", "secret123"),
            ("terms", "accept"),
        ]
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    async fn read_view<S, B>(app: &S, cookie: actix_web::cookie::Cookie<'static>) -> Value
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse<B>,
                Error = actix_web::Error,
            >,
        B: actix_web::body::MessageBody,
    {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri("/signup")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        actix_test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn successful_submission_redirects_with_flashed_status() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let app = actix_test::init_service(test_app(test_state(repo.clone()))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/signup")
                .set_form(valid_request())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).map(|v| v.as_bytes()),
            Some(SIGNUP_PATH.as_bytes())
        );

        let cookie = session_cookie(&res);
        let view = read_view(&app, cookie).await;
        assert_eq!(view["status"], VERIFICATION_LINK_SENT);
        assert_eq!(view["signupEmail"], "jane@example.com");
        assert_eq!(view["errors"], Value::Null);

        assert_eq!(repo.users().len(), 1);
    }

    #[actix_web::test]
    async fn invalid_submission_flashes_errors_and_old_input() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let app = actix_test::init_service(test_app(test_state(repo.clone()))).await;

        // Mismatched email confirmation and no terms acceptance.
        let form = vec![
            ("full_name", "Jane Doe"),
            ("username", "janedoe1"),
            ("email", "jane@example.com"),
            ("email_confirmation", "other@example.com"),
            ("password", "secret123"),
            ("password_confirmation", "secret123"),
        ];

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/signup")
                .set_form(form)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let cookie = session_cookie(&res);
        let view = read_view(&app, cookie).await;
        assert_eq!(view["status"], Value::Null);
        assert_eq!(
            view["errors"]["email"][0],
            "The email confirmation does not match."
        );
        assert_eq!(
            view["errors"]["terms"][0],
            "You must agree to the Terms of Service to register."
        );
        assert_eq!(view["values"]["username"], "janedoe1");
        assert_eq!(view["values"].get("password"), None);
        assert_eq!(view["values"].get("password_confirmation"), None);

        assert!(repo.users().is_empty());
    }

    #[actix_web::test]
    async fn flashed_view_is_empty_on_second_read() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let app = actix_test::init_service(test_app(test_state(repo))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/signup")
                .set_form(valid_request())
                .to_request(),
        )
        .await;
        let cookie = session_cookie(&res);

        let first_get = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/signup")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let consumed_cookie = session_cookie(&first_get);
        let first_view: Value = actix_test::read_body_json(first_get).await;
        assert_eq!(first_view["status"], VERIFICATION_LINK_SENT);

        let second_view = read_view(&app, consumed_cookie).await;
        assert_eq!(second_view["status"], Value::Null);
        assert_eq!(second_view["signupEmail"], Value::Null);
    }

    #[actix_web::test]
    async fn duplicate_username_fails_validation_without_a_second_record() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let app = actix_test::init_service(test_app(test_state(repo.clone()))).await;

        let seed = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/signup")
                .set_form(valid_request())
                .to_request(),
        )
        .await;
        assert_eq!(seed.status(), StatusCode::SEE_OTHER);

        // Same username, fresh email: only the username collides.
        let form = vec![
            ("full_name", "Jane Doe"),
            ("username", "janedoe1"),
            ("email", "second@example.com"),
            ("email_confirmation", "second@example.com"),
            ("password", "secret123"),
            ("password_confirmation", "secret123"),
            ("terms", "accept"),
        ];

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/signup")
                .set_form(form)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let cookie = session_cookie(&res);
        let view = read_view(&app, cookie).await;
        assert_eq!(
            view["errors"]["username"][0],
            "This username has already been taken."
        );
        assert_eq!(repo.users().len(), 1);
    }

    #[actix_web::test]
    async fn empty_form_view_serialises_all_null() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let app = actix_test::init_service(test_app(test_state(repo))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/signup").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: Value = actix_test::read_body_json(res).await;
        assert_eq!(view["status"], Value::Null);
        assert_eq!(view["signupEmail"], Value::Null);
        assert_eq!(view["errors"], Value::Null);
        assert_eq!(view["values"], Value::Null);
    }
}
