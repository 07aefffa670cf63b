use actix_web::{http::header::USER_AGENT, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::contact::SubmissionMeta, utils::get_client_ip::get_client_ip, AppState};

/// Captures the source identifier and user agent of a submission.
/// Usage: Add `meta: SubmissionMeta` as a parameter to your handler function.
impl FromRequest for SubmissionMeta {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let trust_forwarded = req
            .app_data::<web::Data<AppState>>()
            .is_some_and(|state| state.config.trust_forwarded_headers);

        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        ready(Ok(SubmissionMeta::new(
            get_client_ip(req, trust_forwarded),
            user_agent,
        )))
    }
}
