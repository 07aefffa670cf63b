use actix_web::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        StatusCode,
    },
    web, HttpResponse, Responder,
};

use crate::{
    entities::contact::{ContactFormInput, SubmissionMeta, SubmissionResult, ValidateQuery},
    AppState,
};

pub async fn submit_contact(
    state: web::Data<AppState>,
    meta: SubmissionMeta,
    form: web::Json<ContactFormInput>,
) -> impl Responder {
    let result = state.contact_handler
        .submit(form.into_inner(), meta).await;

    let status = match &result {
        SubmissionResult::Success => StatusCode::OK,
        SubmissionResult::Failure { kind, .. } => kind.status_code(),
    };

    HttpResponse::build(status)
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .json(result)
}

/// CORS preflight for the contact form.
pub async fn contact_preflight() -> impl Responder {
    HttpResponse::Ok()
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .insert_header((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

/// Inline field feedback. No rate limiting, no mail.
/// `?field=<name>` reports a single field, as on blur/change.
pub async fn validate_contact(
    state: web::Data<AppState>,
    query: web::Query<ValidateQuery>,
    form: web::Json<ContactFormInput>,
) -> impl Responder {
    let report = state.contact_handler
        .validate(&form, query.field.as_deref());

    HttpResponse::Ok()
        .insert_header((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .json(report)
}
