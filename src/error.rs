use std::fmt::Display;
use std::sync::OnceLock;

use rocket::request::{FromRequest, Outcome};
use rocket::response::{self, Flash, Redirect, Responder};
use rocket::Request;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(pub anyhow::Error);

impl<E> From<E> for Error
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        Error(error.into())
    }
}

pub trait WithContext<T> {
    fn context<C>(self, context: C) -> Self
    where
        C: Display + Send + Sync + 'static;
}

impl<T> WithContext<T> for Result<T> {
    fn context<C>(self, context: C) -> Self
    where
        C: Display + Send + Sync + 'static,
    {
        Ok(anyhow::Context::context(self.map_err(|s| s.0), context)?)
    }
}

/// Page an [`Error`] sends the user back to. Defaults to `/`.
#[derive(Debug)]
pub struct RedirectTo(pub OnceLock<String>);

impl RedirectTo {
    pub fn set(&self, value: &str) {
        let _ = self.0.set(value.to_string());
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for &'r RedirectTo {
    type Error = crate::error::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(request.local_cache(|| RedirectTo(OnceLock::new())))
    }
}

impl Responder<'_, 'static> for Error {
    fn respond_to(self, request: &Request<'_>) -> response::Result<'static> {
        let redirect = request.local_cache(|| RedirectTo(OnceLock::new()));
        let target = redirect.0.get().cloned().unwrap_or_else(|| "/".to_string());
        let error_message = format!("{:#}", self.0);
        tracing::warn!("Redirecting to {} after error: {}", target, error_message);

        Flash::error(Redirect::to(target), error_message).respond_to(request)
    }
}
