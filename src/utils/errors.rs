use tracing::{error, warn};
use serde_json::json;
use parking_lot::RwLock;
use lazy_static::lazy_static;
use derive_more::{Display, Error};
use actix_web::{HttpResponse, ResponseError, dev::HttpResponseBuilder, http::StatusCode};

lazy_static! {
    // In general configuration should be passed in a context struct via Actix .data extractors.
    // Any configuration in a lazy static block exists because there are sections are code where
    // The contexts cannot be accessed or where it becomes increasingly complex to do so.
    // For example, actix middleware, extractors, error responders, etc.

    /// When an error is returned to the client, a useful error message will be sent.
    /// In production this exposes security concerns, so this setting is used to redact these messages.
    /// This value is a global as error responders can't access the normal config struct.
    pub static ref REDACT_ERROR_MESSAGES: RwLock<bool> = RwLock::new(false);
}

///
/// An error type used throughout the services code which can be converted into a HTTP error response.
///
/// All possible library or system errors are converted into one of these InternalErrors so our code
/// can have a clean Result<blah, InternalError> signature declaration and avoids excessive use or
/// operation.await.map_err(|err| blah) type call.
///
/// Conversion from a source error to an InternalError is done futher below with a series of From<T>
/// trait implementations.
///
#[derive(Clone, Debug, Display, Error)]
pub enum InternalError {
    #[display(fmt = "The caller is not an administrator")]
    AdministratorRequired,

    #[display(fmt = "The service configuration is not correct: {}", cause)]
    InvalidConfiguration{ cause: String },

    #[display(fmt = "Unable to snapshot values: {}", cause)]
    InvalidSnapshot{ cause: String },

    #[display(fmt = "Unable to convert to json: {}", cause)]
    InvalidJsonError{ cause: String },

    #[display(fmt = "Unable to render template: {}", cause)]
    TemplateError{ cause: String },

    #[display(fmt = "Unable to format output: {}", cause)]
    FormatError{ cause: String },

    #[display(fmt = "No request context - is the request id middleware installed?")]
    MissingRequestContext,
}

impl InternalError {
    fn error_code(&self) -> u16 {
        match *self {
            InternalError::AdministratorRequired              => 1000,
            InternalError::InvalidConfiguration { cause: _ }  => 1100,
            InternalError::InvalidSnapshot { cause: _ }       => 2001,
            InternalError::InvalidJsonError { cause: _ }      => 2105,
            InternalError::TemplateError { cause: _ }         => 2200,
            InternalError::FormatError { cause: _ }           => 2201,
            InternalError::MissingRequestContext              => 3000,
        }
    }

    ///
    /// Error messages are controlled via the global redaction flag.
    ///
    fn redact_message(&self) -> bool {
        *REDACT_ERROR_MESSAGES.read()
    }
}

impl ResponseError for InternalError {
    fn status_code(&self) -> StatusCode {
        match *self {
            InternalError::AdministratorRequired              => StatusCode::FORBIDDEN,
            InternalError::InvalidConfiguration { cause: _ }  => StatusCode::INTERNAL_SERVER_ERROR,
            InternalError::InvalidSnapshot { cause: _ }       => StatusCode::INTERNAL_SERVER_ERROR,
            InternalError::InvalidJsonError { cause: _ }      => StatusCode::INTERNAL_SERVER_ERROR,
            InternalError::TemplateError { cause: _ }         => StatusCode::INTERNAL_SERVER_ERROR,
            InternalError::FormatError { cause: _ }           => StatusCode::INTERNAL_SERVER_ERROR,
            InternalError::MissingRequestContext              => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // A refusal leaks nothing, not even an error code.
        if self.status_code() == StatusCode::FORBIDDEN {
            warn!("{}", self);
            return HttpResponseBuilder::new(self.status_code()).finish()
        }

        error!("{}", self);

        let body = match self.redact_message() {
            true => json!(
                {
                    "errorCode": self.error_code()
                }),
            false => json!(
                {
                    "errorCode": self.error_code(),
                    "message": self.to_string()
                }),
        };

        HttpResponseBuilder::new(self.status_code()).json(body)
    }
}

impl From<serde_json::Error> for InternalError {
    fn from(error: serde_json::Error) -> Self {
        InternalError::InvalidJsonError { cause: error.to_string() }
    }
}

impl From<minijinja::Error> for InternalError {
    fn from(error: minijinja::Error) -> Self {
        InternalError::TemplateError { cause: error.to_string() }
    }
}

impl From<std::fmt::Error> for InternalError {
    fn from(error: std::fmt::Error) -> Self {
        InternalError::FormatError { cause: error.to_string() }
    }
}

impl From<InternalError> for std::io::Error {
    fn from(error: InternalError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, error.to_string() )
    }
}
