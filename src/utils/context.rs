use std::sync::Arc;
use futures::future::{err, ok, Ready};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, dev::Payload};
use super::{config::Configuration, errors::InternalError};

///
/// Everything built once at start-up and shared (read-only) across all worker threads.
///
#[derive(Debug)]
pub struct InitialisationContext {
    config: Arc<Configuration>,
}

impl InitialisationContext {
    pub fn new(config: Configuration) -> Self {
        InitialisationContext { config: Arc::new(config) }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }
}

///
/// The parts of a RequestContext known before a request arrives. The request id middleware
/// completes it into a RequestContext for each request.
///
#[derive(Clone, Debug)]
pub struct PartialRequestContext {
    config: Arc<Configuration>,
}

impl From<Arc<InitialisationContext>> for PartialRequestContext {
    fn from(ctx: Arc<InitialisationContext>) -> Self {
        PartialRequestContext { config: ctx.config.clone() }
    }
}

///
/// Handed to HTTP handlers as an extractor, gives access to config and the request id.
///
#[derive(Clone, Debug)]
pub struct RequestContext {
    config: Arc<Configuration>,
    request_id: String,
}

impl RequestContext {
    pub fn from(partial: PartialRequestContext, request_id: String) -> Self {
        RequestContext { config: partial.config, request_id }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

impl FromRequest for RequestContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<RequestContext>() {
            Some(ctx) => ok(ctx.clone()),
            None => err(InternalError::MissingRequestContext.into()),
        }
    }
}
