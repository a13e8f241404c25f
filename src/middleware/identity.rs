use std::pin::Pin;
use tracing::debug;
use futures::Future;
use actix_web::Result;
use std::task::{Context, Poll};
use futures::future::{ok, Ready};
use actix_web::{Error, HttpMessage};
use actix_service::{Service, Transform};
use actix_web::{dev::ServiceRequest, dev::ServiceResponse};
use crate::{model::principal::{IdentityHeaders, Principal}, utils::config::Configuration};

///
/// Resolves the caller from the trusted identity headers an upstream gateway sets and attaches
/// it to the request as a Principal.
///
/// This never rejects a request - it's up to each handler to decide what the caller may do.
///
pub struct Middleware {
    identity: IdentityHeaders
}

impl Middleware {
    pub fn new(config: &Configuration) -> Self {
        Middleware {
            identity: IdentityHeaders {
                user_header: config.identity_user_header.to_lowercase(),
                roles_header: config.identity_roles_header.to_lowercase(),
                admin_role: config.admin_role.clone(),
            }
        }
    }
}

impl<S, B> Transform<S> for Middleware
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(IdentityMiddleware { service, identity: self.identity.clone() })
    }
}

pub struct IdentityMiddleware<S> {
    service: S,
    identity: IdentityHeaders
}

impl<S, B> Service for IdentityMiddleware<S>
where
    S: Service<Request = ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Request = ServiceRequest;
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, req: ServiceRequest) -> Self::Future {
        let principal = Principal::from_headers(req.headers(), &self.identity);
        debug!("Request {} {} from {} (administrator: {})", req.method(), req.path(), principal, principal.is_administrator());

        req.extensions_mut().insert(principal);
        Box::pin(self.service.call(req))
    }
}
