use tracing::info;
use actix_http::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, dev::HttpResponseBuilder};
use crate::{model::{page::ConfigPage, principal::Principal}, utils::{context::RequestContext, errors::InternalError}};

///
/// Allow administrators to view the current configuration of the system alongside the details of
/// their own request - eg. to see what a proxy in front of us has done to it.
///
/// Anyone else gets an empty 403.
///
#[tracing::instrument(name="config", skip(req, principal, ctx), fields(request_id = ctx.request_id()), level="info")]
pub async fn handle(req: HttpRequest, principal: Principal, ctx: RequestContext) -> Result<HttpResponse, InternalError> {
    if !principal.is_administrator() {
        return Err(InternalError::AdministratorRequired)
    }

    let page = ConfigPage::capture(&req, ctx.config())?;
    info!("Config viewed by {}", principal);

    Ok(HttpResponseBuilder::new(StatusCode::OK)
        .content_type("text/html; charset=utf-8")
        .body(page.render()?))
}
