use serde::Serialize;
use actix_web::HttpRequest;
use minijinja::Environment;
use crate::{APP_NAME, utils::{config::Configuration, errors::InternalError}};
use super::{request_metadata::{RequestMetadata, RequestSummary}, snapshot::ConfigSnapshot};

const TEMPLATE_NAME: &str = "config.html";
const TEMPLATE: &str = include_str!("../../templates/config.html");

///
/// Everything shown on the config page. Built fresh for each request and thrown away after.
///
#[derive(Debug, Serialize)]
pub struct ConfigPage {
    pub app_name: &'static str,
    pub summary: RequestSummary,
    pub metadata: RequestMetadata,
    pub settings: ConfigSnapshot,
}

impl ConfigPage {
    pub fn capture(req: &HttpRequest, config: &Configuration) -> Result<Self, InternalError> {
        let summary = RequestSummary::from_request(req);
        let mut metadata = RequestMetadata::from_request(req);
        let mut settings = ConfigSnapshot::capture(config)?;

        if config.redact_secrets {
            metadata = metadata.redacted();
            settings = settings.redacted();
        }

        Ok(ConfigPage { app_name: APP_NAME, summary, metadata, settings })
    }

    ///
    /// Render as HTML. The .html template name turns on auto-escaping of every value.
    ///
    pub fn render(&self) -> Result<String, InternalError> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(env.get_template(TEMPLATE_NAME)?.render(self)?)
    }
}
