use serde::Serialize;
use std::collections::BTreeMap;
use actix_web::HttpRequest;
use actix_http::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::utils::redact::redact;
use super::snapshot::Setting;

///
/// Where the request says it was sent to.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestSummary {
    pub host: String,
    pub absolute_uri: String,
}

impl RequestSummary {
    pub fn from_request(req: &HttpRequest) -> Self {
        let conn = req.connection_info();
        let path = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        RequestSummary {
            host: conn.host().to_string(),
            absolute_uri: format!("{}://{}{}", conn.scheme(), conn.host(), path),
        }
    }
}

///
/// The environment of a request as CGI-style name/value pairs, ordered by name.
///
/// Headers become HTTP_<NAME> (upper-cased, dashes to underscores) except the content type and
/// length which, as with CGI, have no prefix. Repeated headers are joined with ", ".
///
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestMetadata {
    entries: Vec<Setting>,
}

impl RequestMetadata {
    pub fn from_request(req: &HttpRequest) -> Self {
        let mut entries = BTreeMap::<String, String>::new();
        let conn = req.connection_info();
        let local_addr = req.app_config().local_addr();

        entries.insert("REQUEST_METHOD".to_string(), req.method().as_str().to_string());
        entries.insert("PATH_INFO".to_string(), req.path().to_string());
        entries.insert("QUERY_STRING".to_string(), req.query_string().to_string());
        entries.insert("SERVER_PROTOCOL".to_string(), format!("{:?}", req.version()));
        entries.insert("SERVER_NAME".to_string(), local_addr.ip().to_string());
        entries.insert("SERVER_PORT".to_string(), local_addr.port().to_string());
        entries.insert("URL_SCHEME".to_string(), conn.scheme().to_string());
        entries.insert("REMOTE_ADDR".to_string(), req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_default());

        for (name, value) in req.headers().iter() {
            let key = match name {
                name if *name == CONTENT_TYPE => "CONTENT_TYPE".to_string(),
                name if *name == CONTENT_LENGTH => "CONTENT_LENGTH".to_string(),
                name => format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_")),
            };
            let value = String::from_utf8_lossy(value.as_bytes());

            entries.entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.to_string());
        }

        RequestMetadata {
            entries: entries.into_iter().map(|(name, value)| Setting::new(name, value)).collect()
        }
    }

    ///
    /// Mask any secret-looking values (eg. HTTP_AUTHORIZATION).
    ///
    pub fn redacted(self) -> Self {
        RequestMetadata {
            entries: self.entries.into_iter()
                .map(|entry| Setting { value: redact(&entry.name, &entry.value), name: entry.name })
                .collect()
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
