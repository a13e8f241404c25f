use std::sync::Arc;
use actix_service::ServiceFactory;
use actix_web::{App, dev::{Body, ServiceRequest, ServiceResponse}};
use config_inspector::{Configuration, InitialisationContext};

///
/// Get an instance of the App with routes and middleware set-up exactly as the binary does.
///
pub fn start_app() -> App<
    impl ServiceFactory<
        Request = ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = ()>,
    Body> {

    start_app_with(|_config| ())
}

///
/// As start_app but the loaded configuration can be tweaked first.
///
pub fn start_app_with<F>(tweak: F) -> App<
    impl ServiceFactory<
        Request = ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = ()>,
    Body>
where
    F: FnOnce(&mut Configuration)
{
    // Repeatedly initialising the Jaeger tracing causes panics in the logs during tests.
    std::env::set_var("DISTRIBUTED_TRACING", "false");

    let ctx = match config_inspector::init_everything() {
        Ok(ctx) => ctx.0,
        Err(err) => panic!("init_everything failed: {}", err),
    };

    let mut config = ctx.config().clone();
    tweak(&mut config);
    config_inspector::app(Arc::new(InitialisationContext::new(config)))
}

///
/// Pull the table with the given id out of a rendered page.
///
pub fn table<'a>(body: &'a str, id: &str) -> &'a str {
    let open = format!("<table id=\"{}\">", id);
    let start = body.find(&open).unwrap_or_else(|| panic!("No {} table in\n{}", id, body));
    let rest = &body[start..];
    let end = rest.find("</table>").unwrap_or_else(|| panic!("Unterminated {} table in\n{}", id, body));
    &rest[..end]
}

///
/// How many rows a table has.
///
pub fn rows(table: &str) -> usize {
    table.matches("<tr>").count()
}

///
/// True if the table has a row with the name and value given.
///
pub fn has_row(table: &str, name: &str, value: &str) -> bool {
    table.contains(&format!("<tr><td>{}</td><td>{}</td></tr>", name, value))
}

///
/// True if the table has a row with the name given.
///
pub fn has_name(table: &str, name: &str) -> bool {
    table.contains(&format!("<tr><td>{}</td>", name))
}


// _    _ _______ _______ _____
// | |  | |__   __|__   __|  __ \
// | |__| |  | |     | |  | |__) |
// |  __  |  | |     | |  |  ___/
// | |  | |  | |     | |  | |
// |_|  |_|  |_|     |_|  |_|
//
// A wrapper around the actix test wrapper around the actix web client.
//
// Why? Just makes your tests a little less verbose.
//
pub mod http {
    use actix_service::Service;
    use std::collections::BTreeMap;
    use actix_web::{dev::ServiceResponse, test};
    use actix_http::{body::MessageBody, http::{HeaderValue, Method}};

    pub struct HttpRequest {
        url: String,
        method: Method,
        headers: BTreeMap<String, String>,
    }

    impl HttpRequest {
        fn new(method: Method, url: String) -> Self {
            HttpRequest {
                url,
                method,
                headers: BTreeMap::new(),
            }
        }

        pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
            self.headers.insert(name.to_string(), value.to_string());
            self
        }

        ///
        /// Add the trusted headers our upstream gateway would set for an authenticated user.
        ///
        pub fn caller(&mut self, user: &str, roles: &str) -> &mut Self {
            self.header("x-authenticated-user", user)
                .header("x-authenticated-roles", roles)
        }

        pub async fn send<S, B, E>(&mut self, app: &mut S) -> HttpResponse<B>
        where
            S: Service<Request = actix_http::Request, Response = ServiceResponse<B>, Error = E>,
            E: std::fmt::Debug,
        {
            // Build an actix web client request.
            let mut req = test::TestRequest::with_uri(&self.url).method(self.method.clone());

            // Append all the specified header.
            for header in &self.headers {
                req = req.header(header.0.as_str(), HeaderValue::from_str(header.1.as_str()).expect(&format!("Failed to set header value {}", header.1)));
            }

            let resp = app.call(req.to_request()).await.unwrap();

            HttpResponse {
                url: self.url.clone(),
                method: self.method.clone(),
                inner: resp
            }
        }
    }

    pub struct HttpResponse<B> {
        url: String,     // The original request URL.
        method: Method,  // The original request HTTP method.
        inner: ServiceResponse<B>
    }

    impl <B> HttpResponse<B>
    where B: MessageBody + Unpin
    {
        pub fn status(&self) -> u16 {
            self.inner.status().as_u16()
        }

        pub fn header(&self, name: &str) -> Option<String> {
            self.inner.headers()
                .get(name)
                .map(|value| value.to_str().expect(&format!("Unreadable {} header from {} {}", name, self.method, self.url)).to_string())
        }

        pub async fn read_text(self) -> String {
            let url = self.url.clone();
            let bytes = test::read_body(self.inner).await;
            String::from_utf8(bytes.to_vec()).expect(&format!("Response body for {} wasn't utf-8", url))
        }
    }

    #[allow(dead_code)]
    pub fn get(url: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, url.to_string())
    }

    #[allow(dead_code)]
    pub fn post(url: &str) -> HttpRequest {
        HttpRequest::new(Method::POST, url.to_string())
    }
}
