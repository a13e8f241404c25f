use std::fmt;
use std::collections::BTreeSet;
use futures::future::{ok, Ready};
use actix_http::http::HeaderMap;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, dev::Payload};

///
/// The names of the trusted headers an upstream gateway uses to tell us who the caller is.
///
#[derive(Clone, Debug)]
pub struct IdentityHeaders {
    pub user_header: String,
    pub roles_header: String,
    pub admin_role: String,
}

///
/// The authenticated caller of a request.
///
/// Resolved by the identity middleware before any handler runs. A request without one is
/// treated as anonymous - which is never an administrator.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Principal {
    user: Option<String>,
    roles: BTreeSet<String>,
    is_administrator: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Principal::default()
    }

    ///
    /// Resolve the caller from the trusted identity headers. Roles are a comma-separated list,
    /// matched case-insensitively. A user must be present to hold the admin role.
    ///
    pub fn from_headers(headers: &HeaderMap, identity: &IdentityHeaders) -> Self {
        let user = headers.get(identity.user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string);

        let roles: BTreeSet<String> = headers.get_all(identity.roles_header.as_str())
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|role| role.trim().to_lowercase())
            .filter(|role| !role.is_empty())
            .collect();

        let is_administrator = user.is_some() && roles.contains(&identity.admin_role.trim().to_lowercase());

        Principal { user, roles, is_administrator }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user().unwrap_or("anonymous"))
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ok(req.extensions()
            .get::<Principal>()
            .cloned()
            .unwrap_or_else(Principal::anonymous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_http::http::{HeaderName, HeaderValue};

    fn identity() -> IdentityHeaders {
        IdentityHeaders {
            user_header: "x-authenticated-user".to_string(),
            roles_header: "x-authenticated-roles".to_string(),
            admin_role: "admin".to_string(),
        }
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(HeaderName::from_static(*name), HeaderValue::from_static(*value));
        }
        headers
    }

    #[test]
    fn test_no_headers_is_anonymous() {
        let principal = Principal::from_headers(&HeaderMap::new(), &identity());

        assert_eq!(principal, Principal::anonymous());
        assert!(!principal.is_administrator());
        assert_eq!(principal.to_string(), "anonymous");
    }

    #[test]
    fn test_admin_role_is_case_insensitive() {
        let principal = Principal::from_headers(
            &headers(&[("x-authenticated-user", "stef"), ("x-authenticated-roles", "support, ADMIN")]),
            &identity());

        assert!(principal.is_administrator());
        assert_eq!(principal.user(), Some("stef"));
        assert_eq!(principal.roles().collect::<Vec<_>>(), vec!("admin", "support"));
    }

    #[test]
    fn test_roles_without_a_user_are_not_admin() {
        let principal = Principal::from_headers(
            &headers(&[("x-authenticated-roles", "admin")]),
            &identity());

        assert!(!principal.is_administrator());
    }

    #[test]
    fn test_other_roles_are_not_admin() {
        let principal = Principal::from_headers(
            &headers(&[("x-authenticated-user", "stef"), ("x-authenticated-roles", "administrator,support")]),
            &identity());

        assert!(!principal.is_administrator());
    }
}
