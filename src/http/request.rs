//! Transport-neutral request and input parsing.

use crate::http::error::AppError;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Split `target` (`/path?query`) and decode its query string.
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, HashMap::new()),
        };
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Token of an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }

    /// Optional query parameter; an empty value counts as absent.
    pub fn query_opt<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        match self.query.get(name).map(String::as_str) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::IllegalInput(format!("invalid query parameter {name}: {raw:?}"))),
        }
    }

    pub fn query_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, AppError> {
        Ok(self.query_opt(name)?.unwrap_or(default))
    }

    pub fn query_required<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        self.query_opt(name)?
            .ok_or_else(|| AppError::IllegalInput(format!("missing query parameter {name}")))
    }

    /// `limit` and `offset` query parameters, both non-negative.
    pub fn pagination(&self) -> Result<(i64, i64), AppError> {
        let limit = self.query_or("limit", DEFAULT_LIMIT)?;
        let offset = self.query_or("offset", DEFAULT_OFFSET)?;
        check_pagination(limit, offset)?;
        Ok((limit, offset))
    }

    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        if self.body.is_empty() {
            return Err(AppError::IllegalInput("missing request body".to_string()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

pub fn check_pagination(limit: i64, offset: i64) -> Result<(), AppError> {
    if limit < 0 || offset < 0 {
        return Err(AppError::IllegalInput(
            "limit and offset must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Minimal shape check for email addresses: `local@domain.tld`.
pub fn check_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::IllegalInput(format!("invalid email: {email:?}")))
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (percent_decode(key), percent_decode(value)),
            None => (percent_decode(pair), String::new()),
        })
        .collect()
}

/// Decode `+` and `%XX` escapes. Invalid escapes are kept verbatim.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match hex::decode(&bytes[i + 1..i + 3]) {
                    Ok(decoded) => {
                        out.extend(decoded);
                        i += 3;
                        continue;
                    }
                    Err(_) => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let req = HttpRequest::new("get", "/stadium?name=river%20side&city_id=5&empty=&flag");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/stadium");
        assert_eq!(req.query["name"], "river side");
        assert_eq!(req.query_opt::<i32>("city_id").unwrap(), Some(5));
        assert_eq!(req.query_opt::<i32>("empty").unwrap(), None);
        assert_eq!(req.query_opt::<i32>("missing").unwrap(), None);
        assert!(req.query.contains_key("flag"));
    }

    #[test]
    fn test_bad_query_value_is_illegal_input() {
        let req = HttpRequest::new("GET", "/venue?stadium_id=abc");
        assert!(matches!(
            req.query_opt::<i32>("stadium_id"),
            Err(AppError::IllegalInput(_))
        ));
    }

    #[test]
    fn test_percent_decode_edge_cases() {
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("%E5%A0%B4"), "場");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }

    #[test]
    fn test_pagination() {
        assert_eq!(HttpRequest::new("GET", "/venue").pagination().unwrap(), (10, 0));
        assert_eq!(
            HttpRequest::new("GET", "/venue?limit=5&offset=20").pagination().unwrap(),
            (5, 20)
        );
        assert!(HttpRequest::new("GET", "/venue?limit=-1").pagination().is_err());
    }

    #[test]
    fn test_bearer_token() {
        let req = HttpRequest::new("GET", "/").with_header("Authorization", "Bearer abc.def");
        assert_eq!(req.bearer_token(), Some("abc.def"));
        let req = HttpRequest::new("GET", "/").with_header("authorization", "Basic xyz");
        assert_eq!(req.bearer_token(), None);
        assert_eq!(HttpRequest::new("GET", "/").bearer_token(), None);
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("player@example.com").is_ok());
        assert!(check_email("no-at-sign").is_err());
        assert!(check_email("@example.com").is_err());
        assert!(check_email("a@localhost").is_err());
    }
}
