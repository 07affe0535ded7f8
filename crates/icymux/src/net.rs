//! HTTP transport seam
//!
//! The connector talks to the network through the `HttpTransport` trait so
//! tests can substitute scripted responses for live HTTP. The default
//! implementation wraps a blocking reqwest client configured from
//! `StreamConfig` (timeouts, redirect policy, fixed user agent).

use std::io::Read;

use crate::config::{network, StreamConfig};
use crate::error::Result;

/// A minimal HTTP response: status, headers, and a streaming body.
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Box<dyn Read + Send>>,
}

impl HttpResponse {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP capability consumed by the connector and the source probe.
pub trait HttpTransport: Send + Sync {
    /// GET with custom request headers, returning the streaming response.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;

    /// HEAD with custom request headers (body always absent).
    fn head(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}

/// Blocking reqwest transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &StreamConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(network::MAX_REDIRECTS)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = reqwest::blocking::Client::builder()
            .user_agent(network::USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .redirect(redirect)
            .build()?;

        Ok(Self { client })
    }

    fn execute(&self, request: reqwest::blocking::RequestBuilder) -> Result<HttpResponse> {
        let response = request.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();

        Ok(HttpResponse {
            status,
            headers,
            body: Some(Box::new(response)),
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(request)
    }

    fn head(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.client.head(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let mut response = self.execute(request)?;
        response.body = None;
        Ok(response)
    }
}

/// Build a transport for a given config.
pub fn default_transport(config: &StreamConfig) -> Result<std::sync::Arc<dyn HttpTransport>> {
    Ok(std::sync::Arc::new(ReqwestTransport::new(config)?))
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport fakes shared by the stream tests.

    use super::*;
    use crate::error::IcyError;
    use std::collections::VecDeque;
    use std::io::{self, Cursor};
    use std::sync::{Arc, Mutex};

    /// Build a canned response with an in-memory body.
    pub fn response(status: u16, headers: &[(&str, &str)], body: &[u8]) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: Some(Box::new(Cursor::new(body.to_vec()))),
        }
    }

    /// Transport that pops one scripted result per request and records every
    /// request it sees as `(method, url, headers)`.
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse>>>,
        pub requests: Arc<Mutex<Vec<(String, String, Vec<(String, String)>)>>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<Result<HttpResponse>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn pop(
            &self,
            method: &str,
            url: &str,
            headers: &[(&str, &str)],
        ) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push((
                method.to_string(),
                url.to_string(),
                headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ));
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(IcyError::Io(io::Error::new(
                        io::ErrorKind::ConnectionRefused,
                        "no scripted response left",
                    )))
                })
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
            self.pop("GET", url, headers)
        }

        fn head(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
            self.pop("HEAD", url, headers)
        }
    }

    /// Reader that serves a prefix then fails with the given error kind.
    pub struct FailAfter {
        data: Cursor<Vec<u8>>,
        kind: io::ErrorKind,
    }

    impl FailAfter {
        pub fn new(prefix: &[u8], kind: io::ErrorKind) -> Self {
            Self {
                data: Cursor::new(prefix.to_vec()),
                kind,
            }
        }
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(self.kind, "connection reset by fake peer")),
                n => Ok(n),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_headers(headers: Vec<(String, String)>) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers,
            body: None,
        }
    }

    // --- HttpResponse ---

    #[test]
    fn header_lookup_is_case_insensitive() {
        let r = response_with_headers(vec![("Icy-MetaInt".to_string(), "8192".to_string())]);
        assert_eq!(r.header("icy-metaint"), Some("8192"));
        assert_eq!(r.header("ICY-METAINT"), Some("8192"));
    }

    #[test]
    fn header_lookup_missing_returns_none() {
        let r = response_with_headers(vec![]);
        assert_eq!(r.header("icy-name"), None);
    }

    #[test]
    fn header_lookup_first_match_wins() {
        let r = response_with_headers(vec![
            ("icy-name".to_string(), "First".to_string()),
            ("icy-name".to_string(), "Second".to_string()),
        ]);
        assert_eq!(r.header("icy-name"), Some("First"));
    }

    #[test]
    fn success_range() {
        assert!(response_with_headers(vec![]).is_success());
        let mut r = response_with_headers(vec![]);
        r.status = 299;
        assert!(r.is_success());
        r.status = 300;
        assert!(!r.is_success());
        r.status = 404;
        assert!(!r.is_success());
    }

    // --- ReqwestTransport construction ---

    #[test]
    fn transport_builds_from_default_config() {
        let config = crate::config::StreamConfig::default();
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn transport_builds_without_redirects() {
        let config = crate::config::StreamConfig {
            follow_redirects: false,
            ..Default::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
