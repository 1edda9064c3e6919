use std::mem;

use http::uri::Authority;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// Signing context for a request.
///
/// A `SigningRequest` is the decomposed view of an HTTP request that
/// canonicalizers operate on: the literal path text, the percent-decoded
/// query pairs, and the header map. It is built from
/// [`http::request::Parts`] and applied back once signing is done; the
/// original URI is restored untouched since header signing never rewrites
/// the request line.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP authority the request is addressed to.
    pub authority: Authority,
    /// Literal path text, exactly as it appears on the wire.
    ///
    /// Pre-encoded sequences are kept as-is so canonicalization can
    /// operate on the resulting path text rather than a decoded form.
    pub path: String,
    /// Query pairs, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,

    uri: Uri,
}

impl SigningRequest {
    /// Build a signing context from [`http::request::Parts`].
    ///
    /// The request must carry an authority: the `host` header is derived
    /// from it and the protocol cannot sign a request without one.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let authority = parts
            .uri
            .authority()
            .cloned()
            .ok_or_else(|| Error::canonicalization("request without authority cannot be signed"))?;
        let uri = mem::take(&mut parts.uri);

        let mut headers = mem::take(&mut parts.headers);
        // Any previous signature is replaced wholesale, so an existing
        // authorization header must not leak into the canonical form.
        headers.remove(http::header::AUTHORIZATION);

        Ok(SigningRequest {
            method: parts.method.clone(),
            authority,
            path: uri.path().to_string(),
            query: uri
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers,
            uri,
        })
    }

    /// Apply the signing context back to [`http::request::Parts`].
    pub fn apply(mut self, parts: &mut http::request::Parts) {
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = self.uri;
    }

    /// Get header names as a sorted vector.
    pub fn header_names_sorted(&self) -> Vec<&str> {
        let mut h = self
            .headers
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<&str>>();
        h.sort_unstable();

        h
    }
}
