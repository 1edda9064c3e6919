use http::header;
use http::HeaderValue;
use percent_encoding::utf8_percent_encode;
use spsign_core::hash::hex_sha256;
use spsign_core::time::format_iso8601;
use spsign_core::time::DateTime;
use spsign_core::Result;
use spsign_core::SigningRequest;

use crate::constants::QUERY_ENCODE_SET;
use crate::constants::URI_ENCODE_SET;
use crate::constants::X_AMZ_DATE;
use crate::constants::X_AMZ_SECURITY_TOKEN;
use crate::Credential;

/// Canonicalize normalizes request fields into the exact byte sequences
/// the signing protocol hashes.
///
/// Every operation is stateless and deterministic, so the canonicalizer
/// can be tested in isolation and the signer can be tested against a stub
/// returning fixed fragments.
pub trait Canonicalize {
    /// Ensure the headers the protocol signs are present on the request.
    ///
    /// Writes `host` (from the request authority) if absent, refreshes
    /// `x-amz-date` from `now` so a re-signed request picks up a fresh
    /// timestamp, and writes `x-amz-security-token` when the credential
    /// holds a session token. Returns the timestamp used, which callers
    /// must treat as the canonical signing time for the rest of the
    /// operation.
    fn initialize_headers(
        &self,
        req: &mut SigningRequest,
        cred: &Credential,
        now: DateTime,
    ) -> Result<DateTime>;

    /// URI-encoded absolute path.
    ///
    /// Operates on the literal path text: sequences that are already
    /// percent-encoded are encoded again, since the canonical form never
    /// takes a second decode pass. An empty path canonicalizes to `/`.
    fn canonical_uri(&self, req: &SigningRequest) -> String;

    /// Query pairs with key and value URI-encoded independently, sorted
    /// byte-wise by encoded key then encoded value, joined as `k=v` with
    /// `&`. A key without a value renders as `k=`; an empty query
    /// canonicalizes to the empty string.
    fn canonical_query_string(&self, req: &SigningRequest) -> String;

    /// Headers as `name:value\n` per header, sorted by lower-cased name,
    /// values trimmed with internal whitespace collapsed, duplicate
    /// values joined with `,` in insertion order.
    fn canonical_headers(&self, req: &SigningRequest) -> Result<String>;

    /// The signed header names: the same set canonical_headers renders,
    /// sorted, joined with `;`.
    fn signed_headers(&self, req: &SigningRequest) -> String;

    /// Lowercase hex SHA256 of the request body, or of the empty byte
    /// sequence when there is no body.
    fn hash_request_body(&self, body: &[u8]) -> String;
}

/// Production canonicalizer implementing the SigV4 rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestCanonicalizer;

impl Canonicalize for RequestCanonicalizer {
    fn initialize_headers(
        &self,
        req: &mut SigningRequest,
        cred: &Credential,
        now: DateTime,
    ) -> Result<DateTime> {
        // Insert HOST header if not present.
        if req.headers.get(header::HOST).is_none() {
            let host = HeaderValue::try_from(req.authority.as_str())?;
            req.headers.insert(header::HOST, host);
        }

        // Always refresh the DATE header so re-signing uses this call's
        // timestamp instead of a stale one.
        let date_header = HeaderValue::try_from(format_iso8601(now))?;
        req.headers.insert(X_AMZ_DATE, date_header);

        // Insert X_AMZ_SECURITY_TOKEN header if a session token exists.
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to avoid leaking.
            value.set_sensitive(true);

            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        Ok(now)
    }

    fn canonical_uri(&self, req: &SigningRequest) -> String {
        if req.path.is_empty() {
            return "/".to_string();
        }

        utf8_percent_encode(&req.path, &URI_ENCODE_SET).to_string()
    }

    fn canonical_query_string(&self, req: &SigningRequest) -> String {
        let mut pairs = req
            .query
            .iter()
            .map(|(k, v)| {
                (
                    utf8_percent_encode(k, &QUERY_ENCODE_SET).to_string(),
                    utf8_percent_encode(v, &QUERY_ENCODE_SET).to_string(),
                )
            })
            .collect::<Vec<_>>();
        // Sort after encoding: ordering is defined over the encoded bytes.
        pairs.sort_unstable();

        let mut s = String::with_capacity(req.path.len());
        for (idx, (k, v)) in pairs.iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }
            s.push_str(k);
            s.push('=');
            s.push_str(v);
        }

        s
    }

    fn canonical_headers(&self, req: &SigningRequest) -> Result<String> {
        let mut s = String::with_capacity(128);
        for name in signed_header_names(req) {
            s.push_str(name);
            s.push(':');
            for (idx, value) in req.headers.get_all(name).iter().enumerate() {
                if idx != 0 {
                    s.push(',');
                }
                s.push_str(&normalize_header_value(value.to_str()?));
            }
            s.push('\n');
        }

        Ok(s)
    }

    fn signed_headers(&self, req: &SigningRequest) -> String {
        signed_header_names(req).join(";")
    }

    fn hash_request_body(&self, body: &[u8]) -> String {
        hex_sha256(body)
    }
}

/// The header-name set under signature, sorted.
///
/// The user agent is left out because proxies may alter it in transit.
fn signed_header_names(req: &SigningRequest) -> Vec<&str> {
    let mut names = req.header_names_sorted();
    names.retain(|name| *name != header::USER_AGENT.as_str());

    names
}

/// Trim a header value and collapse internal whitespace runs to a single
/// space, per Step 4 of the canonical request rules.
fn normalize_header_value(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    for word in value.split_ascii_whitespace() {
        if !s.is_empty() {
            s.push(' ');
        }
        s.push_str(word);
    }

    s
}
