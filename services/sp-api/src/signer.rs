use std::fmt::Write;

use http::header;
use http::HeaderValue;
use log::debug;
use spsign_core::hash::hex_hmac_sha256;
use spsign_core::hash::hex_sha256;
use spsign_core::hash::hmac_sha256;
use spsign_core::time::format_date;
use spsign_core::time::format_iso8601;
use spsign_core::time::DateTime;
use spsign_core::time::{self};
use spsign_core::Result;
use spsign_core::SigningRequest;

use crate::canonical::Canonicalize;
use crate::canonical::RequestCanonicalizer;
use crate::constants::ALGORITHM;
use crate::constants::AWS4_REQUEST;
use crate::constants::SERVICE;
use crate::Credential;

/// Signer that implements AWS SigV4 for the Selling Partner API.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer holds only read-only configuration, so one instance can
/// sign requests from any number of threads. Key rotation means building
/// a new signer with the fresh credential.
#[derive(Debug)]
pub struct Signer<C = RequestCanonicalizer> {
    credential: Credential,
    canonicalizer: C,

    time: Option<DateTime>,
}

impl Signer<RequestCanonicalizer> {
    /// Create a new signer from a credential.
    ///
    /// Fails with a config error when the credential misses a required
    /// field, so misconfiguration surfaces here rather than at sign time.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_canonicalizer(credential, RequestCanonicalizer)
    }
}

impl<C: Canonicalize> Signer<C> {
    /// Create a signer with a custom canonicalizer.
    ///
    /// Canonicalization is stateless, so swapping the implementation is
    /// mostly useful for testing the orchestration against fixed
    /// fragments.
    pub fn with_canonicalizer(credential: Credential, canonicalizer: C) -> Result<Self> {
        credential.validate()?;

        Ok(Self {
            credential,
            canonicalizer,
            time: None,
        })
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign a request.
    ///
    /// Consumes the request and returns a new one carrying `host`,
    /// `x-amz-date`, `x-amz-security-token` when a session token is
    /// present, and the `Authorization` header. Signing is a pure
    /// function of the request, the credential, and the captured
    /// timestamp; call it again to sign with a fresh timestamp.
    pub fn sign<B: AsRef<[u8]>>(&self, req: http::Request<B>) -> Result<http::Request<B>> {
        let (mut parts, body) = req.into_parts();
        let mut sreq = SigningRequest::build(&mut parts)?;

        // The returned timestamp is the canonical signing time for the
        // rest of the pipeline: scope, string to sign, and headers all
        // derive from it.
        let now = self.canonicalizer.initialize_headers(
            &mut sreq,
            &self.credential,
            self.time.unwrap_or_else(time::now),
        )?;

        let signed_headers = self.canonicalizer.signed_headers(&sreq);
        let creq = self.canonical_request(&sreq, &signed_headers, body.as_ref())?;
        debug!("calculated canonical request: {creq}");

        let encoded_req = hex_sha256(creq.as_bytes());
        let string_to_sign = self.string_to_sign(now, &encoded_req)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signature = self.calculate_signature(&string_to_sign, now);
        self.add_signature(&mut sreq, &signed_headers, &signature, now)?;

        sreq.apply(&mut parts);
        Ok(http::Request::from_parts(parts, body))
    }

    fn canonical_request(
        &self,
        sreq: &SigningRequest,
        signed_headers: &str,
        body: &[u8],
    ) -> Result<String> {
        // 256 is specially chosen to avoid reallocation for most requests.
        let mut f = String::with_capacity(256);

        writeln!(f, "{}", sreq.method)?;
        writeln!(f, "{}", self.canonicalizer.canonical_uri(sreq))?;
        writeln!(f, "{}", self.canonicalizer.canonical_query_string(sreq))?;
        // The canonical headers block carries its own trailing newline,
        // which together with writeln produces the protocol's blank line.
        writeln!(f, "{}", self.canonicalizer.canonical_headers(sreq)?)?;
        writeln!(f, "{signed_headers}")?;
        write!(f, "{}", self.canonicalizer.hash_request_body(body))?;

        Ok(f)
    }

    // Scope: "20220313/<region>/execute-api/aws4_request"
    fn credential_scope(&self, now: DateTime) -> String {
        format!(
            "{}/{}/{}/{}",
            format_date(now),
            self.credential.region,
            SERVICE,
            AWS4_REQUEST
        )
    }

    // StringToSign:
    //
    // AWS4-HMAC-SHA256
    // 20220313T072004Z
    // 20220313/<region>/execute-api/aws4_request
    // <hashed_canonical_request>
    fn string_to_sign(&self, now: DateTime, encoded_req: &str) -> Result<String> {
        let scope = self.credential_scope(now);
        debug!("calculated scope: {scope}");

        let mut f = String::new();
        writeln!(f, "{ALGORITHM}")?;
        writeln!(f, "{}", format_iso8601(now))?;
        writeln!(f, "{scope}")?;
        write!(f, "{encoded_req}")?;

        Ok(f)
    }

    fn calculate_signature(&self, string_to_sign: &str, now: DateTime) -> String {
        let signing_key = generate_signing_key(
            &self.credential.secret_access_key,
            now,
            &self.credential.region,
            SERVICE,
        );

        hex_hmac_sha256(&signing_key, string_to_sign.as_bytes())
    }

    fn add_signature(
        &self,
        sreq: &mut SigningRequest,
        signed_headers: &str,
        signature: &str,
        now: DateTime,
    ) -> Result<()> {
        let mut authorization = HeaderValue::from_str(&format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credential.access_key_id,
            self.credential_scope(now),
            signed_headers,
            signature
        ))?;
        authorization.set_sensitive(true);

        sreq.headers.insert(header::AUTHORIZATION, authorization);

        Ok(())
    }
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}
