// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! End-to-end signing tests against fixed reference vectors.
//!
//! The expected signatures were computed independently with the
//! reference SigV4 algorithm for the pinned credentials and timestamp,
//! so any drift in canonicalization, scope, or key derivation shows up
//! as a mismatch here.

use anyhow::Result;
use bytes::Bytes;
use chrono::TimeZone;
use chrono::Utc;
use http::header;
use http::Request;
use pretty_assertions::assert_eq;
use spsign_core::time::DateTime;
use spsign_sp_api::Credential;
use spsign_sp_api::Signer;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_credential() -> Credential {
    Credential {
        access_key_id: "aKey".to_string(),
        secret_access_key: "sKey".to_string(),
        region: "us-east-1".to_string(),
        session_token: None,
    }
}

fn signing_time() -> DateTime {
    Utc.with_ymd_and_hms(2020, 8, 15, 10, 30, 0).unwrap()
}

#[test]
fn test_sign_get_without_query_or_body() -> Result<()> {
    init();

    let signer = Signer::new(test_credential())?.with_time(signing_time());
    let req = Request::builder()
        .method("GET")
        .uri("https://sellingpartnerapi.amazon.com/iam/user")
        .body(Bytes::new())?;

    let signed = signer.sign(req)?;

    assert_eq!(
        signed.headers().get(header::HOST).unwrap(),
        "sellingpartnerapi.amazon.com"
    );
    assert_eq!(
        signed.headers().get("x-amz-date").unwrap(),
        "20200815T103000Z"
    );
    assert_eq!(
        signed.headers().get(header::AUTHORIZATION).unwrap().to_str()?,
        "AWS4-HMAC-SHA256 Credential=aKey/20200815/us-east-1/execute-api/aws4_request, \
         SignedHeaders=host;x-amz-date, \
         Signature=d202624169e4db240a84e8a76ca060efa7d73ab2ff02c49c2deae4837a168d26"
    );

    Ok(())
}

#[test]
fn test_sign_with_query_and_session_token() -> Result<()> {
    init();

    let credential = Credential {
        session_token: Some("sToken".to_string()),
        ..test_credential()
    };
    let signer = Signer::new(credential)?.with_time(signing_time());

    let uri = "https://sellingpartnerapi.amazon.com/orders/v0/orders?CreatedAfter=2020-08-01&MarketplaceIds=ATVPDKIKX0DER";
    let req = Request::builder().method("GET").uri(uri).body(Bytes::new())?;

    let signed = signer.sign(req)?;

    // The wire URI is untouched; only headers change.
    assert_eq!(signed.uri().to_string(), uri);

    let token = signed.headers().get("x-amz-security-token").unwrap();
    assert_eq!(token, "sToken");
    assert!(token.is_sensitive());

    assert_eq!(
        signed.headers().get(header::AUTHORIZATION).unwrap().to_str()?,
        "AWS4-HMAC-SHA256 Credential=aKey/20200815/us-east-1/execute-api/aws4_request, \
         SignedHeaders=host;x-amz-date;x-amz-security-token, \
         Signature=36fe3388fab5112a2224a92130d5f7dd7dc18259a3ebf89628e642af156765a7"
    );

    Ok(())
}

#[test]
fn test_sign_post_with_body() -> Result<()> {
    init();

    let signer = Signer::new(test_credential())?.with_time(signing_time());
    let req = Request::builder()
        .method("POST")
        .uri("https://sellingpartnerapi.amazon.com/listings/2021-08-01/items/A2GP3WG5N6CP41/test-sku")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(b"{\"marketplaceIds\":[\"ATVPDKIKX0DER\"]}"))?;

    let signed = signer.sign(req)?;

    assert_eq!(
        signed.headers().get(header::AUTHORIZATION).unwrap().to_str()?,
        "AWS4-HMAC-SHA256 Credential=aKey/20200815/us-east-1/execute-api/aws4_request, \
         SignedHeaders=content-type;host;x-amz-date, \
         Signature=3f191312eea5eeab0bf96b63b9121133f32189bc9b90d51587f51e98aaa75d82"
    );
    assert_eq!(
        signed.body().as_ref(),
        b"{\"marketplaceIds\":[\"ATVPDKIKX0DER\"]}"
    );

    Ok(())
}

#[test]
fn test_resigning_replaces_previous_signature() -> Result<()> {
    init();

    let first_time = signing_time();
    let second_time = Utc.with_ymd_and_hms(2020, 8, 16, 9, 0, 0).unwrap();

    let request = || {
        Request::builder()
            .method("GET")
            .uri("https://sellingpartnerapi.amazon.com/iam/user")
            .body(Bytes::new())
    };

    let first_signer = Signer::new(test_credential())?.with_time(first_time);
    let second_signer = Signer::new(test_credential())?.with_time(second_time);

    let once = first_signer.sign(request()?)?;
    let first_authorization = once.headers().get(header::AUTHORIZATION).cloned().unwrap();

    let twice = second_signer.sign(once)?;
    let fresh = second_signer.sign(request()?)?;

    // Re-signing fully overwrites the previous signature headers.
    assert_eq!(
        twice.headers().get_all(header::AUTHORIZATION).iter().count(),
        1
    );
    assert_eq!(twice.headers().get_all("x-amz-date").iter().count(), 1);
    assert_eq!(
        twice.headers().get("x-amz-date").unwrap(),
        "20200816T090000Z"
    );

    // The re-signed request is indistinguishable from a fresh signing at
    // the same timestamp, and differs from the first signature.
    assert_eq!(
        twice.headers().get(header::AUTHORIZATION),
        fresh.headers().get(header::AUTHORIZATION)
    );
    assert_ne!(
        twice.headers().get(header::AUTHORIZATION).unwrap(),
        &first_authorization
    );

    Ok(())
}

#[test]
fn test_sign_rejects_request_without_authority() -> Result<()> {
    init();

    let signer = Signer::new(test_credential())?;
    let req = Request::builder()
        .method("GET")
        .uri("/iam/user")
        .body(Bytes::new())?;

    let err = signer.sign(req).expect_err("sign must fail");
    assert_eq!(err.kind(), spsign_core::ErrorKind::Canonicalization);

    Ok(())
}
