mod common;

use anyhow::Result;
use serde_json::{json, Value};

use common::{harness, BASE_URL};
use kb_session::http::{FileUpload, Method, Payload, RequestBody};
use kb_session::models::UserProfile;
use kb_session::pipeline::{RequestOptions, UPLOAD_FIELD};
use kb_session::ClientError;

#[tokio::test]
async fn authenticated_json_request_carries_bearer_and_content_type() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("tok-1", UserProfile::new(1, "ada"))?;
    h.transport.respond("/api/knowledge-base", 201, json!({"id": 9, "name": "Docs"}));

    let body = json!({"name": "Docs"});
    let resp = h
        .client
        .pipeline
        .request("/api/knowledge-base", Method::POST, Some(Payload::Json(body.clone())), RequestOptions::new())
        .await?;
    assert_eq!(resp.status, 201);

    let sent = h.transport.requests();
    let req = &sent[0];
    assert_eq!(req.url, format!("{BASE_URL}/api/knowledge-base"));
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert!(req.header("X-Request-Id").is_some());
    match &req.body {
        RequestBody::Json(bytes) => assert_eq!(serde_json::from_slice::<Value>(bytes)?, body),
        other => panic!("expected JSON body, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn anonymous_request_has_no_authorization_header() -> Result<()> {
    let h = harness();
    h.transport.respond("/api/auth/check-first-user", 200, json!({"is_first_user": true}));

    assert!(h.client.auth().check_first_user().await?);
    let sent = h.transport.requests();
    assert_eq!(sent[0].header("authorization"), None);

    Ok(())
}

#[tokio::test]
async fn absolute_endpoints_bypass_base_url() -> Result<()> {
    let h = harness();
    h.transport.respond("https://cdn.example.com/health", 200, json!({}));

    h.client.pipeline.get("https://cdn.example.com/health").await?;
    assert_eq!(h.transport.requests()[0].url, "https://cdn.example.com/health");

    Ok(())
}

#[tokio::test]
async fn bodyless_methods_drop_payloads() -> Result<()> {
    let h = harness();
    h.transport.respond("/api/knowledge-base/3", 200, json!({}));
    h.transport.respond("/api/knowledge-base/3/documents", 200, json!([]));

    h.client
        .pipeline
        .request("/api/knowledge-base/3", Method::DELETE, Some(Payload::Json(json!({"x": 1}))), RequestOptions::new())
        .await?;
    h.client.pipeline.get("/api/knowledge-base/3/documents").await?;

    for req in h.transport.requests() {
        assert_eq!(req.body, RequestBody::Empty);
    }

    Ok(())
}

#[tokio::test]
async fn upload_sends_multipart_without_explicit_content_type() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("tok", UserProfile::new(1, "root").with_admin(true))?;
    h.transport.respond(
        "/api/knowledge-base/4/upload",
        200,
        json!({
            "message": "Document uploaded and indexed successfully",
            "id": 17,
            "filename": "notes.txt",
            "vector_count": 3
        }),
    );

    let file = FileUpload::new("notes.txt", b"hello world".to_vec());
    let receipt = h.client.knowledge_bases().upload_document(4, file.clone()).await?;
    assert_eq!(receipt.id, 17);
    assert_eq!(receipt.vector_count, Some(3));

    let sent = h.transport.requests();
    let req = &sent[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.header("content-type"), None);
    assert_eq!(req.header("authorization"), Some("Bearer tok"));
    match &req.body {
        RequestBody::Multipart(form) => {
            assert_eq!(form.file_part(UPLOAD_FIELD), Some(&file));
            assert_eq!(form.parts().len(), 1);
        }
        other => panic!("expected multipart body, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn rename_sends_json_body_with_put() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("tok", UserProfile::new(1, "root").with_admin(true))?;
    h.transport.respond("/api/knowledge-base/5", 200, json!({"status": "success"}));

    let reply = h.client.knowledge_bases().update(5, "Runbooks").await?;
    assert_eq!(reply.status, "success");

    let sent = h.transport.requests();
    let req = &sent[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.url, format!("{BASE_URL}/api/knowledge-base/5"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("authorization"), Some("Bearer tok"));
    match &req.body {
        RequestBody::Json(bytes) => {
            assert_eq!(serde_json::from_slice::<Value>(bytes)?, json!({"name": "Runbooks"}))
        }
        other => panic!("expected JSON body, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn delete_document_targets_nested_route() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("tok", UserProfile::new(1, "root").with_admin(true))?;
    h.transport
        .respond("/api/knowledge-base/5/documents/9", 200, json!({"status": "success"}));

    h.client.knowledge_bases().delete_document(5, 9).await?;

    let sent = h.transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::DELETE);
    assert_eq!(sent[0].url, format!("{BASE_URL}/api/knowledge-base/5/documents/9"));
    assert_eq!(sent[0].body, RequestBody::Empty);

    Ok(())
}

#[tokio::test]
async fn callers_cannot_override_protected_headers() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("real", UserProfile::new(1, "ada"))?;
    h.transport.respond("/api/knowledge-base", 200, json!([]));

    let options = RequestOptions::new()
        .header("Authorization", "Bearer forged")
        .header("Accept-Language", "zh-CN");
    h.client
        .pipeline
        .request("/api/knowledge-base", Method::GET, None, options)
        .await?;

    let sent = h.transport.requests();
    let req = &sent[0];
    assert_eq!(req.header("authorization"), Some("Bearer real"));
    assert_eq!(req.header("accept-language"), Some("zh-CN"));
    assert_eq!(
        req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("authorization")).count(),
        1
    );

    Ok(())
}

#[tokio::test]
async fn unauthorized_response_invalidates_and_redirects_once() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("tok", UserProfile::new(1, "ada"))?;
    h.transport.respond("/api/knowledge-base", 401, json!({"detail": "Token expired"}));
    h.transport.respond("/api/knowledge-base/1/documents", 401, json!({"detail": "Token expired"}));

    let first = h.client.knowledge_bases().list().await.unwrap_err();
    let second = h.client.knowledge_bases().documents(1).await.unwrap_err();

    assert_eq!(first, ClientError::auth("Token expired"));
    assert!(second.is_auth());
    assert!(h.client.session.snapshot().is_empty());
    assert_eq!(h.storage.peek(), None);
    assert_eq!(h.redirector.targets(), vec!["/login".to_string()]);

    // a fresh login re-arms the redirect
    h.client.session.set_auth("tok-2", UserProfile::new(1, "ada"))?;
    h.transport.respond("/api/knowledge-base", 401, json!({"detail": "Token expired"}));
    h.client.knowledge_bases().list().await.unwrap_err();
    assert_eq!(h.redirector.targets().len(), 2);

    Ok(())
}

#[tokio::test]
async fn late_unauthorized_for_replaced_token_keeps_new_session() -> Result<()> {
    let h = harness();
    h.client.session.set_auth("old", UserProfile::new(1, "ada"))?;
    let release = h.transport.respond_when_released(
        "/api/knowledge-base",
        401,
        json!({"detail": "Token expired"}),
    );

    let pending = {
        let client = h.client.clone();
        tokio::spawn(async move { client.knowledge_bases().list().await })
    };
    h.transport.wait_for_requests(1).await;
    assert_eq!(h.transport.requests()[0].header("authorization"), Some("Bearer old"));

    h.client
        .session
        .set_auth("new", UserProfile::new(1, "ada").with_admin(true))?;
    release.send(()).ok();

    let err = pending.await?.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(h.client.session.token().as_deref(), Some("new"));
    assert!(h.client.session.is_admin());
    assert_eq!(h.storage.peek().as_deref(), Some("new"));
    assert!(h.redirector.targets().is_empty());

    Ok(())
}

#[tokio::test]
async fn failed_login_does_not_touch_session_or_redirect() -> Result<()> {
    let h = harness();
    h.client.session.set_token(Some("previous"))?;
    h.transport.respond(
        "/api/auth/login",
        401,
        json!({"detail": {"message": "wrong username or password"}}),
    );

    let err = h.client.auth().login("ada", "nope").await.unwrap_err();
    assert_eq!(err, ClientError::auth("wrong username or password"));
    assert_eq!(h.client.session.token().as_deref(), Some("previous"));
    assert!(h.redirector.targets().is_empty());

    Ok(())
}

#[tokio::test]
async fn error_bodies_are_normalized() -> Result<()> {
    let h = harness();
    h.transport.respond("/api/knowledge-base", 422, json!({"detail": "name must not be empty"}));
    h.transport.respond_raw("/api/knowledge-base/2/documents", 502, "Bad Gateway");
    h.transport.respond("/api/knowledge-base/3", 404, json!({"error": "missing"}));

    let validation = h.client.knowledge_bases().create("", None).await.unwrap_err();
    assert_eq!(validation, ClientError::validation(422, "name must not be empty"));
    assert_eq!(validation.user_message(), "name must not be empty");

    let server = h.client.knowledge_bases().documents(2).await.unwrap_err();
    assert_eq!(server, ClientError::server(502, "Bad Gateway"));

    let generic = h.client.knowledge_bases().delete(3).await.unwrap_err();
    assert_eq!(generic, ClientError::validation(404, "request failed"));
    assert_eq!(generic.status(), Some(404));

    // none of these touch the session
    assert!(h.redirector.targets().is_empty());

    Ok(())
}

#[tokio::test]
async fn transport_failures_surface_as_network_errors() -> Result<()> {
    let h = harness();
    h.transport
        .fail("/api/knowledge-base", ClientError::network("request timed out"));

    let err = h.client.knowledge_bases().list().await.unwrap_err();
    assert_eq!(err, ClientError::network("request timed out"));
    assert_eq!(err.status(), None);

    Ok(())
}

#[tokio::test]
async fn empty_endpoint_is_rejected_before_sending() -> Result<()> {
    let h = harness();
    let err = h.client.pipeline.get("  ").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
    assert_eq!(h.transport.request_count(), 0);
    Ok(())
}
