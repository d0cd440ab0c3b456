mod common;

use anyhow::Result;
use reqwest::StatusCode;

const PROTECTED_ENDPOINTS: &[&str] = &[
    "/api/auth/whoami",
    "/api/navigation",
    "/api/admin/admins",
    "/api/admin/employees",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/addresses",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/bank-accounts",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/compensation",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/documents",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/employment",
    "/api/admin/employees/5f0c1492-1a3b-4f39-9f9d-111111111111/onboarding",
    "/api/roles",
    "/api/permissions",
];

#[tokio::test]
async fn protected_endpoints_reject_missing_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for endpoint in PROTECTED_ENDPOINTS {
        let res = client
            .get(format!("{}{}", server.base_url, endpoint))
            .send()
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "expected 401 for {}",
            endpoint
        );

        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["success"], false, "envelope for {}", endpoint);
        assert_eq!(body["code"], "UNAUTHORIZED", "code for {}", endpoint);
    }

    Ok(())
}

#[tokio::test]
async fn malformed_bearer_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_bearer_authorization_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/admin/admins", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn permission_checks_return_403_before_any_data_access() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Valid session, empty permissions snapshot
    let token = common::token_with_permissions(&[]);

    let res = client
        .get(format!("{}/api/roles", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "FORBIDDEN");

    Ok(())
}

#[tokio::test]
async fn whoami_reflects_the_token_snapshot() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::token_with_permissions(&["admin:employee:read"]);

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "super_admin");
    assert_eq!(
        body["data"]["permissions"],
        serde_json::json!(["admin:employee:read"])
    );

    Ok(())
}

#[tokio::test]
async fn navigation_filters_by_token_permissions() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::token_with_permissions(&["admin:employee:read", "admin:role:read"]);

    let res = client
        .get(format!("{}/api/navigation", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let labels: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].as_str().unwrap())
        .collect();

    assert_eq!(labels, vec!["Dashboard", "Employees", "Roles"]);

    Ok(())
}

#[tokio::test]
async fn login_validates_request_body_before_touching_the_database() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Missing password
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&serde_json::json!({ "email": "admin@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Empty email
    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&serde_json::json!({ "email": "  ", "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    Ok(())
}
