mod common;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

// These tests need real rows; each one skips itself when the health probe
// reports the database down.

const ADMIN_PERMISSIONS: &[&str] = &[
    "admin:employee:create",
    "admin:employee:read",
    "admin:employee:update",
    "admin:employee:delete",
    "admin:role:create",
    "admin:role:read",
    "onboarding:workflow:read",
    "onboarding:workflow:update",
];

fn unique_digits() -> String {
    format!("{:012}", Uuid::new_v4().as_u128() % 1_000_000_000_000)
}

fn decimal_value(v: &Value) -> f64 {
    match v {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.as_f64().unwrap(),
        _ => panic!("not a decimal: {v}"),
    }
}

/// Create a throwaway role and an employee attached to it, returning the
/// employee id.
async fn create_employee(client: &Client, base_url: &str, token: &str) -> Result<String> {
    let res = client
        .post(format!("{}/api/roles", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": format!("it-role-{}", Uuid::new_v4()), "permission_ids": [] }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "role create failed: {}",
        res.status()
    );
    let role: Value = res.json().await?;
    let role_id = role["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/admin/employees", base_url))
        .bearer_auth(token)
        .json(&json!({
            "email": format!("it-emp-{}@example.com", Uuid::new_v4()),
            "password": "initial-password",
            "first_name": "Test",
            "last_name": "Employee",
            "role_id": role_id,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "employee create failed: {}",
        res.status()
    );
    let employee: Value = res.json().await?;
    Ok(employee["data"]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn replace_all_addresses_stores_exactly_the_submitted_set() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let client = Client::new();
    let token = common::token_with_permissions(ADMIN_PERMISSIONS);
    let employee_id = create_employee(&client, &server.base_url, &token).await?;
    let url = format!("{}/api/admin/employees/{}/addresses", server.base_url, employee_id);

    let address = |city: &str| {
        json!({
            "address_type": "permanent",
            "line1": "12 MG Road",
            "city": city,
            "state": "KA",
            "postal_code": "560001",
            "country": "IN",
        })
    };

    let res = client
        .post(&url)
        .bearer_auth(&token)
        .json(&address("Bengaluru"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!([address("Mysuru"), address("Mumbai")]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(&url).bearer_auth(&token).send().await?;
    let body: Value = res.json().await?;
    let cities: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["city"].as_str().unwrap())
        .collect();
    assert_eq!(cities.len(), 2);
    assert!(cities.contains(&"Mysuru"));
    assert!(cities.contains(&"Mumbai"));
    assert!(!cities.contains(&"Bengaluru"));

    // The empty set clears the collection
    let res = client
        .put(&url)
        .bearer_auth(&token)
        .json(&json!([]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(&url).bearer_auth(&token).send().await?;
    let body: Value = res.json().await?;
    assert!(body["data"].as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn duplicate_bank_account_pair_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let client = Client::new();
    let token = common::token_with_permissions(ADMIN_PERMISSIONS);
    let first = create_employee(&client, &server.base_url, &token).await?;
    let second = create_employee(&client, &server.base_url, &token).await?;

    let account = json!({
        "account_holder": "Test Employee",
        "account_number": unique_digits(),
        "ifsc_code": "HDFC0001234",
        "bank_name": "HDFC",
    });

    let res = client
        .post(format!("{}/api/admin/employees/{}/bank-accounts", server.base_url, first))
        .bearer_auth(&token)
        .json(&account)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Same (account_number, ifsc_code) pair on another employee
    let res = client
        .post(format!("{}/api/admin/employees/{}/bank-accounts", server.base_url, second))
        .bearer_auth(&token)
        .json(&account)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);

    Ok(())
}

#[tokio::test]
async fn compensation_is_create_once_and_put_updates_in_place() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let client = Client::new();
    let token = common::token_with_permissions(ADMIN_PERMISSIONS);
    let employee_id = create_employee(&client, &server.base_url, &token).await?;
    let url = format!("{}/api/admin/employees/{}/compensation", server.base_url, employee_id);

    let initial = json!({ "basic": 50000, "currency": "INR", "effective_from": "2026-04-01" });

    let res = client.post(&url).bearer_auth(&token).json(&initial).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // A second POST must not create a second record
    let res = client.post(&url).bearer_auth(&token).json(&initial).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let revised = json!({
        "basic": 60000,
        "hra": 10000,
        "currency": "INR",
        "effective_from": "2026-05-01",
    });
    let res = client.put(&url).bearer_auth(&token).json(&revised).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(&url).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(decimal_value(&body["data"]["basic"]), 60000.0);
    assert_eq!(decimal_value(&body["data"]["hra"]), 10000.0);

    Ok(())
}

#[tokio::test]
async fn onboarding_bank_account_revisit_replaces_the_saved_account() -> Result<()> {
    let server = common::ensure_server().await?;
    if !common::database_available(server).await {
        eprintln!("skipping: database unavailable");
        return Ok(());
    }

    let client = Client::new();
    let token = common::token_with_permissions(ADMIN_PERMISSIONS);
    let employee_id = create_employee(&client, &server.base_url, &token).await?;
    let step =
        |name: &str| format!("{}/api/admin/employees/{}/onboarding/{}", server.base_url, employee_id, name);

    // Walk the wizard forward to the bank account step
    let new_email = format!("it-renamed-{}@example.com", Uuid::new_v4());
    let res = client
        .put(step("basic_info"))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Asha", "last_name": "Rao", "email": new_email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Basic info lands on the employee row, email included
    let res = client
        .get(format!("{}/api/admin/employees/{}", server.base_url, employee_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["email"], new_email.as_str());
    assert_eq!(body["data"]["first_name"], "Asha");

    let res = client
        .put(step("employment"))
        .bearer_auth(&token)
        .json(&json!({
            "designation": "Engineer",
            "department": "Platform",
            "employment_type": "full_time",
            "joined_at": "2026-01-15",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .put(step("compensation"))
        .bearer_auth(&token)
        .json(&json!({ "basic": 50000, "currency": "INR", "effective_from": "2026-04-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let account = |number: &str| {
        json!({
            "account_holder": "Asha Rao",
            "account_number": number,
            "ifsc_code": "HDFC0001234",
            "bank_name": "HDFC",
        })
    };

    let number_one = unique_digits();
    let res = client
        .put(step("bank_account"))
        .bearer_auth(&token)
        .json(&account(&number_one))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Re-saving the identical payload must not trip the uniqueness constraint
    let res = client
        .put(step("bank_account"))
        .bearer_auth(&token)
        .json(&account(&number_one))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // A corrected number replaces the earlier entry
    let number_two = unique_digits();
    let res = client
        .put(step("bank_account"))
        .bearer_auth(&token)
        .json(&account(&number_two))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/admin/employees/{}/bank-accounts", server.base_url, employee_id))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let accounts = body["data"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["account_number"], number_two.as_str());

    Ok(())
}
