//! Tests for the Supabase storage and REST client against a mock server

use chrono::Utc;
use mockito::{mock, server_url, Matcher};
use secrecy::SecretString;
use serde_json::json;

use tokenmill_mcp_server::{
    blockchain::DeploymentResult,
    config::StorageSettings,
    storage::{ApplicationRecord, ApplicationStore, ObjectStore, SupabaseClient},
    token::extract,
    Address,
};

const API_KEY: &str = "service-role-key";

// Each test gets its own path prefix; the mock server is shared.
fn client(project: &str) -> SupabaseClient {
    SupabaseClient::new(&StorageSettings {
        url: format!("{}/{}/", server_url(), project),
        api_key: SecretString::new(API_KEY.to_string()),
        bucket: "miniapps".to_string(),
    })
}

fn record() -> ApplicationRecord {
    let params = extract("token called 'Rocket' with symbol RKT").unwrap();
    let deployment = DeploymentResult {
        token_address: Address::from_low_u64_be(0x10),
        market_address: Address::from_low_u64_be(0x20),
    };
    ApplicationRecord::for_launch(&params, &deployment, "https://cdn.test/swap.json", Utc::now())
}

#[tokio::test]
async fn upload_sends_auth_and_upsert_headers() {
    let upload = mock("POST", "/upload-ok/storage/v1/object/miniapps/tokens/swap_abcdef.json")
        .match_header("apikey", API_KEY)
        .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
        .match_header("x-upsert", "true")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({ "functionName": "swapExactIn" })))
        .with_status(200)
        .with_body(r#"{"Key":"miniapps/tokens/swap_abcdef.json"}"#)
        .create();

    let key = client("upload-ok")
        .upload(
            "miniapps",
            "tokens/swap_abcdef.json",
            br#"{"functionName":"swapExactIn"}"#.to_vec(),
            "application/json",
            true,
        )
        .await
        .unwrap();

    assert_eq!(key, "miniapps/tokens/swap_abcdef.json");
    upload.assert();
}

#[tokio::test]
async fn upload_without_key_in_body_falls_back_to_path() {
    let upload = mock("POST", "/upload-nokey/storage/v1/object/miniapps/tokens/a.json")
        .match_header("x-upsert", "false")
        .with_status(200)
        .with_body("{}")
        .create();

    let key = client("upload-nokey")
        .upload("miniapps", "tokens/a.json", b"{}".to_vec(), "application/json", false)
        .await
        .unwrap();

    assert_eq!(key, "miniapps/tokens/a.json");
    upload.assert();
}

#[tokio::test]
async fn upload_error_status_is_an_error() {
    let _upload = mock("POST", "/upload-denied/storage/v1/object/miniapps/tokens/b.json")
        .with_status(403)
        .with_body(r#"{"error":"Unauthorized","message":"new row violates row-level security policy"}"#)
        .create();

    let err = client("upload-denied")
        .upload("miniapps", "tokens/b.json", b"{}".to_vec(), "application/json", true)
        .await
        .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("403"));
    assert!(message.contains("row-level security"));
}

#[test]
fn public_url_points_at_public_object_route() {
    let url = client("public")
        .public_url("miniapps", "tokens/swap_abcdef.json")
        .unwrap();

    assert_eq!(
        url,
        format!(
            "{}/public/storage/v1/object/public/miniapps/tokens/swap_abcdef.json",
            server_url()
        )
    );
}

#[tokio::test]
async fn insert_application_posts_row() {
    let insert = mock("POST", "/insert-ok/rest/v1/applications")
        .match_header("apikey", API_KEY)
        .match_header("prefer", "return=minimal")
        .match_body(Matcher::PartialJson(json!({
            "name": "Rocket",
            "project_name": "Rocket (RKT)",
            "state": "pending",
            "api_url": "https://cdn.test/swap.json",
            "email": null
        })))
        .with_status(201)
        .create();

    client("insert-ok").insert_application(&record()).await.unwrap();

    insert.assert();
}

#[tokio::test]
async fn insert_application_error_status_is_an_error() {
    let _insert = mock("POST", "/insert-conflict/rest/v1/applications")
        .with_status(409)
        .with_body(r#"{"code":"23505","message":"duplicate key value"}"#)
        .create();

    let err = client("insert-conflict")
        .insert_application(&record())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("409"));
}
