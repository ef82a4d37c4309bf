//! Tests for the CREATE_TOKEN action callback contract

mod common;

use common::*;
use tokenmill_mcp_server::{action::ActionReply, ActionError, CreateTokenAction};

const REQUEST: &str =
    "Can you create an ERC-20 token for me called 'DenverCoin' with symbol 'DEN' and total supply of 1,000,000?";

#[test]
fn validate_only_needs_a_name() {
    let action = CreateTokenAction::unconfigured(ActionError::ConfigurationMissing(vec![
        "EVM_PRIVATE_KEY".to_string(),
    ]));

    assert!(action.validate(REQUEST));
    assert!(action.validate("token called Moonbeam"));
    assert!(!action.validate("what is the price of MON today?"));
    assert!(!action.validate(""));
}

#[tokio::test]
async fn successful_launch_reports_progress_then_result() {
    let harness = Harness::healthy();
    let action = harness.action();
    let mut replies: Vec<ActionReply> = Vec::new();

    let launched = action.handle(REQUEST, |r| replies.push(r)).await;

    assert!(launched);
    assert_eq!(replies.len(), 4);
    assert_eq!(
        replies[0].text,
        "🚀 Starting token creation process with TokenMill..."
    );
    assert_eq!(
        replies[1].text,
        "📝 Preparing token with name: DenverCoin, symbol: DEN, supply: 1000000"
    );
    assert_eq!(replies[2].text, "🔄 Deploying token to blockchain...");
    assert!(replies[3].text.starts_with("✅ Token deployed successfully!"));
    assert_eq!(harness.applications.inserted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_launch_ends_with_error_message() {
    let harness = Harness::new(
        FakeChain::default(),
        FakeObjects {
            fail_upload: true,
            ..Default::default()
        },
        FakeApplications::default(),
    );
    let action = harness.action();
    let mut replies: Vec<ActionReply> = Vec::new();

    let launched = action.handle(REQUEST, |r| replies.push(r)).await;

    assert!(!launched);
    let last = &replies.last().unwrap().text;
    assert!(last.starts_with("❌ Failed to deploy token: metadata upload failed"));
    assert!(harness.applications.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn extraction_failure_sends_single_reply() {
    let harness = Harness::healthy();
    let action = harness.action();
    let mut replies: Vec<ActionReply> = Vec::new();

    let launched = action
        .handle("deploy something cool please", |r| replies.push(r))
        .await;

    assert!(!launched);
    assert_eq!(
        replies,
        vec![ActionReply::new(ActionError::ExtractionFailure.user_message())]
    );
    assert!(harness.chain.simulated_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_action_reports_missing_environment() {
    let action = CreateTokenAction::unconfigured(ActionError::ConfigurationMissing(vec![
        "TM_FACTORY_ADDRESS".to_string(),
        "SUPABASE_URL".to_string(),
    ]));
    assert!(!action.is_configured());

    let mut replies: Vec<ActionReply> = Vec::new();
    let launched = action.handle(REQUEST, |r| replies.push(r)).await;

    assert!(!launched);
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0].text,
        "⚠️ Missing environment variables. Please check the configuration."
    );
}
