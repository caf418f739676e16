//! End-to-end command tests against an in-memory session store.

use clap::Parser;

use hissa_cli::config::HissaConfig;
use hissa_cli::error::{CliResult, ErrorCode};
use hissa_cli::state::AppState;
use hissa_cli::{execute, run, Cli};

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

async fn state() -> AppState {
    let mut config = HissaConfig::default();
    config.receipt.include_timestamp = false;
    AppState::in_memory(config).await.unwrap()
}

/// Runs `hissa <args>` and returns what it printed.
async fn hissa(state: &mut AppState, args: &[&str]) -> CliResult<String> {
    let cli = Cli::try_parse_from(std::iter::once("hissa").chain(args.iter().copied()))
        .expect("arguments should parse");

    let mut out = Vec::new();
    execute(cli.command, state, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

async fn dinner() -> AppState {
    let mut state = state().await;
    hissa(&mut state, &["participant", "add", "Alice"]).await.unwrap();
    hissa(&mut state, &["participant", "add", "Bob"]).await.unwrap();
    hissa(
        &mut state,
        &["item", "add", "--name", "Taxi", "--price", "20000"],
    )
    .await
    .unwrap();
    hissa(
        &mut state,
        &[
            "item", "add", "--name", "Pizza", "--price", "30000", "--policy", "selected",
            "--select", "alice",
        ],
    )
    .await
    .unwrap();
    state
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_mutations_print_the_new_bill() {
    let mut state = state().await;

    let text = hissa(&mut state, &["participant", "add", "Alice"]).await.unwrap();
    assert!(text.starts_with("Service charge: 10%\n"));
    assert!(text.contains("Added Alice"));

    let text = hissa(
        &mut state,
        &[
            "item", "add", "-n", "Beer", "-p", "5000", "-q", "4", "--policy", "units",
            "--assign", "Alice=3",
        ],
    )
    .await
    .unwrap();
    assert!(text.contains("16,500 so'm  (15,000 +1,500)"));
    assert!(text.contains("Added item"));
}

#[tokio::test]
async fn test_bill_and_receipt() {
    let mut state = dinner().await;

    let bill = hissa(&mut state, &["bill"]).await.unwrap();
    assert!(bill.contains("44,000 so'm  (40,000 +4,000)"));
    assert!(bill.contains("11,000 so'm  (10,000 +1,000)"));
    assert!(bill.contains("55,000 so'm  (50,000 + 5,000)"));

    let receipt = hissa(&mut state, &["receipt"]).await.unwrap();
    assert!(receipt.starts_with("HISSA - Bill summary\n\n"));
    assert!(receipt.contains("Alice\nDue: 44,000 so'm\n"));
    assert!(receipt.contains("  • Pizza (1 pc, split among 1 selected)\n    30,000 so'm\n"));
    assert!(receipt.ends_with("TOTAL: 55,000 so'm\n"));
}

#[tokio::test]
async fn test_removed_participant_stops_paying() {
    let mut state = dinner().await;

    let text = hissa(&mut state, &["participant", "remove", "bob"]).await.unwrap();
    assert!(text.contains("Removed Bob"));

    let bill = state.bill();
    assert_eq!(bill.participants.len(), 1);
    assert_eq!(bill.overall_subtotal.rounded(), 50_000);
}

#[tokio::test]
async fn test_edit_keeps_position_and_id() {
    let mut state = dinner().await;
    let taxi = state.session().items()[0].id.clone();

    hissa(&mut state, &["item", "edit", "taxi", "--price", "24000"])
        .await
        .unwrap();

    let items = state.session().items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, taxi);
    assert_eq!(items[0].unit_price, 24_000.0);
    assert_eq!(items[1].name, "Pizza");
}

#[tokio::test]
async fn test_invalid_item_leaves_session_unchanged() {
    let mut state = dinner().await;

    let err = hissa(
        &mut state,
        &["item", "add", "--name", "Wine", "--price", "9000", "--policy", "selected"],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = hissa(&mut state, &["item", "add", "--name", "Wine", "--price", "-1"])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let err = hissa(
        &mut state,
        &[
            "item", "add", "--name", "Wine", "--price", "9000", "--policy", "selected",
            "--assign", "Alice=5",
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("0 or 1"));

    assert_eq!(state.session().items().len(), 2);
}

#[tokio::test]
async fn test_unknown_references() {
    let mut state = dinner().await;

    let err = hissa(&mut state, &["item", "remove", "Soup"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let err = hissa(
        &mut state,
        &[
            "item", "add", "--name", "Tea", "--price", "100", "--policy", "selected",
            "--select", "Zed",
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_service_rate_accepts_negative() {
    let mut state = dinner().await;

    hissa(&mut state, &["service", "set", "-5"]).await.unwrap();
    assert_eq!(state.session().service_charge_rate().percent(), -5.0);

    let text = hissa(&mut state, &["service", "show"]).await.unwrap();
    assert_eq!(text, "Service charge: -5%\n");

    let err = hissa(&mut state, &["service", "set", "lots"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_reset_requires_confirmation() {
    let mut state = dinner().await;

    let err = hissa(&mut state, &["reset"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(!state.session().is_empty());

    let text = hissa(&mut state, &["reset", "--yes"]).await.unwrap();
    assert_eq!(text, "Session cleared. Service charge: 10%\n");
    assert!(state.session().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_share_falls_back_to_clipboard() {
    let mut config = HissaConfig::default();
    config.export.share_command = Some(vec!["false".to_string()]);
    config.export.clipboard_command = vec!["cat".to_string()];
    let mut state = AppState::in_memory(config).await.unwrap();

    let text = hissa(&mut state, &["share"]).await.unwrap();
    assert_eq!(text, "Receipt copied to clipboard.\n");
}

#[cfg(unix)]
#[tokio::test]
async fn test_share_failure_is_an_export_error() {
    let mut config = HissaConfig::default();
    config.export.clipboard_command = vec!["false".to_string()];
    let mut state = AppState::in_memory(config).await.unwrap();

    let err = hissa(&mut state, &["share"]).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ExportError);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("hissa.toml");
    std::fs::write(&config_path, "[receipt]\ncurrency = \"UZS\"\n").unwrap();
    let db_path = dir.path().join("session.db");

    let invoke = |args: &[&str]| {
        let mut argv = vec![
            "hissa".to_string(),
            "--config".to_string(),
            config_path.display().to_string(),
            "--db".to_string(),
            db_path.display().to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(argv).unwrap()
    };

    let mut out = Vec::new();
    run(invoke(&["participant", "add", "Alice"]), &mut out)
        .await
        .unwrap();
    run(invoke(&["service", "set", "12.5"]), &mut out)
        .await
        .unwrap();

    let mut out = Vec::new();
    run(invoke(&["service", "show"]), &mut out).await.unwrap();
    run(invoke(&["participant", "list"]), &mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Service charge: 12.5%\n"));
    assert!(text.ends_with("  Alice\n"));
}
