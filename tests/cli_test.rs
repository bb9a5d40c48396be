use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_cli_recognized_shopper_checks_out_first_card() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg("tests/fixtures/cards.csv")
        .arg("--environment")
        .arg("test")
        .arg("--recognized");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""ctp_state": "Ready""#))
        .stdout(predicate::str::contains(r#""src_digital_card_id": "abc123""#))
        .stdout(predicate::str::contains(r#""dcf_action_code": "COMPLETE""#));

    Ok(())
}

#[test]
fn test_cli_otp_flow_with_selected_card() {
    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg("tests/fixtures/cards.csv")
        .arg("--scheme")
        .arg("visa")
        .arg("--email")
        .arg("shopper@example.com")
        .arg("--card")
        .arg("def456");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""scheme": "visa""#))
        .stdout(predicate::str::contains(r#""src_digital_card_id": "def456""#));
}

#[test]
fn test_cli_wrong_otp_fails() {
    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg("tests/fixtures/cards.csv")
        .arg("--phone")
        .arg("+31600000000")
        .arg("--otp")
        .arg("000000");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("completeIdentityValidation"));
}

#[test]
fn test_cli_unknown_shopper_falls_back_to_card_entry() {
    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg("tests/fixtures/cards.csv").arg("--preloaded");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""ctp_state": "NotAvailable""#))
        .stdout(predicate::str::contains(r#""payload": null"#));
}

#[test]
fn test_cli_skips_malformed_cards() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "src_digital_card_id, pan_last_four, art_uri, card_title").unwrap();
    writeln!(csv, "bad, 42, https://art.example/bad.png, Broken").unwrap();
    writeln!(csv, "good, 1234, https://art.example/good.png, Fine").unwrap();

    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg(csv.path()).arg("--recognized");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Skipping card"))
        .stdout(predicate::str::contains(r#""src_digital_card_id": "good""#));
}

#[test]
fn test_cli_unsupported_scheme() {
    let mut cmd = Command::new(cargo_bin!("ctp-sandbox"));
    cmd.arg("tests/fixtures/cards.csv").arg("--scheme").arg("amex");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported scheme 'amex'"));
}
