//! End-to-end runs of the trainer and predictor binaries.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PROBABILITY_LINE: &str = r"^Predicted donor response probability: (0|1)\.\d{2}\n";

fn train(dir: &TempDir) -> PathBuf {
    let model = dir.path().join("ml").join("model.bin");
    Command::cargo_bin("train-donor-model")
        .unwrap()
        .arg("--output")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("Model trained and saved as"));
    model
}

fn predict(model: &Path) -> Command {
    let mut cmd = Command::cargo_bin("predict-donor").unwrap();
    cmd.arg("--model").arg(model);
    cmd
}

fn probability(output: &[u8]) -> f64 {
    let stdout = String::from_utf8(output.to_vec()).unwrap();
    stdout
        .lines()
        .next()
        .and_then(|line| line.rsplit(' ').next())
        .unwrap()
        .parse()
        .unwrap()
}

#[test]
fn default_record_prints_a_two_decimal_probability() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    let assert = predict(&model)
        .assert()
        .success()
        .stdout(predicate::str::is_match(PROBABILITY_LINE).unwrap());
    let p = probability(&assert.get_output().stdout);
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn shorthand_and_json_inputs_score_the_same() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    let shorthand = predict(&model).arg("A+,Pune,3").output().unwrap();
    let json = predict(&model)
        .arg(r#"{"bloodGroup":"A+","city":"Pune","isAvailable":1,"monthsSinceLastDonation":3}"#)
        .output()
        .unwrap();
    let default = predict(&model).output().unwrap();
    assert!(shorthand.status.success());
    assert_eq!(shorthand.stdout, json.stdout);
    assert_eq!(shorthand.stdout, default.stdout);
}

#[test]
fn retraining_gives_the_same_prediction() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);
    let first = predict(&model).arg("O-,Mumbai,5").output().unwrap();
    train(&dir);
    let second = predict(&model).arg("O-,Mumbai,5").output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn mismatched_request_lowers_the_probability() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    let own = predict(&model).arg("B+,Delhi,2").output().unwrap();
    let other = predict(&model)
        .args(["B+,Delhi,2", "--request-blood-group", "AB-", "--request-city", "Chennai"])
        .output()
        .unwrap();
    assert!(probability(&own.stdout) > probability(&other.stdout));
}

#[test]
fn non_integer_months_is_reported() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    predict(&model)
        .arg("A+,Pune,abc")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("abc"));
}

#[test]
fn broken_json_is_not_read_as_shorthand() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    predict(&model)
        .arg(r#"{"bloodGroup":"A+","city":"Pune",3}"#)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn missing_model_is_fatal() {
    let dir = TempDir::new().unwrap();
    predict(&dir.path().join("absent.bin"))
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("absent.bin"));
}

#[test]
fn corrupt_model_is_fatal() {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("model.bin");
    std::fs::write(&model, b"not a model").unwrap();
    predict(&model).assert().failure().stdout(predicate::str::is_empty());
}

#[test]
fn trainer_reads_a_dataset_file() {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("donors.csv");
    std::fs::write(
        &dataset,
        "bloodGroupMatch,cityMatch,isAvailable,monthsSinceLastDonation,respondedPreviously\n\
         1,1,1,2,1\n0,1,0,6,0\n1,0,1,1,1\n0,1,1,8,0\n1,0,0,4,0\n1,1,1,3,1\n0,0,1,10,0\n1,1,0,2,1\n",
    )
    .unwrap();
    let from_file = dir.path().join("from_file.bin");
    Command::cargo_bin("train-donor-model")
        .unwrap()
        .arg("--dataset")
        .arg(&dataset)
        .arg("--output")
        .arg(&from_file)
        .assert()
        .success();

    let builtin = train(&dir);
    let a = predict(&from_file).arg("AB+,Chennai,4").output().unwrap();
    let b = predict(&builtin).arg("AB+,Chennai,4").output().unwrap();
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn roster_recommendations_follow_the_probability() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);
    let roster = dir.path().join("roster.csv");
    std::fs::write(
        &roster,
        "fullName,phone,bloodGroup,city,state,isAvailable,donationCount,lastDonationDate\n\
         Asha Patil,9800000001,A+,Pune,Maharashtra,1,4,2024-02-10\n\
         Vikram Shah,9800000002,A+,Mumbai,Maharashtra,1,6,\n\
         Neha Iyer,9800000003,A+,Chennai,Tamil Nadu,1,9,2023-11-01\n\
         Omkar Joshi,9800000004,B+,Pune,Maharashtra,1,12,\n",
    )
    .unwrap();

    predict(&model)
        .arg("--roster")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::is_match(PROBABILITY_LINE).unwrap())
        .stdout(predicate::str::contains("1. Vikram Shah"))
        .stdout(predicate::str::contains("2. Asha Patil"))
        .stdout(predicate::str::contains("Neha Iyer").not())
        .stdout(predicate::str::contains("Omkar Joshi").not());
}

#[test]
fn donor_in_an_uncoded_city_matches_its_own_city() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    let nagpur = predict(&model).arg("O+,Nagpur,3").output().unwrap();
    let pune = predict(&model).arg("O+,Pune,3").output().unwrap();
    assert!(nagpur.status.success());
    assert_eq!(nagpur.stdout, pune.stdout);
}

#[test]
fn unknown_requested_blood_group_is_rejected() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    for blood_group in ["a+", "AB"] {
        predict(&model)
            .args(["A+,Pune,3", "--request-blood-group", blood_group])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("blood group must be one of"));
    }
}

#[test]
fn a_failure_is_reported_once() {
    let dir = TempDir::new().unwrap();
    let model = train(&dir);

    let output = predict(&model).arg("A+,Pune,abc").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    let reports: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    assert_eq!(reports.len(), 1, "stderr was {:?}", stderr);
    assert!(reports[0].contains("InputParse"));
}
