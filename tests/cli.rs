use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    config: TempDir,
    data: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            config: tempfile::tempdir().unwrap(),
            data: tempfile::tempdir().unwrap(),
        }
    }

    fn kas(&self) -> Command {
        let mut cmd = Command::cargo_bin("kas").unwrap();
        cmd.env("KAS_CONFIG_DIR", self.config.path())
            .env("KAS_DATA_DIR", self.data.path())
            .env("NO_COLOR", "1")
            .env_remove("KAS_BACKEND")
            .env_remove("KAS_OLLAMA_URL")
            .env_remove("KAS_OLLAMA_MODEL")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Day part of the first recorded row's timestamp in ledger.csv.
    fn first_csv_day(&self) -> String {
        let content = std::fs::read_to_string(self.data.path().join("ledger.csv")).unwrap();
        content.lines().nth(1).unwrap()[..10].to_string()
    }

    /// Day part of the first recorded row's timestamp in ledger.db.
    fn first_sqlite_day(&self) -> String {
        let conn = rusqlite::Connection::open(self.data.path().join("ledger.db")).unwrap();
        let cells: String = conn
            .query_row("SELECT cells FROM sheet_rows ORDER BY id LIMIT 1", [], |r| r.get(0))
            .unwrap();
        let cells: serde_json::Value = serde_json::from_str(&cells).unwrap();
        cells[0]["v"].as_str().unwrap()[..10].to_string()
    }
}


#[test]
fn test_init_creates_sheet_with_header() {
    let env = Env::new();
    env.kas()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized kas"));

    let content = std::fs::read_to_string(env.data.path().join("ledger.csv")).unwrap();
    assert_eq!(
        content.lines().next(),
        Some("Tanggal,Amount,Description,Payment Method,Category,Type")
    );
    assert!(env.config.path().join("settings.json").exists());
}

#[test]
fn test_add_then_daily() {
    let env = Env::new();
    env.kas()
        .args(["add", "25000", "nasi goreng", "--payment-method", "ShopeePay", "--category", "Makanan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded Makanan - nasi goreng (Rp25,000)"));
    env.kas()
        .args(["add", "500000", "Ambil uang dari atm", "--category", "Pemasukan", "--type", "income"])
        .assert()
        .success();

    env.kas()
        .args(["daily", "--date", &env.first_csv_day()])
        .assert()
        .success()
        .stdout(predicate::str::contains("nasi goreng"))
        .stdout(predicate::str::contains("Makanan/ShopeePay"))
        .stdout(predicate::str::contains("Ambil uang dari atm"))
        .stdout(predicate::str::contains("Total expenses: Rp25,000"));
}

#[test]
fn test_daily_empty_day() {
    let env = Env::new();
    env.kas()
        .args(["daily", "--date", "2001-02-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions recorded for 2001-02-03."));
}

#[test]
fn test_daily_rejects_bad_date() {
    let env = Env::new();
    env.kas()
        .args(["daily", "--date", "03/02/2001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_balance_all_time() {
    let env = Env::new();
    std::fs::write(
        env.data.path().join("ledger.csv"),
        "Tanggal,Amount,Description,Payment Method,Category,Type\n\
         2023-01-01 08:00:00,100000,Gaji,BCA,Pemasukan,Income\n\
         2023-06-01 12:00:00,30000,Bensin,Cash,Transportasi,expense\n\
         ,5000,Parkir,Cash,Transportasi,Expense\n\
         2024-01-05 09:00:00,999,Pindah saldo,Jago,,transfer\n",
    )
    .unwrap();

    env.kas()
        .arg("balance")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp100,000"))
        .stdout(predicate::str::contains("Rp35,000"))
        .stdout(predicate::str::contains("Rp65,000"))
        .stdout(predicate::str::contains("Rp999").not());
}

#[test]
fn test_record_from_stdin() {
    let env = Env::new();
    env.kas()
        .args(["record", "--reply"])
        .write_stdin(
            "Berikut hasilnya:\n{\"transaction_type\": \"expense\", \"amount\": 18000, \
             \"description\": \"kopi susu\", \"payment_method\": \"Gopay\", \"category\": \"Makanan\"}",
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded Makanan - kopi susu (Rp18,000)"));

    let content = std::fs::read_to_string(env.data.path().join("ledger.csv")).unwrap();
    let row = content.lines().nth(1).unwrap();
    assert!(row.ends_with(",18000,kopi susu,Gopay,Makanan,expense"), "{row}");
}

#[test]
fn test_record_refuses_zero_amount() {
    let env = Env::new();
    env.kas()
        .args(["record", "--reply", r#"{"amount": 0, "description": "?"}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing saved"));
}

#[test]
fn test_record_reply_gets_defaults() {
    let env = Env::new();
    env.kas()
        .args(["record", "--reply", r#"{"transaction_type": "income", "amount": 500000, "description": "Ambil uang dari atm"}"#])
        .assert()
        .success();

    let content = std::fs::read_to_string(env.data.path().join("ledger.csv")).unwrap();
    let row = content.lines().nth(1).unwrap();
    assert!(row.ends_with(",500000,Ambil uang dari atm,Cash,Pemasukan,income"), "{row}");
}

#[test]
fn test_record_without_model_config_fails() {
    let env = Env::new();
    env.kas()
        .args(["record", "25K nasi goreng via ShopeePay"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KAS_OLLAMA_URL"));
    assert!(!env.data.path().join("ledger.csv").exists());
}

#[test]
fn test_sqlite_backend() {
    let env = Env::new();
    env.kas().args(["init", "--backend", "sqlite"]).assert().success();
    assert!(env.data.path().join("ledger.db").exists());

    env.kas()
        .args(["add", "12.5", "teh", "--category", "Makanan"])
        .env("KAS_BACKEND", "sqlite")
        .assert()
        .success();
    env.kas()
        .args(["daily", "--date", &env.first_sqlite_day()])
        .env("KAS_BACKEND", "sqlite")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total expenses: Rp12.50"));
}
