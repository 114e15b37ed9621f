use chrono_tz::Tz;
use serde_json::json;

use dexbot_signals::api::decode_list;
use dexbot_signals::export::{build_export, write_xlsx};
use dexbot_signals::present::signal_table;
use dexbot_signals::signals::{prepare, Signal, SignalKind, SignalSummary, TokenDirectory};
use dexbot_signals::state::{Session, SettingsStore, SortSpec};

fn payload() -> serde_json::Value {
    json!([
        {"pairName": "XVS/USDT", "signal": "Sell", "currentPrice": "8.41",
         "predictedTime": "2024.01.15 10:00:00", "expiryTime": "2024.01.15 14:00:00",
         "hit_status": "Not Reached", "hit_time": "Not Reached"},
        {"pairName": "CAKE/USDT", "signal": "Buy", "currentPrice": 2.61,
         "currentPriceAtPredicition": 2.5, "tpPercentage": 1.6, "slPercentage": -0.8,
         "pairAddress": "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82",
         "predictedTime": "2024.01.15 10:00:00", "expiryTime": "2024.01.15 14:00:00",
         "hit_status": "Reached", "hit_time": "2024.01.15 11:30:00"},
        {"pairName": "ETH/USDT", "signal": "Error"},
        {"pairName": "BTCB/USDT", "signal": "Hold", "currentPrice": "42000.5",
         "predictedTime": "not a date"},
        "garbage",
        {"pairName": "cake2/USDT", "signal": "Buy"}
    ])
}

fn signals() -> Vec<Signal> {
    decode_list("http://signals.test", payload()).unwrap()
}

#[test]
fn test_json_to_rows() {
    let decoded = signals();
    // the bare string is skipped, everything else survives decoding
    assert_eq!(decoded.len(), 5);

    let rows = prepare(decoded, "", &TokenDirectory::builtin(), Tz::UTC);
    let pairs: Vec<&str> = rows.iter().map(|r| r.pair_name()).collect();
    assert_eq!(pairs, vec!["CAKE/USDT", "cake2/USDT", "BTCB/USDT", "XVS/USDT"]);
    assert!(rows.iter().all(|r| r.signal.signal != SignalKind::Error));

    let cake = &rows[0];
    assert_eq!(cake.asset_label(), "PANCAKESWAP (CAKE)");
    assert_eq!(cake.predicted_at, "15.01.2024 09:00:00");
    assert_eq!(cake.hit_time, "15.01.2024 10:30:00");
    assert_eq!(cake.short_address.as_deref(), Some("0x0E09...cE82"));

    let btc = &rows[2];
    assert_eq!(btc.predicted_at, "Invalid Date");
    assert_eq!(btc.expires_at, "N/A");

    let summary = SignalSummary::from_rows(&rows);
    assert_eq!(summary.buy_ratio(), "Buy: 2/4");
}

#[test]
fn test_search_is_subset() {
    let all = prepare(signals(), "", &TokenDirectory::builtin(), Tz::UTC);
    let cake = prepare(signals(), "  CaKe ", &TokenDirectory::builtin(), Tz::UTC);
    assert_eq!(cake.len(), 2);
    for row in &cake {
        assert!(row.pair_name().to_lowercase().contains("cake"));
        assert!(all.iter().any(|r| r.pair_name() == row.pair_name()));
    }
}

#[test]
fn test_saved_sorting_drives_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(SettingsStore::new(dir.path().join("settings.json")), "UTC");
    session
        .set_sorting(vec![
            SortSpec { id: "currentPrice".to_string(), desc: true },
            SortSpec { id: "removedColumn".to_string(), desc: false },
        ])
        .unwrap();

    let reopened = Session::open(SettingsStore::new(dir.path().join("settings.json")), "UTC");
    let table = signal_table();
    let sorting = table.valid_sorting(&reopened.settings().table_sorting);
    assert_eq!(sorting.len(), 1);

    let mut rows = prepare(signals(), "", &TokenDirectory::builtin(), reopened.zone());
    table.sort(&mut rows, &sorting);
    assert_eq!(rows[0].pair_name(), "BTCB/USDT");
    // no price sorts last even when descending
    assert_eq!(rows[3].pair_name(), "cake2/USDT");

    let out = table.render(&rows, &sorting);
    assert!(out.lines().next().unwrap().contains("CURRENT PRICE (USDT) v"));
}

#[test]
fn test_export_from_pipeline() {
    let rows = prepare(signals(), "cake", &TokenDirectory::builtin(), Tz::UTC);
    let sheet = build_export(&rows);
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(
        sheet.file_name,
        "pancake_price_predictions_15012024_0900_to_15012024_1300.xlsx"
    );

    let dir = tempfile::tempdir().unwrap();
    let path = write_xlsx(&sheet, dir.path()).unwrap();
    assert!(path.ends_with(&sheet.file_name));
    assert!(path.exists());
}

#[test]
fn test_empty_export() {
    let rows = prepare(signals(), "no such pair", &TokenDirectory::builtin(), Tz::UTC);
    assert!(rows.is_empty());
    let sheet = build_export(&rows);
    let dir = tempfile::tempdir().unwrap();
    assert!(write_xlsx(&sheet, dir.path()).is_ok());
}
