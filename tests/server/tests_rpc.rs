//! Line protocol round trips.

use std::io::Cursor;
use std::sync::Arc;

use kconfig::project::{MemoryFileAccess, ProjectConfig};
use kconfig::server::protocol::ConfigResult;
use kconfig::server::{RpcServer, Workspace};
use serde_json::{Value, json};

use crate::helpers::source_fixtures::{BOARD, FOO_BAR};

const URI: &str = "file:///w/Kconfig";

fn server() -> RpcServer {
    let workspace = Workspace::new(ProjectConfig::default(), Arc::new(MemoryFileAccess::new()));
    RpcServer::new(Arc::new(workspace))
}

/// Send one request; returns the response followed by notifications.
fn call(server: &mut RpcServer, id: u64, method: &str, params: Value) -> Vec<Value> {
    let line = json!({ "id": id, "method": method, "params": params }).to_string();
    server
        .handle_line(&line)
        .iter()
        .map(|out| serde_json::from_str(out).expect("server writes JSON"))
        .collect()
}

fn result(server: &mut RpcServer, id: u64, method: &str, params: Value) -> Value {
    let messages = call(server, id, method, params);
    assert_eq!(messages[0]["id"], json!(id));
    assert!(messages[0].get("error").is_none(), "{:?}", messages[0]);
    messages[0]["result"].clone()
}

#[test]
fn test_parse_then_queries() {
    let mut server = server();
    let parsed = result(&mut server, 1, "parse", json!({ "fileUri": URI, "text": FOO_BAR }));
    assert_eq!(parsed["diagnostics"], json!([]));

    let config = result(&mut server, 2, "getConfig", Value::Null);
    assert_eq!(
        config["symbols"]["BAR"],
        json!({ "type": "bool", "value": "n", "visible": false, "active": false, "state": "default" })
    );

    let symbols = result(&mut server, 3, "documentSymbols", json!({ "fileUri": URI }));
    assert_eq!(symbols[1]["name"], "BAR");
    assert_eq!(symbols[1]["kind"], "Config");
    assert_eq!(symbols[1]["active"], false);
    assert_eq!(symbols[1]["range"]["start"], json!({ "line": 3, "character": 0 }));

    let hover = result(
        &mut server,
        4,
        "hover",
        json!({ "fileUri": URI, "position": { "line": 5, "character": 14 } }),
    );
    assert!(hover["contents"].as_str().unwrap().contains("**FOO**"));

    let none = result(
        &mut server,
        5,
        "hover",
        json!({ "fileUri": URI, "position": { "line": 1, "character": 3 } }),
    );
    assert_eq!(none, Value::Null);
}

#[test]
fn test_set_config_notifies_changed_symbols() {
    let mut server = server();
    call(&mut server, 1, "parse", json!({ "fileUri": URI, "text": FOO_BAR }));

    let messages = call(&mut server, 2, "setConfig", json!({ "name": "FOO", "value": "y" }));
    assert_eq!(messages[0]["result"], json!({ "ok": true }));
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["method"], "didChangeConfig");
    let symbols = messages[1]["params"]["symbols"].as_array().unwrap();
    assert!(symbols.contains(&json!("FOO")));
    assert!(symbols.contains(&json!("BAR")));

    // Same value again: accepted, nothing changes, nothing is sent.
    let messages = call(&mut server, 3, "setConfig", json!({ "name": "FOO", "value": true }));
    assert_eq!(messages[0]["result"], json!({ "ok": true }));
    assert_eq!(messages.len(), 1);

    let messages = call(&mut server, 4, "setConfig", json!({ "name": "FOO", "value": "maybe" }));
    let error = messages[0]["result"]["error"].as_str().unwrap();
    assert!(error.contains("maybe"));
}

#[test]
fn test_completion_items_on_the_wire() {
    let mut server = server();
    let text = "config FOO\n\tbool \"Foo\"\n\nconfig BAR\n\tbool \"Bar\"\n\tdepends on F\n";
    call(&mut server, 1, "parse", json!({ "fileUri": URI, "text": text }));
    let completions = result(
        &mut server,
        2,
        "complete",
        json!({ "fileUri": URI, "position": { "line": 5, "character": 13 } }),
    );
    assert_eq!(
        completions["items"],
        json!([{ "label": "FOO", "kind": 6, "detail": "bool \"Foo\"", "sortText": "00000" }])
    );
}

#[test]
fn test_export_import_round_trip_over_rpc() {
    let mut first = server();
    call(&mut first, 1, "parse", json!({ "fileUri": URI, "text": BOARD }));
    call(&mut first, 2, "setConfig", json!({ "name": "NR_CPUS", "value": 8 }));
    call(&mut first, 3, "setConfig", json!({ "name": "CONSOLE_USB", "value": "y" }));
    let exported = result(&mut first, 4, "exportConfig", json!({}));
    let text = exported["text"].as_str().unwrap().to_string();
    assert!(text.contains("CONFIG_NR_CPUS=8\n"));

    let mut second = server();
    call(&mut second, 1, "parse", json!({ "fileUri": URI, "text": BOARD }));
    let imported = result(&mut second, 2, "importConfig", json!({ "text": text }));
    assert_eq!(imported["diagnostics"], json!([]));
    assert!(imported["applied"].as_u64().unwrap() > 0);

    let visible = |config: Value| -> Vec<(String, Value, Value, Value)> {
        let config: ConfigResult = serde_json::from_value(config).unwrap();
        config
            .symbols
            .into_iter()
            .map(|(name, s)| (name, json!(s.ty), json!(s.value), json!(s.visible)))
            .collect()
    };
    assert_eq!(
        visible(result(&mut second, 3, "getConfig", Value::Null)),
        visible(result(&mut first, 5, "getConfig", Value::Null))
    );
}

#[test]
fn test_import_reports_line_positions() {
    let mut server = server();
    call(&mut server, 1, "parse", json!({ "fileUri": URI, "text": FOO_BAR }));
    let imported = result(
        &mut server,
        2,
        "importConfig",
        json!({ "text": "CONFIG_FOO=y\nCONFIG_NOPE=y\n" }),
    );
    assert_eq!(imported["applied"], 1);
    let diagnostic = &imported["diagnostics"][0];
    assert_eq!(diagnostic["code"], "W0002");
    assert_eq!(diagnostic["range"]["start"]["line"], 1);
}

#[test]
fn test_protocol_errors() {
    let mut server = server();
    let out = server.handle_line("{ not json");
    let response: Value = serde_json::from_str(&out[0]).unwrap();
    assert_eq!(response["id"], Value::Null);
    assert!(response["error"]["message"].as_str().unwrap().starts_with("invalid request"));

    let messages = call(&mut server, 7, "frobnicate", json!({}));
    assert_eq!(messages[0]["id"], 7);
    assert!(messages[0]["error"]["message"].as_str().unwrap().contains("frobnicate"));

    let messages = call(&mut server, 8, "hover", json!({ "fileUri": URI }));
    assert!(messages[0]["error"]["message"].as_str().unwrap().contains("hover"));
}

#[test]
fn test_run_stops_at_shutdown() {
    let mut server = server();
    let input = format!(
        "{}\n\n{}\n{}\n",
        json!({ "id": 1, "method": "parse", "params": { "fileUri": URI, "text": FOO_BAR } }),
        json!({ "id": 2, "method": "shutdown" }),
        json!({ "id": 3, "method": "getConfig" }),
    );
    let mut output = Vec::new();
    server.run(Cursor::new(input), &mut output).unwrap();
    assert!(server.is_shutdown());

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let ids: Vec<&Value> = lines.iter().filter_map(|l| l.get("id")).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2)]);
}
