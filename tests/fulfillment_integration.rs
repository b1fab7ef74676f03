// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end fulfillment tests against a wiremock registry and a
//! temporary configuration file.

use std::io::Write;

use assistant_bridge::{Bridge, ConfigCache, Error, FulfillmentRequest};
use serde_json::{Value, json};
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(registry_url: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r"
openhab: {registry_url}
agentUserId: home-1
devices:
  lamp:
    type: LIGHT
    name: Desk Lamp
    room: Office
    traits:
      OnOff: Lamp_Power
      ColorSetting: Lamp_Color
  fan:
    type: FAN
    name: Fan
    attributes:
      availableFanSpeeds:
        ordered: true
    traits:
      FanSpeed: Fan_Speed
"
    )
    .unwrap();
    file.flush().unwrap();
    file
}

fn request(intent: &str, payload: Value) -> FulfillmentRequest {
    serde_json::from_value(json!({
        "requestId": "req-42",
        "inputs": [{"intent": intent, "payload": payload}]
    }))
    .unwrap()
}

async fn handle(bridge: &Bridge<'_>, request: &FulfillmentRequest) -> Value {
    let response = bridge.handle(request).await.unwrap();
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn sync_lists_devices_without_registry_calls() {
    let mock_server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let reply = handle(&bridge, &request("action.devices.SYNC", Value::Null)).await;

    assert_eq!(reply["requestId"], "req-42");
    assert_eq!(reply["payload"]["agentUserId"], "home-1");
    let devices = reply["payload"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id"], "fan");
    assert_eq!(devices[0]["type"], "action.devices.types.FAN");
    assert_eq!(devices[0]["attributes"]["availableFanSpeeds"]["ordered"], true);
    assert_eq!(devices[1]["name"], json!({"name": "Desk Lamp"}));
    assert_eq!(devices[1]["roomHint"], "Office");
    assert_eq!(devices[1]["willReportState"], false);
    assert_eq!(
        devices[1]["traits"],
        json!(["action.devices.traits.ColorSetting", "action.devices.traits.OnOff"])
    );
}

#[tokio::test]
async fn query_reports_known_devices() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Lamp_Power", "type": "Switch", "state": "ON"},
            {"name": "Fan_Speed", "type": "String", "state": "S3"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let reply = handle(
        &bridge,
        &request(
            "action.devices.QUERY",
            json!({"devices": [{"id": "lamp"}, {"id": "fan"}, {"id": "garage"}]}),
        ),
    )
    .await;

    assert_eq!(
        reply,
        json!({
            "requestId": "req-42",
            "payload": {"devices": {
                "fan": {"online": true, "currentFanSpeedSetting": "S3"},
                "lamp": {"online": true, "on": true}
            }}
        })
    );
}

#[tokio::test]
async fn query_registry_failure_fails_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/items"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let err = bridge
        .handle(&request(
            "action.devices.QUERY",
            json!({"devices": [{"id": "lamp"}]}),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Registry(_)));
    assert_eq!(err.error_code(), "transientError");
}

#[tokio::test]
async fn execute_isolates_device_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/items/Lamp_Power"))
        .and(body_string("OFF"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let reply = handle(
        &bridge,
        &request(
            "action.devices.EXECUTE",
            json!({"commands": [
                {
                    "devices": [{"id": "lamp"}],
                    "execution": [
                        {"command": "action.devices.commands.ColorAbsolute",
                         "params": {"color": {"temperature": 2700}}},
                        {"command": "action.devices.commands.OnOff", "params": {"on": false}}
                    ]
                },
                {
                    "devices": [{"id": "ghost"}, {"id": "fan"}],
                    "execution": [{"command": "action.devices.commands.StartStop",
                                   "params": {"start": true}}]
                }
            ]}),
        ),
    )
    .await;

    let commands = reply["payload"]["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 4);

    assert_eq!(commands[0]["ids"], json!(["lamp"]));
    assert_eq!(commands[0]["status"], "ERROR");
    assert_eq!(commands[0]["errorCode"], "notSupported");

    assert_eq!(
        commands[1],
        json!({"ids": ["lamp"], "status": "SUCCESS", "states": {"online": true, "on": false}})
    );

    assert_eq!(
        commands[2],
        json!({"ids": ["ghost"], "status": "SUCCESS", "states": {"online": true}})
    );

    assert_eq!(commands[3]["ids"], json!(["fan"]));
    assert_eq!(commands[3]["status"], "ERROR");
    assert_eq!(commands[3]["errorCode"], "functionNotSupported");
}

#[tokio::test]
async fn malformed_execute_payload() {
    let mock_server = MockServer::start().await;
    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let err = bridge
        .handle(&request("action.devices.EXECUTE", json!({"commands": 5})))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request(_)));
    assert_eq!(err.error_code(), "protocolError");
}

#[tokio::test]
async fn disconnect_replies_with_empty_object() {
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache("/nonexistent/config.yaml", &cache);

    let reply = handle(&bridge, &request("action.devices.DISCONNECT", Value::Null)).await;
    assert_eq!(reply, json!({}));
}

#[tokio::test]
async fn configuration_loaded_once_across_requests() {
    let mock_server = MockServer::start().await;
    let config = write_config(&mock_server.uri());
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    for _ in 0..3 {
        handle(&bridge, &request("action.devices.SYNC", Value::Null)).await;
    }

    assert_eq!(cache.load_count(), 1);
}

#[tokio::test]
async fn registry_url_without_host_is_hard_error() {
    let mut config = NamedTempFile::new().unwrap();
    write!(
        config,
        "openhab: \"\"\ndevices:\n  lamp:\n    type: LIGHT\n    name: Lamp\n    traits:\n      OnOff: Lamp_Power\n"
    )
    .unwrap();
    config.flush().unwrap();
    let cache = ConfigCache::new();
    let bridge = Bridge::with_cache(config.path(), &cache);

    let err = bridge
        .handle(&request(
            "action.devices.EXECUTE",
            json!({"commands": [{
                "devices": [{"id": "ghost"}],
                "execution": [{"command": "action.devices.commands.OnOff", "params": {"on": true}}]
            }]}),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert_eq!(err.error_code(), "hardError");
}
