// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::io::Read;
use std::thread;
use std::time::Duration;
use stockroom_api::Client;
use stockroom_app::{InventoryId, InventoryService, NewInventory};
use stockroom_testkit::{fixture_date, flour_record, sample_records};
use tiny_http::{Header, Method, Response, Server};

struct Captured {
    method: Method,
    url: String,
    body: String,
}

/// Serves one canned response per entry and hands back what was received.
fn mock_server(
    responses: Vec<(u16, &'static str)>,
) -> Result<(String, thread::JoinHandle<Vec<Captured>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let mut request = server.recv().expect("request expected");
            let mut received = String::new();
            request
                .as_reader()
                .read_to_string(&mut received)
                .expect("request body should be readable");
            captured.push(Captured {
                method: request.method().clone(),
                url: request.url().to_owned(),
                body: received,
            });
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        captured
    });

    Ok((addr, handle))
}

#[test]
fn unreachable_server_error_points_at_config() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .fetch_inventory()
        .expect_err("fetch should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("[api]"), "{message}");
    assert!(message.contains("127.0.0.1:1"), "{message}");
}

#[test]
fn fetch_inventory_decodes_wire_records() -> Result<()> {
    let body = r#"[
        {"id":"inv-1","name":"Flour","productType":"Grain","description":"bulk bag",
         "averagePrice":4.5,"amount":10,"unitOfMeasurement":"kg",
         "bestBeforeDate":null,"neverExpires":true},
        {"id":"inv-2","name":"Milk","productType":"Dairy","description":null,
         "averagePrice":1.29,"amount":4,"unitOfMeasurement":"l",
         "bestBeforeDate":"2026-03-14T00:00:00.000+00:00","neverExpires":false},
        {"id":"inv-3","name":"Mystery","productType":"Produce",
         "averagePrice":null,"amount":1,"unitOfMeasurement":"ea",
         "bestBeforeDate":"soon"}
    ]"#;
    let (addr, handle) = mock_server(vec![(200, body)])?;

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let records = client.fetch_inventory()?;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0], flour_record());
    assert_eq!(records[1].average_price_cents, 129);
    assert_eq!(records[1].best_before_date, Some(fixture_date()));
    assert_eq!(records[2].average_price_cents, 0);
    assert_eq!(records[2].best_before_date, None);
    assert!(!records[2].never_expires);

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].method, Method::Get);
    assert_eq!(captured[0].url, "/inventory");
    Ok(())
}

#[test]
fn fetch_products_hits_products_endpoint() -> Result<()> {
    let (addr, handle) = mock_server(vec![(200, r#"[{"id":"p1","name":"Grain"}]"#)])?;

    let client = Client::new(&format!("{addr}/"), Duration::from_secs(1))?;
    let products = client.fetch_products()?;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Grain");

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].url, "/products");
    Ok(())
}

#[test]
fn create_posts_record_without_id() -> Result<()> {
    let reply = r#"{"id":"inv-9","name":"Flour","productType":"Grain","description":"bulk bag",
        "averagePrice":4.5,"amount":10,"unitOfMeasurement":"kg","neverExpires":true}"#;
    let (addr, handle) = mock_server(vec![(200, reply)])?;

    let flour = flour_record();
    let draft = NewInventory {
        name: flour.name,
        product_type: flour.product_type,
        description: flour.description,
        average_price_cents: flour.average_price_cents,
        amount: flour.amount,
        unit_of_measurement: flour.unit_of_measurement,
        best_before_date: flour.best_before_date,
        never_expires: flour.never_expires,
    };

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let created = client.create_inventory(&draft)?;
    assert_eq!(created.id, InventoryId::new("inv-9"));

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].method, Method::Post);
    assert_eq!(captured[0].url, "/inventory");
    let sent: serde_json::Value = serde_json::from_str(&captured[0].body)?;
    assert!(sent.get("id").is_none());
    assert_eq!(sent["productType"], "Grain");
    assert_eq!(sent["averagePrice"], 4.5);
    assert_eq!(sent["neverExpires"], true);
    Ok(())
}

#[test]
fn update_puts_record_and_rejects_null_reply() -> Result<()> {
    let (addr, handle) = mock_server(vec![(200, "null")])?;

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let record = sample_records().remove(1);
    let error = client
        .update_inventory(&record)
        .expect_err("null reply should fail");
    assert_eq!(error.to_string(), "inventory inv-2 not found");

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].method, Method::Put);
    let sent: serde_json::Value = serde_json::from_str(&captured[0].body)?;
    assert_eq!(sent["id"], "inv-2");
    assert_eq!(sent["bestBeforeDate"], "2026-03-14");
    Ok(())
}

#[test]
fn delete_sends_id_array() -> Result<()> {
    let (addr, handle) = mock_server(vec![(200, "")])?;

    let client = Client::new(&addr, Duration::from_secs(1))?;
    client.delete_inventory(&[InventoryId::new("inv-1"), InventoryId::new("inv-3")])?;

    let captured = handle.join().expect("server thread should join");
    assert_eq!(captured[0].method, Method::Delete);
    assert_eq!(captured[0].url, "/inventory");
    assert_eq!(captured[0].body, r#"["inv-1","inv-3"]"#);
    Ok(())
}

#[test]
fn non_success_status_surfaces_server_message() -> Result<()> {
    let (addr, handle) = mock_server(vec![(
        500,
        r#"{"status":500,"error":"Internal Server Error","message":"mongo unavailable"}"#,
    )])?;

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .fetch_inventory()
        .expect_err("500 should surface as error");
    assert_eq!(error.to_string(), "server error (500): mongo unavailable");

    handle.join().expect("server thread should join");
    Ok(())
}
