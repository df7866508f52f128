#![cfg(feature = "yahoo")]

mod support;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use papertrade::market_data::{PriceSeriesProvider, YahooChartSource};

use support::{date, dec, ticker};

fn chart_body(exchange: &str) -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": {
                    "symbol": "AAPL",
                    "exchangeName": exchange,
                    "longName": "Apple Inc."
                },
                // Closes at 21:00 UTC on Jan 2, 3, and 8 of 2024; the
                // Jan 3 close is null (halted), and Jan 2 needs rounding.
                "timestamp": [1704229200i64, 1704315600i64, 1704747600i64],
                "indicators": {
                    "quote": [{
                        "close": [185.637, null, 187.0]
                    }]
                }
            }],
            "error": null
        }
    })
}

fn source_for(server: &MockServer) -> YahooChartSource {
    YahooChartSource::with_base_url(format!("{}/v8/finance/chart", server.uri()))
}

#[tokio::test]
async fn parses_chart_response_into_a_security() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("NMS")))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let security = source
        .get_security(&ticker("AAPL"))
        .await?
        .expect("security found");

    assert_eq!(security.ticker, ticker("AAPL"));
    assert_eq!(security.name, "Apple Inc.");
    assert!(security.is_tradeable);
    // Null closes are dropped; real ones are rounded to cents.
    assert_eq!(security.series.len(), 2);
    assert_eq!(security.series.price_at(date(2024, 1, 2)), Some(dec("185.64")));
    assert_eq!(security.series.price_at(date(2024, 1, 3)), None);
    assert_eq!(security.series.price_at(date(2024, 1, 8)), Some(dec("187.00")));
    Ok(())
}

#[tokio::test]
async fn non_nms_exchange_is_not_tradeable() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("PNK")))
        .mount(&server)
        .await;

    let source = source_for(&server);
    let security = source
        .get_security(&ticker("AAPL"))
        .await?
        .expect("security found");
    assert!(!security.is_tradeable);
    Ok(())
}

#[tokio::test]
async fn http_404_is_a_lookup_miss() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = source_for(&server);
    assert!(source.get_security(&ticker("NOPE")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn chart_error_payload_is_a_lookup_miss() -> Result<()> {
    let server = MockServer::start().await;
    let body = json!({
        "chart": {
            "result": null,
            "error": {
                "code": "Not Found",
                "description": "No data found, symbol may be delisted"
            }
        }
    });
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GONE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let source = source_for(&server);
    assert!(source.get_security(&ticker("GONE")).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn server_error_propagates_as_a_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = source_for(&server);
    assert!(source.get_security(&ticker("AAPL")).await.is_err());
    Ok(())
}
