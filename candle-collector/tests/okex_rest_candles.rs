use candle_collector::data::Interval;
use candle_collector::error::DataError;
use candle_collector::exchange::{CandleSource, OkexDelivery, SourcePolicy, OKEX_MAX_ROWS};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

async fn setup() -> (MockServer, OkexDelivery) {
    let mock_server = MockServer::start().await;
    let source = OkexDelivery::new(mock_server.uri())
        .unwrap()
        .with_policy(SourcePolicy {
            page_limit: Some(OKEX_MAX_ROWS),
            min_call_interval: Duration::ZERO,
        });
    (mock_server, source)
}

#[tokio::test]
async fn test_fetch_range_reorders_ascending() {
    let (mock_server, source) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/futures/v3/instruments/BTC-USD-200717/candles"))
        .and(query_param("granularity", "300"))
        .and(query_param("start", "2020-07-11T00:00:00.000Z"))
        .and(query_param("end", "2020-07-12T00:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["2020-07-11T00:10:00.000Z", "9235.9", "9236", "9230", "9231", "1022", "11.0697"],
            ["2020-07-11T00:05:00.000Z", "9231.2", "9240", "9228.1", "9235.9", "3140", "34.0095"],
            ["2020-07-11T00:00:00.000Z", "9228", "9233.3", "9225.1", "9231.2", "2213", "23.9770"]
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let start = Utc.with_ymd_and_hms(2020, 7, 11, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2020, 7, 12, 0, 0, 0).unwrap();
    let candles = source
        .fetch_range("BTC-USD-200717", 300, start, end)
        .await
        .unwrap();

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].open_time, start);
    assert_eq!(candles[0].quote_volume, Some(23.977));
    assert!(candles.windows(2).all(|w| w[0].open_time < w[1].open_time));
}

#[tokio::test]
async fn test_fetch_page_requests_bounded_range() {
    let (mock_server, source) = setup().await;

    // 200 five-minute buckets after midnight end at 16:40
    Mock::given(method("GET"))
        .and(path("/api/futures/v3/instruments/BTC-USDT-200925/candles"))
        .and(query_param("start", "2020-07-11T00:00:00.000Z"))
        .and(query_param("end", "2020-07-11T16:40:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["2020-07-11T00:05:00.000Z", "1", "1", "1", "1", "1", "1"],
            ["2020-07-11T00:00:00.000Z", "1", "1", "1", "1", "1", "1"]
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let since = Utc.with_ymd_and_hms(2020, 7, 11, 0, 0, 0).unwrap();
    let candles = source
        .fetch_page("BTC-USDT-200925", Interval::M5, since, None)
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[1].open_time, Utc.with_ymd_and_hms(2020, 7, 11, 0, 5, 0).unwrap());
}

#[tokio::test]
async fn test_api_error_payload() {
    let (mock_server, source) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/futures/v3/instruments/BTC-USD-190101/candles"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 30032,
            "message": "The currency pair suspended"
        })))
        .mount(&mock_server)
        .await;

    let since = Utc.with_ymd_and_hms(2020, 7, 11, 0, 0, 0).unwrap();
    let err = source
        .fetch_page("BTC-USD-190101", Interval::M5, since, None)
        .await
        .unwrap_err();

    match err {
        DataError::Api { exchange, code, msg } => {
            assert_eq!(exchange, "okex");
            assert_eq!(code, "30032");
            assert_eq!(msg, "The currency pair suspended");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_load_instruments() {
    let (mock_server, source) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/futures/v3/instruments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"instrument_id": "BTC-USD-200717", "underlying": "BTC-USD", "alias": "this_week"},
            {"instrument_id": "BTC-USDT-201225", "underlying": "BTC-USDT", "alias": "next_quarter"}
        ])))
        .mount(&mock_server)
        .await;

    let instruments = source.load_markets().await.unwrap();
    assert_eq!(instruments, vec!["BTC-USD-200717".to_string(), "BTC-USDT-201225".to_string()]);
}
