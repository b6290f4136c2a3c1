//! Contract tests for the GA4 View Item action against a mocked
//! Measurement Protocol collect endpoint.
//!
//! | Scenario | Expected |
//! |----------|----------|
//! | web stream, valid items | one POST with credentials in the query string |
//! | mobile stream | `firebase_app_id` in the query string, colons intact |
//! | unsupported currency | `VALIDATION_ERROR` 400, nothing sent |
//! | nested params with verify flag on | `VALIDATION_ERROR` 400, nothing sent |
//! | timestamp flag on | `timestamp_micros` present in the body |

use courier_destinations::google_analytics_4::{
    EventTimestamp, Ga4Settings, ProductItem, ViewItem, ViewItemPayload,
};

use courier_core::{ActionContext, DestinationAction, ErrorCode, FeatureFlags, Transport};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn settings_for(server: &MockServer) -> Ga4Settings {
    Ga4Settings {
        measurement_id: Some("G-TEST1".to_string()),
        firebase_app_id: Some("1:99:android:aa11".to_string()),
        api_secret: "shh".to_string(),
        collect_url: Some(server.uri()),
    }
}

fn web_payload() -> ViewItemPayload {
    ViewItemPayload {
        client_id: Some("client.42".to_string()),
        currency: Some("USD".to_string()),
        value: Some(19.99),
        items: vec![ProductItem {
            item_name: Some("Cool Shirt".to_string()),
            price: Some(19.99),
            quantity: Some(1),
            ..ProductItem::default()
        }],
        ..ViewItemPayload::default()
    }
}

#[tokio::test]
async fn web_stream_delivers_with_credentials_in_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("api_secret", "shh"))
        .and(query_param("measurement_id", "G-TEST1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = Transport::new().unwrap();
    let outcome = ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings_for(&server),
                payload: &web_payload(),
                features: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.response().expect("delivered").status, 204);

    let request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["client_id"], "client.42");
    assert_eq!(body["events"][0]["name"], "view_item");
    assert_eq!(body["events"][0]["params"]["currency"], "USD");
    assert_eq!(body["events"][0]["params"]["items"][0]["item_name"], "Cool Shirt");
}

#[tokio::test]
async fn mobile_stream_uses_firebase_app_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("api_secret", "shh"))
        .and(query_param("firebase_app_id", "1:99:android:aa11"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let payload = ViewItemPayload {
        data_stream_type: courier_destinations::google_analytics_4::DataStreamType::MobileApp,
        app_instance_id: Some("inst-7".to_string()),
        client_id: None,
        ..web_payload()
    };
    let transport = Transport::new().unwrap();
    ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings_for(&server),
                payload: &payload,
                features: None,
            },
        )
        .await
        .unwrap();

    let request: &Request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["app_instance_id"], "inst-7");
}

#[tokio::test]
async fn unsupported_currency_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let payload = ViewItemPayload {
        currency: Some("DOGE".to_string()),
        ..web_payload()
    };
    let transport = Transport::new().unwrap();
    let err = ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings_for(&server),
                payload: &payload,
                features: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::ValidationError));
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "DOGE is not a valid currency code.");
}

#[tokio::test]
async fn nested_params_fail_only_when_verification_flag_is_on() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut payload = web_payload();
    payload.params = Some(
        serde_json::json!({"nested": {"deep": true}})
            .as_object()
            .cloned()
            .unwrap(),
    );
    let transport = Transport::new().unwrap();
    let settings = settings_for(&server);

    // Flag off: the nested value passes through untouched.
    ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings,
                payload: &payload,
                features: None,
            },
        )
        .await
        .unwrap();

    // Flag on: verification rejects before sending.
    let flags: FeatureFlags =
        [("actions-google-analytics-4-verify-params-feature", true)].into_iter().collect();
    let err = ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings,
                payload: &payload,
                features: Some(&flags),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::ValidationError));
    assert!(err.message().contains("`nested`"));
}

#[tokio::test]
async fn timestamp_is_forwarded_when_flag_is_on() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut payload = web_payload();
    payload.timestamp_micros = Some(EventTimestamp::Rfc3339("2023-11-14T22:13:20Z".to_string()));

    let flags: FeatureFlags =
        [("actions-google-analytics-4-add-timestamp", true)].into_iter().collect();
    let transport = Transport::new().unwrap();
    ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings_for(&server),
                payload: &payload,
                features: Some(&flags),
            },
        )
        .await
        .unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["timestamp_micros"], 1_700_000_000_000_000_i64);
}

#[tokio::test]
async fn user_properties_are_wrapped_for_the_measurement_protocol() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut payload = web_payload();
    payload.user_properties = Some(
        serde_json::json!({"plan": "pro"}).as_object().cloned().unwrap(),
    );
    let transport = Transport::new().unwrap();
    ViewItem
        .perform(
            &transport,
            ActionContext {
                settings: &settings_for(&server),
                payload: &payload,
                features: None,
            },
        )
        .await
        .unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["user_properties"]["plan"]["value"], "pro");
}
