mod common;

use bson::oid::ObjectId;
use chrono::NaiveDate;

use common::*;
use movequote_backend::model::quote_request::{
    Address, ContactDetails, DismantlingOption, MediaRef, PackingOption, PropertyDetails, PropertyType,
    QuoteRequest, ServiceType, SurveyMethod,
};

fn request(email: &str, created_at: &str, media: Vec<MediaRef>) -> QuoteRequest {
    let address = Address {
        line1: "12 Mill Lane".to_string(),
        city: "Bristol".to_string(),
        postcode: "BS1 4DJ".to_string(),
        country: "UK".to_string(),
        ..Address::default()
    };
    QuoteRequest {
        id: ObjectId::new(),
        service_type: ServiceType::OfficeRemoval,
        pickup: address.clone(),
        delivery: address,
        property: PropertyDetails {
            property_type: PropertyType::Office,
            bedrooms: None,
            move_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
            flexible_dates: false,
        },
        packing: PackingOption::SelfPack,
        dismantling: DismantlingOption::NotNeeded,
        survey_method: SurveyMethod::VideoCall,
        contact: ContactDetails {
            full_name: "Sam Price".to_string(),
            email: email.to_string(),
            phone: "0117 496 0000".to_string(),
        },
        notes: None,
        media,
        created_at: created_at.to_string(),
    }
}

#[tokio::test]
async fn customer_sees_only_their_own_requests() {
    let app = TestApp::new();
    {
        let mut rows = app.requests.rows.lock().unwrap();
        rows.push(request("sam@example.com", "2026-10-01T08:00:00.000Z", vec![]));
        rows.push(request("sam@example.com", "2026-10-05T08:00:00.000Z", vec![]));
        rows.push(request("other@example.com", "2026-10-03T08:00:00.000Z", vec![]));
    }
    let token = app.access_token("customer", "Sam@Example.com").await;

    let resp = app.send(empty_request("GET", "/customer/dashboard", Some(&token))).await;
    assert_eq!(resp.status(), 200);
    let view = body_json(resp).await;
    let requests = view["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["created_at"], "2026-10-05T08:00:00.000Z");
    assert_eq!(view["profile"]["role"], "customer");
}

#[tokio::test]
async fn admin_dashboard_counts_collections() {
    let app = TestApp::new();
    app.requests.rows.lock().unwrap().push(request("sam@example.com", "2026-10-01T08:00:00.000Z", vec![]));
    let token = app.admin_token().await;

    let resp = app.send(empty_request("GET", "/admin/dashboard", Some(&token))).await;
    assert_eq!(resp.status(), 200);
    let view = body_json(resp).await;
    assert_eq!(view["stats"]["requests"], 1);
    assert_eq!(view["stats"]["profiles"], 1);
    assert_eq!(view["stats"]["companies"], 0);
    assert!(view["recent_activity"].as_array().unwrap().iter().any(|e| e["type"] == "sign_in"));
}

#[tokio::test]
async fn admin_request_detail_links_every_media_file() {
    let app = TestApp::new();
    let media = vec![MediaRef {
        object_key: "requests/abc/photo.jpg".to_string(),
        original_filename: "photo.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        size: 2048,
        captured: true,
    }];
    let stored = request("sam@example.com", "2026-10-01T08:00:00.000Z", media);
    let id = stored.id.to_hex();
    app.requests.rows.lock().unwrap().push(stored);
    let token = app.admin_token().await;

    let resp = app.send(empty_request("GET", &format!("/admin/requests/{}", id), Some(&token))).await;
    assert_eq!(resp.status(), 200);
    let detail = body_json(resp).await;
    assert_eq!(detail["contact"]["full_name"], "Sam Price");
    assert_eq!(detail["media_links"][0]["url"], "http://media.test/request-media/requests/abc/photo.jpg");
    assert_eq!(detail["media_links"][0]["captured"], true);

    let resp = app.send(empty_request("GET", "/admin/requests/not-an-id", Some(&token))).await;
    assert_eq!(resp.status(), 400);
    let resp = app.send(empty_request("GET", &format!("/admin/requests/{}", ObjectId::new().to_hex()), Some(&token))).await;
    assert_eq!(resp.status(), 404);

    let resp = app.send(empty_request("GET", "/admin/requests", Some(&token))).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn company_without_company_record_is_forbidden() {
    let app = TestApp::new();
    let token = app.access_token("company", "owner@example.com").await;
    // Resolved as customer, so the company area is closed
    let resp = app.send(empty_request("GET", "/company/dashboard", Some(&token))).await;
    assert_eq!(resp.status(), 403);
}
