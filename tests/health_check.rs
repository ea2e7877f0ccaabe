mod common;

#[tokio::test]
async fn health_check_reports_components() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["components"]["store"]["status"], "healthy");
    assert_eq!(body["components"]["whatsapp"]["configured"], true);
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/v1/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Authentication required");

    let response = app
        .client
        .get(app.url("/api/v1/products"))
        .bearer_auth("forged")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn first_login_provisions_tenant() {
    let app = common::spawn_app().await;

    let response = app.post("boutique", "/api/v1/auth/login").send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["item"]["company_name"], "boutique");
    assert_eq!(body["item"]["plan"], "free");

    let response = app
        .post("boutique", "/api/v1/auth/register")
        .json(&serde_json::json!({ "company_name": "Boutique Rivo", "phone": "+261340000009" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = app
        .get("boutique", "/api/v1/auth/me")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["item"]["company_name"], "Boutique Rivo");

    let settings: serde_json::Value = app
        .get("boutique", "/api/v1/settings")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(settings["item"]["language"], "fr");
}
