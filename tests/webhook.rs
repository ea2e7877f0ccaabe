mod common;

use common::{envelope, text_message, Doubles, PHONE_NUMBER_ID, VERIFY_TOKEN};
use devis_assistant::connectors::completion::mock::MockCompletionConnector;
use devis_assistant::connectors::whatsapp::mock::MockWhatsAppConnector;
use devis_assistant::models::Language;
use devis_assistant::services::fallback_text;
use std::time::{Duration, Instant};

#[tokio::test]
async fn verify_handshake_echoes_challenge() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .get(app.url(&format!(
            "/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=1158201444"
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "1158201444");

    let response = app
        .client
        .get(app.url("/webhooks/whatsapp?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn signature_over_other_body_is_rejected() {
    let app = common::spawn_app().await;
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;

    let body = envelope(PHONE_NUMBER_ID, vec![text_message("wamid.1", "261340000000", "Salut")]);
    let other = devis_assistant::helpers::signature::sign(common::APP_SECRET, b"{}").unwrap();
    let response = app
        .client
        .post(app.url("/webhooks/whatsapp"))
        .header("content-type", "application/json")
        .header("x-hub-signature-256", other)
        .body(serde_json::to_vec(&body).unwrap())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(app.whatsapp.sent().is_empty());
}

#[tokio::test]
async fn acknowledges_before_processing_finishes() {
    let app = common::spawn_app_with(Doubles {
        whatsapp: MockWhatsAppConnector::new(),
        completion: MockCompletionConnector::replying("Bien sûr").with_delay(Duration::from_millis(800)),
    })
    .await;
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;

    let body = envelope(
        PHONE_NUMBER_ID,
        vec![
            text_message("wamid.a", "261340000000", "Bonjour"),
            text_message("wamid.b", "261340000000", "Vous avez du savon ?"),
        ],
    );

    let started = Instant::now();
    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
    assert!(started.elapsed() < Duration::from_millis(800));
    assert!(app.whatsapp.texts().is_empty());

    assert!(app.eventually(|| app.whatsapp.texts().len() == 2).await);
}

#[tokio::test]
async fn unreadable_body_is_still_acknowledged() {
    let app = common::spawn_app().await;

    let response = app
        .post_webhook(&serde_json::json!({ "object": "whatsapp_business_account", "entry": "nope" }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn duplicate_delivery_is_answered_once() {
    let app = common::spawn_app().await;
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;
    let body = envelope(PHONE_NUMBER_ID, vec![text_message("wamid.dup", "261340000000", "Bonjour")]);

    app.post_webhook(&body).await;
    assert!(app.eventually(|| app.whatsapp.texts().len() == 1).await);

    app.post_webhook(&body).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(app.whatsapp.texts().len(), 1);
}

#[tokio::test]
async fn completion_failure_sends_fallback() {
    let app = common::spawn_app_with(Doubles {
        whatsapp: MockWhatsAppConnector::new(),
        completion: MockCompletionConnector::failing(),
    })
    .await;
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;

    let body = envelope(
        PHONE_NUMBER_ID,
        vec![
            text_message("wamid.f1", "261340000000", "Bonjour"),
            text_message("wamid.f2", "261340000011", "Salut"),
        ],
    );
    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 200);

    assert!(app.eventually(|| app.whatsapp.texts().len() == 2).await);
    assert!(app
        .whatsapp
        .texts()
        .iter()
        .all(|text| text == fallback_text(Language::Fr)));
}

#[tokio::test]
async fn unknown_account_is_ignored() {
    let app = common::spawn_app().await;

    let body = envelope("UNKNOWN", vec![text_message("wamid.u", "261340000000", "Bonjour")]);
    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 200);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(app.whatsapp.sent().is_empty());
}

#[tokio::test]
async fn malformed_sibling_change_keeps_valid_messages() {
    let app = common::spawn_app().await;
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;

    let mut body = envelope(PHONE_NUMBER_ID, vec![text_message("wamid.1", "261340000000", "Salut")]);
    body["entry"][0]["changes"]
        .as_array_mut()
        .unwrap()
        .insert(
            0,
            serde_json::json!({
                "field": "messages",
                "value": { "metadata": {}, "statuses": [{ "id": "wamid.out", "status": "read" }] }
            }),
        );

    let response = app.post_webhook(&body).await;
    assert_eq!(response.status().as_u16(), 200);

    assert!(app.eventually(|| app.whatsapp.texts().len() == 1).await);
}
