mod common;

use common::{envelope, text_message, PHONE_NUMBER_ID};
use serde_json::{json, Value};

async fn converse(app: &common::TestApp, text: &str) -> Value {
    app.tenant_with_account("shop", PHONE_NUMBER_ID).await;
    let body = envelope(PHONE_NUMBER_ID, vec![text_message("wamid.c1", "261340000000", text)]);
    app.post_webhook(&body).await;

    assert!(app.eventually(|| !app.whatsapp.texts().is_empty()).await);

    let list: Value = app
        .get("shop", "/api/v1/conversations")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
    list["items"][0].clone()
}

#[tokio::test]
async fn inbound_exchange_is_listed_with_messages() {
    let app = common::spawn_app().await;
    let conversation = converse(&app, "Bonjour").await;
    assert_eq!(conversation["status"], "open");
    assert_eq!(conversation["contact_name"], "Rivo");
    let id = conversation["id"].as_str().unwrap();

    let messages: Value = app
        .get("shop", &format!("/api/v1/conversations/{id}/messages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = messages["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["direction"], "in");
    assert_eq!(items[1]["direction"], "out");
    assert_eq!(items[1]["metadata"]["ai_generated"], true);
    assert_eq!(messages["pagination"]["limit"], 100);

    let response = app
        .get("rival", &format!("/api/v1/conversations/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn status_update_sets_and_clears_prospect_label() {
    let app = common::spawn_app().await;
    let conversation = converse(&app, "Bonjour").await;
    let id = conversation["id"].as_str().unwrap();

    let response = app
        .put("shop", &format!("/api/v1/conversations/{id}/status"))
        .json(&json!({ "status": "closed", "prospect_status": "contacted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["status"], "closed");
    assert_eq!(body["item"]["prospect_status"], "contacted");

    let prospects: Value = app
        .get("shop", "/api/v1/prospects?prospect_status=contacted")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prospects["items"].as_array().unwrap().len(), 1);

    let response = app
        .put("shop", &format!("/api/v1/conversations/{id}/status"))
        .json(&json!({ "status": "open" }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["prospect_status"], "contacted");

    let response = app
        .put("shop", &format!("/api/v1/conversations/{id}/status"))
        .json(&json!({ "status": "open", "prospect_status": null }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert!(body["item"]["prospect_status"].is_null());

    let response = app
        .put("shop", &format!("/api/v1/conversations/{id}/status"))
        .json(&json!({ "status": "deleted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quote_request_drafts_quote_and_qualifies_lead() {
    let app = common::spawn_app().await;
    let tenant = app.tenant_with_account("shop", PHONE_NUMBER_ID).await;
    app.post("shop", "/api/v1/products")
        .json(&json!({ "title": "Produit X", "price": 100, "stock": 5 }))
        .send()
        .await
        .unwrap();

    let body = envelope(
        PHONE_NUMBER_ID,
        vec![text_message("wamid.q1", "261340000000", "Je veux un devis pour le Produit X")],
    );
    app.post_webhook(&body).await;

    assert!(app.eventually(|| !app.whatsapp.documents().is_empty()).await);
    assert!(app.eventually(|| !app.notifier.notices().is_empty()).await);

    let quotes: Value = app
        .get("shop", "/api/v1/devis")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = quotes["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["total"], 100.0);
    assert_eq!(items[0]["currency"], "MGA");

    let notice = &app.notifier.notices()[0];
    assert_eq!(Some(notice.owner_email.as_str()), tenant.email.as_deref());
}

#[tokio::test]
async fn manual_send_records_on_conversation() {
    let app = common::spawn_app().await;
    let conversation = converse(&app, "Bonjour").await;
    let id = conversation["id"].as_str().unwrap();

    let response = app
        .post("shop", "/api/v1/wa/send")
        .json(&json!({ "phone": "+261 34 00 000 00", "message": "Merci pour votre visite", "conversation_id": id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["metadata"]["sent_manually"], true);
    assert!(app.whatsapp.texts().contains(&"Merci pour votre visite".to_string()));

    let response = app
        .post("rival", "/api/v1/wa/send")
        .json(&json!({ "phone": "261340000000", "message": "Salut" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn faq_crud_by_language() {
    let app = common::spawn_app().await;

    let response = app
        .post("shop", "/api/v1/faq")
        .json(&json!({ "question": "Livrez-vous ?", "answer": "Oui, à Tana." }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["item"]["id"].as_str().unwrap().to_string();

    app.post("shop", "/api/v1/faq")
        .json(&json!({ "question": "Manatitra ve ianareo ?", "answer": "Eny.", "language": "mg" }))
        .send()
        .await
        .unwrap();

    let fr: Value = app.get("shop", "/api/v1/faq").send().await.unwrap().json().await.unwrap();
    assert_eq!(fr["items"].as_array().unwrap().len(), 1);
    let mg: Value = app
        .get("shop", "/api/v1/faq?language=mg")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mg["items"].as_array().unwrap().len(), 1);

    let response = app
        .put("rival", &format!("/api/v1/faq/{id}"))
        .json(&json!({ "question": "Q", "answer": "A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .delete("shop", &format!("/api/v1/faq/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}
