//! Integration tests for the urbanisme backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database and seed reference data
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));
        repo.seed_if_empty().await.expect("Failed to seed");

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_commission(&self, num_acta: i64, data_comissio: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/commissions"))
            .json(&json!({ "numActa": num_acta, "dataComissio": data_comissio }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json::<Value>().await.unwrap()["data"].clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Client without the default x-api-key header
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_bearer_token_accepted() {
    let fixture = TestFixture::new().await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/commissions"))
        .header("Authorization", "Bearer test-api-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_auth_disabled_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_create_commission_normalizes_picker_date() {
    let fixture = TestFixture::new().await;

    let created = fixture.create_commission(1, "2025-01-02").await;
    assert_eq!(created["numActa"], 1);
    assert_eq!(created["dataComissio"], "2/1/2025");
    assert_eq!(created["diaSetmana"], "dijous");
    assert_eq!(created["numTemes"], 0);
    assert_eq!(created["avisEmail"], false);
    assert_eq!(created["dataEmail"], Value::Null);
    assert_eq!(created["estat"], "Oberta");
}

#[tokio::test]
async fn test_create_commission_rejects_duplicate_acta_in_year() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/commissions"))
        .json(&json!({ "numActa": 1, "dataComissio": "29/1/2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Same acta in another year is fine
    let resp = fixture
        .client
        .post(fixture.url("/api/commissions"))
        .json(&json!({ "numActa": 1, "dataComissio": "14/1/2026" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_list_commissions_sorted_by_date() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(2, "29/1/2025").await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["numActa"], 1);
    assert_eq!(list[1]["numActa"], 2);
}

#[tokio::test]
async fn test_generate_next_year_continues_numbering() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(24, "17/12/2025").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/commissions/generate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let generated = body["data"].as_array().unwrap();

    assert_eq!(generated[0]["numActa"], 25);
    assert_eq!(generated[0]["dataComissio"], "7/1/2026");
    assert_eq!(generated[0]["diaSetmana"], "dimecres");

    let last_acta = generated.last().unwrap()["numActa"].as_i64().unwrap();

    // A second call rolls forward to the year after the generated batch
    let resp = fixture
        .client
        .post(fixture.url("/api/commissions/generate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let next_batch = body["data"].as_array().unwrap();
    assert_eq!(next_batch[0]["dataComissio"], "6/1/2027");
    assert_eq!(next_batch[0]["numActa"], last_acta + 1);
}

#[tokio::test]
async fn test_generate_next_year_requires_existing_commissions() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/commissions/generate"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_patch_commission_clearing_avis_clears_data_email() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .patch(fixture.url("/api/commissions/1/15-1-2025"))
        .json(&json!({ "avisEmail": true, "dataEmail": "10/1/2025", "numTemes": 4 }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["avisEmail"], true);
    assert_eq!(body["data"]["dataEmail"], "10/1/2025");
    assert_eq!(body["data"]["numTemes"], 4);

    let resp = fixture
        .client
        .patch(fixture.url("/api/commissions/1/15-1-2025"))
        .json(&json!({ "avisEmail": false }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["avisEmail"], false);
    assert_eq!(body["data"]["dataEmail"], Value::Null);
    // Untouched fields survive
    assert_eq!(body["data"]["numTemes"], 4);
}

#[tokio::test]
async fn test_mark_commission_sent() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/commissions/1/15-1-2025/mark-sent"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["avisEmail"], true);
    assert!(body["data"]["dataEmail"].is_string());
}

#[tokio::test]
async fn test_rekey_commission_cascades_to_detail() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(5, "15/1/2025").await;

    // Save a detail for the session
    let resp = fixture
        .client
        .post(fixture.url("/api/commission-details"))
        .json(&json!({
            "numActa": 5,
            "sessio": "15/1/2025",
            "dataActual": "10/1/2025",
            "hora": "9:00:00",
            "estat": "Oberta",
            "mitja": "Via telemàtica",
            "expedientsCount": 0,
            "expedients": [{
                "id": "3175/2024",
                "peticionari": "Maria Prats",
                "procediment": "Obres Majors",
                "descripcio": "Reforma",
                "indret": "Av. Palma 1",
                "sentitInforme": "Favorable",
                "departament": "Urbanisme",
                "tecnic": "Jordi Couso"
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Rekey to a new acta number and date
    let resp = fixture
        .client
        .put(fixture.url("/api/commissions/5/15-1-2025"))
        .json(&json!({ "numActa": 6, "dataComissio": "22/1/2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["numActa"], 6);
    assert_eq!(body["data"]["dataComissio"], "22/1/2025");
    assert_eq!(body["data"]["diaSetmana"], "dimecres");

    // Detail is reachable under the new key and carries the expedient
    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/6/22-1-2025/detail"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["sessio"], "22/1/2025");
    assert_eq!(body["data"]["expedients"][0]["id"], "3175/2024");
}

#[tokio::test]
async fn test_rekey_commission_rejects_clash() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;
    fixture.create_commission(2, "29/1/2025").await;

    let resp = fixture
        .client
        .put(fixture.url("/api/commissions/2/29-1-2025"))
        .json(&json!({ "numActa": 1, "dataComissio": "29/1/2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_detail_synthesized_for_open_commission() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/1/15-1-2025/detail"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let detail = &body["data"];
    assert_eq!(detail["numActa"], 1);
    assert_eq!(detail["sessio"], "15/1/2025");
    assert_eq!(detail["hora"], "9:00:00");
    assert_eq!(detail["mitja"], "Via telemàtica");
    assert_eq!(detail["estat"], "Oberta");
    assert_eq!(detail["expedientsCount"], 0);
    assert_eq!(detail["expedients"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_detail_not_synthesized_for_finalized_commission() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    fixture
        .client
        .patch(fixture.url("/api/commissions/1/15-1-2025"))
        .json(&json!({ "estat": "Finalitzada" }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/1/15-1-2025/detail"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_save_detail_syncs_parent_summary() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let expedient = |id: &str| {
        json!({
            "id": id,
            "peticionari": "Maria Prats",
            "procediment": "Obres Majors",
            "descripcio": "",
            "indret": "",
            "sentitInforme": "Favorable",
            "departament": "Urbanisme",
            "tecnic": "Jordi Couso"
        })
    };

    let resp = fixture
        .client
        .post(fixture.url("/api/commission-details"))
        .json(&json!({
            "numActa": 1,
            "sessio": "16/1/2025",
            "dataActual": "10/1/2025",
            "hora": "10:30:00",
            "estat": "Finalitzada",
            "mitja": "Presencial",
            "expedientsCount": 99,
            "expedients": [expedient("1/2025"), expedient("2/2025")]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    // Count is derived from the list, not trusted from the payload
    assert_eq!(body["data"]["expedientsCount"], 2);

    // The parent summary follows the detail: date, weekday, state, numTemes
    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let summary = &body["data"].as_array().unwrap()[0];
    assert_eq!(summary["numTemes"], 2);
    assert_eq!(summary["dataComissio"], "16/1/2025");
    assert_eq!(summary["diaSetmana"], "dijous");
    assert_eq!(summary["estat"], "Finalitzada");

    // Saving again replaces the expedient list wholesale
    let resp = fixture
        .client
        .post(fixture.url("/api/commission-details"))
        .json(&json!({
            "numActa": 1,
            "sessio": "16/1/2025",
            "dataActual": "10/1/2025",
            "hora": "10:30:00",
            "estat": "Finalitzada",
            "mitja": "Presencial",
            "expedientsCount": 0,
            "expedients": [expedient("3/2025")]
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["expedientsCount"], 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/1/16-1-2025/detail"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let expedients = body["data"]["expedients"].as_array().unwrap();
    assert_eq!(expedients.len(), 1);
    assert_eq!(expedients[0]["id"], "3/2025");
}

#[tokio::test]
async fn test_delete_and_restore_commission() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    fixture
        .client
        .post(fixture.url("/api/commission-details"))
        .json(&json!({
            "numActa": 1,
            "sessio": "15/1/2025",
            "dataActual": "10/1/2025",
            "hora": "9:00:00",
            "estat": "Oberta",
            "mitja": "Via telemàtica",
            "expedientsCount": 0,
            "expedients": [{
                "id": "1/2025",
                "peticionari": "Maria Prats",
                "procediment": "Primera Ocupació",
                "descripcio": "",
                "indret": "",
                "sentitInforme": "Favorable",
                "departament": "Urbanisme",
                "tecnic": "Jordi Couso"
            }]
        }))
        .send()
        .await
        .unwrap();

    // Delete returns the removed records
    let resp = fixture
        .client
        .delete(fixture.url("/api/commissions/1/15-1-2025"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let deleted = body["data"].clone();
    assert_eq!(deleted["summary"]["numActa"], 1);
    assert_eq!(deleted["detail"]["expedients"][0]["id"], "1/2025");

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Restore brings back summary and detail
    let resp = fixture
        .client
        .post(fixture.url("/api/commissions/restore"))
        .json(&deleted)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/1/15-1-2025/detail"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["expedients"][0]["id"], "1/2025");
}

#[tokio::test]
async fn test_restore_commission_rejects_acta_clash_in_year() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .delete(fixture.url("/api/commissions/1/15-1-2025"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let deleted = body["data"].clone();

    // Same acta, different date, same year
    fixture.create_commission(1, "29/1/2025").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/commissions/restore"))
        .json(&deleted)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_list_seeded_and_crud() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/procediments"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 7);

    // Create
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/procediments"))
        .json(&json!({ "name": "Llicència de tala" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/admin/procediments/{id}")))
        .json(&json!({ "name": "Llicència de tala d'arbres" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Llicència de tala d'arbres");

    // Delete returns the item, restore reinserts it with the same id
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/procediments/{id}")))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let deleted = body["data"].clone();
    assert_eq!(deleted["id"], id.as_str());

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/procediments/restore"))
        .json(&deleted)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/procediments"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_admin_tecnics_require_email() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/tecnics"))
        .json(&json!({ "name": "Nou Tècnic" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/tecnics"))
        .json(&json!({ "name": "Nou Tècnic", "email": "nou@tossa.cat" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_admin_unknown_list_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/admin/nonsense"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_admin_import_merges() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/departaments/import"))
        .json(&json!([
            { "id": "d1", "name": "Urbanisme i Territori" },
            { "id": "d9", "name": "Turisme" }
        ]))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], true);
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["name"], "Urbanisme i Territori");
    assert_eq!(records[3]["id"], "d9");

    // Importing the same batch again changes nothing
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/departaments/import"))
        .json(&json!([
            { "id": "d1", "name": "Urbanisme i Territori" },
            { "id": "d9", "name": "Turisme" }
        ]))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], false);
}

#[tokio::test]
async fn test_users_listed_without_passwords() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/users"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
    }
}

#[tokio::test]
async fn test_user_crud_and_master_protection() {
    let fixture = TestFixture::new().await;

    // Create
    let resp = fixture
        .client
        .post(fixture.url("/api/users"))
        .json(&json!({
            "name": "Anna Serra",
            "email": "aserra@tossa.cat",
            "password": "secret",
            "role": "editor"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["role"], "editor");
    assert!(body["data"].get("password").is_none());

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/users/{id}")))
        .json(&json!({
            "name": "Anna Serra i Puig",
            "email": "aserra@tossa.cat",
            "role": "admin"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Anna Serra i Puig");
    assert_eq!(body["data"]["role"], "admin");

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The master user can neither be deleted nor demoted
    let resp = fixture
        .client
        .delete(fixture.url("/api/users/user-master"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .put(fixture.url("/api/users/user-master"))
        .json(&json!({
            "name": "Admin Master",
            "email": "admin@tossa.cat",
            "role": "viewer"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Nor overwritten through restore
    let resp = fixture
        .client
        .post(fixture.url("/api/users/restore"))
        .json(&json!({
            "id": "user-master",
            "name": "Hijacked",
            "email": "evil@example.com",
            "password": "pwned",
            "role": "viewer"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The seeded master credentials still work
    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "admin@tossa.cat", "password": "masterpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
async fn test_user_import_merge_rules() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/users/import"))
        .json(&json!([
            { "id": "user-master", "name": "Hijacked", "email": "evil@example.com" },
            { "id": "user-1", "name": "Josep Almató Costa", "email": "jalmato@tossa.cat" },
            { "id": "user-2", "name": "Anna Serra", "email": "aserra@tossa.cat",
              "password": "should-be-ignored", "role": "admin" }
        ]))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], true);
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    // Master untouched, existing user renamed, new user appended
    assert_eq!(records[0]["name"], "Admin Master");
    assert_eq!(records[1]["name"], "Josep Almató Costa");
    assert_eq!(records[2]["id"], "user-2");
    assert_eq!(records[2]["role"], "admin");

    // The new user got the default password, not the imported one
    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "aserra@tossa.cat", "password": "changeme123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_user_csv_roundtrip() {
    let fixture = TestFixture::new().await;

    let csv = "id,name,email,role\nuser-9,Pere Soler,psoler@tossa.cat,editor\n";
    let resp = fixture
        .client
        .post(fixture.url("/api/users/import-csv"))
        .header("Content-Type", "text/csv")
        .body(csv)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], true);

    let resp = fixture
        .client
        .get(fixture.url("/api/users/export-csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let text = resp.text().await.unwrap();
    assert!(text.starts_with("id,name,email,role\n"));
    assert!(text.contains("user-9,Pere Soler,psoler@tossa.cat,editor"));
    assert!(!text.contains("changeme123"));
    assert!(!text.contains("masterpassword"));
}

#[tokio::test]
async fn test_csv_import_bad_header_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/users/import-csv"))
        .header("Content-Type", "text/csv")
        .body("nom,correu\nx,y\n")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_login() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "admin@tossa.cat", "password": "masterpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], "user-master");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("password").is_none());

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "admin@tossa.cat", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_application_data_roundtrip() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/application-data"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let exported = body["data"].clone();
    assert_eq!(exported["commissions"].as_array().unwrap().len(), 1);
    assert_eq!(
        exported["adminData"]["users"].as_array().unwrap().len(),
        2
    );

    // Mutate, then import the snapshot back
    fixture.create_commission(2, "29/1/2025").await;
    let resp = fixture
        .client
        .put(fixture.url("/api/application-data"))
        .json(&exported)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_application_data_import_without_admin_falls_back_to_seed() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .put(fixture.url("/api/application-data"))
        .json(&json!({ "commissions": [], "commissionDetails": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Seed lists and master user are back
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/tecnics"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let resp = fixture
        .client
        .post(fixture.url("/api/login"))
        .json(&json!({ "email": "admin@tossa.cat", "password": "masterpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_backup_create_restore_delete() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    // Snapshot the store
    let resp = fixture
        .client
        .post(fixture.url("/api/backups"))
        .json(&json!({ "description": "abans de la prova" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let timestamp = body["data"]["timestamp"].as_i64().unwrap();
    assert_eq!(body["data"]["description"], "abans de la prova");

    // Mutate the store
    fixture.create_commission(2, "29/1/2025").await;
    fixture
        .client
        .delete(fixture.url("/api/commissions/1/15-1-2025"))
        .send()
        .await
        .unwrap();

    // Restore puts the original state back and keeps the backup listed
    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/backups/{timestamp}/restore")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["numActa"], 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/backups"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Delete the backup
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/backups/{timestamp}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .post(fixture.url(&format!("/api/backups/{timestamp}/restore")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_backup_default_description() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/backups"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let description = body["data"]["description"].as_str().unwrap();
    assert!(!description.is_empty());
}

#[tokio::test]
async fn test_statistics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.create_commission(1, "15/1/2025").await;

    fixture
        .client
        .post(fixture.url("/api/commission-details"))
        .json(&json!({
            "numActa": 1,
            "sessio": "15/1/2025",
            "dataActual": "10/1/2025",
            "hora": "9:00:00",
            "estat": "Finalitzada",
            "mitja": "Via telemàtica",
            "expedientsCount": 0,
            "expedients": [
                {
                    "id": "1/2025", "peticionari": "A", "procediment": "Obres Majors",
                    "descripcio": "", "indret": "", "sentitInforme": "Favorable",
                    "departament": "Urbanisme", "tecnic": "Jordi Couso"
                },
                {
                    "id": "2/2025", "peticionari": "B", "procediment": "Primera Ocupació",
                    "descripcio": "", "indret": "", "sentitInforme": "",
                    "departament": "", "tecnic": ""
                }
            ]
        }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/statistics/2025"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let stats = &body["data"];

    let tech_dist = stats["technicianDistribution"].as_array().unwrap();
    assert_eq!(tech_dist[0]["name"], "Jordi Couso");
    assert_eq!(tech_dist[0]["value"], 1);
    assert_eq!(tech_dist[1]["name"], "No assignat");

    let status_dist = stats["reportStatusDistribution"].as_array().unwrap();
    assert_eq!(status_dist[0]["name"], "Favorable");
    assert_eq!(status_dist[1]["name"], "Sense estat");

    let workload = stats["workloadOverTime"].as_array().unwrap();
    assert_eq!(workload[0]["date"], "15/1");
    assert_eq!(workload[0]["load"], 2);

    let matrix = &stats["technicianWorkload"];
    // Only expedients assigned to a listed technician count in the matrix
    assert_eq!(matrix["grandTotal"], 1);
    assert_eq!(matrix["rowTotals"]["Jordi Couso"], 1);
    assert_eq!(matrix["data"]["Jordi Couso"]["15/1/2025"], 1);
    assert_eq!(matrix["headers"][0]["date"], "15/1/2025");
    assert_eq!(matrix["headers"][0]["isFuture"], false);
    // All five seeded technicians appear as rows
    assert_eq!(matrix["technicians"].as_array().unwrap().len(), 5);

    // A year with no data yields empty distributions
    let resp = fixture
        .client
        .get(fixture.url("/api/statistics/2019"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"]["technicianDistribution"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
    assert_eq!(body["data"]["technicianWorkload"]["grandTotal"], 0);
}

#[tokio::test]
async fn test_not_found_envelope() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/commissions/99/1-1-2025"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"].is_string());
}
