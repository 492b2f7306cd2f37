//! `/api/schedules` handlers. Schedule ids are generated on create.

use lambda_http::{Body, Error, Response};
use serde::Serialize;
use serde_json::Value;
use shared::http::{parse_json_body, rejection_response, MessageBody};
use shared::tables::YEAR_MONTH_INDEX;
use shared::{Schedule, ScheduleFields};
use tracing::info;

use crate::resource::{self, respond, to_document};
use crate::AppState;

#[derive(Debug, Serialize)]
struct ScheduleCreated {
    message: String,
    schedule: Schedule,
}

fn parse_schedule(body: &Body) -> shared::Result<ScheduleFields> {
    parse_json_body::<Value>(body).and_then(ScheduleFields::try_from)
}

pub async fn create_schedule(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    let fields = match parse_schedule(body) {
        Ok(fields) => fields,
        Err(e) => return rejection_response(&e),
    };

    let outcome = match to_document(&fields) {
        Ok(item) => {
            resource::create::<Schedule>(state.store.as_ref(), &state.schedules_table, item).await
        }
        Err(e) => Err(e),
    };

    if let Ok(schedule) = &outcome {
        info!("Created schedule {}", schedule.id);
    }

    respond(
        outcome.map(|schedule| ScheduleCreated {
            message: "schedule created successfully".to_string(),
            schedule,
        }),
        201,
        "Failed to create schedule",
    )
}

pub async fn list_schedules_by_month(state: &AppState, yearmonth: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::query::<Schedule>(
        state.store.as_ref(),
        &state.schedules_table,
        YEAR_MONTH_INDEX,
        "yearmonth",
        yearmonth,
    )
    .await;

    respond(outcome, 200, "Failed to retrieve schedule")
}

pub async fn get_schedule(state: &AppState, id: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::get::<Schedule>(state.store.as_ref(), &state.schedules_table, id).await;
    respond(outcome, 200, "Failed to retrieve schedule")
}

/// Sets every field present in the body. Optional fields left out keep
/// whatever value is already stored.
pub async fn update_schedule(state: &AppState, id: &str, body: &Body) -> Result<Response<Body>, Error> {
    let fields = match parse_schedule(body) {
        Ok(fields) => fields,
        Err(e) => return rejection_response(&e),
    };

    let outcome = match to_document(&fields) {
        Ok(fields) => {
            resource::update::<Schedule>(state.store.as_ref(), &state.schedules_table, id, fields).await
        }
        Err(e) => Err(e),
    };

    if outcome.is_ok() {
        info!("Updated schedule {}", id);
    }

    respond(outcome, 200, "Failed to update schedule")
}

pub async fn delete_schedule(state: &AppState, id: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::delete(state.store.as_ref(), &state.schedules_table, id)
        .await
        .map(|()| MessageBody {
            message: "schedule deleted successfully".to_string(),
        });

    respond(outcome, 200, "Failed to delete schedule")
}

#[cfg(test)]
mod tests {
    use crate::handler;
    use crate::test_support::{body_json, failing_state, memory_state, request};
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn schedule(title: &str, yearmonth: &str) -> Value {
        json!({
            "title": title,
            "yearmonth": yearmonth,
            "starttime": "09:00",
            "startindex": 18,
            "endtime": "10:30",
            "endindex": 21,
            "registdate": "2024-04-30",
            "memo": "bring notes",
            "type": "work"
        })
    }

    async fn create(state: &Arc<crate::AppState>, body: Value) -> Value {
        let response = handler(state.clone(), request("POST", "/api/schedules", Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        body_json(&response)
    }

    #[tokio::test]
    async fn test_create_generates_unique_ids_and_echoes_fields() {
        let (state, _) = memory_state();
        let mut ids = HashSet::new();

        for _ in 0..3 {
            let created = create(&state, schedule("Standup", "2024-05")).await;
            assert_eq!(created["message"], "schedule created successfully");

            let mut stored = created["schedule"].clone();
            let id = stored["id"].as_str().unwrap().to_string();
            assert!(!id.is_empty());
            assert!(ids.insert(id));

            stored.as_object_mut().unwrap().remove("id");
            assert_eq!(stored, schedule("Standup", "2024-05"));
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_every_field_type() {
        let (state, _) = memory_state();
        let created = create(&state, schedule("Review", "2024-05")).await;
        let id = created["schedule"]["id"].as_str().unwrap();

        let response = handler(state.clone(), request("GET", &format!("/api/schedules/{}", id), None))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response), created["schedule"]);
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_fields_without_writing() {
        let (state, store) = memory_state();
        let mut body = schedule(&"x".repeat(41), "2024-05");
        body["startindex"] = json!(49);
        body["registdate"] = json!("2023-13-01");

        let response = handler(state, request("POST", "/api/schedules", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let report = body_json(&response);
        assert_eq!(report["error"], "Validation failed");
        let mut fields: Vec<&String> = report["fields"].as_object().unwrap().keys().collect();
        fields.sort();
        assert_eq!(fields, vec!["registdate", "startindex", "title"]);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_body() {
        let (state, store) = memory_state();
        let event = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/api/schedules")
            .header("authorization", request("GET", "/", None).headers()["authorization"].clone())
            .body(lambda_http::Body::from("{\"title\": 5"))
            .unwrap();

        let response = handler(state, event).await.unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_create_reports_wrong_types_per_field() {
        let (state, store) = memory_state();
        let mut body = schedule("Standup", "2024-05");
        body["startindex"] = json!("5");
        body["endindex"] = json!(99);
        body["starttime"] = json!(null);

        let response = handler(state, request("POST", "/api/schedules", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let report = body_json(&response);
        assert_eq!(report["error"], "Validation failed");
        assert_eq!(report["fields"]["startindex"], json!(["expected an integer, got string"]));
        assert_eq!(report["fields"]["starttime"], json!(["starttime must not be null"]));
        assert!(report["fields"].get("endindex").is_some());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_list_by_month_returns_only_that_month() {
        let (state, _) = memory_state();
        create(&state, schedule("A", "2024-05")).await;
        create(&state, schedule("B", "2024-05")).await;
        create(&state, schedule("C", "2024-06")).await;

        let response = handler(state, request("GET", "/api/schedules/ym/2024-05", None))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let mut titles: Vec<String> = body_json(&response)
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap().to_string())
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_update_sets_sent_fields_and_keeps_key() {
        let (state, _) = memory_state();
        let created = create(&state, schedule("Draft", "2024-05")).await;
        let id = created["schedule"]["id"].as_str().unwrap().to_string();

        let update = json!({
            "id": "hijack",
            "title": "Final",
            "startindex": 0,
            "endindex": 48,
            "memo": "",
            "type": "misc"
        });
        let response = handler(
            state.clone(),
            request("PUT", &format!("/api/schedules/{}", id), Some(update)),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let updated = body_json(&response);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["title"], "Final");
        assert_eq!(updated["endindex"], 48);
        assert_eq!(updated["type"], "misc");
        // Not sent, so left as stored.
        assert_eq!(updated["yearmonth"], "2024-05");
        assert_eq!(updated["starttime"], "09:00");

        let response = handler(state, request("GET", &format!("/api/schedules/{}", id), None))
            .await
            .unwrap();
        assert_eq!(body_json(&response), updated);
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_creates_it() {
        let (state, store) = memory_state();

        let response = handler(
            state.clone(),
            request("PUT", "/api/schedules/fresh-id", Some(schedule("Walk-in", "2024-07"))),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(store.len("Schedules"), 1);

        let response = handler(state, request("GET", "/api/schedules/fresh-id", None))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let stored = body_json(&response);
        assert_eq!(stored["id"], "fresh-id");
        assert_eq!(stored["title"], "Walk-in");
        assert_eq!(stored["yearmonth"], "2024-07");
    }

    #[tokio::test]
    async fn test_update_validates_like_create() {
        let (state, store) = memory_state();
        let mut body = schedule("Ok", "2024-05");
        body["endindex"] = json!(100);

        let response = handler(state, request("PUT", "/api/schedules/some-id", Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert!(body_json(&response)["fields"].get("endindex").is_some());
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (state, store) = memory_state();
        let created = create(&state, schedule("Temp", "2024-05")).await;
        let path = format!("/api/schedules/{}", created["schedule"]["id"].as_str().unwrap());

        let response = handler(state.clone(), request("DELETE", &path, None)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response), json!({ "message": "schedule deleted successfully" }));
        assert_eq!(store.len("Schedules"), 0);

        let response = handler(state.clone(), request("GET", &path, None)).await.unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(body_json(&response), json!({ "error": "schedule not found" }));

        let response = handler(state, request("DELETE", "/api/schedules/never-existed", None))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_store_failures_are_500() {
        let state = failing_state();

        let cases = [
            ("POST", "/api/schedules", Some(schedule("A", "2024-05")), "Failed to create schedule"),
            ("GET", "/api/schedules/abc", None, "Failed to retrieve schedule"),
            ("GET", "/api/schedules/ym/2024-05", None, "Failed to retrieve schedule"),
            ("PUT", "/api/schedules/abc", Some(schedule("A", "2024-05")), "Failed to update schedule"),
            ("DELETE", "/api/schedules/abc", None, "Failed to delete schedule"),
        ];

        for (method, path, body, message) in cases {
            let response = handler(state.clone(), request(method, path, body)).await.unwrap();
            assert_eq!(response.status(), 500, "{} {}", method, path);
            assert_eq!(body_json(&response), json!({ "error": message }));
        }
    }
}
