//! Route handlers and request dispatch.

pub mod auth;
pub mod reservations;
pub mod tables;

use lambda_http::{Body, Error, Request, RequestExt, Response};
use shared::http::{error_response, respond};
use tracing::{info, warn};

use crate::router::{self, Route};
use crate::state::AppState;

/// Path as the client sent it. API Gateway REST events carry the stage in the
/// URI (`/prod/tables`); the raw path does not.
fn route_path(event: &Request) -> &str {
    let raw_path = event.raw_http_path();
    if raw_path.is_empty() {
        event.uri().path()
    } else {
        raw_path
    }
}

/// Resolve the request to a route and run its handler.
pub async fn dispatch(state: &AppState, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = route_path(&event);

    info!(method, path, uri = %event.uri().path(), "Received request");

    let matched = match router::resolve(method, path) {
        Ok(matched) => matched,
        Err(e) => {
            warn!(method, path, error = %e, "Rejected request");
            return error_response(400, e.to_string());
        }
    };

    let body = event.body();
    match matched.route {
        Route::SignUp => respond(auth::sign_up(state, body).await),
        Route::SignIn => respond(auth::sign_in(state, body).await),
        Route::ListTables => respond(tables::list(state).await),
        Route::CreateTable => respond(tables::create(state, body).await),
        Route::GetTable => {
            let path_parameters = event.path_parameters();
            let table_id = path_parameters
                .first("tableId")
                .or_else(|| matched.param("tableId"));
            respond(tables::get(state, table_id).await)
        }
        Route::ListReservations => respond(reservations::list(state).await),
        Route::CreateReservation => respond(reservations::create(state, body).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::state;
    use serde_json::{json, Value};

    fn request(method: &str, path: &str, body: Option<Value>) -> Request {
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or(Body::Empty);
        lambda_http::http::Request::builder()
            .method(method)
            .uri(path)
            .body(body)
            .unwrap()
    }

    fn json_body(response: &Response<Body>) -> Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_unregistered_route_names_path_and_method() {
        let state = state();
        let response = dispatch(&state, request("PUT", "/tables", None)).await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(
            json_body(&response),
            json!({"message": "Unsupported path or method: /tables PUT"})
        );

        let response = dispatch(&state, request("GET", "/menu", None)).await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(
            json_body(&response)["message"],
            "Unsupported path or method: /menu GET"
        );
    }

    #[tokio::test]
    async fn test_table_lifecycle_over_http() {
        let state = state();

        let created = dispatch(
            &state,
            request(
                "POST",
                "/tables",
                Some(json!({"id": 1, "number": 5, "places": 4, "isVip": false})),
            ),
        )
        .await
        .unwrap();
        assert_eq!(created.status(), 200);
        assert_eq!(created.headers()["content-type"], "application/json");
        assert_eq!(json_body(&created), json!({"id": 1}));

        let fetched = dispatch(&state, request("GET", "/tables/1", None)).await.unwrap();
        assert_eq!(
            json_body(&fetched),
            json!({"id": 1, "number": 5, "places": 4, "isVip": false})
        );

        let listed = dispatch(&state, request("GET", "/tables", None)).await.unwrap();
        assert_eq!(json_body(&listed)["tables"].as_array().unwrap().len(), 1);

        let missing = dispatch(&state, request("GET", "/tables/2", None)).await.unwrap();
        assert_eq!(missing.status(), 404);

        let invalid = dispatch(&state, request("GET", "/tables/abc", None)).await.unwrap();
        assert_eq!(invalid.status(), 400);
    }

    #[tokio::test]
    async fn test_reservation_flow_over_http() {
        let state = state();
        dispatch(
            &state,
            request(
                "POST",
                "/tables",
                Some(json!({"id": 1, "number": 5, "places": 4, "isVip": true, "minOrder": 50})),
            ),
        )
        .await
        .unwrap();

        let booking = |start: &str, end: &str| {
            request(
                "POST",
                "/reservations",
                Some(json!({
                    "tableNumber": 5, "clientName": "Ada", "phoneNumber": "555-0100",
                    "date": "2024-01-01", "slotTimeStart": start, "slotTimeEnd": end
                })),
            )
        };

        let first = dispatch(&state, booking("2024-01-01T10:00:00", "2024-01-01T11:00:00"))
            .await
            .unwrap();
        assert_eq!(first.status(), 200);
        assert!(json_body(&first)["reservationId"].is_string());

        let overlap = dispatch(&state, booking("2024-01-01T10:30:00", "2024-01-01T10:45:00"))
            .await
            .unwrap();
        assert_eq!(overlap.status(), 400);

        let listed = dispatch(&state, request("GET", "/reservations", None)).await.unwrap();
        let reservations = json_body(&listed)["reservations"].clone();
        assert_eq!(reservations.as_array().unwrap().len(), 1);
        assert_eq!(reservations[0]["slotTimeStart"], "2024-01-01T10:00:00");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let state = state();
        let event = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/tables")
            .body(Body::from("{not json"))
            .unwrap();
        let response = dispatch(&state, event).await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(json_body(&response)["message"], "Invalid request body format.");
    }

    fn rest_event(method: &str, resource: &str, path: &str, path_parameters: Value) -> Request {
        let event = json!({
            "resource": resource,
            "path": path,
            "httpMethod": method,
            "headers": {"Host": "abc123.execute-api.eu-central-1.amazonaws.com"},
            "multiValueHeaders": {"Host": ["abc123.execute-api.eu-central-1.amazonaws.com"]},
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "pathParameters": path_parameters,
            "stageVariables": null,
            "requestContext": {
                "accountId": "123456789012",
                "resourceId": "abc1",
                "stage": "prod",
                "requestId": "c6af9ac6-7b61-11e6-9a41-93e8deadbeef",
                "identity": {"sourceIp": "127.0.0.1"},
                "resourcePath": resource,
                "httpMethod": method,
                "apiId": "abc123",
                "path": format!("/prod{}", path)
            },
            "body": null,
            "isBase64Encoded": false
        });
        lambda_http::request::from_str(&event.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_rest_api_stage_is_not_part_of_the_route() {
        let state = state();
        state.store.put_table(&crate::testing::table(7, 3)).await.unwrap();

        let listed = dispatch(&state, rest_event("GET", "/tables", "/tables", Value::Null))
            .await
            .unwrap();
        assert_eq!(listed.status(), 200);
        assert_eq!(json_body(&listed)["tables"][0]["id"], 7);

        let fetched = dispatch(
            &state,
            rest_event("GET", "/tables/{tableId}", "/tables/7", json!({"tableId": "7"})),
        )
        .await
        .unwrap();
        assert_eq!(fetched.status(), 200);
        assert_eq!(json_body(&fetched)["number"], 3);

        let unknown = dispatch(&state, rest_event("DELETE", "/tables", "/tables", Value::Null))
            .await
            .unwrap();
        assert_eq!(
            json_body(&unknown)["message"],
            "Unsupported path or method: /tables DELETE"
        );
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_bad_request() {
        let state = state();
        let response = dispatch(
            &state,
            request("POST", "/signin", Some(json!({"email": "a@b.c", "password": "nope"}))),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(json_body(&response)["message"], "Incorrect username or password.");
    }
}
