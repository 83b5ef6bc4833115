//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{debug, error, warn};

use crate::domain::SearchError;
use crate::network::Network;
use crate::planner::{NetworkPlanner, PlanRequest, SearchConfig};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops))
        .route("/journey/plan", post(plan_journey))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Every stop in the network, in id order.
async fn list_stops(State(state): State<AppState>) -> Json<StopsResponse> {
    let stops = state
        .network
        .stops
        .values()
        .map(|stop| StopResult {
            id: stop.id,
            name: stop.name.clone(),
        })
        .collect();
    Json(StopsResponse { stops })
}

/// Plan journeys from an origin to each requested destination.
async fn plan_journey(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanJourneyRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "invalid plan request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;
    if req.destinations.is_empty() {
        return Err(AppError::BadRequest {
            message: "At least one destination is required".into(),
        });
    }

    // The search is CPU bound; keep it off the async workers.
    let network = state.network.clone();
    let config = state.config.clone();
    tokio::task::spawn_blocking(move || plan(&network, &config, req))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Planner task failed: {e}"),
        })?
        .map(Json)
}

fn plan(
    network: &Network,
    config: &SearchConfig,
    req: PlanJourneyRequest,
) -> Result<PlanJourneyResponse, AppError> {
    let date = req.departure.date();
    let request = PlanRequest::new(req.origin, req.destinations, req.departure);

    let planner = NetworkPlanner::for_network(network, config);
    let plan = planner.plan(&request)?;

    let destinations = (0..plan.destination_count())
        .map(|index| {
            Ok(match plan.journey(index)? {
                Some(journey) => DestinationResult::from_journey(index, &journey, date, network),
                None => DestinationResult::unreachable(index),
            })
        })
        .collect::<Result<Vec<_>, SearchError>>()?;

    debug!(
        destinations = destinations.len(),
        reachable = destinations.iter().filter(|d| d.reachable).count(),
        "planned journeys"
    );

    Ok(PlanJourneyResponse {
        departure: req.departure,
        destinations,
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::UnknownEdge(_) | SearchError::UnknownVertex(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::UnknownDestination(_) | SearchError::UnknownStop(_) => {
                AppError::NotFound {
                    message: e.to_string(),
                }
            }
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message.clone()),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Streets V0 - V1 - V2 - V3 - V4 - V5 at 1 m/s with an isolated V9.
    /// Quay sits at V1 and Castle at V4; one trip runs between them.
    const NETWORK: &str = r#"{
        "stops": [
            {"id": 0, "name": "Quay", "vertices": [1]},
            {"id": 1, "name": "Castle", "vertices": [4]}
        ],
        "connections": [
            {"trip": 1, "from": 0, "departure": "08:05:00", "to": 1, "arrival": "08:10:00"}
        ],
        "streets": {
            "vertices": 10,
            "edge_types": [{"id": 0, "speed": 1.0}],
            "edges": [
                {"from": 0, "to": 1, "length": 100.0, "type": 0},
                {"from": 1, "to": 2, "length": 400.0, "type": 0},
                {"from": 2, "to": 3, "length": 400.0, "type": 0},
                {"from": 3, "to": 4, "length": 100.0, "type": 0},
                {"from": 4, "to": 5, "length": 100.0, "type": 0}
            ]
        }
    }"#;

    fn state() -> AppState {
        AppState::new(Network::from_json(NETWORK).unwrap(), SearchConfig::default())
    }

    async fn post_plan(body: &str) -> Result<PlanJourneyResponse, AppError> {
        plan_journey(State(state()), Bytes::from(body.to_string()))
            .await
            .map(|Json(response)| response)
    }

    #[tokio::test]
    async fn health_says_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn lists_stops_in_order() {
        let Json(response) = list_stops(State(state())).await;
        let names: Vec<&str> = response.stops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Quay", "Castle"]);
    }

    #[tokio::test]
    async fn plans_transit_and_reports_unreachable() {
        let response = post_plan(
            r#"{
                "origin": {"vertex": 0},
                "destinations": [{"vertex": 5}, {"vertex": 9}],
                "departure": "2024-03-15T08:00:00"
            }"#,
        )
        .await
        .unwrap();

        assert_eq!(response.destinations.len(), 2);

        let first = &response.destinations[0];
        assert!(first.reachable);
        assert_eq!(first.kind, Some(JourneyKind::Transit));
        assert_eq!(first.transfers, Some(0));
        assert_eq!(first.duration_secs, Some(700));
        assert_eq!(first.legs.len(), 3);
        assert!(matches!(first.legs[0], LegResult::Walk(_)));
        assert!(matches!(first.legs[1], LegResult::Transit(_)));
        assert!(matches!(first.legs[2], LegResult::Walk(_)));

        let second = &response.destinations[1];
        assert!(!second.reachable);
        assert!(second.legs.is_empty());
    }

    #[tokio::test]
    async fn walks_when_the_trip_is_missed() {
        let response = post_plan(
            r#"{
                "origin": {"vertex": 0},
                "destinations": [{"vertex": 2}],
                "departure": "2024-03-15T09:00:00"
            }"#,
        )
        .await
        .unwrap();

        let only = &response.destinations[0];
        assert_eq!(only.kind, Some(JourneyKind::Walk));
        assert_eq!(only.duration_secs, Some(500));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = post_plan("{not json").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn empty_destinations_are_rejected() {
        let err = post_plan(
            r#"{"origin": {"vertex": 0}, "destinations": [], "departure": "2024-03-15T08:00:00"}"#,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn unknown_edge_is_a_bad_request() {
        let err = post_plan(
            r#"{
                "origin": {"edge": 42, "offset": 0.5},
                "destinations": [{"vertex": 5}],
                "departure": "2024-03-15T08:00:00"
            }"#,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[test]
    fn search_errors_map_to_status_codes() {
        let status = |e: SearchError| AppError::from(e).into_response().status();
        assert_eq!(
            status(SearchError::UnknownVertex(crate::domain::VertexId(3))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(SearchError::UnknownDestination(4)), StatusCode::NOT_FOUND);
        assert_eq!(status(SearchError::NotRun), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
