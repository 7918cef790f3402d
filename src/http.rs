use crate::availability::{available_start_times, AvailabilityError, AvailabilityQuery};
use crate::backend::{BackendError, SalonBackend};
use crate::configuration::Configuration;
use crate::types::{BookingRequest, Salon, Selection};
use crate::AppState;
use axum::body::Body;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, Response};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::fs;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AvailabilityRequest {
    salon_id: Uuid,
    date: NaiveDate,
    selections: Vec<Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeleteBookingRequest {
    id: Uuid,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match self {
            BackendError::UnknownSalon | BackendError::UnknownBooking => StatusCode::NOT_FOUND,
            BackendError::UnknownStaff(_) | BackendError::UnassignedSelection(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BackendError::SlotTaken | BackendError::SlotInPast | BackendError::DuplicateSalon => {
                StatusCode::CONFLICT
            }
        };
        (status, self.to_string()).into_response()
    }
}

impl IntoResponse for AvailabilityError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
    }
}

pub fn create_app<T: SalonBackend, C: Configuration>(backend: T, configuration: C) -> Router {
    let state = AppState {
        backend,
        configuration,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/frontend", get(get_frontend::<T, C>))
        .route("/salons", get(get_salons::<T, C>))
        .route("/availability", post(compute_availability::<T, C>))
        .route("/book", post(book::<T, C>))
        .route("/bookings/stream", get(stream_bookings::<T, C>));

    let admin = Router::new()
        .route("/admin_page", get(get_admin_page::<T, C>))
        .route("/add_salon", post(add_salon::<T, C>))
        .route("/remove_booking", post(remove_booking::<T, C>))
        .route("/remove_all_bookings", post(remove_all_bookings::<T, C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<T, C>,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(cors)
}

async fn admin_auth<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    if let Some(auth_header) = request.headers().get("x-admin-password") {
        if auth_header.to_str().unwrap_or("") != state.configuration.password() {
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
        }
    } else {
        return Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string()));
    }
    Ok(next.run(request).await)
}

async fn get_salons<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> impl IntoResponse {
    Json(state.backend.salons())
}

/// Runs the availability engine for one salon and date. The engine itself is
/// a pure function; this handler fetches the salon and the involved staff
/// members' bookings and injects the current local time.
async fn compute_availability<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<AvailabilityRequest>,
) -> Response {
    let Some(salon) = state.backend.salon(request.salon_id) else {
        return BackendError::UnknownSalon.into_response();
    };

    let staff_names: BTreeSet<&str> = request
        .selections
        .iter()
        .filter_map(|selection| selection.staff_name.as_deref())
        .collect();
    let mut bookings = vec![];
    for staff_name in staff_names {
        bookings.extend(state.backend.bookings_on(salon.id, staff_name, request.date));
    }

    let query = AvailabilityQuery {
        selections: &request.selections,
        date: request.date,
        salon: &salon,
        bookings: &bookings,
        now: Local::now().naive_local(),
    };
    match available_start_times(&query) {
        Ok(slots) => Json(slots).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn book<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<BookingRequest>,
) -> Response {
    match state.backend.book(request) {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn stream_bookings<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = state
        .backend
        .booking_stream()
        .map(|bookings| Event::default().json_data(&bookings));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn add_salon<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(salon): Json<Salon>,
) -> Response {
    match state.backend.add_salon(salon) {
        Ok(()) => (StatusCode::OK, "Salon added successfully".to_string()).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn remove_booking<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<DeleteBookingRequest>,
) -> Response {
    match state.backend.remove_booking(request.id) {
        Ok(()) => (StatusCode::OK, "Booking removed successfully".to_string()).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn remove_all_bookings<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> impl IntoResponse {
    state.backend.remove_all_bookings();
    (
        StatusCode::OK,
        "All bookings removed successfully".to_string(),
    )
}

async fn get_frontend<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Result<Html<String>, (StatusCode, String)> {
    match fs::read_to_string(state.configuration.frontend_path()).await {
        Ok(contents) => Ok(Html(contents)),
        Err(e) => {
            let error_message = format!("Failed to read frontend file: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, error_message))
        }
    }
}

async fn get_admin_page<T: SalonBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> impl IntoResponse {
    info!("Admin page requested");
    state.configuration.website_title()
}
