use serde::Deserialize;
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use duel_types::{PlayerId, PlayerInfo, RoomError};

pub mod catalog;
pub mod config;
pub mod realtime;
pub mod room_service;
pub mod ws;

use catalog::CatalogCache;
use realtime::RoomHub;
use room_service::{RoomService, ServiceError};

#[derive(Deserialize)]
struct SeatRequest {
    player_id: PlayerId,
    player_name: String,
}

#[derive(Deserialize)]
struct StartRequest {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct GuessRequest {
    player_id: PlayerId,
    word_index: i32,
    guess: String,
}

#[derive(Deserialize)]
struct TimeoutRequest {
    player_id: PlayerId,
    word_index: i32,
}

pub fn create_routes(
    service: Arc<RoomService>,
    hub: Arc<RoomHub>,
    catalog: Arc<CatalogCache>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let service_filter = warp::any().map({
        let service = service.clone();
        move || service.clone()
    });

    let hub_filter = warp::any().map({
        let hub = hub.clone();
        move || hub.clone()
    });

    let catalog_filter = warp::any().map({
        let catalog = catalog.clone();
        move || catalog.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Room lifecycle
    let create_room = warp::path!("api" / "rooms")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_create_room);

    let get_room = warp::path!("api" / "rooms" / String)
        .and(warp::get())
        .and(service_filter.clone())
        .and_then(handle_get_room);

    let join_room = warp::path!("api" / "rooms" / String / "join")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_join_room);

    let start_room = warp::path!("api" / "rooms" / String / "start")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_start_room);

    let submit_guess = warp::path!("api" / "rooms" / String / "guess")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_submit_guess);

    let timeout = warp::path!("api" / "rooms" / String / "timeout")
        .and(warp::post())
        .and(warp::body::json())
        .and(service_filter.clone())
        .and_then(handle_timeout);

    // Word catalog for clients (descriptions, hints, synonyms)
    let words = warp::path!("api" / "words")
        .and(warp::get())
        .and(catalog_filter)
        .and_then(handle_words);

    // Realtime events per room
    let room_socket = warp::path!("ws" / String)
        .and(warp::ws())
        .and(hub_filter)
        .and(service_filter)
        .map(|code: String, ws: warp::ws::Ws, hub, service| {
            ws.on_upgrade(move |socket| ws::handle_room_socket(socket, code, hub, service))
        });

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(create_room)
        .or(get_room)
        .or(join_room)
        .or(start_room)
        .or(submit_guess)
        .or(timeout)
        .or(words)
        .or(room_socket)
        .with(cors)
        .with(warp::log("duel_server"))
}

fn error_reply(err: ServiceError) -> (warp::reply::Json, StatusCode) {
    let status = match &err {
        ServiceError::Room(RoomError::RoomNotFound) => StatusCode::NOT_FOUND,
        ServiceError::Room(RoomError::EmptyCatalog | RoomError::CodeCollision) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ServiceError::Room(_) => StatusCode::CONFLICT,
        ServiceError::Internal(e) => {
            tracing::error!("internal error: {e:#}");
            return (
                warp::reply::json(&serde_json::json!({ "error": "internal_error" })),
                StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    };

    // RoomError's tagged serialization is the wire shape:
    // {"error":"room_full"} or {"error":"stale_word_index","submitted":3}
    let body = match &err {
        ServiceError::Room(room_err) => warp::reply::json(room_err),
        ServiceError::Internal(_) => unreachable!(),
    };
    (body, status)
}

async fn handle_create_room(
    body: SeatRequest,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let host = PlayerInfo {
        id: body.player_id,
        name: body.player_name,
    };
    match service.create_room(host).await {
        Ok(room) => Ok(warp::reply::with_status(
            warp::reply::json(&room),
            StatusCode::CREATED,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_get_room(
    code: String,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.get_room(&code).await {
        Ok(room) => Ok(warp::reply::with_status(
            warp::reply::json(&room),
            StatusCode::OK,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_join_room(
    code: String,
    body: SeatRequest,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let player = PlayerInfo {
        id: body.player_id,
        name: body.player_name,
    };
    match service.join_room(&code, player).await {
        Ok(room) => Ok(warp::reply::with_status(
            warp::reply::json(&room),
            StatusCode::OK,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_start_room(
    code: String,
    body: StartRequest,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service.start_room(&code, body.player_id).await {
        Ok(room) => Ok(warp::reply::with_status(
            warp::reply::json(&room),
            StatusCode::OK,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_submit_guess(
    code: String,
    body: GuessRequest,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service
        .submit_guess(&code, body.player_id, body.word_index, &body.guess)
        .await
    {
        Ok(reply) => Ok(warp::reply::with_status(
            warp::reply::json(&reply),
            StatusCode::OK,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_timeout(
    code: String,
    body: TimeoutRequest,
    service: Arc<RoomService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match service
        .advance_on_timeout(&code, body.player_id, body.word_index)
        .await
    {
        Ok(room) => Ok(warp::reply::with_status(
            warp::reply::json(&room),
            StatusCode::OK,
        )),
        Err(err) => {
            let (body, status) = error_reply(err);
            Ok(warp::reply::with_status(body, status))
        }
    }
}

async fn handle_words(
    catalog: Arc<CatalogCache>,
) -> Result<impl warp::Reply, warp::Rejection> {
    match catalog.get().await {
        Ok(catalog) => Ok(warp::reply::with_status(
            warp::reply::json(&*catalog),
            StatusCode::OK,
        )),
        Err(e) => {
            tracing::error!("failed to load word catalog: {e:#}");
            Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({ "error": "catalog_unavailable" })),
                StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }
}
