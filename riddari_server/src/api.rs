//! HTTP boundary over the search engine: start a search, stream its
//! move events, query the last result.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream};

use riddari_core::board::Square;
use riddari_engine::{
    move_event::MoveEvent, search_result::SearchResult, CancellationToken, Engine, SolveRequest,
};

/// How long one subscription poll waits before re-checking for a result.
const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Idle cutoff: a stream that has seen no events for this long is closed
/// so connections never hang.
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    /// Token of the most recently started request; a new solve cancels
    /// it before installing its own.
    current_token: Arc<Mutex<CancellationToken>>,
}

pub fn router() -> Router {
    let state = AppState {
        engine: Arc::new(Engine::new()),
        current_token: Arc::new(Mutex::new(CancellationToken::new())),
    };

    Router::new()
        .route("/api/solve", post(start_solve))
        .route("/api/events", get(stream_events))
        .route("/api/status", get(solve_status))
        .with_state(state)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SquareDto {
    rank: u8,
    file: u8,
}

impl From<Square> for SquareDto {
    fn from(square: Square) -> Self {
        Self {
            rank: square.rank(),
            file: square.file(),
        }
    }
}

impl From<SquareDto> for Square {
    fn from(dto: SquareDto) -> Self {
        Square::new(dto.rank, dto.file)
    }
}

#[derive(Debug, Deserialize)]
struct SolveParams {
    size: u8,
    start: SquareDto,
}

#[derive(Debug, Serialize)]
struct MoveEventDto {
    square: SquareDto,
    index: u32,
    backtrack: bool,
}

impl From<MoveEvent> for MoveEventDto {
    fn from(event: MoveEvent) -> Self {
        Self {
            square: event.square.into(),
            index: event.index,
            backtrack: event.is_backtrack(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResultDto {
    solved: bool,
    aborted: bool,
    attempt_count: u64,
    elapsed_ms: u64,
    moves: Vec<MoveEventDto>,
}

impl From<SearchResult> for ResultDto {
    fn from(result: SearchResult) -> Self {
        Self {
            solved: result.solved,
            aborted: result.aborted,
            attempt_count: result.stats.attempts,
            elapsed_ms: result.elapsed.as_millis() as u64,
            moves: result.moves.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StatusResponse {
    Finished(ResultDto),
    NotStarted { status: &'static str },
}

async fn start_solve(
    State(state): State<AppState>,
    Json(params): Json<SolveParams>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let request = SolveRequest::new(params.size, params.start.into());
    if let Err(error) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, error.to_string()));
    }

    // A new request takes over the engine: cancel whatever is running.
    let token = CancellationToken::new();
    {
        let mut current = state.current_token.lock().unwrap();
        current.cancel();
        *current = token.clone();
    }

    tracing::info!(size = request.size, start = %request.start, "starting search");

    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || match engine.solve(request, &token) {
        Ok(result) => tracing::info!(
            solved = result.solved,
            aborted = result.aborted,
            attempts = result.stats.attempts,
            "search finished"
        ),
        Err(error) => tracing::error!(%error, "search failed"),
    });

    Ok(Json(serde_json::json!({ "status": "solving" })))
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(64);
    let engine = Arc::clone(&state.engine);

    tokio::task::spawn_blocking(move || {
        let stream = engine.subscribe();
        let mut idle = Duration::ZERO;

        loop {
            match stream.next(STREAM_POLL_INTERVAL) {
                Some(event) => {
                    idle = Duration::ZERO;
                    if forward(&tx, &MoveEventDto::from(event)).is_err() {
                        return;
                    }
                }
                None => {
                    idle += STREAM_POLL_INTERVAL;
                    if idle >= STREAM_IDLE_TIMEOUT {
                        return;
                    }
                }
            }

            if let Some(result) = engine.status() {
                // The search is done: flush whatever is still buffered,
                // then tell the client to stop listening.
                while let Some(event) = stream.try_next() {
                    if forward(&tx, &MoveEventDto::from(event)).is_err() {
                        return;
                    }
                }
                let _ = forward(
                    &tx,
                    &serde_json::json!({ "complete": true, "solved": result.solved }),
                );
                return;
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}

async fn solve_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(match state.engine.status() {
        Some(result) => StatusResponse::Finished(result.into()),
        None => StatusResponse::NotStarted {
            status: "not_started",
        },
    })
}

/// Serializes `payload` as one SSE event and hands it to the response
/// stream; `Err` means the client went away.
fn forward<T: Serialize>(
    tx: &mpsc::Sender<Result<Event, Infallible>>,
    payload: &T,
) -> Result<(), ()> {
    let event = Event::default().json_data(payload).map_err(|_| ())?;
    tx.blocking_send(Ok(event)).map_err(|_| ())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn move_event_wire_shape() {
        let event = MoveEvent::placement(Square::new(2, 3), 7);
        let value = serde_json::to_value(MoveEventDto::from(event)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "square": { "rank": 2, "file": 3 },
                "index": 7,
                "backtrack": false,
            })
        );
    }

    #[test]
    fn backtrack_wire_shape() {
        let event = MoveEvent::backtrack(Square::new(4, 0));
        let value = serde_json::to_value(MoveEventDto::from(event)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "square": { "rank": 4, "file": 0 },
                "index": 0,
                "backtrack": true,
            })
        );
    }

    #[test]
    fn not_started_wire_shape() {
        let value = serde_json::to_value(StatusResponse::NotStarted {
            status: "not_started",
        })
        .unwrap();

        assert_eq!(value, serde_json::json!({ "status": "not_started" }));
    }

    #[test]
    fn solve_params_parse() {
        let params: SolveParams =
            serde_json::from_value(serde_json::json!({
                "size": 8,
                "start": { "rank": 0, "file": 0 },
            }))
            .unwrap();

        assert_eq!(params.size, 8);
        assert_eq!(Square::from(params.start), Square::new(0, 0));
    }
}
