use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    board::Board,
    event::Event,
    export,
    form::AddEventForm,
    ics,
    sync::{Debounce, Syncer},
    templates::{render_page, PageView},
};

pub struct App {
    board: RwLock<Board>,
    syncer: Syncer,
    auto_sync: Option<Debounce>,
}

impl App {
    pub fn new(board: Board, syncer: Syncer, auto_sync: Option<Debounce>) -> Arc<Self> {
        Arc::new(Self {
            board: RwLock::new(board),
            syncer,
            auto_sync,
        })
    }

    async fn snapshot(&self) -> Vec<Event> {
        self.board.read().await.events().to_vec()
    }

    fn changed(self: &Arc<Self>) {
        let Some(debounce) = &self.auto_sync else {
            return;
        };

        let app = Arc::clone(self);
        debounce.trigger(move || async move {
            let events = app.snapshot().await;
            app.syncer.run(&events).await;
        });
    }

    async fn render(&self, form: &AddEventForm, error: Option<&str>) -> Result<String, AppError> {
        let status = self.syncer.status().await;
        let board = self.board.read().await;
        let literal = export::to_js_literal(board.events())?;

        Ok(render_page(&PageView {
            events: board.events(),
            pending: board.pending(),
            form,
            error,
            status: &status,
            literal: &literal,
            auto_sync: self.auto_sync.is_some(),
        }))
    }
}

/// Unexpected failures, rendered as a plain 500.
pub struct AppError(String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0).into_response()
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self(format!("failed to encode CSV: {err}"))
    }
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/events", post(handle_add))
        .route("/events/:index/delete", post(handle_request_delete))
        .route("/delete/confirm", post(handle_confirm_delete))
        .route("/delete/cancel", post(handle_cancel_delete))
        .route("/sync", post(handle_sync))
        .route("/events.csv", get(handle_csv))
        .route("/events.json", get(handle_json))
        .route("/events.ics", get(handle_ics))
        .with_state(app)
        .layer(TraceLayer::new_for_http())
}

async fn handle_index(State(app): State<Arc<App>>) -> Result<Html<String>, AppError> {
    Ok(Html(app.render(&AddEventForm::default(), None).await?))
}

async fn handle_add(
    State(app): State<Arc<App>>,
    Form(form): Form<AddEventForm>,
) -> Result<Response, AppError> {
    let event = match form.parse() {
        Ok(event) => event,
        Err(err) => {
            let page = app.render(&form, Some(&err.to_string())).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    info!(name = %event.name, date = %event.date_text(), "event added");
    app.board.write().await.append(event);
    app.changed();

    Ok(Redirect::to("/").into_response())
}

async fn handle_request_delete(
    State(app): State<Arc<App>>,
    Path(index): Path<usize>,
) -> Response {
    match app.board.write().await.request_delete(index) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
    }
}

async fn handle_confirm_delete(State(app): State<Arc<App>>) -> Response {
    let removed = app.board.write().await.confirm_delete();

    match removed {
        Ok(event) => {
            info!(name = %event.name, date = %event.date_text(), "event deleted");
            app.changed();
            Redirect::to("/").into_response()
        }
        Err(err) => (StatusCode::CONFLICT, err.to_string()).into_response(),
    }
}

async fn handle_cancel_delete(State(app): State<Arc<App>>) -> Redirect {
    app.board.write().await.cancel_delete();
    Redirect::to("/")
}

async fn handle_sync(State(app): State<Arc<App>>) -> Redirect {
    let events = app.snapshot().await;
    app.syncer.run(&events).await;
    Redirect::to("/")
}

async fn handle_csv(State(app): State<Arc<App>>) -> Result<Response, AppError> {
    let bytes = export::to_csv_file_bytes(&app.snapshot().await)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], bytes).into_response())
}

async fn handle_json(State(app): State<Arc<App>>) -> Json<Vec<Event>> {
    Json(app.snapshot().await)
}

async fn handle_ics(State(app): State<Arc<App>>) -> Response {
    let events = app.snapshot().await;
    let calendar = ics::to_ics(env!("CARGO_PKG_NAME"), &events).to_string();
    ([(header::CONTENT_TYPE, "text/calendar")], calendar).into_response()
}
