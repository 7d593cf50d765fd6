use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use douyin_scout::{
    analyze, browser_manager, collect, comments::CommentHarvester, export, pipeline, types::*,
    urls, AppState, HarvestError, SearchType,
};

fn parse_port_from_args() -> Option<u16> {
    let mut args = std::env::args().peekable();
    while let Some(a) = args.next() {
        if a == "--port" {
            if let Some(v) = args.next() {
                if let Ok(p) = v.parse::<u16>() {
                    return Some(p);
                }
            }
        } else if let Some(rest) = a.strip_prefix("--port=") {
            if let Ok(p) = rest.parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

fn port_from_env() -> Option<u16> {
    for k in ["DOUYIN_SCOUT_PORT", "PORT"] {
        if let Ok(v) = std::env::var(k) {
            if let Ok(p) = v.trim().parse::<u16>() {
                return Some(p);
            }
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting douyin-scout");
    if browser_manager::driver_available() {
        info!("Browser driver found; collection endpoints enabled");
    } else {
        warn!(
            "No browser executable found; collection endpoints will return 503. \
             Install Chrome/Chromium or set CHROME_EXECUTABLE."
        );
    }

    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/collect/search", post(start_collection))
        .route("/api/collect/status/{task_id}", get(collection_status))
        .route("/api/collect/stop/{task_id}", post(stop_collection))
        .route("/api/data/videos", get(get_videos))
        .route("/api/data/users", get(get_users))
        .route("/api/analyze", post(analyze_data))
        .route("/api/export", post(export_data))
        .route("/api/video/comments", post(video_comments))
        .route("/api/keyword/comments", post(keyword_comments))
        .route("/api/user/comments", post(user_comments))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port: u16 = parse_port_from_args().or_else(port_from_env).unwrap_or(8000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/DOUYIN_SCOUT_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("douyin-scout listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: String) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
}

fn harvest_error(e: &HarvestError) -> HandlerError {
    let status = if e.is_service_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Gate for every endpoint that needs a browser.
fn require_driver() -> Result<(), HandlerError> {
    if browser_manager::driver_available() {
        Ok(())
    } else {
        Err(harvest_error(&HarvestError::DriverUnavailable))
    }
}

async fn health_check() -> Json<HealthResponse> {
    let mut features = vec![
        "collection (keyword search, video/user)".to_string(),
        "analysis (interaction, content length, keywords)".to_string(),
        "export (json, csv)".to_string(),
        "comment harvesting (video, keyword, user pipelines)".to_string(),
    ];
    if browser_manager::driver_available() {
        features.push("browser automation available".to_string());
    } else {
        features.push("browser automation unavailable (no driver found)".to_string());
    }

    Json(HealthResponse {
        status: "running".to_string(),
        service: "douyin-scout".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn start_collection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<StartCollectionResponse>, HandlerError> {
    require_driver()?;
    request.validate().map_err(bad_request)?;

    let (task_id, cancel) = state.tasks.register("task");
    let delay = Duration::from_secs_f64(request.delay);
    let spawn_state = state.clone();
    let spawn_id = task_id.clone();
    tokio::spawn(async move {
        let result = match request.search_type {
            SearchType::Video => collect::collect_search_videos(
                &spawn_state,
                &request.keyword,
                request.scroll_count,
                delay,
                &spawn_id,
                &cancel,
            )
            .await
            .map(|_| ()),
            SearchType::User => collect::collect_search_users(
                &spawn_state,
                &request.keyword,
                request.scroll_count,
                delay,
                &spawn_id,
                &cancel,
            )
            .await
            .map(|_| ()),
        };
        if let Err(e) = result {
            error!("[collect] task={} background run failed: {}", spawn_id, e);
        }
    });

    Ok(Json(StartCollectionResponse {
        success: true,
        task_id: task_id.clone(),
        message: "collection task started".to_string(),
        status_url: format!("/api/collect/status/{}", task_id),
    }))
}

async fn collection_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<CollectionStatusResponse>, HandlerError> {
    match state.tasks.get(&task_id) {
        Some(task) => Ok(Json(CollectionStatusResponse {
            task_id,
            status: task.status,
            progress: task.progress,
            collected_count: task.collected_count,
            message: task.message,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("task not found: {}", task_id),
            }),
        )),
    }
}

async fn stop_collection(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Json<StopResponse> {
    state.tasks.stop(&task_id);
    Json(StopResponse {
        success: true,
        message: "collection stopped".to_string(),
    })
}

async fn get_videos(State(state): State<Arc<AppState>>) -> Json<DataResponse<VideoRecord>> {
    let data = state.videos_snapshot();
    Json(DataResponse {
        success: true,
        count: data.len(),
        data,
    })
}

async fn get_users(State(state): State<Arc<AppState>>) -> Json<DataResponse<UserRecord>> {
    let data = state.users_snapshot();
    Json(DataResponse {
        success: true,
        count: data.len(),
        data,
    })
}

async fn analyze_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let (likes, titles): (Vec<String>, Vec<String>) = match request.data_type {
        DataType::Video => {
            let videos = state.videos_snapshot();
            (
                videos.iter().map(|v| v.likes.clone()).collect(),
                videos.iter().map(|v| v.title.clone()).collect(),
            )
        }
        DataType::User => {
            let users = state.users_snapshot();
            (
                users.iter().map(|u| u.likes.clone()).collect(),
                users.iter().map(|u| u.title.clone()).collect(),
            )
        }
    };

    let result = match request.analysis_type {
        AnalysisType::Interaction => {
            analyze::analyze_interaction(&likes).map(|r| serde_json::to_value(r))
        }
        AnalysisType::ContentLength => {
            analyze::analyze_content_length(&titles).map(|r| serde_json::to_value(r))
        }
        AnalysisType::Keywords => {
            analyze::analyze_keywords(&titles, 100).map(|r| serde_json::to_value(r))
        }
    };

    match result {
        Ok(Ok(value)) => Ok(Json(serde_json::json!({
            "success": true,
            "data_type": request.data_type,
            "analysis_type": request.analysis_type,
            "result": value,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))),
        Ok(Err(e)) => Err(bad_request(format!("analysis serialization failed: {}", e))),
        Err(e) => Err(bad_request(format!("analysis failed: {}", e))),
    }
}

async fn export_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, HandlerError> {
    let result = match request.data_type {
        DataType::Video => {
            let videos = state.videos_snapshot();
            export::export_records(&videos, "video", request.format).map(|p| (p, videos.len()))
        }
        DataType::User => {
            let users = state.users_snapshot();
            export::export_records(&users, "user", request.format).map(|p| (p, users.len()))
        }
    };

    match result {
        Ok((path, count)) => Ok(Json(ExportResponse {
            success: true,
            path: path.display().to_string(),
            count,
        })),
        Err(e) => Err(bad_request(format!("export failed: {}", e))),
    }
}

async fn video_comments(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<VideoCommentsResponse>, HandlerError> {
    require_driver()?;
    request.validate().map_err(bad_request)?;

    // Search-page and popup links are accepted; resolve to the detail page
    // first.
    let real_url = urls::resolve_canonical(&urls::normalize(&request.video_url))
        .await
        .map_err(|e| harvest_error(&e))?;

    let comments = CommentHarvester::default()
        .fetch_comments(&real_url, request.limit)
        .await
        .map_err(|e| harvest_error(&e))?;

    state.record_comment_count(&real_url, comments.len());

    Ok(Json(VideoCommentsResponse {
        success: true,
        video_url: real_url,
        count: comments.len(),
        comments: comments
            .into_iter()
            .map(|comment| CommentRecord { comment })
            .collect(),
    }))
}

async fn keyword_comments(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KeywordCommentRequest>,
) -> Result<Json<KeywordCommentsResponse>, HandlerError> {
    require_driver()?;
    request.validate().map_err(bad_request)?;

    let batch = pipeline::comments_by_keyword(&state, &request)
        .await
        .map_err(|e| harvest_error(&e))?;

    Ok(Json(KeywordCommentsResponse {
        success: true,
        keyword: request.keyword,
        video_count: batch.video_count,
        comment_count: batch.comments.len(),
        comments: batch
            .comments
            .into_iter()
            .map(|comment| CommentRecord { comment })
            .collect(),
    }))
}

async fn user_comments(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserCommentRequest>,
) -> Result<Json<UserCommentsResponse>, HandlerError> {
    require_driver()?;
    request.validate().map_err(bad_request)?;

    let batch = pipeline::comments_by_user(&state, &request)
        .await
        .map_err(|e| harvest_error(&e))?;

    Ok(Json(UserCommentsResponse {
        success: true,
        user_input: request.user_input,
        video_count: batch.video_count,
        comment_count: batch.comments.len(),
        comments: batch
            .comments
            .into_iter()
            .map(|comment| CommentRecord { comment })
            .collect(),
    }))
}
