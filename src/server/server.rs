use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::recommendation::Recommender;
use crate::user::{auth::AuthTokenValue, UserManager, UserStore};
use axum_extra::extract::cookie::{Cookie, SameSite};

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{
    log_requests, metrics, recommendations::make_recommendation_routes,
    session::{Session, COOKIE_SESSION_TOKEN_KEY},
    state::*,
    ServerConfig,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Serialize)]
struct SessionResponse {
    user_id: usize,
    user_handle: Option<String>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for {}", body.user_handle);
    let start = Instant::now();

    let outcome = match user_manager.lock() {
        Ok(locked_manager) => locked_manager.login(&body.user_handle, &body.password),
        Err(_) => {
            error!("User manager lock is poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match outcome {
        Ok(Some(auth_token)) => {
            metrics::record_login_attempt("success", start.elapsed());
            let token = auth_token.value.0;
            match HeaderValue::from_str(&format!(
                "{}={}; Path=/; HttpOnly",
                COOKIE_SESSION_TOKEN_KEY, token
            )) {
                Ok(cookie_value) => (
                    StatusCode::CREATED,
                    [(header::SET_COOKIE, cookie_value)],
                    Json(LoginSuccessResponse { token }),
                )
                    .into_response(),
                Err(err) => {
                    error!("Could not build session cookie: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Ok(None) => {
            metrics::record_login_attempt("failure", start.elapsed());
            StatusCode::UNAUTHORIZED.into_response()
        }
        Err(err) => {
            metrics::record_login_attempt("error", start.elapsed());
            error!("Error during login: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let deleted = match user_manager.lock() {
        Ok(locked_manager) => {
            locked_manager.delete_auth_token(session.user_id, &AuthTokenValue(session.token))
        }
        Err(_) => {
            error!("User manager lock is poisoned");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match deleted {
        Ok(_) => {
            let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
                .same_site(SameSite::Lax)
                .build();
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie_value.to_string())],
            )
                .into_response()
        }
        Err(err) => {
            debug!("Could not delete auth token: {}", err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn get_session(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let user_handle = match user_manager.lock() {
        Ok(locked_manager) => locked_manager.get_user_handle(session.user_id),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    Json(SessionResponse {
        user_id: session.user_id,
        user_handle,
    })
    .into_response()
}

pub fn make_app(
    config: ServerConfig,
    user_store: Box<dyn UserStore>,
    recommender: Recommender,
) -> Result<Router> {
    let user_manager = UserManager::new(user_store);
    let state = ServerState::new(config, user_manager, recommender);

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/session", get(get_session))
        .with_state(state.clone());

    let ai_routes = make_recommendation_routes(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    #[allow(unused_mut)]
    let mut app: Router = home_router
        .nest("/auth", auth_routes)
        .nest("/ai", ai_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    let app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics::metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    user_store: Box<dyn UserStore>,
    recommender: Recommender,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, user_store, recommender)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Could not bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });
    info!("Metrics available at port {}", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Ready to serve at port {}", port);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message};
    use crate::user::SqliteUserStore;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct UnreachableProvider;

    #[async_trait]
    impl LlmProvider for UnreachableProvider {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn model(&self) -> &str {
            "none"
        }

        async fn complete(
            &self,
            _messages: &[Message],
            _options: &CompletionOptions,
        ) -> Result<CompletionResponse, LlmError> {
            panic!("protected routes must not reach the provider");
        }

        async fn health_check(&self) -> Result<(), LlmError> {
            Ok(())
        }
    }

    fn make_test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteUserStore::new(temp_dir.path().join("user.db")).unwrap();
        let recommender =
            Recommender::new(Arc::new(UnreachableProvider), CompletionOptions::default());
        let app = make_app(ServerConfig::default(), Box::new(store), recommender).unwrap();
        (app, temp_dir)
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let (app, _dir) = make_test_app();

        for route in ["/auth/logout", "/auth/session"] {
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", route);
        }

        let request = Request::builder()
            .method("POST")
            .uri("/ai/recommendations")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, "not-a-token")
            .body(Body::from(r#"{"category":"mood","option":"Happy","songs":[]}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn home_and_categories_are_public() {
        let (app, _dir) = make_test_app();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ai/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=3600"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let categories: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(categories.as_array().unwrap().len(), 3);
        assert_eq!(categories[1]["label"], "Time of Day");
    }

    #[tokio::test]
    async fn rejects_unknown_login() {
        let (app, _dir) = make_test_app();

        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"user_handle":"nobody","password":"pw"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn metrics_app_serves_text() {
        metrics::init_metrics();
        metrics::record_recommendation("success");
        let response = make_metrics_app()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
