//! 路由配置模块

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 规则相关路由
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(handlers::rule::list_rules).post(handlers::rule::create_rule),
        )
        .route("/rules/combine", post(handlers::rule::combine_rules))
        .route("/rules/evaluate", post(handlers::rule::evaluate_rule))
        .route(
            "/rules/{id}",
            get(handlers::rule::get_rule)
                .put(handlers::rule::update_rule)
                .delete(handlers::rule::delete_rule),
        )
        .route(
            "/rules/{id}/evaluate",
            post(handlers::rule::evaluate_stored_rule),
        )
}

/// 构建完整应用路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", rule_routes())
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
}
