//! 规则 API 处理器
//!
//! 规则的创建、查询、修改、删除、组合与求值。
//! 规则字符串在入库前解析为语法树，求值请求携带传输格式的语法树或引用已保存规则。

use axum::{
    Json,
    extract::{Path, State},
};
use rule_engine::{
    EvaluationContext, Node, RuleCombinator, RuleExecutor, TransportNode, parse_rule,
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::{
        ApiResponse, CombineResponse, CombineRulesRequest, CreateRuleRequest, DeletedResponse,
        EvaluateRequest, EvaluateResponse, EvaluateStoredRequest, RuleDto, UpdateRuleRequest,
    },
    error::{ApiError, Result},
    state::AppState,
};

/// 创建规则
///
/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<ApiResponse<RuleDto>>> {
    req.validate()?;

    let ast = parse_rule(&req.rule)?;
    let stored = state.repository.save(req.name, &req.rule, &ast).await?;

    info!(rule_id = stored.id, "Rule created");
    Ok(Json(ApiResponse::success(stored.into())))
}

/// 获取全部规则
///
/// GET /api/rules
pub async fn list_rules(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<RuleDto>>>> {
    let rules = state.repository.list().await?;
    Ok(Json(ApiResponse::success(
        rules.into_iter().map(Into::into).collect(),
    )))
}

/// 获取规则详情
///
/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RuleDto>>> {
    let stored = state
        .repository
        .get(id)
        .await?
        .ok_or(ApiError::RuleNotFound(id))?;
    Ok(Json(ApiResponse::success(stored.into())))
}

/// 修改规则，语法树随规则字符串重新生成
///
/// PUT /api/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<Json<ApiResponse<RuleDto>>> {
    req.validate()?;

    let ast = parse_rule(&req.rule)?;
    let stored = state
        .repository
        .update(id, &req.rule, &ast)
        .await?
        .ok_or(ApiError::RuleNotFound(id))?;

    info!(rule_id = id, "Rule updated");
    Ok(Json(ApiResponse::success(stored.into())))
}

/// 删除规则
///
/// DELETE /api/rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>> {
    if !state.repository.delete(id).await? {
        return Err(ApiError::RuleNotFound(id));
    }

    info!(rule_id = id, "Rule deleted");
    Ok(Json(ApiResponse::success(DeletedResponse { id, deleted: true })))
}

/// 组合多条规则
///
/// POST /api/rules/combine
pub async fn combine_rules(
    State(state): State<AppState>,
    Json(req): Json<CombineRulesRequest>,
) -> Result<Json<ApiResponse<CombineResponse>>> {
    req.validate()?;

    let combined = RuleCombinator::new()
        .with_connective(req.operator)
        .combine(&req.rules)?;
    let rule = combined.to_string();

    let saved = if req.save {
        let stored = state.repository.save(req.name, &rule, &combined).await?;
        info!(rule_id = stored.id, count = req.rules.len(), "Combined rule saved");
        Some(stored.into())
    } else {
        None
    };

    Ok(Json(ApiResponse::success(CombineResponse {
        operator: req.operator,
        rule,
        ast: TransportNode::from(&combined),
        saved,
    })))
}

/// 对传输格式的语法树求值
///
/// POST /api/rules/evaluate
pub async fn evaluate_rule(
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<ApiResponse<EvaluateResponse>>> {
    req.validate()?;

    let (Some(ast), Some(context)) = (req.ast, req.context) else {
        return Err(ApiError::Validation("求值需要提供语法树和上下文".to_string()));
    };

    let tree = TransportNode::tree_from_value(ast)?;
    let response = run(&tree, &context, req.trace)?;
    Ok(Json(ApiResponse::success(response)))
}

/// 对已保存的规则求值
///
/// POST /api/rules/{id}/evaluate
pub async fn evaluate_stored_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<EvaluateStoredRequest>,
) -> Result<Json<ApiResponse<EvaluateResponse>>> {
    req.validate()?;

    let Some(context) = req.context else {
        return Err(ApiError::Validation("求值需要提供上下文".to_string()));
    };

    let stored = state
        .repository
        .get(id)
        .await?
        .ok_or(ApiError::RuleNotFound(id))?;
    let tree = stored.tree()?;

    let response = run(&tree, &context, req.trace)?;
    Ok(Json(ApiResponse::success(response)))
}

fn run(tree: &Node, context: &EvaluationContext, trace: bool) -> Result<EvaluateResponse> {
    let executor = if trace {
        RuleExecutor::new().with_trace()
    } else {
        RuleExecutor::new()
    };

    let result = executor.execute(tree, context)?;
    debug!(
        result = %result.value,
        elapsed_us = result.evaluation_time_us,
        "Rule evaluated"
    );

    Ok(EvaluateResponse::from_result(result, trace))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{repository::MockRuleRepository, routes::create_router, state::AppState};

    fn app_with(repo: MockRuleRepository) -> axum::Router {
        create_router(AppState::new(Arc::new(repo)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_storage_failure_is_hidden() {
        let mut repo = MockRuleRepository::new();
        repo.expect_save()
            .returning(|_, _, _| Err(sqlx::Error::PoolTimedOut));

        let response = app_with(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rules")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rule": "age > 30"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["message"], "服务内部错误，请稍后重试");
    }

    #[tokio::test]
    async fn test_parse_error_skips_storage() {
        let mut repo = MockRuleRepository::new();
        repo.expect_save().never();

        let response = app_with(repo)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rules")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"rule": "age > > 30"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNEXPECTED_COMPARISON_OPERATOR");
    }

    #[tokio::test]
    async fn test_list_failure() {
        let mut repo = MockRuleRepository::new();
        repo.expect_list()
            .times(1)
            .returning(|| Err(sqlx::Error::PoolClosed));

        let response = app_with(repo)
            .oneshot(
                Request::builder()
                    .uri("/api/rules")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
