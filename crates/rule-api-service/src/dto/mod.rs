//! 请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    CombineRulesRequest, CreateRuleRequest, EvaluateRequest, EvaluateStoredRequest,
    UpdateRuleRequest,
};
pub use response::{ApiResponse, CombineResponse, DeletedResponse, EvaluateResponse, RuleDto};
