pub mod classifier;
pub mod llm;
pub mod planner;
pub mod prompt;
pub mod rules;
pub mod validator;

pub use classifier::{classify, classify_with_advisor};
pub use llm::{Advice, AdviceRequest, Advisor, HttpAdvisor};
pub use planner::plan_cleanup;
pub use rules::{ClassifyConfig, ExtRule, RuleTable};
pub use validator::PlanValidator;
