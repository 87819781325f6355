// ABOUTME: Intent router — classifies a prompt and selects the model configuration.
// ABOUTME: Pure and stateless; pattern tables in intents, decision ladder in decision.

pub mod decision;
pub mod intents;

pub use decision::{
    ModelTier, RouteContext, RoutingDecision, ToolKind, REASONING_BUDGET_TOKENS, route,
};
