// ABOUTME: Routing decision ladder — ordered, first-match-wins model selection.
// ABOUTME: Maps a prompt and call context to a model tier, tool set, and generation params.

use crate::router::intents;
use crate::types::{Location, Mood};

/// Fixed thinking-token allowance applied whenever extended reasoning is on.
pub const REASONING_BUDGET_TOKENS: u32 = 12000;

/// A named backend configuration selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Image-capable tier for poetry visualization.
    ImageGen,
    /// Top reasoning tier for duels, parallels, and image analysis.
    Reasoning,
    /// Location-capable tier with map lookup attached.
    Location,
    /// Search-capable tier with web search attached.
    Search,
    /// Low-latency tier for short prompts early in a conversation.
    Lite,
    /// General-purpose default tier.
    General,
}

impl ModelTier {
    /// The backend model identifier for this tier.
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelTier::ImageGen => "gemini-2.5-flash-image",
            ModelTier::Reasoning => "gemini-3-pro-preview",
            ModelTier::Location => "gemini-2.5-flash",
            ModelTier::Search => "gemini-3-flash-preview",
            ModelTier::Lite => "gemini-2.5-flash-lite-latest",
            ModelTier::General => "gemini-3-pro-preview",
        }
    }
}

/// An optional backend capability attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    MapLookup,
    WebSearch,
}

/// The call context the router classifies.
#[derive(Debug, Clone)]
pub struct RouteContext<'a> {
    pub prompt: &'a str,
    /// Number of prior turns in the session.
    pub history_len: usize,
    pub has_attachment: bool,
    pub mood: Option<Mood>,
    /// Last-known coordinates, used as a retrieval bias for map lookups.
    pub location: Option<Location>,
}

/// The router's output: how the generation call should be shaped.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub tier: ModelTier,
    pub tools: Vec<ToolKind>,
    pub retrieval_bias: Option<Location>,
    pub temperature: f32,
    pub extended_reasoning: bool,
    pub image_aspect_ratio: Option<&'static str>,
}

impl RoutingDecision {
    fn for_tier(tier: ModelTier, temperature: f32) -> Self {
        Self {
            tier,
            tools: Vec::new(),
            retrieval_bias: None,
            temperature,
            extended_reasoning: false,
            image_aspect_ratio: None,
        }
    }
}

/// Classify a prompt and produce a routing decision.
///
/// The branches are evaluated top to bottom and the first satisfied one wins.
/// Intent categories are not mutually exclusive, so this order is the
/// tie-break: a prompt matching both the duel and news patterns always gets
/// the duel branch's configuration.
pub fn route(ctx: &RouteContext) -> RoutingDecision {
    let duel = intents::is_duel_intent(ctx.prompt);
    let parallel = intents::is_parallel_intent(ctx.prompt);

    // Branch 1: image generation wins over everything else.
    if intents::is_image_gen_intent(ctx.prompt) {
        let mut decision = RoutingDecision::for_tier(ModelTier::ImageGen, 0.9);
        decision.image_aspect_ratio = Some("1:1");
        return decision;
    }

    // Branch 2: image analysis, duels, and parallels get the top reasoning tier.
    if ctx.has_attachment || duel || parallel {
        let temperature = if duel || parallel { 0.9 } else { 0.7 };
        let mut decision = RoutingDecision::for_tier(ModelTier::Reasoning, temperature);
        decision.extended_reasoning = true;
        return decision;
    }

    // Branch 3: place queries attach map lookup, biased by known coordinates.
    if intents::is_location_query(ctx.prompt) {
        let mut decision = RoutingDecision::for_tier(ModelTier::Location, 0.7);
        decision.tools.push(ToolKind::MapLookup);
        decision.retrieval_bias = ctx.location;
        return decision;
    }

    // Branch 4: time-sensitive queries attach web search.
    if intents::is_news_query(ctx.prompt) {
        let mut decision = RoutingDecision::for_tier(ModelTier::Search, 0.7);
        decision.tools.push(ToolKind::WebSearch);
        return decision;
    }

    // Branch 5: short prompt in a shallow conversation takes the fast lane.
    if ctx.prompt.chars().count() < 50 && ctx.history_len < 3 {
        return RoutingDecision::for_tier(ModelTier::Lite, 0.7);
    }

    // Branch 6: general-purpose default, extended reasoning off.
    RoutingDecision::for_tier(ModelTier::General, 0.7)
}
