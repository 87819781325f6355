// ABOUTME: Generation provider — the backend contract and the Gemini REST client.
// ABOUTME: Shapes each call from the routing decision; absorbs failures into a fallback reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::wire;
use crate::config::Config;
use crate::prompt::PersonaBuilder;
use crate::router::{REASONING_BUDGET_TOKENS, RouteContext, RoutingDecision, ToolKind, route};
use crate::types::{Attachment, GroundingSource, Location, Mood, Role};

/// Fixed reply used when the backend fails for any reason.
pub const FALLBACK_TEXT: &str = "Texnik xatolik yuz berdi. Qayta urinib ko'ring.";
/// Reply text when the backend produced an image but no prose.
const IMAGE_ONLY_TEXT: &str = "Tasvir yaratildi.";
/// Reply text when the backend produced nothing usable.
const EMPTY_TEXT: &str = "Javob olib bo'lmadi.";
/// Prompt substituted when an image arrives without accompanying text.
const DEFAULT_IMAGE_PROMPT: &str = "Ushbu rasmni tahlil qiling.";

/// One prior conversation turn, as the backend contract sees it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Everything the store hands the provider for one round-trip.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Prior message history of the session, oldest first. The in-flight
    /// user message is NOT included; the prompt travels separately.
    pub history: Vec<HistoryEntry>,
    pub mood: Option<Mood>,
    pub attachment: Option<Attachment>,
    pub location: Option<Location>,
}

/// What comes back from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub text: String,
    pub image_url: Option<String>,
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl GenerationResult {
    /// The fixed response substituted for any backend failure.
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            image_url: None,
            grounding_sources: None,
        }
    }
}

/// The external generation service. Implementations never error: any failure
/// is reported as the fallback result so the store can treat it like a
/// normal assistant reply.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;
}

/// Create the production provider from config, resolving the API key from
/// the config file or the GEMINI_API_KEY environment variable.
pub fn create_provider(config: &Config) -> anyhow::Result<Arc<dyn GenerationProvider>> {
    let api_key = config
        .gemini
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "GEMINI_API_KEY is not set. Add it to the environment or to ~/.adib/config.toml"
            )
        })?;
    Ok(Arc::new(GeminiProvider::new(
        config.gemini.base_url.clone(),
        api_key,
    )))
}

/// Client for the generateContent REST endpoint.
pub struct GeminiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    persona: PersonaBuilder,
}

impl GeminiProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        let mut persona = PersonaBuilder::new();
        persona.load_override();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            persona,
        }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> anyhow::Result<GenerationResult> {
        let (model, body) = shape_call(&self.persona, request);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let parsed: wire::GenerateContentResponse = response.json().await?;
        Ok(parse_response(parsed))
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        match self.try_generate(request).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Warning: generation call failed: {}", e);
                GenerationResult::fallback()
            }
        }
    }
}

/// Route the request and build the wire body.
///
/// Attachment calls are a single user turn of inline data plus text and skip
/// the persona; text calls get the persona (with mood suffix) first, then the
/// prior history with assistant turns mapped to the wire role `model`, then
/// the prompt.
fn shape_call(
    persona: &PersonaBuilder,
    request: &GenerationRequest,
) -> (&'static str, wire::GenerateContentRequest) {
    let decision = route(&RouteContext {
        prompt: &request.prompt,
        history_len: request.history.len(),
        has_attachment: request.attachment.is_some(),
        mood: request.mood,
        location: request.location,
    });

    let contents = match &request.attachment {
        Some(attachment) => {
            let text = if request.prompt.is_empty() {
                DEFAULT_IMAGE_PROMPT.to_string()
            } else {
                request.prompt.clone()
            };
            vec![wire::Content {
                role: "user".to_string(),
                parts: vec![
                    wire::Part::inline(attachment.mime_type.clone(), attachment.data.clone()),
                    wire::Part::text(text),
                ],
            }]
        }
        None => {
            let mut contents = vec![wire::Content {
                role: "user".to_string(),
                parts: vec![wire::Part::text(persona.build(request.mood))],
            }];
            for entry in &request.history {
                let role = match entry.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                contents.push(wire::Content {
                    role: role.to_string(),
                    parts: vec![wire::Part::text(entry.content.clone())],
                });
            }
            contents.push(wire::Content {
                role: "user".to_string(),
                parts: vec![wire::Part::text(request.prompt.clone())],
            });
            contents
        }
    };

    let body = wire::GenerateContentRequest {
        contents,
        tools: build_tools(&decision),
        tool_config: decision.retrieval_bias.map(|bias| wire::ToolConfig {
            retrieval_config: wire::RetrievalConfig {
                lat_lng: wire::LatLng {
                    latitude: bias.latitude,
                    longitude: bias.longitude,
                },
            },
        }),
        generation_config: wire::GenerationConfig {
            temperature: decision.temperature,
            thinking_config: decision
                .extended_reasoning
                .then_some(wire::ThinkingConfig {
                    thinking_budget: REASONING_BUDGET_TOKENS,
                }),
            image_config: decision.image_aspect_ratio.map(|aspect| wire::ImageConfig {
                aspect_ratio: aspect.to_string(),
            }),
        },
    };

    (decision.tier.model_name(), body)
}

fn build_tools(decision: &RoutingDecision) -> Option<Vec<wire::ToolSpec>> {
    if decision.tools.is_empty() {
        return None;
    }
    let specs = decision
        .tools
        .iter()
        .map(|tool| match tool {
            ToolKind::MapLookup => wire::ToolSpec {
                google_maps: Some(wire::EmptyConfig {}),
                ..Default::default()
            },
            ToolKind::WebSearch => wire::ToolSpec {
                google_search: Some(wire::EmptyConfig {}),
                ..Default::default()
            },
        })
        .collect();
    Some(specs)
}

/// Collapse a wire response into the result contract: concatenated text,
/// the last inline image as a data URI, and grounding chunks in order.
fn parse_response(response: wire::GenerateContentResponse) -> GenerationResult {
    let mut text = String::new();
    let mut image_url = None;
    let mut sources = Vec::new();

    if let Some(candidate) = response.candidates.into_iter().next() {
        if let Some(metadata) = candidate.grounding_metadata {
            for chunk in metadata.grounding_chunks {
                if let Some(web) = chunk.web {
                    sources.push(GroundingSource {
                        title: web.title,
                        uri: web.uri,
                    });
                } else if let Some(maps) = chunk.maps {
                    sources.push(GroundingSource {
                        title: maps.title,
                        uri: maps.uri,
                    });
                }
            }
        }
        if let Some(content) = candidate.content {
            for part in content.parts {
                if let Some(inline) = part.inline_data {
                    image_url = Some(format!(
                        "data:{};base64,{}",
                        inline.mime_type, inline.data
                    ));
                } else if let Some(part_text) = part.text {
                    text.push_str(&part_text);
                }
            }
        }
    }

    let trimmed = text.trim();
    let text = if trimmed.is_empty() {
        if image_url.is_some() {
            IMAGE_ONLY_TEXT.to_string()
        } else {
            EMPTY_TEXT.to_string()
        }
    } else {
        trimmed.to_string()
    };

    GenerationResult {
        text,
        image_url,
        grounding_sources: if sources.is_empty() {
            None
        } else {
            Some(sources)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            history: Vec::new(),
            mood: None,
            attachment: None,
            location: None,
        }
    }

    fn persona() -> PersonaBuilder {
        PersonaBuilder::new()
    }

    #[test]
    fn text_call_prepends_persona_then_history_then_prompt() {
        let mut request = text_request("Davom etamizmi, keyingi savolga o'tsak bo'ladimi?");
        request.history = vec![
            HistoryEntry {
                role: Role::User,
                content: "Salom".to_string(),
            },
            HistoryEntry {
                role: Role::Assistant,
                content: "Va alaykum assalom!".to_string(),
            },
        ];
        let (_, body) = shape_call(&persona(), &request);

        assert_eq!(body.contents.len(), 4);
        assert_eq!(body.contents[0].role, "user");
        assert!(
            body.contents[0].parts[0]
                .text
                .as_ref()
                .unwrap()
                .contains("AI-ADIB")
        );
        assert_eq!(body.contents[1].role, "user");
        assert_eq!(body.contents[2].role, "model");
        assert_eq!(
            body.contents[3].parts[0].text.as_deref(),
            Some("Davom etamizmi, keyingi savolga o'tsak bo'ladimi?")
        );
    }

    #[test]
    fn mood_suffix_reaches_the_persona_turn() {
        let mut request = text_request("Bir maslahat bering, nima o'qisam bo'ladi shu kunlarda?");
        request.mood = Some(Mood::Sadness);
        let (_, body) = shape_call(&persona(), &request);
        let persona_text = body.contents[0].parts[0].text.as_ref().unwrap();
        assert!(persona_text.ends_with("Kayfiyat: Qayg'u"));
    }

    #[test]
    fn attachment_call_is_a_single_turn_without_persona() {
        let mut request = text_request("Bu rasmda nima bor?");
        request.attachment = Some(Attachment {
            data: "QUJD".to_string(),
            mime_type: "image/png".to_string(),
        });
        let (model, body) = shape_call(&persona(), &request);

        assert_eq!(model, "gemini-3-pro-preview");
        assert_eq!(body.contents.len(), 1);
        let parts = &body.contents[0].parts;
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, "QUJD");
        assert_eq!(parts[1].text.as_deref(), Some("Bu rasmda nima bor?"));
        // Reasoning branch: thinking budget on, default temperature.
        let config = &body.generation_config;
        assert_eq!(config.temperature, 0.7);
        assert_eq!(
            config.thinking_config.as_ref().unwrap().thinking_budget,
            12000
        );
    }

    #[test]
    fn attachment_without_prompt_gets_the_analysis_request() {
        let mut request = text_request("");
        request.attachment = Some(Attachment {
            data: "QUJD".to_string(),
            mime_type: "image/jpeg".to_string(),
        });
        let (_, body) = shape_call(&persona(), &request);
        assert_eq!(
            body.contents[0].parts[1].text.as_deref(),
            Some("Ushbu rasmni tahlil qiling.")
        );
    }

    #[test]
    fn image_gen_call_sets_aspect_ratio_and_image_model() {
        let request = text_request("She'rning rasmini yarat");
        let (model, body) = shape_call(&persona(), &request);
        assert_eq!(model, "gemini-2.5-flash-image");
        assert_eq!(
            body.generation_config
                .image_config
                .as_ref()
                .unwrap()
                .aspect_ratio,
            "1:1"
        );
        assert_eq!(body.generation_config.temperature, 0.9);
        assert!(body.tools.is_none());
    }

    #[test]
    fn news_call_attaches_web_search_tool() {
        let request = text_request("Adabiyot olamidagi oxirgi yangiliklarni aytib bering");
        let (model, body) = shape_call(&persona(), &request);
        assert_eq!(model, "gemini-3-flash-preview");
        let tools = body.tools.unwrap();
        let value = serde_json::to_value(&tools).unwrap();
        assert_eq!(value, serde_json::json!([{ "googleSearch": {} }]));
    }

    #[test]
    fn location_call_passes_retrieval_bias() {
        let mut request = text_request("Yaqin atrofdagi muzey va kutubxonalarni xaritada ko'rsat");
        request.location = Some(Location {
            latitude: 41.3,
            longitude: 69.28,
        });
        let (model, body) = shape_call(&persona(), &request);
        assert_eq!(model, "gemini-2.5-flash");
        let value = serde_json::to_value(body.tools.as_ref().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([{ "googleMaps": {} }]));
        let config = body.tool_config.unwrap();
        assert_eq!(config.retrieval_config.lat_lng.latitude, 41.3);
    }

    #[test]
    fn parse_response_concatenates_text_parts() {
        let response = serde_json::from_value::<wire::GenerateContentResponse>(serde_json::json!({
            "candidates": [{
                "content": { "parts": [ { "text": "Bir " }, { "text": "ikki" } ] }
            }]
        }))
        .unwrap();
        let result = parse_response(response);
        assert_eq!(result.text, "Bir ikki");
        assert_eq!(result.image_url, None);
        assert_eq!(result.grounding_sources, None);
    }

    #[test]
    fn parse_response_builds_data_uri_and_image_only_text() {
        let response = serde_json::from_value::<wire::GenerateContentResponse>(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "QUJD" } }
                ] }
            }]
        }))
        .unwrap();
        let result = parse_response(response);
        assert_eq!(result.text, "Tasvir yaratildi.");
        assert_eq!(
            result.image_url.as_deref(),
            Some("data:image/png;base64,QUJD")
        );
    }

    #[test]
    fn parse_response_collects_web_and_maps_chunks_in_order() {
        let response = serde_json::from_value::<wire::GenerateContentResponse>(serde_json::json!({
            "candidates": [{
                "content": { "parts": [ { "text": "Mana" } ] },
                "groundingMetadata": { "groundingChunks": [
                    { "maps": { "title": "Muzey", "uri": "https://maps.example/1" } },
                    { "web": { "title": "Sayt", "uri": "https://example.uz" } }
                ] }
            }]
        }))
        .unwrap();
        let result = parse_response(response);
        let sources = result.grounding_sources.unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].title, "Muzey");
        assert_eq!(sources[1].title, "Sayt");
    }

    #[test]
    fn parse_empty_response_yields_placeholder_text() {
        let response: wire::GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let result = parse_response(response);
        assert_eq!(result.text, "Javob olib bo'lmadi.");
    }

    #[tokio::test]
    async fn unreachable_backend_yields_fallback_result() {
        let provider = GeminiProvider::new(
            "http://127.0.0.1:1/v1beta".to_string(),
            "test-key".to_string(),
        );
        let result = provider.generate(&text_request("Salom")).await;
        assert_eq!(result, GenerationResult::fallback());
        assert_eq!(result.text, "Texnik xatolik yuz berdi. Qayta urinib ko'ring.");
    }
}
