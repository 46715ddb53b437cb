//! The per-request planning pipeline.
//!
//! Sequences the route extraction, enrichment, and synthesis stages:
//! `Received → Extracting → {Unresolved | Enriching} → Synthesizing →
//! Completed`. Every stage failure is absorbed into a fixed fallback text so
//! the pipeline always completes with exactly one response string; the
//! outcome additionally records which stages degraded so logs can tell a
//! real answer from substituted fallback text.

use crate::config::Config;
use crate::services::{GeminiService, MapsService};

/// Response when extraction cannot identify both endpoints.
pub const CLARIFICATION_MESSAGE: &str = "❌ I couldn't recognize your source or destination. Please specify them clearly (e.g., 'Plan a trip from New York to London').";

/// Substituted for the travel-metrics section when the lookup fails.
pub const TRAVEL_FALLBACK: &str = "No travel data available.";

/// Returned when itinerary synthesis itself fails.
pub const ITINERARY_FALLBACK: &str =
    "❌ Failed to generate itinerary. Please check your API keys.";

/// Terminal result of one pipeline run.
#[derive(Debug)]
pub struct PlanOutcome {
    /// The text returned to the user and persisted as the chat response.
    pub response: String,
    /// False when the run short-circuited to the clarification message.
    pub resolved: bool,
    /// Reasons for every fallback substitution made along the way. Empty
    /// means the response is built entirely from fresh upstream data.
    pub degradations: Vec<String>,
}

impl PlanOutcome {
    fn unresolved(degradations: Vec<String>) -> Self {
        Self {
            response: CLARIFICATION_MESSAGE.to_string(),
            resolved: false,
            degradations,
        }
    }
}

/// Run the full planning pipeline for one chat message.
///
/// Never fails: upstream errors degrade to fallback text and are recorded in
/// the outcome. The caller persists the response exactly once whatever
/// happened here.
pub async fn plan_trip(config: &Config, user_input: &str) -> PlanOutcome {
    let gemini = GeminiService::new(config);
    let maps = MapsService::new(config);
    let mut degradations = Vec::new();

    // Stage 1: extract the route from the raw request.
    tracing::info!("Stage 1: Extracting route");
    let route = match gemini.extract_route(user_input).await {
        Ok(route) => route,
        Err(e) => {
            // An extraction failure is indistinguishable from an
            // unidentifiable route as far as the user is concerned, but the
            // outcome records which one happened.
            tracing::warn!("Route extraction failed: {}", e);
            degradations.push(format!("route extraction failed: {}", e));
            return PlanOutcome::unresolved(degradations);
        }
    };

    if !route.is_resolved() {
        tracing::info!("Route unresolved; asking the user to clarify");
        return PlanOutcome::unresolved(degradations);
    }

    // Stage 2: enrich with travel metrics and destination places,
    // strictly sequentially. Each lookup degrades on its own.
    tracing::info!(
        "Stage 2: Enriching {} -> {}",
        route.source,
        route.destination
    );
    let travel_data = match maps.travel_info(&route.source, &route.destination).await {
        Ok(metrics) => metrics.to_string(),
        Err(e) => {
            tracing::warn!("Travel metrics unavailable: {}", e);
            degradations.push(format!("travel metrics unavailable: {}", e));
            TRAVEL_FALLBACK.to_string()
        }
    };

    let places = maps.city_places(&route.destination).await;
    degradations.extend(places.degradations);

    // Stage 3: synthesize the itinerary from everything gathered.
    tracing::info!("Stage 3: Synthesizing itinerary");
    let response = match gemini
        .generate_itinerary(
            user_input,
            &travel_data,
            &places.text,
            &route.source,
            &route.destination,
        )
        .await
    {
        Ok(itinerary) => itinerary,
        Err(e) => {
            tracing::error!("Itinerary synthesis failed: {}", e);
            degradations.push(format!("itinerary synthesis failed: {}", e));
            ITINERARY_FALLBACK.to_string()
        }
    };

    tracing::info!(
        "Pipeline completed ({} degradation(s))",
        degradations.len()
    );
    PlanOutcome {
        response,
        resolved: true,
        degradations,
    }
}
