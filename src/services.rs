use crate::config::{Config, UNCONFIGURED_MAPS_KEY};
use crate::errors::AppError;
use crate::json_extract::first_json_object;
use crate::models::{Coordinate, ExtractedRoute, PlaceResult, TravelMetrics};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout for the structured-extraction call.
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for the itinerary-synthesis call.
const SYNTHESIZE_TIMEOUT: Duration = Duration::from_secs(120);
/// Timeout for every mapping-service call.
const MAPS_TIMEOUT: Duration = Duration::from_secs(10);

/// Nearby-search radius in meters.
const PLACES_RADIUS_M: u32 = 5000;
/// Maximum places kept per category.
const PLACES_LIMIT: usize = 5;

const EXTRACTION_PROMPT: &str = r#"Extract only the source (starting city) and destination (target city) from the following unstructured travel query.
If a source or destination cannot be confidently identified as a city, return an empty string for that field.

Return your response in the following JSON format:
{
  "source": "...",
  "destination": "..."
}

Here is the user's input:
"#;

/// Client for the language-model service (Gemini generateContent wire
/// format). Used twice per request: structured route extraction and
/// itinerary synthesis.
pub struct GeminiService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.gemini_base_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    /// Send one prompt and return the model's reply text.
    ///
    /// The reply is read from the fixed response path
    /// `candidates[0].content.parts[0].text`.
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned status {}: {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Gemini response: {}", e))
        })?;

        body.get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(String::from)
            .ok_or_else(|| {
                AppError::ExternalApiError("Gemini response missing reply text".to_string())
            })
    }

    /// Extract a source/destination pair from a free-text travel request.
    ///
    /// The reply is scanned for its first balanced JSON object; missing keys
    /// decode as empty fields, which the planner treats as unresolved. Both
    /// fields are trimmed.
    pub async fn extract_route(&self, user_text: &str) -> Result<ExtractedRoute, AppError> {
        let prompt = format!("{}\n{}", EXTRACTION_PROMPT, user_text);

        tracing::info!("Extracting route from user request");
        let reply = self.generate(&prompt, EXTRACT_TIMEOUT).await?;

        let object = first_json_object(&reply).ok_or_else(|| {
            AppError::ExternalApiError("Gemini reply contains no JSON object".to_string())
        })?;

        let route: ExtractedRoute = serde_json::from_str(object).map_err(|e| {
            AppError::ExternalApiError(format!("Failed to decode extracted route: {}", e))
        })?;

        let route = ExtractedRoute {
            source: route.source.trim().to_string(),
            destination: route.destination.trim().to_string(),
        };

        tracing::info!(
            "Extracted route: source='{}', destination='{}'",
            route.source,
            route.destination
        );
        Ok(route)
    }

    /// Compose the itinerary prompt from everything the pipeline gathered
    /// and ask the model for a Markdown itinerary.
    pub async fn generate_itinerary(
        &self,
        user_input: &str,
        travel_data: &str,
        places_info: &str,
        source: &str,
        destination: &str,
    ) -> Result<String, AppError> {
        let prompt = format!(
            r#"User Request: """{user_input}"""
Travel Info: {travel_data}
Destination Details: {places_info}

You are a travel expert AI. Generate a detailed itinerary for a trip from {source} to {destination}.
Include:
1. Best mode of travel.
2. Accommodation suggestions from the provided details.
3. Daily itinerary with specific activities and meal recommendations.
4. Approximate budget breakdown.
5. Practical travel tips.

Use Markdown for formatting.
"#
        );

        tracing::info!(
            "Generating itinerary for {} -> {} ({} chars of context)",
            source,
            destination,
            prompt.len()
        );
        self.generate(&prompt, SYNTHESIZE_TIMEOUT).await
    }
}

/// Labeled place sections for one city, plus the degradation reasons
/// collected while building them.
#[derive(Debug)]
pub struct CityPlaces {
    pub text: String,
    pub degradations: Vec<String>,
}

/// Client for the mapping service: geocoding, nearby places, and
/// distance-matrix lookups.
pub struct MapsService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MapsService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.maps_base_url.clone(),
            api_key: config.maps_api_key.clone(),
        }
    }

    fn configured(&self) -> bool {
        self.api_key != UNCONFIGURED_MAPS_KEY
    }

    /// Resolve a free-text city name to a coordinate pair.
    ///
    /// Returns `Ok(None)` without a network call when the city is empty or a
    /// placeholder, or when no maps key is configured; and `Ok(None)` when
    /// the service reports a non-OK status or no results.
    pub async fn geocode(&self, city: &str) -> Result<Option<Coordinate>, AppError> {
        if city.is_empty() || city == UNCONFIGURED_MAPS_KEY {
            return Ok(None);
        }
        if !self.configured() {
            tracing::warn!("Maps API key not configured; skipping geocoding for '{}'", city);
            return Ok(None);
        }

        let url = reqwest::Url::parse_with_params(
            &format!("{}/maps/api/geocode/json", self.base_url),
            &[("address", city), ("key", self.api_key.as_str())],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Geocoding city: {}", city);

        let response = self
            .client
            .get(url)
            .timeout(MAPS_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Geocoding returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse geocoding response: {}", e))
        })?;

        if body.get("status").and_then(|s| s.as_str()) != Some("OK") {
            tracing::warn!(
                "Geocoding status not OK for '{}': {:?}",
                city,
                body.get("status")
            );
            return Ok(None);
        }

        let location = body
            .get("results")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("geometry"))
            .and_then(|g| g.get("location"));

        let coordinate = match location {
            Some(loc) => {
                let latitude = loc.get("lat").and_then(|v| v.as_f64());
                let longitude = loc.get("lng").and_then(|v| v.as_f64());
                match (latitude, longitude) {
                    (Some(latitude), Some(longitude)) => Some(Coordinate {
                        latitude,
                        longitude,
                    }),
                    _ => None,
                }
            }
            None => None,
        };

        if coordinate.is_none() {
            tracing::warn!("Geocoding returned no usable result for '{}'", city);
        }
        Ok(coordinate)
    }

    /// Fetch up to five nearby places of one category, in the mapping
    /// service's own ranking order.
    pub async fn nearby_places(
        &self,
        location: &Coordinate,
        category: &str,
    ) -> Result<Vec<PlaceResult>, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/maps/api/place/nearbysearch/json", self.base_url),
            &[
                ("location", location.to_string().as_str()),
                ("radius", PLACES_RADIUS_M.to_string().as_str()),
                ("type", category),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Fetching nearby '{}' places at {}", category, location);

        let response = self
            .client
            .get(url)
            .timeout(MAPS_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Places request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Places returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse places response: {}", e))
        })?;

        let places = body
            .get("results")
            .and_then(|r| r.as_array())
            .map(|results| {
                results
                    .iter()
                    .take(PLACES_LIMIT)
                    .map(|p| PlaceResult {
                        name: p
                            .get("name")
                            .and_then(|v| v.as_str())
                            .unwrap_or("Unknown")
                            .to_string(),
                        rating: p.get("rating").and_then(|v| v.as_f64()),
                        vicinity: p
                            .get("vicinity")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(places)
    }

    /// Fetch distance and duration between two free-text locations.
    ///
    /// Any missing data or non-OK element status is an error; the planner
    /// degrades it to the fixed travel fallback text.
    pub async fn travel_info(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<TravelMetrics, AppError> {
        if !self.configured() {
            return Err(AppError::ExternalApiError(
                "Maps API key not configured".to_string(),
            ));
        }

        let url = reqwest::Url::parse_with_params(
            &format!("{}/maps/api/distancematrix/json", self.base_url),
            &[
                ("origins", source),
                ("destinations", destination),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("Fetching travel metrics: {} -> {}", source, destination);

        let response = self
            .client
            .get(url)
            .timeout(MAPS_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Distance matrix request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Distance matrix returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse distance matrix response: {}", e))
        })?;

        let element = body
            .get("rows")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("elements"))
            .and_then(|e| e.get(0))
            .ok_or_else(|| {
                AppError::ExternalApiError("Distance matrix response missing element".to_string())
            })?;

        if element.get("status").and_then(|s| s.as_str()) != Some("OK") {
            return Err(AppError::ExternalApiError(format!(
                "Distance matrix element status not OK: {:?}",
                element.get("status")
            )));
        }

        let distance_text = element
            .get("distance")
            .and_then(|d| d.get("text"))
            .and_then(|t| t.as_str());
        let duration_text = element
            .get("duration")
            .and_then(|d| d.get("text"))
            .and_then(|t| t.as_str());

        match (distance_text, duration_text) {
            (Some(distance_text), Some(duration_text)) => Ok(TravelMetrics {
                distance_text: distance_text.to_string(),
                duration_text: duration_text.to_string(),
            }),
            _ => Err(AppError::ExternalApiError(
                "Distance matrix element missing distance/duration".to_string(),
            )),
        }
    }

    /// Build the labeled place sections for a destination city.
    ///
    /// No coordinate (including geocoding failure) yields the single
    /// "No location found" line and issues zero places calls. A failed
    /// category degrades to an empty section and records its reason.
    pub async fn city_places(&self, city: &str) -> CityPlaces {
        let mut degradations = Vec::new();

        let coordinate = match self.geocode(city).await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                tracing::warn!("Geocoding failed for '{}': {}", city, e);
                degradations.push(format!("geocoding failed for '{}': {}", city, e));
                None
            }
        };

        let location = match coordinate {
            Some(location) => location,
            None => {
                return CityPlaces {
                    text: format!("No location found for {}.", city),
                    degradations,
                }
            }
        };

        let sections = [
            (format!("📍 Attractions in {}:", city), "tourist_attraction"),
            ("🏨 Hotels:".to_string(), "lodging"),
            ("🍽️ Restaurants:".to_string(), "restaurant"),
        ];

        let mut out = Vec::new();
        for (label, category) in &sections {
            out.push(format!("\n{}", label));
            match self.nearby_places(&location, category).await {
                Ok(places) => {
                    for place in places {
                        out.push(place.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!("Places lookup failed for '{}': {}", category, e);
                    degradations.push(format!("places lookup failed for '{}': {}", category, e));
                }
            }
        }

        CityPlaces {
            text: out.join("\n"),
            degradations,
        }
    }
}
