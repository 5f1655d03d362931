//! Prompt templates for agronomic recommendations.

use crate::data::{SoilData, WeatherData};

/// Persona sent ahead of every recommendation request.
pub const SYSTEM_PROMPT: &str =
    "You are an expert agronomist. Provide concise, practical farming advice.";

/// Renders the user prompt for one soil/weather pair.
///
/// The pH and temperature are called out explicitly; the full mappings,
/// including every extra reading, follow as JSON.
pub fn generate_user_prompt(
    soil: &SoilData,
    weather: &WeatherData,
    sentence_limit: Option<u32>,
) -> String {
    let instruction = match sentence_limit {
        Some(limit) => format!(
            "Provide clear recommendations in {limit} sentences or fewer for:"
        ),
        None => "Provide specific recommendations for:".to_string(),
    };

    format!(
        r#"**Agricultural Recommendation Request**
Soil pH: {ph}
Temperature: {temperature}°C
Additional soil data: {soil_json}
Additional weather data: {weather_json}

{instruction}
1. Suitable crops
2. Soil amendments
3. Irrigation advice
4. Potential pest risks"#,
        ph = display_value(soil.ph()),
        temperature = display_value(weather.temperature()),
        soil_json = soil.to_json(),
        weather_json = weather.to_json(),
    )
}

/// Strings print bare; everything else prints as JSON.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
