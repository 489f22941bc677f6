//! Prompt construction for the location-advice assistant.
//!
//! The prompt embeds the analysis result so the model answers from measured
//! data instead of inventing numbers. Analysis data arrives as loosely-typed
//! JSON because it is the composed API response, not an internal type.

use serde_json::Value;

/// System message sent with every completion request.
pub const SYSTEM_INSTRUCTIONS: &str =
    "You are Hotspot IQ, a helpful location intelligence advisor.";

/// Builds the user prompt from the analysis payload and the user's question.
#[must_use]
pub fn generate_context_prompt(location_data: &Value, user_question: &str) -> String {
    let lat = field(location_data, &["lat"]);
    let lng = field(location_data, &["lng"]);
    let address = field(location_data, &["address", "formatted_address"]);
    let business_type = field_or(location_data, &["business_type"], "Not specified");
    let score = field_or(location_data, &["opportunity_score"], "N/A");
    let category = field_or(location_data, &["interpretation", "category"], "N/A");
    let footfall = field_or(location_data, &["footfall_proxy"], "N/A");
    let competitor_count = field_or(location_data, &["competitors", "count"], "0");
    let landmarks = format_landmarks(location_data.pointer("/landmarks/by_category"));

    format!(
        "You are Hotspot IQ, an expert location intelligence advisor for businesses in India.\n\n\
         LOCATION DATA:\n\
         - Coordinates: {lat}, {lng}\n\
         - Address: {address}\n\
         - Business Type: {business_type}\n\n\
         ANALYSIS RESULTS:\n\
         - Opportunity Score: {score}/100\n\
         - Score Category: {category}\n\
         - Footfall Level: {footfall}\n\
         - Competitor Count: {competitor_count} nearby\n\n\
         LANDMARKS NEARBY:\n\
         {landmarks}\n\n\
         USER QUESTION: {user_question}\n\n\
         Please provide a helpful, actionable response based on this data. \
         Be specific and use the numbers provided.\n\
         Keep your response concise (2-3 paragraphs max) and practical for a business owner."
    )
}

/// Renders the landmark category counts as a bullet list.
fn format_landmarks(by_category: Option<&Value>) -> String {
    let Some(Value::Object(map)) = by_category else {
        return "No landmark data available".to_owned();
    };
    if map.is_empty() {
        return "No landmark data available".to_owned();
    }

    let lines: Vec<String> = map
        .iter()
        .map(|(category, count)| {
            let readable = category
                .split('_')
                .map(capitalise)
                .collect::<Vec<_>>()
                .join(" ");
            format!("- {readable}: {}", render(count))
        })
        .collect();

    if lines.is_empty() {
        "No landmarks detected".to_owned()
    } else {
        lines.join("\n")
    }
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

fn field(data: &Value, path: &[&str]) -> String {
    field_or(data, path, "N/A")
}

fn field_or(data: &Value, path: &[&str], default: &str) -> String {
    let mut current = data;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return default.to_owned(),
        }
    }
    if current.is_null() {
        return default.to_owned();
    }
    render(current)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_includes_analysis_numbers() {
        let data = json!({
            "lat": 12.9716,
            "lng": 77.5946,
            "address": { "formatted_address": "Indiranagar, Bengaluru" },
            "business_type": "cafe",
            "opportunity_score": 72,
            "interpretation": { "category": "Prime Opportunity Zone" },
            "footfall_proxy": "high",
            "competitors": { "count": 4 },
            "landmarks": { "by_category": { "metro_station": 1, "mall": 2 } }
        });

        let prompt = generate_context_prompt(&data, "Is this good for a cafe?");
        assert!(prompt.contains("Coordinates: 12.9716, 77.5946"));
        assert!(prompt.contains("Opportunity Score: 72/100"));
        assert!(prompt.contains("- Metro Station: 1"));
        assert!(prompt.contains("- Mall: 2"));
        assert!(prompt.contains("USER QUESTION: Is this good for a cafe?"));
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let prompt = generate_context_prompt(&json!({}), "hello");
        assert!(prompt.contains("Coordinates: N/A, N/A"));
        assert!(prompt.contains("Business Type: Not specified"));
        assert!(prompt.contains("No landmark data available"));
    }
}
