//! Canned responses used when no completion backend is configured or the
//! backend call fails. Keyword-routed so the answer stays relevant to the
//! question while only using locally computed numbers.

use serde_json::Value;

/// Generates a data-grounded response without calling the model.
#[must_use]
pub fn template_response(message: &str, analysis_data: Option<&Value>) -> String {
    let Some(data) = analysis_data else {
        return "Please select a location on the map first so I can analyze it for you."
            .to_owned();
    };

    let score = data
        .get("opportunity_score")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let category = data
        .pointer("/interpretation/category")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let competitors = data
        .pointer("/competitors/count")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let footfall = data
        .get("footfall_proxy")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let business_type = data
        .get("business_type")
        .and_then(Value::as_str)
        .unwrap_or("business");

    let message_lower = message.to_lowercase();

    if message_lower.contains("good") || message_lower.contains("suitable") {
        return if score >= 70 {
            format!(
                "Based on the data, this location shows **strong potential** for a \
                 {business_type}. With an Opportunity Score of {score}/100, you're looking at \
                 a prime location. There are {competitors} competitors nearby, and footfall \
                 appears to be {footfall}. I'd recommend moving quickly on this opportunity!"
            )
        } else if score >= 40 {
            format!(
                "This location has **moderate potential** for a {business_type}, scoring \
                 {score}/100. With {competitors} competitors in the area and {footfall} \
                 footfall, you'll need a strong differentiation strategy. Consider what unique \
                 value you can offer."
            )
        } else {
            format!(
                "This location shows some **challenges** for a {business_type}, with a score \
                 of {score}/100. High competition ({competitors} nearby) or low footfall \
                 ({footfall}) could make success difficult. I'd recommend exploring alternative \
                 locations."
            )
        };
    }

    if message_lower.contains("competition") || message_lower.contains("competitor") {
        let advice = if competitors > 5 {
            "This is a competitive area - differentiation will be key."
        } else {
            "Competition is manageable - focus on great service and location visibility."
        };
        return format!(
            "There are **{competitors} competitors** (similar {business_type}s) within 1km of \
             this location. {advice}"
        );
    }

    if message_lower.contains("landmark") || message_lower.contains("nearby") {
        if let Some(Value::Object(by_category)) = data.pointer("/landmarks/by_category") {
            let parts: Vec<String> = by_category
                .iter()
                .filter_map(|(cat, count)| {
                    let n = count.as_i64().unwrap_or(0);
                    (n > 0).then(|| format!("{n} {}s", cat.replace('_', " ")))
                })
                .collect();
            if !parts.is_empty() {
                return format!(
                    "Nearby landmarks include: **{}**. These contribute to the footfall and \
                     accessibility of your location.",
                    parts.join(", ")
                );
            }
        }
        return "I don't have detailed landmark data for this location yet.".to_owned();
    }

    format!(
        "This location has an Opportunity Score of **{score}/100** ({category}). There are \
         {competitors} competitors nearby and {footfall} footfall. What specific aspect would \
         you like me to analyze further?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis(score: i64, competitors: i64) -> Value {
        json!({
            "opportunity_score": score,
            "interpretation": { "category": "Moderate Opportunity" },
            "competitors": { "count": competitors },
            "footfall_proxy": "medium",
            "business_type": "cafe",
            "landmarks": { "by_category": { "metro_station": 1, "park": 0 } }
        })
    }

    #[test]
    fn no_analysis_asks_for_a_location() {
        let reply = template_response("is this good?", None);
        assert!(reply.contains("select a location"));
    }

    #[test]
    fn suitability_question_branches_on_score() {
        let strong = template_response("Is this good?", Some(&analysis(80, 3)));
        assert!(strong.contains("strong potential"));

        let moderate = template_response("Is this suitable?", Some(&analysis(55, 3)));
        assert!(moderate.contains("moderate potential"));

        let weak = template_response("Is this good?", Some(&analysis(20, 3)));
        assert!(weak.contains("challenges"));
    }

    #[test]
    fn competition_question_reports_count() {
        let reply = template_response("How is the competition?", Some(&analysis(60, 8)));
        assert!(reply.contains("**8 competitors**"));
        assert!(reply.contains("differentiation will be key"));
    }

    #[test]
    fn landmark_question_lists_nonzero_categories() {
        let reply = template_response("What landmarks are nearby?", Some(&analysis(60, 2)));
        assert!(reply.contains("1 metro stations"));
        assert!(!reply.contains("park"));
    }

    #[test]
    fn fallthrough_summarises_the_score() {
        let reply = template_response("Tell me more", Some(&analysis(60, 2)));
        assert!(reply.contains("**60/100**"));
        assert!(reply.contains("Moderate Opportunity"));
    }
}
