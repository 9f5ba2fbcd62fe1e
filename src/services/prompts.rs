use crate::types::SuggestionTask;

/// JSON schema of a single task, embedded in prompts so the model knows the exact shape.
pub fn task_schema_json() -> String {
    let schema = schemars::schema_for!(SuggestionTask);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Generic travel-assistant framing applied to every text generation
pub fn wrap_travel_prompt(prompt: &str, context: Option<&str>) -> String {
    let context_line = match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("Context: {}", context),
        None => String::new(),
    };

    format!(
        "You are a helpful travel assistant. {}\n\nUser question: {}\n\nPlease provide helpful, accurate travel information. If asked about hotels, destinations, or travel planning, give specific and useful advice. Format your response in a clear, conversational way.",
        context_line, prompt
    )
}

/// Build the instruction prompt that asks for a RESPONSE section and a TASKS array
pub fn assistant_prompt(query: &str) -> String {
    format!(
        r#"You are a comprehensive travel planning assistant. When users ask about travel plans, destinations, or trip preparation, provide helpful information AND automatically generate actionable tasks they should complete.

User query: {query}

Please provide a helpful response and then extract any actionable tasks from your advice.

IMPORTANT: Always generate relevant tasks when users mention:
- Wanting to visit a destination
- Planning a trip
- Asking about travel requirements
- Needing help with bookings
- Asking about activities or attractions

Format your response EXACTLY like this:

RESPONSE:
[Your helpful travel advice here - be comprehensive and detailed. DO NOT mention tasks or JSON in this section. Just provide natural travel advice.]

TASKS:
[
  {{
    "title": "Task title",
    "description": "Detailed description of what needs to be done",
    "category": "preparation|booking|transportation|activities|documents",
    "priority": "high|medium|low",
    "suggestedDueDate": "YYYY-MM-DD or relative like '+30 days'",
    "estimatedCost": "Optional cost estimate like '$200-300'",
    "tips": "Additional helpful tips for completing this task"
  }}
]

Each element of the TASKS array must conform to this JSON schema:
{schema}

IMPORTANT: The RESPONSE section should be natural travel advice without mentioning tasks. The TASKS section should be separate and properly formatted JSON.

Examples of tasks to generate:
- For visa requirements: "Apply for tourist visa"
- For flights: "Book round-trip flights"
- For hotels: "Reserve accommodation"
- For activities: "Book [specific activity]"
- For preparation: "Get travel insurance", "Exchange currency", "Pack essentials"
- For documents: "Check passport validity", "Get travel vaccinations"

If the user mentions a specific destination, create destination-specific tasks."#,
        query = query,
        schema = task_schema_json(),
    )
}

/// Prompt sent alongside an uploaded image, with or without a user question
pub fn image_prompt(message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(message) => format!(
            "The user uploaded an image and asked: \"{}\". Please analyze this travel-related image and respond to their question. Also generate relevant travel tasks based on what you see and their question.\n\nRESPONSE:\n[Your analysis and response]\n\nTASKS:\n[Generate relevant tasks in JSON format based on the image and question]",
            message
        ),
        None => "Analyze this travel-related image. Identify the location if possible, describe what you see, and provide relevant travel information or recommendations.\n\nRESPONSE:\n[Your analysis]\n\nTASKS:\n[Generate relevant travel tasks based on what you see in the image, such as visiting this location, booking accommodations, or planning activities]".to_string(),
    }
}
