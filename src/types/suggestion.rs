use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Category a suggested task belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Preparation,
    Booking,
    Transportation,
    Activities,
    Documents,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 5] = [
        TaskCategory::Preparation,
        TaskCategory::Booking,
        TaskCategory::Transportation,
        TaskCategory::Activities,
        TaskCategory::Documents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Preparation => "preparation",
            TaskCategory::Booking => "booking",
            TaskCategory::Transportation => "transportation",
            TaskCategory::Activities => "activities",
            TaskCategory::Documents => "documents",
        }
    }

    /// Lenient conversion for model output: anything unrecognised becomes the default.
    pub fn coerce(raw: Option<&Value>) -> Self {
        raw.and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown task category `{}`", s))
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a suggested task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    pub fn coerce(raw: Option<&Value>) -> Self {
        raw.and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            _ => Err(format!("unknown task priority `{}`", s)),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One actionable step suggested to the traveller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionTask {
    /// Short, human-readable task title (e.g., "Book flights to Paris")
    pub title: String,
    /// Detailed description of what needs to be done
    pub description: String,
    /// One of: preparation, booking, transportation, activities, documents
    #[serde(default)]
    pub category: TaskCategory,
    /// One of: high, medium, low
    #[serde(default)]
    pub priority: TaskPriority,
    /// Either a relative offset like "+30 days" or an absolute YYYY-MM-DD date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_due_date: Option<String>,
    /// Free-form cost estimate such as "$200-300"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,
    /// Additional helpful tips for completing the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

impl SuggestionTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: TaskCategory::default(),
            priority: TaskPriority::default(),
            suggested_due_date: None,
            estimated_cost: None,
            tips: None,
        }
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, suggested_due_date: impl Into<String>) -> Self {
        self.suggested_due_date = Some(suggested_due_date.into());
        self
    }

    pub fn with_cost(mut self, estimated_cost: impl Into<String>) -> Self {
        self.estimated_cost = Some(estimated_cost.into());
        self
    }

    pub fn with_tips(mut self, tips: impl Into<String>) -> Self {
        self.tips = Some(tips.into());
        self
    }

    /// Build a task from one element of a model-produced JSON array.
    ///
    /// Returns `None` when the element is not an object or has no usable title.
    /// Every other field is coerced: unknown enum literals fall back to the
    /// defaults, numbers become strings, and a bare number of days becomes `"+N days"`.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let title = text_field(object.get("title"))?;
        let description = text_field(object.get("description")).unwrap_or_default();

        let suggested_due_date = match object.get("suggestedDueDate") {
            Some(Value::Number(days)) => Some(format!("+{} days", days)),
            other => text_field(other),
        };

        Some(Self {
            title,
            description,
            category: TaskCategory::coerce(object.get("category")),
            priority: TaskPriority::coerce(object.get("priority")),
            suggested_due_date,
            estimated_cost: text_field(object.get("estimatedCost")),
            tips: text_field(object.get("tips")),
        })
    }
}

fn text_field(raw: Option<&Value>) -> Option<String> {
    let text = match raw? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Prose for the chat window plus the tasks recovered from (or generated for) it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub narrative: String,
    pub tasks: Vec<SuggestionTask>,
}
