use serde::Serialize;

/// Reply text plus optional suggested answers for channels that can render them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions<I, S>(text: impl Into<String>, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            suggestions: suggestions.into_iter().map(Into::into).collect(),
        }
    }
}
