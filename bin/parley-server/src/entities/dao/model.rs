use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named preset of base model, system prompt and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    /// Upstream model identifier, e.g. `"gpt-4o-mini"`.
    pub base_model: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    /// The single entry served while no model list has been saved.
    fn default() -> Self {
        Self {
            id: "1".into(),
            name: "Default Model".into(),
            base_model: "gpt-4o-mini".into(),
            system_prompt: "You are a helpful assistant.".into(),
            temperature: 0.7,
            max_tokens: 512,
        }
    }
}

/// Collapse repeated ids: a later entry replaces the earlier one in place.
pub fn dedupe_last_wins(models: Vec<ModelConfig>) -> Vec<ModelConfig> {
    let mut out: Vec<ModelConfig> = Vec::with_capacity(models.len());
    for model in models {
        match out.iter_mut().find(|m| m.id == model.id) {
            Some(slot) => *slot = model,
            None => out.push(model),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn model(id: &str, name: &str) -> ModelConfig {
        ModelConfig {
            id: id.into(),
            name: name.into(),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let v = serde_json::to_value(ModelConfig::default()).unwrap();
        assert_eq!(v["baseModel"], "gpt-4o-mini");
        assert_eq!(v["systemPrompt"], "You are a helpful assistant.");
        assert_eq!(v["maxTokens"], 512);
        assert_eq!(v["temperature"], 0.7);
    }

    #[test]
    fn dedupe_keeps_first_position_with_last_value() {
        let out = dedupe_last_wins(vec![model("a", "one"), model("b", "two"), model("a", "three")]);
        let names: Vec<_> = out.iter().map(|m| (m.id.as_str(), m.name.as_str())).collect();
        assert_eq!(names, vec![("a", "three"), ("b", "two")]);
    }
}
