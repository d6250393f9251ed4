//! translate_text: one-shot translation through the language model.

use serde_json::{json, Value};

use super::{error_payload, str_field, ToolService};

pub fn translation_prompt(text: &str, target_lang: &str) -> String {
    format!(
        "Translate the following text into '{target_lang}'. \
         Return ONLY the translated text. \
         Do NOT explain. Do NOT provide alternatives.\n\n{text}"
    )
}

impl ToolService {
    pub async fn translate_text(&self, args: &Value) -> Value {
        let (Some(text), Some(target)) = (str_field(args, "text"), str_field(args, "target_lang")) else {
            return error_payload("Both 'text' and 'target_lang' are required");
        };
        match self.translator.complete(&translation_prompt(text, target)).await {
            Ok(translated) => json!({ "translated_text": translated.trim() }),
            Err(e) => error_payload(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::MockModel;
    use crate::agent::model::ModelError;
    use crate::config::ToolServiceConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn translation_is_trimmed() {
        let model = Arc::new(MockModel::new());
        model.push_completion(Ok("  hola \n".into()));
        let svc = ToolService::new(ToolServiceConfig::default(), model.clone()).unwrap();
        let out = svc.translate_text(&json!({"text": "hello", "target_lang": "es"})).await;
        assert_eq!(out, json!({"translated_text": "hola"}));
        assert_eq!(model.complete_prompts(), vec![translation_prompt("hello", "es")]);
    }

    #[tokio::test]
    async fn model_errors_and_missing_fields() {
        let model = Arc::new(MockModel::new());
        model.push_completion(Err(ModelError::Request("quota exceeded".into())));
        let svc = ToolService::new(ToolServiceConfig::default(), model).unwrap();
        assert_eq!(
            svc.translate_text(&json!({"text": "hello"})).await,
            json!({"error": "Both 'text' and 'target_lang' are required"})
        );
        let out = svc.translate_text(&json!({"text": "hello", "target_lang": "es"})).await;
        assert_eq!(out, json!({"error": "model request failed: quota exceeded"}));
    }

    #[test]
    fn prompt_names_the_target() {
        let p = translation_prompt("Blue Star Donuts", "hindi");
        assert!(p.starts_with("Translate the following text into 'hindi'."));
        assert!(p.ends_with("\n\nBlue Star Donuts"));
    }
}
