//! Static tool catalog handed to the language model.

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use lazy_static::lazy_static;
use serde_json::{json, Map, Value};

pub const GEOCODE_LOCATION: &str = "geocode_location";
pub const GET_WEATHER: &str = "get_weather";
pub const SEARCH_PLACES: &str = "search_places";
pub const TRANSLATE_TEXT: &str = "translate_text";

/// JSON Schema のプリミティブ型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: Option<&'static str>,
    pub required: bool,
}

/// パラメータ定義（宣言順を保持）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    params: Vec<ParamSpec>,
}

impl ParameterSchema {
    /// 空のオブジェクトスキーマから組み立てを開始
    pub fn object() -> Self {
        Self::default()
    }

    pub fn add_string(self, name: &'static str, description: Option<&'static str>) -> Self {
        self.add(name, ParamType::String, description)
    }

    pub fn add(mut self, name: &'static str, param_type: ParamType, description: Option<&'static str>) -> Self {
        self.params.push(ParamSpec { name, param_type, description, required: false });
        self
    }

    /// Mark an already added parameter as required.
    pub fn required(mut self, name: &'static str) -> Self {
        if let Some(p) = self.params.iter_mut().find(|p| p.name == name) {
            p.required = true;
        }
        self
    }

    /// `{"type":"object","properties":{..},"required":[..]}`
    pub fn as_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::from(p.param_type.as_str()));
            if let Some(d) = p.description {
                prop.insert("description".into(), Value::from(d));
            }
            properties.insert(p.name.to_string(), Value::Object(prop));
        }
        let required: Vec<&str> = self.params.iter().filter(|p| p.required).map(|p| p.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Required fields must be present and every known field must carry its declared type.
    /// Unknown fields are left for the tool to judge.
    pub fn check(&self, arguments: &Map<String, Value>) -> Result<(), String> {
        for p in &self.params {
            match arguments.get(p.name) {
                None | Some(Value::Null) if p.required => {
                    return Err(format!("missing required field '{}'", p.name));
                }
                Some(v) if !v.is_null() && !p.param_type.accepts(v) => {
                    return Err(format!("field '{}' must be a {}", p.name, p.param_type.as_str()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// モデルに渡すツール宣言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: ParameterSchema,
}

impl ToolSpec {
    pub fn new(name: &'static str, description: &'static str, parameters: ParameterSchema) -> Self {
        Self { name, description, parameters }
    }

    /// OpenAI SDK の `FunctionObject` に変換
    pub fn function_object(&self) -> FunctionObject {
        FunctionObject {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            parameters: Some(self.parameters.as_json_schema()),
            strict: Some(false),
        }
    }

    /// ChatCompletionTool 形式（APIへ渡す vector 用）
    pub fn as_chat_tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: self.function_object(),
        }
    }
}

lazy_static! {
    static ref TOOL_CATALOG: Vec<ToolSpec> = build_catalog();
}

fn build_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            GEOCODE_LOCATION,
            "Get coordinates for a place.",
            ParameterSchema::object()
                .add_string("location", Some("Place name, address or landmark"))
                .required("location"),
        ),
        ToolSpec::new(
            GET_WEATHER,
            "Fetch weather for a location.",
            ParameterSchema::object()
                .add_string("location", Some("City or place to report the current weather for"))
                .required("location"),
        ),
        ToolSpec::new(
            SEARCH_PLACES,
            "Search for businesses at a location.",
            ParameterSchema::object()
                .add_string("query", Some("Kind of business, e.g. coffee"))
                .add_string("location", Some("Where to search"))
                .required("query")
                .required("location"),
        ),
        ToolSpec::new(
            TRANSLATE_TEXT,
            "Translate text into another language.",
            ParameterSchema::object()
                .add_string("text", Some("Text to translate"))
                .add_string("target_lang", Some("Target language name or code"))
                .required("text")
                .required("target_lang"),
        ),
    ]
}

/// The tool catalog, in a fixed order.
pub fn list_tools() -> &'static [ToolSpec] {
    &TOOL_CATALOG
}

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    list_tools().iter().find(|t| t.name == name)
}
