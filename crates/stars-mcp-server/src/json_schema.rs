/// Macro to generate the JSON schema of a tool input type
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        // Draft-07 is the newest draft every MCP client we target understands
        let settings = schemars::generate::SchemaSettings::draft07();
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<$type>();
        match serde_json::to_value(schema) {
            Ok(serde_json::Value::Object(schema)) => schema,
            _ => serde_json::Map::new(),
        }
    }};
}

#[cfg(test)]
mod tests {
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(JsonSchema, Deserialize)]
    struct UsernameInput {
        /// GitHub username
        #[allow(dead_code)]
        username: String,
    }

    #[test]
    fn schema_from_type() {
        let schema = schema_from_type!(UsernameInput);

        assert_eq!(
            serde_json::Value::Object(schema),
            serde_json::json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "UsernameInput",
                "type": "object",
                "properties": {
                    "username": {
                        "description": "GitHub username",
                        "type": "string"
                    }
                },
                "required": ["username"]
            })
        );
    }
}
