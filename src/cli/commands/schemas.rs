use std::sync::Arc;

use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::state::load_registry;

pub fn handle(config: Arc<AppConfig>, output_format: OutputFormat) -> anyhow::Result<()> {
    let registry = load_registry(&config)?;

    match output_format {
        OutputFormat::Json => {
            let schemas: Vec<_> = registry.iter().map(|s| s.as_ref()).collect();
            output_success(
                &output_format,
                &format!("{} content schemas", registry.len()),
                Some(json!(schemas)),
            )
        }
        OutputFormat::Text => {
            for schema in registry.iter() {
                println!("{} ({})", schema.content_key, schema.title);
                for field in &schema.fields {
                    match &field.placeholder {
                        Some(p) => println!("  {:<16} {:<9} {} [{}]", field.key, field.kind.as_str(), field.label, p),
                        None => println!("  {:<16} {:<9} {}", field.key, field.kind.as_str(), field.label),
                    }
                }
            }
            Ok(())
        }
    }
}
