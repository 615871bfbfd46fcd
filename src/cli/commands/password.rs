use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::{utils, OutputFormat};

pub fn hash(password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = hash_password(password)?;

    match output_format {
        OutputFormat::Json => utils::output_success(output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
