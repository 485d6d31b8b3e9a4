//! Show the legacy token rewrite.

use anyhow::Result;
use clap::Args;
use std::path::Path;

use super::common::{is_stdin, read_source};
use crate::templating::{contains_template_syntax, transform};

/// Rewrite legacy `%token%` syntax and print the result.
#[derive(Args, Debug)]
pub struct TransformCommand {
    /// Template text; `-` reads stdin
    text: String,
}

impl TransformCommand {
    pub async fn execute(self) -> Result<()> {
        let text = if is_stdin(Path::new(&self.text)) {
            read_source(Path::new(&self.text)).await?
        } else {
            self.text
        };

        if !contains_template_syntax(&text) {
            tracing::debug!("Input has no template syntax");
        }
        println!("{}", transform(&text));
        Ok(())
    }
}
