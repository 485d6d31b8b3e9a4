//! Render stored templates or ad-hoc template text.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::common::{
    CommandContext, ensure_single_stdin, is_stdin, parse_name_file, read_data, read_source,
};
use crate::store::{TemplateLookup, TemplateStore};
use crate::templating::{PartialSet, RenderOptions};

/// Render a stored template.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template id or name; the first template when omitted
    template: Option<String>,

    /// JSON (or .yaml) file with the data model; `-` reads stdin
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Locale for helpers invoked without one, e.g. de-DE
    #[arg(short, long)]
    locale: Option<String>,

    /// Render this HTML body instead of the stored one
    #[arg(short, long)]
    body: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl RenderCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let lookup = self.template.as_deref().map_or(TemplateLookup::First, TemplateLookup::parse);
        ensure_single_stdin([("--body", self.body.as_deref()), ("--data", self.data.as_deref())])?;
        let data = read_data(self.data.as_deref()).await?;
        let body = match self.body.as_deref() {
            Some(path) => Some(read_source(path).await?),
            None => None,
        };

        let service = ctx.service()?;
        let rendered = service
            .render_with_override(&lookup, body.as_deref(), &data, self.locale.as_deref())
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        } else {
            println!("{} {}", "Subject:".bold(), rendered.subject);
            println!();
            println!("{}", rendered.html_body);
        }
        Ok(())
    }
}

/// Render template text given on the command line.
#[derive(Args, Debug)]
pub struct RenderTextCommand {
    /// Template text; `-` reads stdin
    text: String,

    /// JSON (or .yaml) file with the data model; `-` reads stdin
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Locale for helpers invoked without one, e.g. de-DE
    #[arg(short, long)]
    locale: Option<String>,

    /// Partial visible to this render, as NAME=FILE (repeatable)
    #[arg(short, long = "partial", value_parser = parse_name_file)]
    partials: Vec<(String, PathBuf)>,

    /// Also make the stored partials available
    #[arg(long)]
    with_store_partials: bool,
}

impl RenderTextCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let text_path = Path::new(&self.text);
        let text = if is_stdin(text_path) {
            ensure_single_stdin([("TEXT", Some(text_path)), ("--data", self.data.as_deref())])?;
            read_source(text_path).await?
        } else {
            self.text.clone()
        };
        let data = read_data(self.data.as_deref()).await?;

        let mut partials = PartialSet::new();
        if self.with_store_partials {
            partials.extend(ctx.open_store()?.partial_set().await?);
        }
        for (name, path) in &self.partials {
            let body = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read partial '{name}' from {}", path.display()))?;
            partials.insert(name.clone(), body);
        }

        let mut options = RenderOptions::new();
        if !partials.is_empty() {
            options = options.with_partials(partials);
        }
        if let Some(locale) = &self.locale {
            options = options.with_locale(locale.clone());
        }

        let rendered = ctx.engine()?.render(&text, &data, &options)?;
        println!("{rendered}");
        Ok(())
    }
}
