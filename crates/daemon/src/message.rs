// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Promotion message rendering
//!
//! Templates use Jinja2 syntax. `requester` and `resource` are in scope:
//!
//! ```text
//! You are now enrolled in class {{ resource }}!
//! ```

use minijinja::Environment;
use roster_core::PromotionEvent;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Render error: {0}")]
    Render(String),
}

#[derive(Serialize)]
struct MessageContext<'a> {
    requester: &'a str,
    resource: &'a str,
}

/// A validated message template
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    source: String,
}

impl MessageTemplate {
    /// Checks syntax; undefined values only surface at render time
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let env = Environment::new();
        env.template_from_str(&source)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;
        Ok(Self { source })
    }

    pub fn render(&self, event: &PromotionEvent) -> Result<String, TemplateError> {
        let env = Environment::new();
        let tmpl = env
            .template_from_str(&self.source)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;
        tmpl.render(MessageContext {
            requester: &event.requester.0,
            resource: &event.resource.0,
        })
        .map_err(|e| TemplateError::Render(e.to_string()))
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
