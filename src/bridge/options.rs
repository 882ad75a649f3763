// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! HTML generation options and their block-markup encoding.
//!
//! The module reads its options from a small TapirMD document placed right
//! after the input. Each option is a named code block:
//!
//! ```text
//! @@@ #identSuffix
//! '''
//! -doc
//! '''
//! ```
//!
//! The whole schema is written on every render, in a fixed order.

use std::fmt::Write;

/// Custom app name that enables raw HTML blocks.
pub const HTML_CUSTOM_APP: &str = "html";

/// Options for one HTML generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlGenOptions {
    /// Comma or semicolon separated custom app names. Only `html` is known to
    /// the module today.
    pub enabled_custom_apps: String,
    /// Appended to every HTML `id` attribute value.
    pub ident_suffix: String,
    /// Appended to every auto-generated HTML `id` attribute value.
    pub auto_ident_suffix: String,
    /// Whether the root block is rendered as a wrapping element.
    pub render_root: bool,
}

impl HtmlGenOptions {
    /// Add a custom app to the enabled list.
    ///
    /// # Example
    /// ```
    /// use tmd_bridge::bridge::{HtmlGenOptions, HTML_CUSTOM_APP};
    ///
    /// let options = HtmlGenOptions::default().with_custom_app(HTML_CUSTOM_APP);
    /// assert_eq!(options.enabled_custom_apps, "html");
    /// ```
    pub fn with_custom_app(mut self, app: &str) -> Self {
        if !self.enabled_custom_apps.is_empty() {
            self.enabled_custom_apps.push(',');
        }
        self.enabled_custom_apps.push_str(app);
        self
    }

    pub fn with_render_root(mut self, render_root: bool) -> Self {
        self.render_root = render_root;
        self
    }

    /// Build the option document in the order the module expects.
    pub fn to_config_document(&self) -> ConfigDocument {
        let mut document = ConfigDocument::new();
        document.push("enabledCustomApps", &self.enabled_custom_apps);
        document.push("identSuffix", &self.ident_suffix);
        document.push("autoIdentSuffix", &self.auto_ident_suffix);
        document.push("renderRoot", if self.render_root { "true" } else { "false" });
        document
    }
}

/// Ordered (name, value) pairs encoded as block markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    entries: Vec<(&'static str, String)>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.entries.push((name, value.into()));
    }

    pub fn entries(&self) -> &[(&'static str, String)] {
        &self.entries
    }

    /// Encode as a leading newline followed by one section per entry,
    /// sections separated by a blank line. Values are written verbatim.
    pub fn encode(&self) -> String {
        let capacity = self
            .entries
            .iter()
            .map(|(name, value)| name.len() + value.len() + 24)
            .sum::<usize>()
            + 1;
        let mut out = String::with_capacity(capacity);
        out.push('\n');
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            // writing to a String cannot fail
            let _ = write!(out, "@@@ #{}\n'''\n{}\n'''\n", name, value);
        }
        out
    }
}
