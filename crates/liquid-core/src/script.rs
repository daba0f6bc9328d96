//! Startup scripts derived from an app record.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::app::AppRecord;

/// A script registered with the surface before any page script runs.
///
/// Startup scripts run once per document, in the top-level frame only, in
/// the application's own script world. They run even when the record
/// disables page JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupScript {
    pub name: String,
    pub source: String,
    pub main_frame_only: bool,
}

pub struct ScriptInjector;

impl ScriptInjector {
    pub const CSS_SCRIPT_NAME: &'static str = "liquid-additional-css";
    pub const JS_SCRIPT_NAME: &'static str = "liquid-additional-js";

    /// Zero, one or two scripts: stylesheet loader first, then custom JS.
    pub fn scripts_for(record: &AppRecord) -> Vec<StartupScript> {
        let mut scripts = Vec::with_capacity(2);

        if let Some(css) = record.additional_css.as_deref().filter(|s| !s.trim().is_empty()) {
            scripts.push(StartupScript {
                name: Self::CSS_SCRIPT_NAME.to_string(),
                source: Self::stylesheet_loader(css),
                main_frame_only: true,
            });
        }

        if let Some(js) = record.additional_js.as_deref().filter(|s| !s.trim().is_empty()) {
            scripts.push(StartupScript {
                name: Self::JS_SCRIPT_NAME.to_string(),
                source: js.to_string(),
                main_frame_only: true,
            });
        }

        scripts
    }

    /// Wraps CSS in a script that appends a `<link>` to a data URL.
    ///
    /// A linked stylesheet loads asynchronously; inline `<style>` text would not.
    fn stylesheet_loader(css: &str) -> String {
        let encoded = STANDARD.encode(css.as_bytes());
        format!(
            r#"(function() {{
    var link = document.createElement("link");
    link.rel = "stylesheet";
    link.type = "text/css";
    link.href = "data:text/css;charset=utf-8;base64,{encoded}";
    (document.head || document.documentElement).appendChild(link);
}})();"#
        )
    }
}
