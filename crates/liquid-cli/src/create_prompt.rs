//! Interactive creation of a new app record.

use anyhow::Result;
use colored::Colorize;
use liquid_application::CreateFlow;
use liquid_core::app::{AppConfigForm, AppConfigRepository, AppName, FormChange};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

/// Where answers come from.
pub trait LineSource {
    /// Reads one line, pre-filled with `initial`. `Ok(None)` means the user gave up.
    fn read(&mut self, prompt: &str, initial: &str) -> Result<Option<String>>;
}

pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read(&mut self, prompt: &str, initial: &str) -> Result<Option<String>> {
        match self.editor.readline_with_initial(prompt, (initial, "")) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

type Toggle = (&'static str, fn(&AppConfigForm) -> bool, fn(bool) -> FormChange);

const TOGGLES: [Toggle; 5] = [
    ("Enable JavaScript", |f: &AppConfigForm| f.enable_js, FormChange::EnableJs),
    ("Allow cookies", |f: &AppConfigForm| f.allow_cookies, FormChange::AllowCookies),
    (
        "Allow third-party cookies",
        |f: &AppConfigForm| f.allow_third_party_cookies,
        FormChange::AllowThirdPartyCookies,
    ),
    ("Hide scroll bars", |f: &AppConfigForm| f.hide_scroll_bars, FormChange::HideScrollBars),
    (
        "Remove window frame",
        |f: &AppConfigForm| f.remove_window_frame,
        FormChange::RemoveWindowFrame,
    ),
];

pub struct PromptCreateFlow<L: LineSource> {
    lines: L,
}

impl<L: LineSource> PromptCreateFlow<L> {
    pub fn new(lines: L) -> Self {
        Self { lines }
    }

    fn ask(&mut self, label: &str, initial: &str) -> Result<Option<String>> {
        let prompt = format!("{} ", format!("{}:", label).cyan());
        Ok(self
            .lines
            .read(&prompt, initial)?
            .map(|s| s.trim().to_string()))
    }

    fn ask_yes_no(&mut self, label: &str, current: bool) -> Result<Option<bool>> {
        let hint = if current { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.ask(&format!("{} {}", label, hint), "")? else {
                return Ok(None);
            };
            match parse_yes_no(&answer, current) {
                Some(value) => return Ok(Some(value)),
                None => println!("{}", "Please answer y or n".yellow()),
            }
        }
    }

    /// Walks the user through the form once. `Ok(None)` on cancel.
    fn fill(&mut self, form: &mut AppConfigForm) -> Result<Option<()>> {
        let Some(name) = self.ask("Name", &form.name)? else {
            return Ok(None);
        };
        form.apply(FormChange::Name(name));

        let Some(url) = self.ask("URL", &form.url)? else {
            return Ok(None);
        };
        form.apply(FormChange::Url(url));

        let Some(title) = self.ask("Title (empty follows the page)", &form.title)? else {
            return Ok(None);
        };
        form.apply(FormChange::Title(title));

        for (label, current, change) in TOGGLES {
            // Read the live value; an earlier answer may have changed it.
            let Some(value) = self.ask_yes_no(label, current(form))? else {
                return Ok(None);
            };
            form.apply(change(value));
        }

        let Some(domains) = self.ask(
            "Additional domains (space separated)",
            &form.additional_domains,
        )?
        else {
            return Ok(None);
        };
        form.apply(FormChange::AdditionalDomains(domains));

        Ok(Some(()))
    }
}

impl<L: LineSource> CreateFlow for PromptCreateFlow<L> {
    fn create(
        &mut self,
        requested: &AppName,
        store: &dyn AppConfigRepository,
    ) -> Result<Option<AppName>> {
        println!(
            "{}",
            format!("No app named '{}' yet. Let's create it.", requested).bright_yellow()
        );
        let mut form = AppConfigForm::for_new(requested.as_str());

        loop {
            if self.fill(&mut form)?.is_none() {
                return Ok(None);
            }

            let record = match form.build(None) {
                Ok(record) => record,
                Err(e) => {
                    println!("{}", e.to_string().red());
                    continue;
                }
            };

            if record.name != *requested && store.exists(&record.name) {
                println!(
                    "{}",
                    format!("An app named '{}' already exists", record.name).red()
                );
                continue;
            }

            store.save(&record)?;
            info!(app = %record.name, "[CreatePrompt] Created app record");
            println!("{}", format!("Created '{}'", record.name).green());
            return Ok(Some(record.name));
        }
    }
}

/// Empty input keeps `current`.
fn parse_yes_no(answer: &str, current: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(current),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
