use poolscope_core::{FilePreferenceStore, Settings, ThemeContext, ThemePreference};
use serde::Serialize;

use crate::cli::{ThemeArgs, ThemeCommand};
use crate::error::CliError;
use crate::output::TextTable;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ThemeResponseData {
    theme: ThemePreference,
    path: String,
    changed: bool,
}

pub fn run(args: &ThemeArgs, settings: &Settings) -> Result<CommandResult, CliError> {
    let store = FilePreferenceStore::new(settings.theme_path());
    let path = store.path().display().to_string();
    let mut context = ThemeContext::load(store);
    let before = context.current();

    let theme = match args.command.clone().unwrap_or(ThemeCommand::Show) {
        ThemeCommand::Show => context.current(),
        ThemeCommand::Toggle => context.toggle()?,
        ThemeCommand::Set { theme } => context.set(theme)?,
    };

    let mut table = TextTable::new(["Theme", "Path"]);
    table.push_row(vec![theme.to_string(), path.clone()]);

    let data = serde_json::to_value(ThemeResponseData {
        theme,
        path,
        changed: theme != before,
    })?;
    Ok(CommandResult::ok(data, None).with_table(table))
}
