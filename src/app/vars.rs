use serde::Deserialize;

use super::buffer::Buffer;

/// Editor-wide settings, seeded from the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub tabstop: usize,
    pub showtabs: bool,
    pub list: bool,
    pub autoindent: bool,
    pub textwidth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tabstop: 8,
            showtabs: false,
            list: false,
            autoindent: false,
            textwidth: 0,
        }
    }
}

/// Every variable reachable through `set`/`get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Var {
    ReadOnly,
    Modified,
    Eol,
    TabStop,
    ShowTabs,
    List,
    AutoIndent,
    TextWidth,
}

impl Var {
    pub const ALL: [Var; 8] = [
        Var::ReadOnly,
        Var::Modified,
        Var::Eol,
        Var::TabStop,
        Var::ShowTabs,
        Var::List,
        Var::AutoIndent,
        Var::TextWidth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Var::ReadOnly => "ro",
            Var::Modified => "modified",
            Var::Eol => "eol",
            Var::TabStop => "tabstop",
            Var::ShowTabs => "showtabs",
            Var::List => "list",
            Var::AutoIndent => "autoindent",
            Var::TextWidth => "textwidth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ro" | "readonly" => Some(Var::ReadOnly),
            "modified" => Some(Var::Modified),
            "eol" => Some(Var::Eol),
            "ts" | "tabstop" => Some(Var::TabStop),
            "showtabs" => Some(Var::ShowTabs),
            "list" => Some(Var::List),
            "ai" | "autoindent" => Some(Var::AutoIndent),
            "tw" | "textwidth" => Some(Var::TextWidth),
            _ => None,
        }
    }

    pub fn is_bool(self) -> bool {
        !matches!(self, Var::TabStop | Var::TextWidth)
    }

    /// Current value; `None` when an integer variable is unset.
    pub fn get(self, settings: &Settings, buffer: &Buffer) -> Option<usize> {
        let value = match self {
            Var::ReadOnly => usize::from(buffer.is_read_only()),
            Var::Modified => usize::from(buffer.is_modified()),
            Var::Eol => usize::from(buffer.has_eol()),
            Var::TabStop => settings.tabstop,
            Var::ShowTabs => usize::from(settings.showtabs),
            Var::List => usize::from(settings.list),
            Var::AutoIndent => usize::from(settings.autoindent),
            Var::TextWidth if settings.textwidth == 0 => return None,
            Var::TextWidth => settings.textwidth,
        };
        Some(value)
    }

    pub fn set(self, settings: &mut Settings, buffer: &mut Buffer, value: usize) {
        let on = value != 0;
        match self {
            Var::ReadOnly => buffer.set_read_only(on),
            Var::Modified => buffer.set_modified(on),
            Var::Eol => buffer.set_eol(on),
            Var::TabStop => settings.tabstop = value.max(1),
            Var::ShowTabs => settings.showtabs = on,
            Var::List => settings.list = on,
            Var::AutoIndent => settings.autoindent = on,
            Var::TextWidth => settings.textwidth = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarError {
    Malformed,
    Unknown,
    NeedsInteger(String),
    NotANumber(String),
}

/// Handles the text after `set` or `get`, returning the lines to report.
pub fn parse_setget(
    is_set: bool,
    args: &str,
    settings: &mut Settings,
    buffer: &mut Buffer,
) -> Result<Vec<String>, VarError> {
    if args.is_empty() {
        if is_set {
            return Err(VarError::Malformed);
        }
        return Ok(Var::ALL
            .iter()
            .map(|var| describe(*var, var.get(settings, buffer)))
            .collect());
    }

    let Some(args) = args.strip_prefix(' ') else {
        return Err(VarError::Malformed);
    };
    if !args.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(VarError::Malformed);
    }

    let (negate, word_and_rest) = match args.strip_prefix("no") {
        Some(rest) if Var::from_name(args).is_none() => (true, rest),
        _ => (false, args),
    };
    let word_len = word_and_rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(word_and_rest.len());
    let (word, rest) = word_and_rest.split_at(word_len);
    let var = Var::from_name(word).ok_or(VarError::Unknown)?;

    let mut chars = rest.chars();
    match chars.next() {
        None => {
            if !is_set {
                return Ok(vec![describe(var, var.get(settings, buffer))]);
            }
            if !var.is_bool() {
                return Err(VarError::NeedsInteger(word.to_string()));
            }
            var.set(settings, buffer, usize::from(!negate));
            Ok(Vec::new())
        }
        Some(' ') | Some('=') => {
            if !is_set {
                return Ok(vec![describe(var, var.get(settings, buffer))]);
            }
            if negate {
                return Err(VarError::Malformed);
            }
            let text = chars.as_str().trim();
            match text.parse::<usize>() {
                Ok(value) if value > 0 => {
                    var.set(settings, buffer, value);
                    Ok(Vec::new())
                }
                _ => Err(VarError::NotANumber(text.to_string())),
            }
        }
        Some(_) => Err(VarError::Malformed),
    }
}

fn describe(var: Var, value: Option<usize>) -> String {
    match value {
        Some(value) => format!("{}: {}", var.name(), value),
        None => format!("{}: (not set)", var.name()),
    }
}
