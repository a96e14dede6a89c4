//! Cleaning options: the form controls the user edits and the flat option
//! set sent along with each upload.

use std::collections::BTreeMap;
use std::fmt;

/// Value of one option: checkbox state or the chosen entry of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Choice(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Flag(b) => write!(f, "{}", b),
            OptionValue::Choice(s) => f.write_str(s),
        }
    }
}

/// Option name -> value, rebuilt from the form on every submission.
pub type OptionSet = BTreeMap<String, OptionValue>;

/// Kind of a form control, mirroring what a collector can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Checkbox {
        name: String,
        label: String,
        checked: bool,
    },
    SelectOne {
        name: String,
        label: String,
        choices: Vec<String>,
        selected: String,
    },
    /// Anything else (text fields, buttons). Ignored by [`collect`].
    Other { name: String },
}

/// Ordered list of controls making up the options form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub controls: Vec<Control>,
}

impl Form {
    pub fn new(controls: Vec<Control>) -> Self {
        Form { controls }
    }

    /// Controls understood by the cleaning service, with its defaults.
    pub fn cleaning_defaults() -> Self {
        Form::new(vec![
            Control::SelectOne {
                name: "missing_strategy".to_string(),
                label: "Missing values".to_string(),
                choices: vec!["mean".to_string(), "median".to_string()],
                selected: "mean".to_string(),
            },
            checkbox("fix_dtypes", "Fix data types", true),
            checkbox("remove_duplicates", "Remove duplicate rows", true),
            checkbox("trim_whitespace", "Trim whitespace", true),
            checkbox("lowercase_text", "Lowercase text", false),
            checkbox("detect_outliers", "Detect outliers", true),
        ])
    }

    /// Set a checkbox. Returns false if no checkbox has that name.
    pub fn set_checked(&mut self, target: &str, value: bool) -> bool {
        for control in &mut self.controls {
            if let Control::Checkbox { name, checked, .. } = control {
                if name == target {
                    *checked = value;
                    return true;
                }
            }
        }
        false
    }

    /// Pick an entry of a select. Values outside its choices are rejected.
    pub fn select(&mut self, target: &str, value: &str) -> bool {
        for control in &mut self.controls {
            if let Control::SelectOne {
                name,
                choices,
                selected,
                ..
            } = control
            {
                if name == target && choices.iter().any(|c| c == value) {
                    *selected = value.to_string();
                    return true;
                }
            }
        }
        false
    }
}

fn checkbox(name: &str, label: &str, checked: bool) -> Control {
    Control::Checkbox {
        name: name.to_string(),
        label: label.to_string(),
        checked,
    }
}

/// Read the current state of the form into a flat option set.
///
/// Checkboxes become `Flag`, single selects become `Choice`; every other
/// control is skipped. A later control with a duplicate name wins.
pub fn collect(form: &Form) -> OptionSet {
    let mut options = OptionSet::new();
    for control in &form.controls {
        match control {
            Control::Checkbox { name, checked, .. } => {
                options.insert(name.clone(), OptionValue::Flag(*checked));
            }
            Control::SelectOne { name, selected, .. } => {
                options.insert(name.clone(), OptionValue::Choice(selected.clone()));
            }
            Control::Other { .. } => {}
        }
    }
    options
}

/// Option set as multipart text fields (booleans as `true`/`false`).
pub fn to_form_fields(options: &OptionSet) -> Vec<(String, String)> {
    options
        .iter()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect()
}
