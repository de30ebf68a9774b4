//! Terminal presenter: records every rendered entry and prints it.

use serde::{Deserialize, Serialize};
use weather_query_core::{Bar, CommandTable, Diagnostic, Grid, Presenter};

use crate::render::{self, Format};

/// One documented command in the help output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct HelpEntry {
    pub(crate) usage: String,
    pub(crate) arity: String,
    pub(crate) description: String,
}

/// A rendered entry. History stores these so a replay needs no re-execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub(crate) enum Output {
    Echo {
        line: String,
    },
    Text {
        text: String,
    },
    Table {
        grid: Grid,
    },
    Histogram {
        title: String,
        y_label: String,
        bars: Vec<Bar>,
    },
    WeatherCode {
        code: i64,
        label: String,
    },
    Error {
        line: String,
        diagnostic: Diagnostic,
    },
    Help {
        commands: Vec<HelpEntry>,
    },
    Upload,
    Clear,
}

impl Output {
    pub(crate) fn help(tables: &CommandTable) -> Self {
        Output::Help {
            commands: tables
                .commands
                .iter()
                .map(|c| HelpEntry {
                    usage: c.usage(),
                    arity: c.arity_label(),
                    description: c.description.clone(),
                })
                .collect(),
        }
    }
}

/// Presenter that prints in the selected format as it goes.
pub(crate) struct TerminalPresenter {
    format: Format,
    line: String,
    pub(crate) outputs: Vec<Output>,
}

impl TerminalPresenter {
    pub(crate) fn new(format: Format) -> Self {
        Self {
            format,
            line: String::new(),
            outputs: Vec::new(),
        }
    }

    fn emit(&mut self, output: Output) {
        render::output(&output, self.format);
        self.outputs.push(output);
    }

    pub(crate) fn failed(&self) -> bool {
        self.outputs
            .iter()
            .any(|o| matches!(o, Output::Error { .. }))
    }
}

impl Presenter for TerminalPresenter {
    fn request_echo(&mut self, line: &str) {
        self.line = line.to_string();
        self.emit(Output::Echo {
            line: line.to_string(),
        });
    }

    fn generic_result(&mut self, text: &str) {
        self.emit(Output::Text {
            text: text.to_string(),
        });
    }

    fn table(&mut self, grid: &Grid) {
        self.emit(Output::Table { grid: grid.clone() });
    }

    fn histogram(&mut self, title: &str, y_label: &str, bars: &[Bar]) {
        self.emit(Output::Histogram {
            title: title.to_string(),
            y_label: y_label.to_string(),
            bars: bars.to_vec(),
        });
    }

    fn weather_code(&mut self, code: i64, label: &str) {
        self.emit(Output::WeatherCode {
            code,
            label: label.to_string(),
        });
    }

    fn error(&mut self, diagnostic: &Diagnostic) {
        let line = self.line.clone();
        self.emit(Output::Error {
            line,
            diagnostic: diagnostic.clone(),
        });
    }

    fn help(&mut self, tables: &CommandTable) {
        self.emit(Output::help(tables));
    }

    fn upload_widget(&mut self) {
        self.emit(Output::Upload);
    }

    fn clear(&mut self) {
        self.emit(Output::Clear);
    }
}
