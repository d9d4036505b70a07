// ==============================================================================
// Shared Test Helpers
// ==============================================================================
//
// Each test file that imports this module compiles its own copy, so not every
// function is used in every binary.
#![allow(dead_code)]
// Import this module in each test file with:
//
//     mod common;
//     use common::{fixture, read_fixture, render_diagnostic};

use std::fs;
use std::path::PathBuf;

use miette::{GraphicalReportHandler, GraphicalTheme};

pub const FIXTURE_DIR: &str = "tests/fixtures";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(FIXTURE_DIR).join(name)
}

/// Read a fixture, normalizing `\r\n` to `\n`. Git on Windows may check out
/// the golden `.avdl` files with CRLF line endings, while the renderer always
/// emits `\n`.
pub fn read_fixture(name: &str) -> String {
    let path = fixture(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
        .replace("\r\n", "\n")
}

/// Render a diagnostic to a deterministic string: no color, no Unicode, 80
/// columns.
pub fn render_diagnostic(diagnostic: &dyn miette::Diagnostic) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::none()).with_width(80);
    let mut buf = String::new();
    handler
        .render_report(&mut buf, diagnostic)
        .expect("render to String is infallible");
    buf
}
