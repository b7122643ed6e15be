//! Report rendering for terminals and GitHub Actions job logs.

use std::fmt::Display;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Terminal,
    /// Markdown with collapsible sections, for job summaries and PR comments.
    GithubActions,
}

impl Style {
    /// `GITHUB_ACTIONS=true` selects the markdown renderer.
    pub fn from_env() -> Self {
        match std::env::var("GITHUB_ACTIONS").as_deref() {
            Ok("true") => Style::GithubActions,
            _ => Style::Terminal,
        }
    }
}

pub struct Ui<W: Write> {
    style: Style,
    out: W,
}

impl<W: Write> Ui<W> {
    pub fn new(style: Style, out: W) -> Self {
        Self { style, out }
    }

    pub fn report_error(&mut self, err: &dyn Display) -> io::Result<()> {
        match self.style {
            Style::Terminal => writeln!(self.out, "{err}"),
            Style::GithubActions => {
                writeln!(self.out, "**Error occurred during processing: {err}**")
            }
        }
    }

    pub fn print(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.out, "{msg}")
    }

    /// A titled list. Nothing is printed when `items` is empty.
    pub fn summarize<I, T>(&mut self, header: &str, items: I) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let items: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
        if items.is_empty() {
            return Ok(());
        }

        match self.style {
            Style::Terminal => {
                writeln!(self.out, "{header}")?;
                for item in &items {
                    writeln!(self.out, "{item}")?;
                }
                writeln!(self.out)
            }
            Style::GithubActions => {
                writeln!(self.out)?;
                writeln!(self.out, "<details>")?;
                writeln!(self.out, "<summary>")?;
                writeln!(self.out, "{}", escape_html(header))?;
                writeln!(self.out, "</summary>")?;
                writeln!(self.out)?;
                writeln!(self.out, "<blockquote>")?;
                writeln!(self.out)?;
                for item in &items {
                    writeln!(self.out, "* {}", item.trim_end().replace('\n', "\n  "))?;
                }
                writeln!(self.out)?;
                writeln!(self.out, "</blockquote>")?;
                writeln!(self.out, "</details>")
            }
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
