use std::{
    fmt::{self, Display},
    io,
};

use super::{
    ColorSetting, Report, Status, SupportsColor,
    colors::{GREEN, RED, RESET, YELLOW},
};

/// Renders a [`Report`] as an indented tree of scope results.
///
/// ```text
/// --- FAIL: root (0.00s)
///     --- PASS: root/a (0.00s)
///     --- FAIL: root/b (0.00s)
///         src/lib.rs:12: should be true
/// ```
#[derive(Debug)]
pub struct PrettyFormatter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for PrettyFormatter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: Default::default(),
        }
    }
}

impl<W: io::Write> PrettyFormatter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> PrettyFormatter<WithTarget> {
        PrettyFormatter {
            target: with_target,
            color_setting: self.color_setting,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        PrettyFormatter {
            color_setting: color_setting.into(),
            ..self
        }
    }

    pub fn into_target(self) -> W {
        self.target
    }
}

impl<W: io::Write + SupportsColor> PrettyFormatter<W> {
    /// Return whether this formatter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        match self.color_setting {
            ColorSetting::Automatic => self.target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }

    /// Write the tree of `report` followed by an overall `PASS` or `FAIL`.
    pub fn fmt_report(&mut self, report: &Report) -> io::Result<()> {
        self.fmt_tree(report)?;
        match report.failed() {
            true => self.fmt_label(Status::Failed)?,
            false => self.fmt_label(Status::Passed)?,
        }
        writeln!(self.target)
    }

    /// Write one line per scope, with its logs indented below it.
    pub fn fmt_tree(&mut self, report: &Report) -> io::Result<()> {
        self.fmt_scope(report, 0)
    }

    fn fmt_scope(&mut self, report: &Report, depth: usize) -> io::Result<()> {
        let indent = "    ".repeat(depth);
        write!(self.target, "{indent}--- ")?;
        self.fmt_label(report.status)?;
        writeln!(
            self.target,
            ": {} ({:.2}s)",
            report.name,
            report.duration.as_secs_f64()
        )?;

        for line in report.logs.iter().flat_map(|log| log.lines()) {
            writeln!(self.target, "{indent}    {line}")?;
        }

        for child in &report.children {
            self.fmt_scope(child, depth + 1)?;
        }

        Ok(())
    }

    fn fmt_label(&mut self, status: Status) -> io::Result<()> {
        let (label, color) = match status {
            Status::Passed => ("PASS", GREEN),
            Status::Failed => ("FAIL", RED),
            Status::Skipped => ("SKIP", YELLOW),
        };
        match self.use_color() {
            true => write!(self.target, "{color}{label}{RESET}"),
            false => write!(self.target, "{label}"),
        }
    }
}

#[derive(Debug, Default)]
struct Buffer(Vec<u8>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut self.0, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = PrettyFormatter {
            target: Buffer::default(),
            color_setting: ColorSetting::Never,
        };
        formatter.fmt_tree(self).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&formatter.target.0))
    }
}
