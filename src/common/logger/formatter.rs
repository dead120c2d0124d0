use std::fmt::Result as FmtResult;

use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        FmtContext, FormattedFields,
        format::{FormatEvent, FormatFields, Writer},
    },
    registry::LookupSpan,
};

const TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");

struct Palette {
    reset: &'static str,
    bold: &'static str,
    dim: &'static str,
}

const ANSI: Palette = Palette {
    reset: "\x1b[0m",
    bold: "\x1b[1m",
    dim: "\x1b[2m",
};

const PLAIN: Palette = Palette {
    reset: "",
    bold: "",
    dim: "",
};

/// One line per event:
/// `[timestamp] LEVEL target: line download{request_id=.. video_id=..}: > message`.
pub struct CustomFormatter {
    use_ansi: bool,
}

impl CustomFormatter {
    pub fn new(use_ansi: bool) -> Self {
        Self { use_ansi }
    }

    fn palette(&self) -> &'static Palette {
        if self.use_ansi { &ANSI } else { &PLAIN }
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(TIMESTAMP)
        .unwrap_or_default()
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> FmtResult {
        let p = self.palette();
        let meta = event.metadata();

        write!(writer, "{}[{}]{} ", p.dim, timestamp(), p.reset)?;

        if self.use_ansi {
            write!(
                writer,
                "{}{}{:<5}{} ",
                level_color(meta.level()),
                p.bold,
                meta.level().as_str(),
                p.reset
            )?;
        } else {
            write!(writer, "{:<5} ", meta.level().as_str())?;
        }

        match meta.line() {
            Some(line) => write!(writer, "{}{}: {}{} ", p.dim, meta.target(), line, p.reset)?,
            None => write!(writer, "{}{}{} ", p.dim, meta.target(), p.reset)?,
        }

        // outermost span first; the download span carries the request id
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}{}", p.bold, span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>().filter(|f| !f.is_empty()) {
                    write!(writer, "{{{}}}", fields)?;
                }
                write!(writer, "{}: ", p.reset)?;
            }
        }

        write!(writer, "> ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer, "{}", p.reset)
    }
}
