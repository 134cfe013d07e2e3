//! Utilities for printing and everything related to "UI".

use std::iter;

use term_painter::{Color, Style, ToStyle};

macro_rules! print_msg {
    ($kind:ident: $icon:literal => $fmt:literal $($args:tt)*) => {{
        use crate::ui::MsgKind;
        use term_painter::ToStyle;

        let icon_style = MsgKind::$kind.icon_style();
        icon_style.with(|| {
            print!("[{}] ", $icon);
        });

        // Rewrap the body for the terminal width
        let body_style = MsgKind::$kind.body_style();
        let body = format!($fmt $($args)*);
        let lines = crate::ui::wrap(&body, crate::ui::line_len());

        for (i, line) in lines.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ if i == lines.len() - 1 => "    └ ",
                _ => "    │ ",
            };

            println!("{}{}", icon_style.paint(prefix), body_style.paint(line));
        }
    }};
}

macro_rules! progress {
    ([$fmt:literal $($args:tt)*] => $body:tt) => {{
        use std::{
            io::{stdout, Write},
            time::Instant,
        };
        use crate::ui::MsgKind;
        use term_painter::ToStyle;

        let print_body = || {
            MsgKind::Progress.body_style().with(|| {
                print!($fmt $($args)*);
                print!(" ... ");
            });
        };

        MsgKind::Progress.icon_style().with(|| print!("[…] "));
        print_body();
        let _ = stdout().flush();

        let before = Instant::now();
        let out = $body;
        let time = before.elapsed();

        print!("\r{} ", MsgKind::Progress.icon_style().paint("[✓]"));
        print_body();
        MsgKind::Progress.body_style().with(|| {
            println!("{} (in {:.2?})", MsgKind::Progress.icon_style().paint("done"), time);
        });

        out
    }};
}

macro_rules! info {
    () => { info!("") };
    ($($t:tt)*) => {{
        print_msg!(Info: 'i' => $($t)*);
    }};
}

macro_rules! warn {
    () => { warn!("") };
    ($($t:tt)*) => {{
        print_msg!(Warning: 'w' => $($t)*);
    }};
}

macro_rules! error {
    () => { error!("") };
    ($($t:tt)*) => {{
        print_msg!(Error: '!' => $($t)*);
    }};
}

pub enum MsgKind {
    Error,
    Warning,
    Info,
    Progress,
}

impl MsgKind {
    pub fn icon_style(&self) -> Style {
        match self {
            MsgKind::Error => Color::Red.bold(),
            MsgKind::Warning => Color::Yellow.bold(),
            MsgKind::Info => Color::Blue.bold(),
            MsgKind::Progress => Color::Green.bold(),
        }
    }

    pub fn body_style(&self) -> Style {
        match self {
            MsgKind::Error => Color::BrightRed.to_style(),
            MsgKind::Warning => Color::BrightYellow.to_style(),
            MsgKind::Info => Color::NotSet.to_style(),
            MsgKind::Progress => Color::NotSet.to_style(),
        }
    }
}

/// The maximum length of a message line, leaving room for the icon.
pub fn line_len() -> usize {
    let width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);
    std::cmp::max(std::cmp::min(100, width), 20) - 7
}

/// Splits `body` into lines of roughly `line_len` characters, breaking only
/// at whitespace. Always returns at least one line.
pub fn wrap(body: &str, line_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in body.split_whitespace() {
        if !current_line.is_empty()
            && current_line.chars().count() + word.chars().count() >= line_len
        {
            lines.push(current_line.trim_end().to_owned());
            current_line.clear();
        }

        current_line.push_str(word);
        current_line.push(' ');
    }
    lines.push(current_line.trim_end().to_owned());

    lines
}

/// Formats the given integer with `,` as thousand separator.
pub fn fmt_with_thousand_sep(mut v: u64) -> String {
    let mut out = (v % 1000).to_string();
    v /= 1000;
    while v != 0 {
        out = format!("{},{:03}", v % 1000, out);
        v /= 1000;
    }

    out
}

/// Defines the characters to draw a table.
#[derive(Copy, Clone)]
struct TableStyle {
    horizontal: char,
    vertical: char,
    cross: char,
    vertical_double: char,
    cross_vertical_double: char,
    t_cross_right: char,
}

/// A nice unicode table.
const UNICODE_TABLE: TableStyle = TableStyle {
    horizontal: '─',
    vertical: '│',
    cross: '┼',
    vertical_double: '║',
    cross_vertical_double: '╫',
    t_cross_right: '┤',
};

/// Prints a table. The first row is the header, the first column holds the
/// row labels and is separated by a double line.
pub fn print_table(cells: &[Vec<String>]) {
    let style = UNICODE_TABLE;
    let num_cols = match cells.first() {
        Some(header) => header.len(),
        None => return,
    };

    let col_widths = (0..num_cols).map(|col| {
        cells.iter()
            .map(|row| row.get(col).map(|c| c.chars().count()).unwrap_or(0))
            .max()
            .unwrap_or(0)
    }).collect::<Vec<_>>();

    let separator = |col: usize| {
        match col {
            0 => style.vertical_double,
            _ => style.vertical,
        }
    };

    // ----- Print header ----------------------------------------------------
    println!();
    for col in 0..num_cols {
        print!(" {: ^1$} {2}", cells[0][col], col_widths[col], separator(col));
    }
    println!();

    // ----- Print separator -------------------------------------------------
    for col in 0..num_cols {
        let line = iter::repeat(style.horizontal)
            .take(col_widths[col] + 2)
            .collect::<String>();
        print!("{}", line);

        match col {
            0 => print!("{}", style.cross_vertical_double),
            _ if col == num_cols - 1 => print!("{}", style.t_cross_right),
            _ => print!("{}", style.cross),
        }
    }
    println!();

    // ----- Print table body ------------------------------------------------
    let label_style = Color::White.bold();
    let value_style = Color::Green.bold();

    for row in &cells[1..] {
        for col in 0..num_cols {
            let cell = row.get(col).map(|s| s.as_str()).unwrap_or("");
            let padded = format!("{: >1$}", cell, col_widths[col]);
            let painted = match col {
                0 => label_style.paint(padded),
                _ => value_style.paint(padded),
            };
            print!(" {} {}", painted, separator(col));
        }
        println!();
    }
    println!();
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_sep() {
        assert_eq!(fmt_with_thousand_sep(0), "0");
        assert_eq!(fmt_with_thousand_sep(999), "999");
        assert_eq!(fmt_with_thousand_sep(1000), "1,000");
        assert_eq!(fmt_with_thousand_sep(1_234_567), "1,234,567");
        assert_eq!(fmt_with_thousand_sep(20_005), "20,005");
    }

    #[test]
    fn wrap_lines() {
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("short", 10), vec!["short"]);
        assert_eq!(wrap("aaa bbb ccc ddd", 8), vec!["aaa bbb", "ccc ddd"]);

        // A single word longer than the line isn't split
        assert_eq!(wrap("abcdefghijkl x", 5), vec!["abcdefghijkl", "x"]);
    }
}
