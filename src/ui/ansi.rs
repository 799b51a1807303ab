//! Print styled ratatui lines straight to a terminal, without a full-screen UI.

use std::io::{self, Write};

use ratatui::crossterm::style::{
    Attribute, Attributes, Color as CColor, ContentStyle, PrintStyledContent,
};
use ratatui::crossterm::{queue, terminal};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;

pub fn to_crossterm_color(color: Color) -> CColor {
    match color {
        Color::Reset => CColor::Reset,
        Color::Black => CColor::Black,
        Color::Red => CColor::DarkRed,
        Color::Green => CColor::DarkGreen,
        Color::Yellow => CColor::DarkYellow,
        Color::Blue => CColor::DarkBlue,
        Color::Magenta => CColor::DarkMagenta,
        Color::Cyan => CColor::DarkCyan,
        Color::Gray => CColor::Grey,
        Color::DarkGray => CColor::DarkGrey,
        Color::LightRed => CColor::Red,
        Color::LightGreen => CColor::Green,
        Color::LightYellow => CColor::Yellow,
        Color::LightBlue => CColor::Blue,
        Color::LightMagenta => CColor::Magenta,
        Color::LightCyan => CColor::Cyan,
        Color::White => CColor::White,
        Color::Indexed(index) => CColor::AnsiValue(index),
        Color::Rgb(r, g, b) => CColor::Rgb { r, g, b },
    }
}

fn to_content_style(style: Style) -> ContentStyle {
    const ATTRIBUTES: &[(Modifier, Attribute)] = &[
        (Modifier::BOLD, Attribute::Bold),
        (Modifier::DIM, Attribute::Dim),
        (Modifier::ITALIC, Attribute::Italic),
        (Modifier::UNDERLINED, Attribute::Underlined),
        (Modifier::REVERSED, Attribute::Reverse),
        (Modifier::CROSSED_OUT, Attribute::CrossedOut),
    ];

    let mut attributes = Attributes::default();
    for (modifier, attribute) in ATTRIBUTES {
        if style.add_modifier.contains(*modifier) {
            attributes.set(*attribute);
        }
    }

    ContentStyle {
        foreground_color: style.fg.map(to_crossterm_color),
        background_color: style.bg.map(to_crossterm_color),
        underline_color: None,
        attributes,
    }
}

/// Write each line followed by a newline. With `styled` off the output is
/// plain text, which is what pipes and log files get.
pub fn write_lines<W: Write>(out: &mut W, lines: &[Line<'_>], styled: bool) -> io::Result<()> {
    for line in lines {
        for span in &line.spans {
            if styled {
                let style = to_content_style(line.style.patch(span.style));
                queue!(out, PrintStyledContent(style.apply(span.content.as_ref())))?;
            } else {
                out.write_all(span.content.as_bytes())?;
            }
        }
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Current terminal width, if stdout is a terminal.
pub fn terminal_width() -> Option<usize> {
    terminal::size().ok().map(|(w, _)| w as usize)
}
