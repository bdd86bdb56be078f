use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row as ComfyRow, Table};
use serde::Serialize;
use terminal_size::{Width as TermWidth, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Cli, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub(super) struct KeyValueRow {
    pub key: String,
    pub value: String,
}

pub(super) trait TableRow {
    const HEADERS: &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

pub(super) fn terminal_width() -> Option<u16> {
    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(v) = cols.parse::<u16>()
    {
        return Some(v);
    }
    terminal_size().map(|(TermWidth(w), _)| w)
}

/// Clips `text` to `max` display columns, ending with an ellipsis when cut.
pub(super) fn clip_for_table(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

pub(super) fn render_output<T: Serialize + TableRow>(
    cli: &Cli,
    rows: Vec<T>,
) -> anyhow::Result<()> {
    match cli.output {
        OutputFormat::Json => {
            let s = serde_json::to_string_pretty(&rows)?;
            println!("{s}");
            Ok(())
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::DynamicFullWidth);

            if let Some(w) = terminal_width() {
                table.set_width(w);
            }

            table.set_header(ComfyRow::from(
                T::HEADERS
                    .iter()
                    .map(|h| header_cell(cli, h))
                    .collect::<Vec<_>>(),
            ));
            for row in rows {
                table.add_row(ComfyRow::from(row.cells()));
            }
            println!("{table}");
            Ok(())
        }
    }
}

pub(super) fn header_cell(cli: &Cli, text: &str) -> Cell {
    if super::should_color(cli) {
        Cell::new(text)
            .add_attribute(Attribute::Bold)
            .fg(Color::Cyan)
    } else {
        Cell::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(clip_for_table("  Heat shield details ", 40), "Heat shield details");
    }

    #[test]
    fn long_text_is_clipped_by_display_width() {
        let clipped = clip_for_table("number of affected rows by the mutation", 12);
        assert_eq!(clipped, "number of a…");
        assert!(clipped.width() <= 12);

        let wide = clip_for_table("火箭火箭火箭", 5);
        assert_eq!(wide, "火箭…");
    }
}
