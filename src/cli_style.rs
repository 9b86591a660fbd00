//! Terminal styling shared by the interactive binaries.

use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

pub fn get_styles() -> Styles {
    let cyan = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    let green = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let red = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));
    Styles::styled()
        .usage(cyan)
        .header(cyan)
        .literal(green)
        .valid(green)
        .invalid(red)
        .error(red)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

pub mod colors {
    use crossterm::style::Color;

    pub const TEAL: Color = Color::Rgb {
        r: 0,
        g: 200,
        b: 200,
    };
    pub const VIOLET: Color = Color::Rgb {
        r: 150,
        g: 110,
        b: 255,
    };
    pub const CORAL: Color = Color::Rgb {
        r: 255,
        g: 120,
        b: 110,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 230,
        b: 130,
    };
    pub const AMBER: Color = Color::Rgb {
        r: 255,
        g: 180,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

pub mod box_chars {
    pub const DOUBLE_TOP_LEFT: &str = "╔";
    pub const DOUBLE_TOP_RIGHT: &str = "╗";
    pub const DOUBLE_BOTTOM_LEFT: &str = "╚";
    pub const DOUBLE_BOTTOM_RIGHT: &str = "╝";
    pub const DOUBLE_HORIZONTAL: &str = "═";
    pub const DOUBLE_VERTICAL: &str = "║";

    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const NOTE: &str = "♪";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

const SECTION_WIDTH: usize = 60;
const WELCOME_WIDTH: usize = 64;

pub fn print_banner(subtitle: &str) {
    let banner = r#"
    ███╗   ███╗ ██████╗  ██████╗ ██████╗ ██╗    ██╗ █████╗ ██╗   ██╗███████╗
    ████╗ ████║██╔═══██╗██╔═══██╗██╔══██╗██║    ██║██╔══██╗██║   ██║██╔════╝
    ██╔████╔██║██║   ██║██║   ██║██║  ██║██║ █╗ ██║███████║██║   ██║█████╗
    ██║╚██╔╝██║██║   ██║██║   ██║██║  ██║██║███╗██║██╔══██║╚██╗ ██╔╝██╔══╝
    ██║ ╚═╝ ██║╚██████╔╝╚██████╔╝██████╔╝╚███╔███╔╝██║  ██║ ╚████╔╝ ███████╗
    ╚═╝     ╚═╝ ╚═════╝  ╚═════╝ ╚═════╝  ╚══╝╚══╝ ╚═╝  ╚═╝  ╚═══╝  ╚══════╝
"#;

    let gradient = [
        colors::TEAL,
        colors::TEAL,
        colors::VIOLET,
        colors::VIOLET,
        colors::CORAL,
        colors::CORAL,
        colors::CORAL,
    ];
    for (i, line) in banner.lines().enumerate() {
        let color = gradient.get(i).copied().unwrap_or(colors::TEAL);
        println!("{}", line.with(color).bold());
    }

    println!(
        "{}",
        format!("  ═══════════════════  {}  ═══════════════════", subtitle).with(colors::DIM)
    );
    println!();
}

fn print_status(symbol: &str, color: CtColor, message: &str) {
    println!(
        " {} {}",
        symbol.to_string().with(color).bold(),
        message.with(color)
    );
}

pub fn print_success(message: &str) {
    print_status(box_chars::CHECK, colors::GREEN, message);
}

pub fn print_error(message: &str) {
    print_status(box_chars::CROSS_MARK, colors::RED, message);
}

pub fn print_warning(message: &str) {
    print_status("⚠", colors::AMBER, message);
}

pub fn print_info(message: &str) {
    print_status("ℹ", colors::TEAL, message);
}

/// Prints `left`, `fill` repeated `width` times, then `right`.
fn print_rule(left: &str, fill: &str, right: &str, width: usize, color: CtColor) {
    println!(
        "{}{}{}",
        left.with(color),
        fill.repeat(width).with(color),
        right.with(color)
    );
}

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;
    let trailing = SECTION_WIDTH.saturating_sub(title_len + 4 + padding);

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::ROUND_TOP_LEFT.with(colors::TEAL),
        box_chars::HORIZONTAL.repeat(padding).with(colors::TEAL),
        title
            .with(colors::TEAL)
            .bold()
            .attribute(Attribute::Italic),
        box_chars::HORIZONTAL.repeat(trailing).with(colors::TEAL),
        box_chars::ROUND_TOP_RIGHT.with(colors::TEAL)
    );
}

pub fn print_section_footer() {
    print_rule(
        box_chars::ROUND_BOTTOM_LEFT,
        box_chars::HORIZONTAL,
        box_chars::ROUND_BOTTOM_RIGHT,
        SECTION_WIDTH,
        colors::TEAL,
    );
    println!();
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::VIOLET),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    println!(
        "{}{}  {}",
        "  ".repeat(indent),
        box_chars::ARROW_RIGHT.with(colors::TEAL),
        item.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

pub fn print_heading(text: &str) {
    println!(
        "  {} {}",
        box_chars::DIAMOND.with(colors::CORAL),
        text.with(colors::TEAL).bold()
    );
}

pub fn print_subtitle(text: &str) {
    println!("    {}", text.with(colors::DIM).attribute(Attribute::Italic));
}

/// A numbered track line: `♪ 1. Title - Artist`, with an optional dimmed
/// note underneath.
pub fn print_track(position: usize, title: &str, artist: &str, note: Option<&str>) {
    println!(
        "  {} {} {} {} {}",
        box_chars::NOTE.with(colors::CORAL).bold(),
        format!("{}.", position).with(colors::DIM),
        title.with(colors::WHITE).bold(),
        "-".with(colors::DIM),
        artist.with(colors::VIOLET)
    );
    if let Some(note) = note {
        println!("       {}", note.with(colors::DIM).attribute(Attribute::Italic));
    }
}

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.width()).collect();
        TableBuilder {
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
            col_widths,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.col_widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(row);
    }

    fn print_border(&self, left: &str, junction: &str, right: &str) {
        let segments = self
            .col_widths
            .iter()
            .map(|width| box_chars::HORIZONTAL.repeat(width + 2))
            .collect::<Vec<_>>()
            .join(junction);
        println!(
            "{}{}{}",
            left.with(colors::TEAL),
            segments.with(colors::TEAL),
            right.with(colors::TEAL)
        );
    }

    fn print_cells(&self, cells: &[String], header: bool) {
        print!("{}", box_chars::VERTICAL.with(colors::TEAL));
        for (i, width) in self.col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = " ".repeat(width.saturating_sub(cell.width()));
            if header {
                print!(" {}{} ", cell.with(colors::TEAL).bold(), padding);
            } else {
                print!(" {}{} ", cell.with(colors::WHITE), padding);
            }
            print!("{}", box_chars::VERTICAL.with(colors::TEAL));
        }
        println!();
    }

    pub fn print(&self) {
        if self.col_widths.is_empty() {
            return;
        }
        self.print_border(
            box_chars::ROUND_TOP_LEFT,
            box_chars::T_TOP,
            box_chars::ROUND_TOP_RIGHT,
        );
        self.print_cells(&self.headers, true);
        self.print_border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT);
        for row in &self.rows {
            self.print_cells(row, false);
        }
        self.print_border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        );
    }
}

pub fn get_prompt() -> String {
    format!(
        "{}{}{} ",
        "❯".with(colors::TEAL).bold(),
        "❯".with(colors::VIOLET).bold(),
        "❯".with(colors::CORAL).bold(),
    )
}

pub fn print_command_echo(command: &str) {
    println!(
        "{}  {}",
        get_prompt().trim_end(),
        command.with(colors::GREEN).bold()
    );
}

fn print_boxed_line(content: &str, visible_width: usize) {
    println!(
        "  {}{}{}{}",
        box_chars::DOUBLE_VERTICAL.with(colors::VIOLET),
        content,
        " ".repeat(WELCOME_WIDTH.saturating_sub(visible_width)),
        box_chars::DOUBLE_VERTICAL.with(colors::VIOLET)
    );
}

/// Banner plus a framed summary of what the tool is connected to.
pub fn print_welcome(subtitle: &str, headline: &str, details: &[(&str, &str)]) {
    print_banner(subtitle);

    print!("  ");
    print_rule(
        box_chars::DOUBLE_TOP_LEFT,
        box_chars::DOUBLE_HORIZONTAL,
        box_chars::DOUBLE_TOP_RIGHT,
        WELCOME_WIDTH,
        colors::VIOLET,
    );

    print_boxed_line(
        &format!("  {}", headline.with(colors::GREEN)),
        headline.width() + 2,
    );
    print_boxed_line("", 0);
    for (key, value) in details {
        let content = format!("  {} {}", format!("{}:", key).with(colors::DIM), value);
        print_boxed_line(&content, key.width() + value.width() + 4);
    }
    print_boxed_line("", 0);
    let help_msg = "  Type 'help' for available commands";
    print_boxed_line(&help_msg.with(colors::DIM).to_string(), help_msg.width());

    print!("  ");
    print_rule(
        box_chars::DOUBLE_BOTTOM_LEFT,
        box_chars::DOUBLE_HORIZONTAL,
        box_chars::DOUBLE_BOTTOM_RIGHT,
        WELCOME_WIDTH,
        colors::VIOLET,
    );
    println!();
}

pub struct CommandHelp {
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

/// A titled set of commands shown together in the help screen.
pub struct CommandGroup<'a> {
    pub title: &'static str,
    pub commands: &'a [CommandHelp],
}

pub fn print_help(groups: &[CommandGroup]) {
    let group_colors = [colors::TEAL, colors::CORAL, colors::VIOLET, colors::AMBER];

    println!();
    print_section_header("Available Commands");
    println!();

    for (group, color) in groups.iter().zip(group_colors.iter().cycle()) {
        println!(
            "  {} {}",
            box_chars::DIAMOND.with(*color),
            group.title.with(*color).bold()
        );
        for cmd in group.commands {
            println!(
                "      {} {}  {}",
                cmd.name.with(colors::GREEN).bold(),
                cmd.args.with(colors::DIM),
                cmd.description.with(colors::WHITE)
            );
        }
        println!();
    }

    print_section_footer();
}

pub fn print_goodbye(app_name: &str) {
    println!();
    println!(
        "  {} {}",
        box_chars::NOTE.with(colors::TEAL),
        format!("Goodbye! Thanks for using {}", app_name)
            .with(colors::VIOLET)
            .bold()
    );
    println!();
}

pub fn flush() {
    let _ = io::stdout().flush();
}
