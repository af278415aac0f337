use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Color as CtColor, Stylize};
use estate_accounts::{user::UserSettings, Locale, Notification, UserView};
use unicode_width::UnicodeWidthStr;

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    let good = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let bad = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));
    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(good)
        .valid(good)
        .invalid(bad)
        .error(bad)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

/// Sand & Nile palette.
mod palette {
    use crossterm::style::Color;

    pub const GOLD: Color = Color::Rgb {
        r: 230,
        g: 180,
        b: 80,
    };
    pub const SAND: Color = Color::Rgb {
        r: 240,
        g: 215,
        b: 160,
    };
    pub const NILE: Color = Color::Rgb {
        r: 0,
        g: 170,
        b: 170,
    };
    pub const OK: Color = Color::Rgb {
        r: 80,
        g: 200,
        b: 120,
    };
    pub const WARN: Color = Color::Rgb {
        r: 255,
        g: 140,
        b: 60,
    };
    pub const FAIL: Color = Color::Rgb {
        r: 235,
        g: 80,
        b: 80,
    };
    pub const MUTED: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

const CARD_WIDTH: usize = 56;
const LABEL_WIDTH: usize = 22;

pub fn print_success(message: &str) {
    println!(" {} {}", "✓".with(palette::OK).bold(), message.with(palette::OK));
}

pub fn print_error(message: &str) {
    println!(" {} {}", "✗".with(palette::FAIL).bold(), message.with(palette::FAIL));
}

pub fn print_warning(message: &str) {
    println!(" {} {}", "⚠".with(palette::WARN).bold(), message.with(palette::WARN));
}

/// Right-pads `text` to `width` terminal columns. Arabic and emoji titles
/// don't line up when padded by byte or char count.
fn pad(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width())))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn settings_summary(settings: &UserSettings) -> String {
    format!(
        "email {} · price alerts {} · new listings {}",
        yes_no(settings.email_notifications),
        yes_no(settings.price_alerts),
        yes_no(settings.new_listings)
    )
}

fn card_top(title: &str) {
    let rule = CARD_WIDTH.saturating_sub(title.width() + 3);
    println!();
    println!(
        "{} {} {}",
        "╭─".with(palette::NILE),
        title.with(palette::GOLD).bold(),
        "─".repeat(rule).with(palette::NILE)
    );
}

fn card_line(label: &str, value: &str, color: CtColor) {
    println!(
        "{} {}{}",
        "│".with(palette::NILE),
        pad(label, LABEL_WIDTH).with(palette::MUTED),
        value.with(color)
    );
}

fn card_bottom() {
    println!(
        "{}{}",
        "╰".with(palette::NILE),
        "─".repeat(CARD_WIDTH).with(palette::NILE)
    );
    println!();
}

pub fn print_user_card(user: &UserView) {
    let unread = user.notifications.iter().filter(|n| !n.read).count();

    card_top(&user.full_name());
    card_line("Email", &user.email, palette::SAND);
    card_line("Id", &user.id, palette::MUTED);
    card_line("Phone", user.phone.as_deref().unwrap_or("-"), palette::SAND);
    card_line("Avatar", user.avatar.as_deref().unwrap_or("-"), palette::SAND);
    card_line(
        "Member since",
        &user.created_at.format("%Y-%m-%d").to_string(),
        palette::SAND,
    );
    card_line(
        "Favorites",
        &user.favorites.len().to_string(),
        palette::SAND,
    );
    card_line(
        "Unread notifications",
        &unread.to_string(),
        if unread > 0 { palette::GOLD } else { palette::SAND },
    );
    card_line("Settings", &settings_summary(&user.settings), palette::SAND);
    card_bottom();
}

pub fn print_favorites(favorites: &[String]) {
    card_top(&format!("Favorites ({})", favorites.len()));
    if favorites.is_empty() {
        card_line("", "no favorite properties yet", palette::MUTED);
    }
    for property_id in favorites {
        println!(
            "{} {} {}",
            "│".with(palette::NILE),
            "♥".with(palette::FAIL),
            property_id.as_str().with(palette::SAND)
        );
    }
    card_bottom();
}

/// Newest first, unread entries marked with a filled dot.
pub fn print_notifications(notifications: &[Notification], locale: Locale) {
    let unread = notifications.iter().filter(|n| !n.read).count();
    card_top(&format!("Notifications ({} unread)", unread));
    if notifications.is_empty() {
        card_line("", "nothing here", palette::MUTED);
    }
    for notification in notifications {
        let (marker, title_color) = if notification.read {
            ("○".with(palette::MUTED), palette::MUTED)
        } else {
            ("●".with(palette::GOLD), palette::SAND)
        };
        println!(
            "{} {} {} {}",
            "│".with(palette::NILE),
            marker,
            notification.localized_title(locale).with(title_color).bold(),
            format!("[{}]", notification.notification_type).with(palette::NILE)
        );
        let message = notification.localized_message(locale);
        if !message.is_empty() {
            println!("{}     {}", "│".with(palette::NILE), message);
        }
        println!(
            "{}     {} {} {}",
            "│".with(palette::NILE),
            notification.id.as_str().with(palette::MUTED),
            notification
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .with(palette::MUTED),
            notification.link_or_default().with(palette::MUTED)
        );
    }
    card_bottom();
}

pub fn print_unread_count(count: usize) {
    let badge = format!(" {} ", count);
    let badge = if count > 0 {
        badge.with(CtColor::Black).on(palette::GOLD).bold()
    } else {
        badge.with(palette::MUTED)
    };
    println!(" {} unread notifications", badge);
}

pub fn print_location(backend: &str, location: &str) {
    println!(
        " {} {} {}",
        pad(backend, 10).with(palette::NILE).bold(),
        "→".with(palette::MUTED),
        location.with(palette::SAND)
    );
}

pub fn get_prompt(logged_in_as: Option<&str>) -> String {
    let who = match logged_in_as {
        Some(email) => email.with(palette::SAND),
        None => "guest".with(palette::MUTED),
    };
    format!("{} {} ", who, "❯".with(palette::GOLD).bold())
}

pub fn print_command_echo(command: &str) {
    println!(
        "{}  {}",
        "❯".with(palette::GOLD).bold(),
        command.with(palette::OK).bold()
    );
}

pub fn print_banner(backend: &str, location: &str) {
    println!(
        "{} {}",
        "ESTATE ACCOUNTS".with(palette::GOLD).bold(),
        env!("CARGO_PKG_VERSION").with(palette::MUTED)
    );
    print_location(backend, location);
    println!(
        " {}",
        "Type 'help' for available commands".with(palette::MUTED)
    );
    println!();
}

pub struct CommandHelp {
    pub name: String,
    pub description: String,
}

const HELP_GROUPS: &[(&str, &[&str])] = &[
    (
        "Account",
        &["register", "login", "logout", "whoami", "update-profile"],
    ),
    ("Favorites", &["add-favorite", "remove-favorite", "favorites"]),
    (
        "Notifications",
        &["notify", "notifications", "read", "unread", "welcome"],
    ),
    ("Session", &["where", "help", "exit"]),
];

pub fn print_help(commands: &[CommandHelp]) {
    let name_width = commands.iter().map(|c| c.name.width()).max().unwrap_or(0);
    card_top("Available Commands");
    for (group, names) in HELP_GROUPS {
        println!("{} {}", "│".with(palette::NILE), group.with(palette::GOLD).bold());
        for command in commands.iter().filter(|c| names.contains(&c.name.as_str())) {
            println!(
                "{}   {}  {}",
                "│".with(palette::NILE),
                pad(&command.name, name_width).with(palette::OK).bold(),
                command.description.as_str()
            );
        }
    }
    card_bottom();
}

pub fn print_goodbye() {
    println!();
    println!(" {}", "Goodbye! / مع السلامة".with(palette::GOLD).bold());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_by_display_width() {
        assert_eq!(pad("abc", 5), "abc  ");
        assert_eq!(pad("abcdef", 3), "abcdef");
        // Wide glyphs take two columns each
        assert_eq!(pad("房", 4), "房  ");
    }

    #[test]
    fn summarizes_settings() {
        let settings = UserSettings {
            email_notifications: true,
            price_alerts: false,
            new_listings: true,
        };
        assert_eq!(
            settings_summary(&settings),
            "email on · price alerts off · new listings on"
        );
    }

    #[test]
    fn every_help_group_entry_is_distinct() {
        let mut names: Vec<&str> = HELP_GROUPS
            .iter()
            .flat_map(|(_, names)| names.iter().copied())
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
