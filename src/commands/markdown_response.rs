//! Markdown response formatters for bot commands.
//!
//! Every text goes through a [`Localizer`]; these functions only assemble the
//! localized pieces and format numbers.

use crate::{
    commands::command::Command,
    locale::Localizer,
    servers::{Mode, PlayerRecord, RankedEntry, Score},
};

/// Formats the help message of a server.
///
/// Lists the commands of the server in registration order, with their usage.
///
/// # Arguments
///
/// * `localizer` - Text lookup service
/// * `server` - Display name of the server
/// * `link` - Website of the server
/// * `commands` - Commands of the server
/// * `prefix_alias` - Prefix and alias of the server, such as `!bancho`
pub fn format_help<'a>(
    localizer: &dyn Localizer,
    server: &str,
    link: &str,
    commands: impl Iterator<Item = &'a Command>,
    prefix_alias: &str,
) -> String {
    let lines = commands
        .map(|command| {
            let usage = format!("{} {} {}", prefix_alias, command.name, command.usage);
            let description = localizer.text(&format!("help_{}", command.name), &[]);
            localizer.text(
                "help_line",
                &[("usage", usage.trim_end()), ("description", &description)],
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        "{}\n\n{}",
        localizer.text("help_header", &[("server", server), ("link", link)]),
        lines
    )
}

/// Formats the usage reminder of a command.
pub fn format_usage(localizer: &dyn Localizer, command: &Command, prefix_alias: &str) -> String {
    let usage = format!("{} {} {}", prefix_alias, command.name, command.usage);
    localizer.text("usage", &[("usage", usage.trim_end())])
}

/// Formats a performance value, `-` when absent.
fn format_performance(performance: Option<f64>) -> String {
    match performance {
        Some(performance) => format!("{:.0}pp", performance),
        None => "-".to_owned(),
    }
}

/// Formats the profile of a player.
///
/// A rank of 0 is shown as unranked.
pub fn format_profile(localizer: &dyn Localizer, record: &PlayerRecord) -> String {
    let rank = match record.rank {
        0 => localizer.text("unranked", &[]),
        rank => format!("#{}", rank),
    };

    localizer.text(
        "profile",
        &[
            ("nickname", &record.nickname),
            ("mode", record.mode.name()),
            ("country", record.country.as_deref().unwrap_or("-")),
            ("rank", &rank),
            ("performance", &format!("{:.0}", record.performance)),
            ("accuracy", &format!("{:.2}", record.accuracy)),
            ("play_count", &record.play_count.to_string()),
        ],
    )
}

/// Formats a numbered list of scores under a header.
pub fn format_scores(localizer: &dyn Localizer, header: String, scores: &[Score]) -> String {
    let lines = scores
        .iter()
        .enumerate()
        .map(|(index, score)| {
            localizer.text(
                "score_line",
                &[
                    ("index", &(index + 1).to_string()),
                    ("title", &score.title),
                    ("mods", &score.mods.to_string()),
                    ("accuracy", &format!("{:.2}", score.accuracy)),
                    ("grade", &score.grade),
                    ("combo", &score.max_combo.to_string()),
                    ("performance", &format_performance(score.performance)),
                ],
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("{}\n\n{}", header, lines)
}

/// Formats a leaderboard under a header.
pub fn format_leaderboard(localizer: &dyn Localizer, header: String, entries: &[RankedEntry]) -> String {
    let lines = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            localizer.text(
                "leaderboard_line",
                &[
                    ("index", &(index + 1).to_string()),
                    ("nickname", &entry.nickname),
                    ("rank", &entry.rank.to_string()),
                    ("performance", &format!("{:.0}", entry.performance)),
                    ("accuracy", &format!("{:.2}", entry.accuracy)),
                ],
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("{}\n\n{}", header, lines)
}

/// Formats the list of valid modes, for corrective replies.
pub fn format_modes() -> String {
    Mode::ALL
        .iter()
        .map(|mode| format!("{} ({})", mode.name(), mode.index()))
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{locale::Catalog, servers::Mods};

    fn create_test_record(rank: u64) -> PlayerRecord {
        PlayerRecord {
            player_id: "42".to_owned(),
            nickname: "Alice".to_owned(),
            mode: Mode::Taiko,
            rank,
            performance: 4321.4,
            accuracy: 98.766,
            play_count: 5000,
            country: Some("FR".to_owned()),
        }
    }

    #[test]
    fn test_format_profile() {
        let profile = format_profile(&Catalog::english(), &create_test_record(120));

        assert!(profile.contains("**Alice**"));
        assert!(profile.contains("#120"));
        assert!(profile.contains("4321pp"));
        assert!(profile.contains("98.77%"));
    }

    #[test]
    fn test_format_profile_unranked() {
        let profile = format_profile(&Catalog::english(), &create_test_record(0));
        assert!(profile.contains("Rank: unranked"));
    }

    #[test]
    fn test_format_scores() {
        let scores = [Score {
            score_id: None,
            beatmap_id: "75".to_owned(),
            title: "DISCOPRINCE".to_owned(),
            mods: Mods(8 | 64),
            accuracy: 97.5,
            performance: None,
            grade: "A".to_owned(),
            max_combo: 314,
        }];

        let text = format_scores(&Catalog::english(), "Header".to_owned(), &scores);

        assert_eq!(text, "Header\n\n1. DISCOPRINCE +HDDT 97.50% A x314 -");
    }

    #[test]
    fn test_format_leaderboard() {
        let entries = [RankedEntry::from(&create_test_record(3))];

        let text = format_leaderboard(&Catalog::english(), "Header".to_owned(), &entries);

        assert_eq!(text, "Header\n\n1. **Alice** #3 4321pp 98.77%");
    }

    #[test]
    fn test_format_modes() {
        assert_eq!(format_modes(), "standard (0), taiko (1), fruits (2), mania (3)");
    }
}
