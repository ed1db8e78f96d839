//! Typed arguments of a command.
//!
//! Every command receives the tokens following its alias. They are turned into
//! an [`ArgumentBundle`]: an optional leading game mode, optional score
//! modifiers and the free text usually naming a player.

use log::debug;

use crate::servers::{Mode, Mods};

/// Arguments of one command invocation.
///
/// Built once per invocation and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentBundle {
    /// Mode given as first token, `None` when unspecified
    pub mode: Option<Mode>,
    /// Modifier tokens such as `+HDDT`, only split off when requested
    pub modifiers: Vec<String>,
    /// Free text tokens, usually a nickname or an id
    pub nickname: Vec<String>,
    /// Every token following the mode token, verbatim
    pub full: Vec<String>,
}

impl ArgumentBundle {
    /// Parses the tokens following a command alias.
    ///
    /// When the first token is a mode indicator (see [`Mode::from_token`]) it
    /// sets `mode` and is consumed. The remaining tokens become both
    /// `nickname` and `full`.
    ///
    /// An empty token list is valid and gives an empty bundle.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scorebot::commands::arguments::ArgumentBundle;
    /// # use scorebot::servers::Mode;
    /// let tokens = vec!["taiko".to_owned(), "Alice".to_owned()];
    /// let bundle = ArgumentBundle::parse(&tokens);
    /// assert_eq!(bundle.mode, Some(Mode::Taiko));
    /// assert_eq!(bundle.nickname, vec!["Alice"]);
    /// ```
    pub fn parse(tokens: &[String]) -> Self {
        let (mode, rest) = match tokens.split_first() {
            Some((first, rest)) => match Mode::from_token(first) {
                Some(mode) => (Some(mode), rest),
                None => (None, tokens),
            },
            None => (None, tokens),
        };

        let bundle = ArgumentBundle {
            mode,
            modifiers: Vec::new(),
            nickname: rest.to_vec(),
            full: rest.to_vec(),
        };

        debug!("parsed arguments {:?}", bundle);

        bundle
    }

    /// Parses the tokens like [`Self::parse`], then moves the modifier tokens
    /// out of `nickname`.
    ///
    /// Modifier tokens start with `+`. They are kept in `full`, so the raw
    /// text is never altered.
    pub fn parse_with_mods(tokens: &[String]) -> Self {
        let mut bundle = Self::parse(tokens);
        let (modifiers, nickname): (Vec<String>, Vec<String>) = bundle
            .nickname
            .into_iter()
            .partition(|token| token.starts_with('+') && token.len() > 1);

        bundle.modifiers = modifiers;
        bundle.nickname = nickname;
        bundle
    }

    /// Nickname tokens joined with spaces, `None` when there is none.
    pub fn joined_nickname(&self) -> Option<String> {
        if self.nickname.is_empty() {
            None
        } else {
            Some(self.nickname.join(" "))
        }
    }

    /// Combined modifiers, `None` when no valid modifier was given.
    pub fn mods(&self) -> Option<Mods> {
        let mods = Mods::from_tokens(&self.modifiers);
        if mods.is_empty() { None } else { Some(mods) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn test_parse_empty() {
        let bundle = ArgumentBundle::parse(&[]);
        assert_eq!(bundle, ArgumentBundle::default());
        assert_eq!(bundle.joined_nickname(), None);
    }

    #[test]
    fn test_parse_mode_synonyms() {
        for (token, mode) in [
            ("standard", Mode::Standard),
            ("OSU", Mode::Standard),
            ("Taiko", Mode::Taiko),
            ("ctb", Mode::Fruits),
            ("fruits", Mode::Fruits),
            ("MANIA", Mode::Mania),
            ("0", Mode::Standard),
            ("1", Mode::Taiko),
            ("2", Mode::Fruits),
            ("3", Mode::Mania),
        ] {
            let bundle = ArgumentBundle::parse(&tokens(&format!("{} Alice Smith", token)));
            assert_eq!(bundle.mode, Some(mode), "token {}", token);
            assert_eq!(bundle.nickname, vec!["Alice", "Smith"]);
            assert_eq!(bundle.full, vec!["Alice", "Smith"]);
        }
    }

    #[test]
    fn test_parse_unrecognized_first_token() {
        let bundle = ArgumentBundle::parse(&tokens("Alice taiko 4"));
        assert_eq!(bundle.mode, None);
        assert_eq!(bundle.nickname, vec!["Alice", "taiko", "4"]);
        assert_eq!(bundle.full, vec!["Alice", "taiko", "4"]);
    }

    #[test]
    fn test_parse_out_of_range_integer() {
        let bundle = ArgumentBundle::parse(&tokens("4 Alice"));
        assert_eq!(bundle.mode, None);
        assert_eq!(bundle.nickname, vec!["4", "Alice"]);
    }

    #[test]
    fn test_parse_empty_first_token() {
        let bundle = ArgumentBundle::parse(&["".to_owned(), "Alice".to_owned()]);
        assert_eq!(bundle.mode, None);
        assert_eq!(bundle.full, vec!["", "Alice"]);
    }

    #[test]
    fn test_parse_mode_only() {
        let bundle = ArgumentBundle::parse(&tokens("taiko"));
        assert_eq!(bundle.mode, Some(Mode::Taiko));
        assert!(bundle.nickname.is_empty());
        assert!(bundle.full.is_empty());
    }

    #[test]
    fn test_parse_does_not_split_modifiers() {
        let bundle = ArgumentBundle::parse(&tokens("Alice +HD"));
        assert!(bundle.modifiers.is_empty());
        assert_eq!(bundle.nickname, vec!["Alice", "+HD"]);
    }

    #[test]
    fn test_parse_with_mods() {
        let bundle = ArgumentBundle::parse_with_mods(&tokens("mania 1234 +HD +DT"));
        assert_eq!(bundle.mode, Some(Mode::Mania));
        assert_eq!(bundle.modifiers, vec!["+HD", "+DT"]);
        assert_eq!(bundle.nickname, vec!["1234"]);
        assert_eq!(bundle.full, vec!["1234", "+HD", "+DT"]);
        assert_eq!(bundle.mods(), Some(Mods(8 | 64)));
    }

    #[test]
    fn test_parse_with_mods_none() {
        let bundle = ArgumentBundle::parse_with_mods(&tokens("1234 +"));
        assert!(bundle.modifiers.is_empty());
        assert_eq!(bundle.nickname, vec!["1234", "+"]);
        assert_eq!(bundle.mods(), None);
    }

    #[test]
    fn test_joined_nickname() {
        let bundle = ArgumentBundle::parse(&tokens("Nickname With Spaces"));
        assert_eq!(bundle.joined_nickname(), Some("Nickname With Spaces".to_owned()));
    }
}
