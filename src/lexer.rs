//! Lexical analysis: splitting a raw input line into tokens.

/// Characters that end a token.
///
/// The same delimiter set as the classic `strtok(line, " \t\r\n\a")` call:
/// blanks, tabs, line terminators and the BEL character.
const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\u{7}'];

/// Split an input line into an ordered sequence of tokens.
///
/// Tokens are maximal runs of non-delimiter characters, in source order;
/// empty tokens are never produced, so a line of pure whitespace yields an
/// empty sequence. There is no quoting or escaping: every character of a
/// token is literal, and `|` only acts as the pipeline separator when it
/// stands alone as a token of its own.
pub fn split_line(line: &str) -> Vec<String> {
    line.split(|c| DELIMITERS.contains(&c))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::split_line;

    #[test]
    fn splits_on_single_spaces() {
        assert_eq!(split_line("ls -la"), vec!["ls", "-la"]);
    }

    #[test]
    fn runs_of_whitespace_yield_no_empty_tokens() {
        assert_eq!(split_line("ls \t  -la\r\n"), vec!["ls", "-la"]);
    }

    #[test]
    fn bell_character_is_a_delimiter() {
        assert_eq!(split_line("ls\u{7}-la"), vec!["ls", "-la"]);
    }

    #[test]
    fn whitespace_only_line_yields_nothing() {
        assert!(split_line(" \t ").is_empty());
        assert!(split_line("").is_empty());
    }

    #[test]
    fn pipe_glued_to_a_word_stays_in_the_word() {
        // Without quoting rules the lexer has no opinion on `|`; only the
        // parser treats a free-standing "|" specially.
        assert_eq!(split_line("ls|wc"), vec!["ls|wc"]);
        assert_eq!(split_line("ls | wc"), vec!["ls", "|", "wc"]);
    }
}
