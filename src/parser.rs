//! Partitioning a token sequence into pipeline segments.

/// The reserved token that separates pipeline stages.
///
/// There is no escaping mechanism, so this literal can never be passed to a
/// program as an argument.
pub const PIPE_TOKEN: &str = "|";

/// An ordered sequence of argument vectors, one per pipeline stage.
///
/// Parsing is a single linear scan: every free-standing [`PIPE_TOKEN`]
/// closes the current segment, even an empty one. Separators at the start
/// or end of the line, or two adjacent separators, therefore produce empty
/// segments. Those are deliberately kept: launching an empty segment later
/// fails the same controlled way an unknown command does, instead of being
/// rejected up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    segments: Vec<Vec<String>>,
}

impl Pipeline {
    /// Partition `tokens` into segments.
    ///
    /// Always yields at least one segment; an empty token sequence parses
    /// to a single empty segment.
    pub fn parse(tokens: Vec<String>) -> Self {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for token in tokens {
            if token == PIPE_TOKEN {
                segments.push(std::mem::take(&mut current));
            } else {
                current.push(token);
            }
        }
        segments.push(current);
        Self { segments }
    }

    /// Whether the line contained at least one separator.
    pub fn is_pipeline(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn segments(&self) -> &[Vec<String>] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Vec<String>> {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::Pipeline;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn no_separator_is_a_single_segment() {
        let p = Pipeline::parse(argv(&["ls", "-la"]));
        assert!(!p.is_pipeline());
        assert_eq!(p.segments(), &[argv(&["ls", "-la"])]);
    }

    #[test]
    fn separator_splits_into_two_segments() {
        let p = Pipeline::parse(argv(&["ls", "|", "wc", "-l"]));
        assert!(p.is_pipeline());
        assert_eq!(p.segments(), &[argv(&["ls"]), argv(&["wc", "-l"])]);
    }

    #[test]
    fn empty_input_is_a_single_empty_segment() {
        let p = Pipeline::parse(Vec::new());
        assert!(!p.is_pipeline());
        assert_eq!(p.segments(), &[Vec::<String>::new()]);
    }

    #[test]
    fn boundary_separators_keep_empty_segments() {
        let leading = Pipeline::parse(argv(&["|", "wc"]));
        assert_eq!(leading.segments(), &[argv(&[]), argv(&["wc"])]);

        let trailing = Pipeline::parse(argv(&["ls", "|"]));
        assert_eq!(trailing.segments(), &[argv(&["ls"]), argv(&[])]);
    }

    #[test]
    fn adjacent_separators_keep_the_empty_middle_segment() {
        let p = Pipeline::parse(argv(&["ls", "|", "|", "wc"]));
        assert_eq!(
            p.segments(),
            &[argv(&["ls"]), argv(&[]), argv(&["wc"])]
        );
    }
}
