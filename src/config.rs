//! Parser Configuration
//!
//! Each parser owns an immutable copy of its options, so independent
//! streamers never share mutable settings.

/// Default read size of file-backed providers
pub const DEFAULT_CHUNK_SIZE: usize = 16384;

/// Default read size of the standard input provider
pub const DEFAULT_STDIN_CHUNK_SIZE: usize = 1024;

/// Node selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Emit every element found at a fixed nesting depth
    #[default]
    DepthCapture,
    /// Emit every element with a given name
    NamedElement,
}

/// Options recognised by both strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    pub strategy: Strategy,
    /// Number of ancestors of the captured element: 0 is the root, 1 its children
    pub capture_depth: usize,
    /// Element to capture with [`Strategy::NamedElement`]
    pub element_name: Option<String>,
    /// Search for the real end of comments and CDATA containing `>`
    pub allow_literal_gt: bool,
    /// Collect markup outside the captured nodes
    pub extract_container: bool,
    /// Also accept `<name .../>` as a complete named element
    pub check_short_closing: bool,
    /// Read size used by the file-backed convenience constructors
    pub chunk_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            strategy: Strategy::DepthCapture,
            capture_depth: 1,
            element_name: None,
            allow_literal_gt: false,
            extract_container: false,
            check_short_closing: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ParserOptions {
    /// Options for the depth-capture strategy
    pub fn depth_capture(capture_depth: usize) -> Self {
        ParserOptions {
            capture_depth,
            ..Self::default()
        }
    }

    /// Options for the named-element strategy
    pub fn named_element(name: impl Into<String>) -> Self {
        ParserOptions {
            strategy: Strategy::NamedElement,
            element_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_capture_depth(mut self, capture_depth: usize) -> Self {
        self.capture_depth = capture_depth;
        self
    }

    pub fn with_element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    pub fn with_literal_gt(mut self, allow: bool) -> Self {
        self.allow_literal_gt = allow;
        self
    }

    pub fn with_container(mut self, extract: bool) -> Self {
        self.extract_container = extract;
        self
    }

    pub fn with_short_closing(mut self, check: bool) -> Self {
        self.check_short_closing = check;
        self
    }

    /// Set the read size. Zero is bumped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ParserOptions::default();
        assert_eq!(opts.strategy, Strategy::DepthCapture);
        assert_eq!(opts.capture_depth, 1);
        assert_eq!(opts.element_name, None);
        assert!(!opts.allow_literal_gt);
        assert!(!opts.extract_container);
        assert!(!opts.check_short_closing);
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_named_element_builder() {
        let opts = ParserOptions::named_element("child")
            .with_short_closing(true)
            .with_chunk_size(0);
        assert_eq!(opts.strategy, Strategy::NamedElement);
        assert_eq!(opts.element_name.as_deref(), Some("child"));
        assert!(opts.check_short_closing);
        assert_eq!(opts.chunk_size, 1);
    }
}
