use inksac::prelude::*;

/// Colours diagnostics when the terminal supports it.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn highlight_error(&self, error: &str) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return error.to_string();
        }

        let error_style = Style::builder()
            .foreground(Color::Red)
            .bold()
            .build();

        error.style(error_style).to_string()
    }

    pub fn highlight_warning(&self, warning: &str) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return warning.to_string();
        }

        let warning_style = Style::builder()
            .foreground(Color::Yellow)
            .build();

        warning.style(warning_style).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_color_passthrough() {
        let highlighter = SyntaxHighlighter {
            color_support: ColorSupport::NoColor,
        };
        assert_eq!(highlighter.highlight_error("osh: oops"), "osh: oops");
        assert_eq!(highlighter.highlight_warning("careful"), "careful");
    }

    #[test]
    fn test_message_survives_styling() {
        let highlighter = SyntaxHighlighter::new();
        assert!(highlighter.highlight_error("osh: oops").contains("osh: oops"));
        assert!(highlighter
            .highlight_warning("Process exited with status: 1")
            .contains("Process exited with status: 1"));
    }
}
