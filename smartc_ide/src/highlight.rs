//! # Assembly Highlighter
//!
//! Colorizer for SmartC assembly listings. Output is HTML: every token is
//! escaped and wrapped in a `<span>` whose class names its kind.
//!
//! | Token | Class |
//! |---|---|
//! | `^comment ...` (whole line) | `asm_comment` |
//! | `^declare`, `^const`, ... | `asm_directive` |
//! | `label:` / `:label` | `asm_label` |
//! | `SET`, `JMP`, ... (first word) | `asm_instruction` |
//! | `@var`, `$var` | `asm_variable` |
//! | `#0000000000000005`, `42` | `asm_number` |

use compile_orchestrator::{Colorizer, ColorizerConfig, RenderError};

/// SmartC assembly colorizer
#[derive(Debug, Clone, Copy, Default)]
pub struct AsmHighlighter;

impl AsmHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn color_line(line: &str) -> String {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let mut out = escape(indent);

        if trimmed.starts_with("^comment") {
            out.push_str(&span("asm_comment", trimmed));
            return out;
        }

        for (index, word) in trimmed.split(' ').enumerate() {
            if index > 0 {
                out.push(' ');
            }
            if word.is_empty() {
                continue;
            }
            let class = if index == 0 {
                Self::head_class(word)
            } else {
                Self::operand_class(word)
            };
            match class {
                Some(class) => out.push_str(&span(class, word)),
                None => out.push_str(&escape(word)),
            }
        }
        out
    }

    fn head_class(word: &str) -> Option<&'static str> {
        if word.starts_with('^') {
            Some("asm_directive")
        } else if word.len() > 1 && word.ends_with(':') {
            Some("asm_label")
        } else {
            Some("asm_instruction")
        }
    }

    fn operand_class(word: &str) -> Option<&'static str> {
        let first = word.chars().next()?;
        match first {
            '@' | '$' => Some("asm_variable"),
            '#' => Some("asm_number"),
            ':' => Some("asm_label"),
            c if c.is_ascii_digit() => Some("asm_number"),
            _ => None,
        }
    }
}

impl Colorizer for AsmHighlighter {
    fn color_text(&self, assembly: &str, config: &ColorizerConfig) -> Result<String, RenderError> {
        if let Some(c) = assembly
            .chars()
            .find(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        {
            return Err(RenderError::Colorizer(format!(
                "unexpected control character U+{:04X}",
                c as u32
            )));
        }

        let mut out = config.pre_all.clone();
        for line in assembly.lines() {
            out.push_str(&config.pre_line);
            out.push_str(&Self::color_line(line));
            out.push_str(&config.post_line);
        }
        Ok(out)
    }
}

fn span(class: &str, text: &str) -> String {
    format!("<span class=\"{}\">{}</span>", class, escape(text))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(asm: &str) -> String {
        AsmHighlighter::new()
            .color_text(asm, &ColorizerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_instruction_and_operands() {
        assert_eq!(
            color("SET @a #0000000000000005"),
            "<span class=\"asm_instruction\">SET</span> \
             <span class=\"asm_variable\">@a</span> \
             <span class=\"asm_number\">#0000000000000005</span><br>"
        );
    }

    #[test]
    fn test_directive_and_label() {
        assert_eq!(
            color("^declare a\n__fn_main:"),
            "<span class=\"asm_directive\">^declare</span> a<br>\
             <span class=\"asm_label\">__fn_main:</span><br>"
        );
    }

    #[test]
    fn test_jump_target_is_label() {
        assert_eq!(
            color("JMP :__fn_main"),
            "<span class=\"asm_instruction\">JMP</span> <span class=\"asm_label\">:__fn_main</span><br>"
        );
    }

    #[test]
    fn test_escapes_markup() {
        let out = color("^comment <b>&</b>");
        assert_eq!(
            out,
            "<span class=\"asm_comment\">^comment &lt;b&gt;&amp;&lt;/b&gt;</span><br>"
        );
    }

    #[test]
    fn test_config_wraps_lines() {
        let config = ColorizerConfig {
            pre_all: "<pre>".to_string(),
            pre_line: "> ".to_string(),
            post_line: "\n".to_string(),
        };
        let out = AsmHighlighter::new().color_text("FIN\nFIN", &config).unwrap();
        assert_eq!(
            out,
            "<pre>> <span class=\"asm_instruction\">FIN</span>\n\
             > <span class=\"asm_instruction\">FIN</span>\n"
        );
    }

    #[test]
    fn test_keeps_indent_and_blank_lines() {
        assert_eq!(color("  FIN\n"), "  <span class=\"asm_instruction\">FIN</span><br>");
        assert_eq!(color("\n"), "<br>");
    }

    #[test]
    fn test_control_character_is_render_error() {
        let result = AsmHighlighter::new().color_text("FIN\u{0}", &ColorizerConfig::default());
        assert!(matches!(result, Err(RenderError::Colorizer(_))));
    }
}
