use sr_core::{ErrorKind, ScriptError};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Bracket(char),
    Interpolation,
}

/// Re-indents a script by bracket nesting and collapses runs of blank lines.
///
/// Only leading whitespace of lines that start in code is touched; lines that
/// begin inside a template literal or block comment are copied verbatim. Any
/// scan problem (unterminated literal, stray closer) is an error and callers
/// keep the original text.
pub fn format_script(source: &str) -> Result<String, ScriptError> {
    let mut output = String::with_capacity(source.len());
    let mut stack: Vec<(Frame, usize)> = Vec::new();
    let mut mode = Mode::Code;
    let mut pending_blank = false;

    for (line_no, raw_line) in source.lines().enumerate() {
        if matches!(mode, Mode::Template | Mode::BlockComment) {
            output.push_str(raw_line);
            output.push('\n');
            mode = scan_line(raw_line, line_no, mode, &mut stack)?;
            continue;
        }

        let content = raw_line.trim_start();
        if content.trim_end().is_empty() {
            pending_blank = !output.is_empty();
            continue;
        }
        if pending_blank {
            output.push('\n');
            pending_blank = false;
        }

        let leading_closers = content
            .chars()
            .take_while(|ch| matches!(ch, '}' | ')' | ']'))
            .count()
            .min(stack.len());
        let level = indent_level(&stack[..stack.len() - leading_closers]);
        mode = scan_line(content, line_no, mode, &mut stack)?;

        // trailing whitespace of a line that ends inside a template is string content
        let line = if mode == Mode::Template {
            content
        } else {
            content.trim_end()
        };
        for _ in 0..level {
            output.push_str(INDENT);
        }
        output.push_str(line);
        output.push('\n');
    }

    if matches!(
        mode,
        Mode::Template | Mode::BlockComment | Mode::SingleQuote | Mode::DoubleQuote
    ) {
        return Err(format_error("unterminated literal or comment at end of input"));
    }
    if let Some((_, line_no)) = stack.last() {
        return Err(format_error(format!(
            "bracket opened on line {} is never closed",
            line_no + 1
        )));
    }

    Ok(output)
}

/// Number of distinct source lines holding the still-open frames.
fn indent_level(frames: &[(Frame, usize)]) -> usize {
    let mut level = 0usize;
    let mut last_line = None;
    for (_, line_no) in frames {
        if last_line != Some(*line_no) {
            level += 1;
            last_line = Some(*line_no);
        }
    }
    level
}

fn scan_line(
    line: &str,
    line_no: usize,
    mut mode: Mode,
    stack: &mut Vec<(Frame, usize)>,
) -> Result<Mode, ScriptError> {
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match mode {
            Mode::Code => match ch {
                '\'' => mode = Mode::SingleQuote,
                '"' => mode = Mode::DoubleQuote,
                '`' => mode = Mode::Template,
                '/' if chars.peek() == Some(&'/') => {
                    mode = Mode::LineComment;
                    break;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                '{' | '(' | '[' => stack.push((Frame::Bracket(ch), line_no)),
                '}' if matches!(stack.last(), Some((Frame::Interpolation, _))) => {
                    stack.pop();
                    mode = Mode::Template;
                }
                '}' | ')' | ']' => close_bracket(stack, ch, line_no)?,
                _ => {}
            },
            Mode::SingleQuote | Mode::DoubleQuote => match ch {
                '\\' => {
                    chars.next();
                }
                '\'' if mode == Mode::SingleQuote => mode = Mode::Code,
                '"' if mode == Mode::DoubleQuote => mode = Mode::Code,
                _ => {}
            },
            Mode::Template => match ch {
                '\\' => {
                    chars.next();
                }
                '`' => mode = Mode::Code,
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    stack.push((Frame::Interpolation, line_no));
                    mode = Mode::Code;
                }
                _ => {}
            },
            Mode::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
            Mode::LineComment => break,
        }
    }

    match mode {
        Mode::SingleQuote | Mode::DoubleQuote => Err(format_error(format!(
            "unterminated string on line {}",
            line_no + 1
        ))),
        Mode::LineComment => Ok(Mode::Code),
        other => Ok(other),
    }
}

fn close_bracket(
    stack: &mut Vec<(Frame, usize)>,
    closer: char,
    line_no: usize,
) -> Result<(), ScriptError> {
    let expected = match closer {
        '}' => '{',
        ')' => '(',
        _ => '[',
    };
    match stack.pop() {
        Some((Frame::Bracket(open), _)) if open == expected => Ok(()),
        _ => Err(format_error(format!(
            "unexpected '{}' on line {}",
            closer,
            line_no + 1
        ))),
    }
}

fn format_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ErrorKind::Formatting, message)
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn reindents_by_nesting() {
        let source = "function add(a, b) {\nif (a) {\nreturn a + b;\n}\nreturn b;\n}\nreturn add(1, 2);";
        let expected = "function add(a, b) {\n    if (a) {\n        return a + b;\n    }\n    return b;\n}\nreturn add(1, 2);\n";
        assert_eq!(format_script(source).expect("format"), expected);
    }

    #[test]
    fn brackets_opened_on_one_line_indent_once() {
        let source = "items.map((item) => {\n        return item * 2;\n});";
        let expected = "items.map((item) => {\n    return item * 2;\n});\n";
        assert_eq!(format_script(source).expect("format"), expected);
    }

    #[test]
    fn blank_line_runs_collapse() {
        let source = "\n\nconst a = 1;\n\n\n\nconst f = () => a;\n\n";
        assert_eq!(
            format_script(source).expect("format"),
            "const a = 1;\n\nconst f = () => a;\n"
        );
    }

    #[test]
    fn template_literal_lines_are_verbatim() {
        let source = "const f = () => `line one\n      keep {me}\n  ${1 + 1}`;\n    return f();";
        let expected = "const f = () => `line one\n      keep {me}\n  ${1 + 1}`;\nreturn f();\n";
        assert_eq!(format_script(source).expect("format"), expected);
    }

    #[test]
    fn trailing_whitespace_inside_template_is_kept() {
        let source = "const f = () => `a   \nb`;   \n  return f();  ";
        let expected = "const f = () => `a   \nb`;   \nreturn f();\n";
        assert_eq!(format_script(source).expect("format"), expected);
    }

    #[test]
    fn strings_and_comments_do_not_affect_depth() {
        let source = "const f = () => {\nconst s = '}' + \"{\"; // }\n/* { */\nreturn s;\n};";
        let expected = "const f = () => {\n    const s = '}' + \"{\"; // }\n    /* { */\n    return s;\n};\n";
        assert_eq!(format_script(source).expect("format"), expected);
    }

    #[test]
    fn stray_closer_is_an_error() {
        let error = format_script("return 1; }").expect_err("stray closer");
        assert_eq!(error.kind, ErrorKind::Formatting);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(format_script("const s = 'abc;\nreturn s;").is_err());
    }

    #[test]
    fn unclosed_bracket_is_an_error() {
        assert!(format_script("function f() {\nreturn 1;").is_err());
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(format_script("").expect("format"), "");
        assert_eq!(format_script("  \n \n").expect("format"), "");
    }
}
