/// Lines shown on each side of the failing line
const CONTEXT_LINES: usize = 2;

/// Render the source around `line` (1-based) with a caret under `column`
pub fn code_frame(source: &str, line: usize, column: Option<usize>) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    if line == 0 || line > lines.len() {
        return None;
    }

    let first = line.saturating_sub(CONTEXT_LINES).max(1);
    let last = (line + CONTEXT_LINES).min(lines.len());
    let width = last.to_string().len();

    let mut frame = Vec::new();
    for number in first..=last {
        let marker = if number == line { '>' } else { ' ' };
        let text = lines[number - 1];
        frame.push(format!("{} {:>width$} | {}", marker, number, text, width = width).trim_end().to_string());
        if number == line {
            if let Some(column) = column.filter(|c| *c > 0) {
                frame.push(format!(
                    "  {:>width$} | {}^",
                    "",
                    " ".repeat(column - 1),
                    width = width
                ));
            }
        }
    }
    Some(frame.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "const a = 1;\nconst b = 2;\nexport default {\n  name: 'x',,\n};\nconst c = 3;\nconst d = 4;";

    #[test]
    fn test_frame_shows_two_lines_of_context_and_caret() {
        let frame = code_frame(SOURCE, 4, Some(14));
        let expected = [
            "  2 | const b = 2;",
            "  3 | export default {",
            "> 4 |   name: 'x',,",
            "    |              ^",
            "  5 | };",
            "  6 | const c = 3;",
        ]
        .join("\n");
        assert_eq!(frame, Some(expected));
    }

    #[test]
    fn test_frame_clamped_at_file_start() {
        let frame = code_frame(SOURCE, 1, None);
        assert!(frame.is_some_and(|f| f.starts_with("> 1 | const a = 1;") && f.lines().count() == 3));
    }

    #[test]
    fn test_out_of_range_line() {
        assert!(code_frame(SOURCE, 0, None).is_none());
        assert!(code_frame(SOURCE, 99, None).is_none());
    }
}
