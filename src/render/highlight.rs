// Python syntax highlighting
//
// A small single-pass tokenizer that wraps Python tokens in
// `<span class="token KIND">` elements (Prism's class names, so any Prism theme
// stylesheet applies). It only needs to be good enough for display: code that
// doesn't tokenize cleanly still comes out escaped and readable.

use super::html::push_escaped;

/// Token types for Python syntax highlighting
#[derive(Debug, Clone, Copy, PartialEq)]
enum PyToken {
    Keyword,
    Builtin,
    Boolean,  // True, False, None
    Number,   // 42, 3.14, 0xff, 1e-9, 2j
    String,   // '...', "...", '''...''', f"..."
    Comment,  // # to end of line
    Function, // name followed by (
    ClassName,
    Decorator,
    Operator,
    Punctuation,
    Plain,
}

impl PyToken {
    fn class(self) -> Option<&'static str> {
        match self {
            PyToken::Keyword => Some("keyword"),
            PyToken::Builtin => Some("builtin"),
            PyToken::Boolean => Some("boolean"),
            PyToken::Number => Some("number"),
            PyToken::String => Some("string"),
            PyToken::Comment => Some("comment"),
            PyToken::Function => Some("function"),
            PyToken::ClassName => Some("class-name"),
            PyToken::Decorator => Some("decorator"),
            PyToken::Operator => Some("operator"),
            PyToken::Punctuation => Some("punctuation"),
            PyToken::Plain => None,
        }
    }
}

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "case", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield",
];

const BUILTINS: &[&str] = &[
    "abs", "all", "any", "bin", "bool", "chr", "dict", "divmod", "enumerate", "filter", "float",
    "format", "frozenset", "hex", "input", "int", "isinstance", "len", "list", "map", "max",
    "min", "next", "oct", "open", "ord", "pow", "print", "range", "repr", "reversed", "round",
    "set", "sorted", "str", "sum", "tuple", "type", "zip",
];

const OPERATOR_CHARS: &str = "+-*/%=<>!&|^~";
const PUNCTUATION_CHARS: &str = "()[]{}:;,.";

/// Highlight Python source and return HTML (already escaped)
pub fn highlight_python(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let mut out = String::with_capacity(code.len() * 2);
    let mut i = 0;
    // Previous significant identifier, to spot `class Name` / `def name`
    let mut previous_word = String::new();
    let mut line_start = true;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\n' {
            out.push('\n');
            line_start = true;
            i += 1;
            continue;
        }

        if ch.is_whitespace() {
            let end = scan_while(&chars, i, |c| c.is_whitespace() && c != '\n');
            emit(&mut out, &chars[i..end], PyToken::Plain);
            i = end;
            continue;
        }

        if ch == '#' {
            let end = scan_while(&chars, i, |c| c != '\n');
            emit(&mut out, &chars[i..end], PyToken::Comment);
            i = end;
            line_start = false;
            continue;
        }

        if ch == '@' && line_start {
            let end = scan_while(&chars, i + 1, |c| c.is_alphanumeric() || c == '_' || c == '.');
            emit(&mut out, &chars[i..end], PyToken::Decorator);
            i = end;
            line_start = false;
            continue;
        }

        line_start = false;

        if ch == '"' || ch == '\'' {
            let end = scan_string(&chars, i);
            emit(&mut out, &chars[i..end], PyToken::String);
            i = end;
            previous_word.clear();
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())) {
            let end = scan_number(&chars, i);
            emit(&mut out, &chars[i..end], PyToken::Number);
            i = end;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let end = scan_while(&chars, i, |c| c.is_alphanumeric() || c == '_');

            // String prefixes: f"...", rb'...', etc.
            if end - i <= 2 && is_string_prefix(&chars[i..end]) {
                if let Some(&quote) = chars.get(end) {
                    if quote == '"' || quote == '\'' {
                        let string_end = scan_string(&chars, end);
                        emit(&mut out, &chars[i..string_end], PyToken::String);
                        i = string_end;
                        previous_word.clear();
                        continue;
                    }
                }
            }

            let word: String = chars[i..end].iter().collect();
            let token = classify_word(&word, &previous_word, next_non_space(&chars, end));
            emit(&mut out, &chars[i..end], token);
            previous_word = word;
            i = end;
            continue;
        }

        if OPERATOR_CHARS.contains(ch) {
            let end = scan_while(&chars, i, |c| OPERATOR_CHARS.contains(c));
            emit(&mut out, &chars[i..end], PyToken::Operator);
            i = end;
            continue;
        }

        let token = if PUNCTUATION_CHARS.contains(ch) {
            PyToken::Punctuation
        } else {
            PyToken::Plain
        };
        emit(&mut out, &chars[i..i + 1], token);
        i += 1;
    }

    out
}

fn emit(out: &mut String, text: &[char], token: PyToken) {
    if text.is_empty() {
        return;
    }
    let text: String = text.iter().collect();
    match token.class() {
        Some(class) => {
            out.push_str("<span class=\"token ");
            out.push_str(class);
            out.push_str("\">");
            push_escaped(out, &text);
            out.push_str("</span>");
        }
        None => push_escaped(out, &text),
    }
}

fn classify_word(word: &str, previous_word: &str, next: Option<char>) -> PyToken {
    match word {
        "True" | "False" | "None" => PyToken::Boolean,
        _ if KEYWORDS.contains(&word) => PyToken::Keyword,
        _ if previous_word == "class" => PyToken::ClassName,
        _ if previous_word == "def" => PyToken::Function,
        _ if BUILTINS.contains(&word) => PyToken::Builtin,
        _ if next == Some('(') => PyToken::Function,
        _ => PyToken::Plain,
    }
}

fn is_string_prefix(chars: &[char]) -> bool {
    !chars.is_empty()
        && chars
            .iter()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'u' | 'f'))
}

fn scan_while(chars: &[char], start: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = start;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

fn next_non_space(chars: &[char], from: usize) -> Option<char> {
    chars[from..].iter().copied().find(|c| *c != ' ' && *c != '\t')
}

/// Scan a string literal starting at an opening quote; returns the end index (exclusive)
///
/// Unterminated single-quoted strings stop at end of line; unterminated
/// triple-quoted strings run to end of input.
fn scan_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let triple = chars.get(start + 1) == Some(&quote) && chars.get(start + 2) == Some(&quote);
    let mut i = if triple { start + 3 } else { start + 1 };

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            i += 2;
            continue;
        }
        if triple {
            if ch == quote && chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote) {
                return i + 3;
            }
        } else if ch == quote {
            return i + 1;
        } else if ch == '\n' {
            return i;
        }
        i += 1;
    }

    chars.len()
}

/// Scan a numeric literal: decimal, hex/octal/binary, floats, exponents, imaginary suffix
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() {
        let ch = chars[i];
        let exponent_sign = (ch == '+' || ch == '-')
            && i > start
            && matches!(chars[i - 1], 'e' | 'E')
            && !is_radix_literal(chars, start);
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
            i += 1;
        } else {
            break;
        }
    }
    i
}

fn is_radix_literal(chars: &[char], start: usize) -> bool {
    chars[start] == '0' && matches!(chars.get(start + 1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'))
}
