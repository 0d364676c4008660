//! Single-key edits of shell-style `KEY=value` configuration files.
//!
//! The editing here is pure text work; reading, backing up and writing the
//! file lives in `fs::edit`.
use std::fmt;

/// Pure transformation of a configuration value.
///
/// Implementations must be idempotent on their own output: applying the
/// transform to an already-transformed value returns it unchanged.
pub trait ValueTransform {
    fn apply(&self, value: &str) -> String;
}

impl<F> ValueTransform for F
where
    F: Fn(&str) -> String,
{
    fn apply(&self, value: &str) -> String {
        self(value)
    }
}

/// Whitespace-token edit: drop every token in `strip`, then append each token
/// of `append` that is not already present. Tokens are re-joined with one space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenEdit {
    pub strip: Vec<String>,
    pub append: Vec<String>,
}

impl TokenEdit {
    pub fn new<S, A>(strip: S, append: A) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            strip: strip.into_iter().map(Into::into).collect(),
            append: append.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValueTransform for TokenEdit {
    fn apply(&self, value: &str) -> String {
        let mut tokens: Vec<&str> = value
            .split_whitespace()
            .filter(|t| !self.strip.iter().any(|s| s == t))
            .collect();
        for add in &self.append {
            if !tokens.contains(&add.as_str()) {
                tokens.push(add);
            }
        }
        tokens.join(" ")
    }
}

/// The single configuration-file edit: rewrite the value assigned to `key`.
pub struct ConfigLine {
    pub key: String,
    pub transform: Box<dyn ValueTransform>,
}

impl ConfigLine {
    pub fn new(key: impl Into<String>, transform: impl ValueTransform + 'static) -> Self {
        Self {
            key: key.into(),
            transform: Box::new(transform),
        }
    }
}

impl fmt::Debug for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLine")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// One rewritten assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueChange {
    pub old: String,
    pub new: String,
}

/// Result of applying a [`ConfigLine`] to file contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub changes: Vec<ValueChange>,
}

impl Rewrite {
    /// True when at least one assignment got a different value.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.changes.iter().any(|c| c.old != c.new)
    }
}

/// A parsed `KEY=value` line, borrowed from the original text.
struct Assignment<'a> {
    head: &'a str,
    quote: Option<char>,
    value: &'a str,
    tail: &'a str,
}

fn split_line_ending(seg: &str) -> (&str, &str) {
    if let Some(body) = seg.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = seg.strip_suffix('\n') {
        (body, "\n")
    } else {
        (seg, "")
    }
}

/// Byte offset of the quote closing a value that starts right after `q`.
///
/// Inside double quotes a backslash escapes the next character; single
/// quotes have no escapes.
fn closing_quote(inner: &str, q: char) -> Option<usize> {
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' && q == '"' {
            chars.next();
        } else if c == q {
            return Some(i);
        }
    }
    None
}

fn parse_assignment<'a>(body: &'a str, key: &str) -> Option<Assignment<'a>> {
    let indent = body.len() - body.trim_start().len();
    let mut rest = &body[indent..];
    if let Some(r) = rest.strip_prefix("export ") {
        rest = r.trim_start();
    }
    let after_key = rest.strip_prefix(key)?.strip_prefix('=')?;
    let head_len = body.len() - after_key.len();
    let head = &body[..head_len];

    match after_key.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let inner = &after_key[1..];
            match closing_quote(inner, q) {
                Some(end) => Some(Assignment {
                    head,
                    quote: Some(q),
                    value: &inner[..end],
                    tail: &inner[end + 1..],
                }),
                // Unterminated quote: leave the line alone.
                None => None,
            }
        }
        _ => {
            let end = after_key
                .find(|c: char| c.is_whitespace() || c == '#')
                .unwrap_or(after_key.len());
            Some(Assignment {
                head,
                quote: None,
                value: &after_key[..end],
                tail: &after_key[end..],
            })
        }
    }
}

/// Rewrite every uncommented assignment of `line.key` in `content`.
///
/// Returns `None` when the key is not assigned anywhere. All other bytes,
/// including line endings and a missing final newline, are preserved.
#[must_use]
pub fn rewrite_assignments(content: &str, line: &ConfigLine) -> Option<Rewrite> {
    let mut out = String::with_capacity(content.len() + 32);
    let mut changes = Vec::new();
    for seg in content.split_inclusive('\n') {
        let (body, ending) = split_line_ending(seg);
        match parse_assignment(body, &line.key) {
            Some(a) => {
                let new = line.transform.apply(a.value);
                out.push_str(a.head);
                // A bare value that gained whitespace must be quoted to stay
                // one shell word.
                let quote = a
                    .quote
                    .or_else(|| new.contains(char::is_whitespace).then_some('"'));
                if let Some(q) = quote {
                    out.push(q);
                    out.push_str(&new);
                    out.push(q);
                } else {
                    out.push_str(&new);
                }
                out.push_str(a.tail);
                out.push_str(ending);
                changes.push(ValueChange {
                    old: a.value.to_string(),
                    new,
                });
            }
            None => out.push_str(seg),
        }
    }
    if changes.is_empty() {
        None
    } else {
        Some(Rewrite {
            content: out,
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmdline() -> ConfigLine {
        ConfigLine::new(
            "GRUB_CMDLINE_LINUX_DEFAULT",
            TokenEdit::new(["quiet", "splash"], ["usbcore.autosuspend=-1"]),
        )
    }

    #[test]
    fn token_edit_strips_and_appends_once() {
        let t = TokenEdit::new(["quiet", "splash"], ["usbcore.autosuspend=-1"]);
        let first = t.apply("debug quiet splash foo");
        assert_eq!(first, "debug foo usbcore.autosuspend=-1");
        assert_eq!(t.apply(&first), first);
    }

    #[test]
    fn token_edit_on_empty_value_only_appends() {
        let t = TokenEdit::new(["quiet"], ["a=1", "b"]);
        assert_eq!(t.apply(""), "a=1 b");
        assert_eq!(t.apply("   "), "a=1 b");
    }

    #[test]
    fn closures_are_transforms() {
        let line = ConfigLine::new("X", |v: &str| v.to_uppercase());
        let rw = rewrite_assignments("X=abc\n", &line).unwrap();
        assert_eq!(rw.content, "X=ABC\n");
    }

    #[test]
    fn rewrites_quoted_value_and_keeps_other_lines() {
        let src = "# comment\nGRUB_DEFAULT=0\nGRUB_CMDLINE_LINUX_DEFAULT=\"quiet splash\"\nGRUB_CMDLINE_LINUX=\"\"\n";
        let rw = rewrite_assignments(src, &cmdline()).unwrap();
        assert_eq!(
            rw.content,
            "# comment\nGRUB_DEFAULT=0\nGRUB_CMDLINE_LINUX_DEFAULT=\"usbcore.autosuspend=-1\"\nGRUB_CMDLINE_LINUX=\"\"\n"
        );
        assert!(rw.is_modified());
        assert_eq!(rw.changes.len(), 1);
        assert_eq!(rw.changes[0].old, "quiet splash");
    }

    #[test]
    fn similar_keys_and_comments_do_not_match() {
        let src = "#GRUB_CMDLINE_LINUX_DEFAULT=\"quiet\"\nGRUB_CMDLINE_LINUX_DEFAULTS=\"quiet\"\n";
        assert!(rewrite_assignments(src, &cmdline()).is_none());
    }

    #[test]
    fn preserves_single_quotes_crlf_tail_and_missing_newline() {
        let src = "  export GRUB_CMDLINE_LINUX_DEFAULT='quiet' # boot args\r\nA=1";
        let rw = rewrite_assignments(src, &cmdline()).unwrap();
        assert_eq!(
            rw.content,
            "  export GRUB_CMDLINE_LINUX_DEFAULT='usbcore.autosuspend=-1' # boot args\r\nA=1"
        );
    }

    #[test]
    fn bare_values_are_rewritten_in_place() {
        let line = ConfigLine::new("K", TokenEdit::new(["x"], ["y"]));
        let rw = rewrite_assignments("K=x\n", &line).unwrap();
        assert_eq!(rw.content, "K=y\n");
    }

    #[test]
    fn bare_value_gaining_tokens_is_quoted_and_stays_stable() {
        let rw = rewrite_assignments("GRUB_CMDLINE_LINUX_DEFAULT=debug\n", &cmdline()).unwrap();
        assert_eq!(
            rw.content,
            "GRUB_CMDLINE_LINUX_DEFAULT=\"debug usbcore.autosuspend=-1\"\n"
        );
        let again = rewrite_assignments(&rw.content, &cmdline()).unwrap();
        assert!(!again.is_modified());
        assert_eq!(again.content, rw.content);
    }

    #[test]
    fn escaped_double_quotes_stay_inside_the_value() {
        let line = ConfigLine::new("K", TokenEdit::new(["b"], Vec::<String>::new()));
        let rw = rewrite_assignments("K=\"a \\\"quiet\\\" b\" # c\n", &line).unwrap();
        assert_eq!(rw.changes[0].old, "a \\\"quiet\\\" b");
        assert_eq!(rw.content, "K=\"a \\\"quiet\\\"\" # c\n");
    }

    #[test]
    fn single_quotes_have_no_escapes() {
        let line = ConfigLine::new("K", |v: &str| v.to_uppercase());
        let rw = rewrite_assignments("K='a\\' tail\n", &line).unwrap();
        assert_eq!(rw.changes[0].old, "a\\");
        assert_eq!(rw.content, "K='A\\' tail\n");
    }

    #[test]
    fn already_transformed_value_is_not_modified() {
        let src = "GRUB_CMDLINE_LINUX_DEFAULT=\"debug usbcore.autosuspend=-1\"\n";
        let rw = rewrite_assignments(src, &cmdline()).unwrap();
        assert!(!rw.is_modified());
        assert_eq!(rw.content, src);
    }

    #[test]
    fn every_assignment_is_rewritten() {
        let src = "GRUB_CMDLINE_LINUX_DEFAULT=\"quiet\"\nGRUB_CMDLINE_LINUX_DEFAULT=\"$GRUB_CMDLINE_LINUX_DEFAULT splash\"\n";
        let rw = rewrite_assignments(src, &cmdline()).unwrap();
        assert_eq!(rw.changes.len(), 2);
        assert_eq!(
            rw.content,
            "GRUB_CMDLINE_LINUX_DEFAULT=\"usbcore.autosuspend=-1\"\nGRUB_CMDLINE_LINUX_DEFAULT=\"$GRUB_CMDLINE_LINUX_DEFAULT usbcore.autosuspend=-1\"\n"
        );
    }
}
