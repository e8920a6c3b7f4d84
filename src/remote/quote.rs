//! Single-quote literals for remote shells.
//!
//! Both functions are total: any input yields one word that the target shell
//! reads back as exactly the input.

/// Quote for a POSIX shell. Each `'` closes the quote, emits `"'"`, and reopens.
pub fn quote_posix(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

/// Quote for PowerShell, where `''` inside a single-quoted string is a literal `'`.
pub fn quote_powershell(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Read one word made of adjacent single- and double-quoted segments.
    fn unquote_posix(word: &str) -> Option<String> {
        let mut out = String::new();
        let mut chars = word.chars();
        while let Some(c) = chars.next() {
            let close = match c {
                '\'' => '\'',
                '"' => '"',
                _ => return None,
            };
            loop {
                match chars.next()? {
                    ch if ch == close => break,
                    // Only a lone quote char is ever emitted inside "..."; nothing to unescape.
                    ch => out.push(ch),
                }
            }
        }
        Some(out)
    }

    /// Read one PowerShell single-quoted string.
    fn unquote_powershell(word: &str) -> Option<String> {
        let inner = word.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\'' {
                // A lone quote would have ended the string early.
                if chars.next()? != '\'' {
                    return None;
                }
            }
            out.push(c);
        }
        Some(out)
    }

    const SAMPLES: &[&str] = &[
        "",
        "/srv/app",
        "Projects/deno",
        "it's",
        "'",
        "''",
        "a b  c",
        "$HOME/${SHELL:-bash}",
        "`whoami`; rm -rf /",
        "quote\"double",
        "line\nbreak",
        "C:\\Users\\me\\My Projects",
        "ünïcödé ✓",
    ];

    #[test]
    fn test_quote_posix_examples() {
        assert_eq!(quote_posix("/srv/app"), "'/srv/app'");
        assert_eq!(quote_posix(""), "''");
        assert_eq!(quote_posix("it's"), r#"'it'"'"'s'"#);
        assert_eq!(quote_posix("$HOME"), "'$HOME'");
    }

    #[test]
    fn test_quote_powershell_examples() {
        assert_eq!(quote_powershell("Projects/deno"), "'Projects/deno'");
        assert_eq!(quote_powershell(""), "''");
        assert_eq!(quote_powershell("it's"), "'it''s'");
        assert_eq!(quote_powershell("''"), "''''''");
    }

    #[test]
    fn test_quote_posix_round_trip() {
        for s in SAMPLES {
            assert_eq!(unquote_posix(&quote_posix(s)).as_deref(), Some(*s), "{s:?}");
        }
    }

    #[test]
    fn test_quote_posix_round_trip_via_shell_words() {
        for s in SAMPLES {
            let words = shell_words::split(&quote_posix(s)).unwrap();
            assert_eq!(words, vec![s.to_string()], "{s:?}");
        }
    }

    #[test]
    fn test_quote_powershell_round_trip() {
        for s in SAMPLES {
            assert_eq!(
                unquote_powershell(&quote_powershell(s)).as_deref(),
                Some(*s),
                "{s:?}"
            );
        }
    }

    #[test]
    fn test_dialects_differ_on_quotes() {
        assert_ne!(quote_posix("a'b"), quote_powershell("a'b"));
        assert_eq!(quote_posix("ab"), quote_powershell("ab"));
    }
}
