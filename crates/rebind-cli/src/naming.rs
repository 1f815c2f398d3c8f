//! Spelling of unexported names.
//!
//! The engine never chooses names; this is the caller-side policy used by
//! `rebind exports` when it unexports what nobody imports.

/// Initialisms lowercased as a unit when they lead a name.
pub const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

#[derive(Debug, Clone)]
pub struct Initialisms {
    /// Longest first, so `HTTPS` wins over `HTTP`.
    words: Vec<String>,
}

impl Initialisms {
    /// The common set plus `extra`, uppercased and deduplicated.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = COMMON_INITIALISMS.iter().map(|w| w.to_string()).collect();
        for word in extra {
            let word = word.as_ref().trim().to_uppercase();
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { words }
    }

    /// Parses a comma-separated `--initialisms` value.
    pub fn parse_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The initialism `name` starts with, provided it ends at a word
    /// boundary: end of name, or a character that is not lowercase.
    pub fn leading<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.words
            .iter()
            .find(|word| {
                name.strip_prefix(word.as_str())
                    .is_some_and(|rest| !rest.starts_with(|c: char| c.is_lowercase()))
            })
            .map(String::as_str)
    }

    /// `HTTPServer` becomes `httpServer`, `Name` becomes `name`.
    pub fn unexported_name(&self, name: &str) -> String {
        if let Some(word) = self.leading(name) {
            return format!("{}{}", word.to_lowercase(), &name[word.len()..]);
        }
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Default for Initialisms {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<&str>())
    }
}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !KEYWORDS.contains(&name)
}
