use regex::Regex;

#[derive(Debug, Clone)]
struct FilterRule {
    exclude: bool,
    pattern: Regex,
}

/// Ordered include/exclude rules over exported names.
///
/// Rules are tried in the order they were added and the first matching rule
/// decides. A name no rule matches is reported.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    rules: Vec<FilterRule>,
}

impl NameFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.push(pattern, false)?;
        Ok(self)
    }

    pub fn exclude(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.push(pattern, true)?;
        Ok(self)
    }

    /// Builds a filter with every include rule ahead of every exclude rule.
    pub fn from_patterns(include: &[String], exclude: &[String]) -> Result<Self, regex::Error> {
        let mut filter = Self::new();
        for pattern in include {
            filter.push(pattern, false)?;
        }
        for pattern in exclude {
            filter.push(pattern, true)?;
        }
        Ok(filter)
    }

    fn push(&mut self, pattern: &str, exclude: bool) -> Result<(), regex::Error> {
        self.rules.push(FilterRule {
            exclude,
            pattern: Regex::new(pattern)?,
        });
        Ok(())
    }

    pub fn reports(&self, name: &str) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(name))
            .is_none_or(|rule| !rule.exclude)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
