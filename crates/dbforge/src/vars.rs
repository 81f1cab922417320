//! Variable filtering and substitution.
//!
//! Raw text that ends up in compiled statements (expression text, operands,
//! substituted table or column names) may contain substitution tokens. Each
//! token is bound to a value together with a [`Filter`] policy:
//!
//! - [`Filter::Escaped`]: the value is HTML-escaped (`&`, `<`, `>`, `"`, `'`)
//! - [`Filter::Raw`]: the value is inserted unchanged
//!
//! Substitution replaces every occurrence of a token with its filtered value.
//! Longer tokens win over shorter ones at the same position and replaced text
//! is never rescanned.
//!
//! # Sigil maps
//!
//! [`Variables::from_sigiled`] accepts the legacy key convention where the first
//! character of a key selects the policy: `@` escapes, `!` passes through, and
//! any other key is **dropped silently** (a `WARN` event is emitted). The key,
//! sigil included, is the token that gets replaced.
//!
//! ```
//! use dbforge::Variables;
//!
//! let vars = Variables::from_sigiled([("@name", "<b>x</b>"), ("xname", "y")]);
//! assert_eq!(vars.len(), 1);
//! assert_eq!(vars.substitute("Hello @name"), "Hello &lt;b&gt;x&lt;/b&gt;");
//! ```

use std::borrow::Cow;

/// How a variable's value is filtered before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// HTML-escape the value.
    Escaped,
    /// Insert the value unchanged.
    ///
    /// **Warning**: This bypasses filtering. Only use with trusted values.
    Raw,
}

impl Filter {
    /// Policy selected by the first character of a sigil key.
    pub fn from_sigil(key: &str) -> Option<Self> {
        match key.chars().next() {
            Some('@') => Some(Filter::Escaped),
            Some('!') => Some(Filter::Raw),
            _ => None,
        }
    }

    fn apply<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            Filter::Escaped => html_escape(value),
            Filter::Raw => Cow::Borrowed(value),
        }
    }
}

/// A single substitution variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub token: String,
    pub value: String,
    pub filter: Filter,
}

impl Var {
    pub fn new(token: impl Into<String>, value: impl Into<String>, filter: Filter) -> Self {
        Self {
            token: token.into(),
            value: value.into(),
            filter,
        }
    }

    /// Value after applying the filter policy.
    pub fn filtered(&self) -> Cow<'_, str> {
        self.filter.apply(&self.value)
    }
}

/// An ordered set of substitution variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    vars: Vec<Var>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a sigil-keyed map (`@` escape, `!` raw, anything else dropped).
    pub fn from_sigiled<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = Self::new();
        for (key, value) in pairs {
            let key = key.into();
            match Filter::from_sigil(&key) {
                Some(filter) => vars.insert(Var::new(key, value, filter)),
                None => {
                    tracing::warn!(
                        target: "dbforge.vars",
                        token = %key,
                        "variable without '@' or '!' sigil dropped from substitution"
                    );
                }
            }
        }
        vars
    }

    /// Add an HTML-escaped variable.
    pub fn escaped(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(Var::new(token, value, Filter::Escaped));
        self
    }

    /// Add a pass-through variable.
    pub fn raw(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(Var::new(token, value, Filter::Raw));
        self
    }

    /// Insert a variable, replacing any previous binding of the same token.
    pub fn insert(&mut self, var: Var) {
        match self.vars.iter_mut().find(|v| v.token == var.token) {
            Some(existing) => *existing = var,
            None => self.vars.push(var),
        }
    }

    pub fn get(&self, token: &str) -> Option<&Var> {
        self.vars.iter().find(|v| v.token == token)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Var> {
        self.vars.iter()
    }

    /// Replace every token occurrence in `template` with its filtered value.
    pub fn substitute(&self, template: &str) -> String {
        let mut pairs: Vec<(&str, Cow<'_, str>)> = self
            .vars
            .iter()
            .filter(|v| !v.token.is_empty())
            .map(|v| (v.token.as_str(), v.filtered()))
            .collect();
        if pairs.is_empty() {
            return template.to_string();
        }
        // Longest token first so `@name` never shadows `@name_full`.
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        'scan: while !rest.is_empty() {
            for (token, value) in &pairs {
                if let Some(tail) = rest.strip_prefix(token) {
                    out.push_str(value);
                    rest = tail;
                    continue 'scan;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                out.push(ch);
            }
            rest = chars.as_str();
        }
        out
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = &'a Var;
    type IntoIter = std::slice::Iter<'a, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` as HTML entities.
pub fn html_escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_variable_is_html_escaped() {
        let vars = Variables::from_sigiled([("@name", "<b>x</b>")]);
        assert_eq!(vars.substitute("Hello @name"), "Hello &lt;b&gt;x&lt;/b&gt;");
    }

    #[test]
    fn unsigiled_variable_is_dropped() {
        let vars = Variables::from_sigiled([("xname", "y")]);
        assert!(vars.is_empty());
        assert_eq!(vars.substitute("Hello xname"), "Hello xname");
    }

    #[test]
    fn raw_variable_passes_through() {
        let vars = Variables::from_sigiled([("!expr", "a < b")]);
        assert_eq!(vars.substitute("WHERE !expr"), "WHERE a < b");
    }

    #[test]
    fn quotes_are_escaped() {
        let vars = Variables::new().escaped("@v", "O'Brien \"q\" & co");
        assert_eq!(
            vars.substitute("@v"),
            "O&#039;Brien &quot;q&quot; &amp; co"
        );
    }

    #[test]
    fn longest_token_wins() {
        let vars = Variables::new().raw("!id", "1").raw("!id_max", "99");
        assert_eq!(vars.substitute("!id..!id_max"), "1..99");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let vars = Variables::new().raw("!a", "!b").raw("!b", "x");
        assert_eq!(vars.substitute("!a !b"), "!b x");
    }

    #[test]
    fn later_binding_replaces_earlier() {
        let vars = Variables::new().raw("!t", "one").raw("!t", "two");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.substitute("!t"), "two");
    }

    #[test]
    fn html_escape_borrows_clean_input() {
        assert!(matches!(html_escape("plain"), Cow::Borrowed(_)));
    }
}
