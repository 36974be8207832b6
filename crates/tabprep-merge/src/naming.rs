//! Output column naming across a chain of joins.

use std::collections::BTreeSet;

/// Set of output header names already taken.
///
/// Threaded through every step of a multi-table merge so that a name claimed
/// by an earlier input is never reused by a later one.
#[derive(Debug, Clone)]
pub struct ColumnNamer {
    used: BTreeSet<String>,
    suffix: String,
}

impl ColumnNamer {
    pub fn new<I, S>(headers: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            used: headers
                .into_iter()
                .map(|header| header.as_ref().to_string())
                .collect(),
            suffix: suffix.to_string(),
        }
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Takes `name` if free, else the first free of `name+suffix`,
    /// `name+suffix+"2"`, `name+suffix+"3"`, ...
    pub fn claim(&mut self, name: &str) -> String {
        let chosen = if self.used.contains(name) {
            self.next_free(name)
        } else {
            name.to_string()
        };
        self.used.insert(chosen.clone());
        chosen
    }

    /// Records that `old` now appears as `new` in the output.
    pub fn rename(&mut self, old: &str, new: &str) {
        self.used.remove(old);
        self.used.insert(new.to_string());
    }

    fn next_free(&self, name: &str) -> String {
        let base = format!("{name}{}", self.suffix);
        if !self.used.contains(&base) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if !self.used.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_free_name() {
        let mut namer = ColumnNamer::new(["id", "Value"], "_2");
        assert_eq!(namer.claim("score"), "score");
        assert!(namer.is_used("score"));
    }

    #[test]
    fn test_claim_increments_tie_breaker() {
        let mut namer = ColumnNamer::new(["Value"], "_r");
        assert_eq!(namer.claim("Value"), "Value_r");
        assert_eq!(namer.claim("Value"), "Value_r2");
        assert_eq!(namer.claim("Value"), "Value_r3");
    }

    #[test]
    fn test_claim_skips_names_already_in_input() {
        let mut namer = ColumnNamer::new(["Value", "Value_r"], "_r");
        assert_eq!(namer.claim("Value"), "Value_r2");
    }

    #[test]
    fn test_rename_frees_old_name() {
        let mut namer = ColumnNamer::new(["id"], "_2");
        namer.rename("id", "key");
        assert_eq!(namer.claim("id"), "id");
        assert_eq!(namer.claim("key"), "key_2");
    }
}
