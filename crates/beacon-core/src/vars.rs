//! Custom variable sets.

/// Number of custom variable slots the collector accepts per scope.
pub const CUSTOM_VARIABLE_SLOTS: usize = 5;

/// Maximum length of a custom variable name or value, in characters.
pub const CUSTOM_VARIABLE_MAX_LEN: usize = 200;

/// A single name/value custom variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomVariable {
    pub name: String,
    pub value: String,
}

impl CustomVariable {
    fn set(&mut self, name: &str, value: &str) {
        self.name = truncate_chars(name, CUSTOM_VARIABLE_MAX_LEN);
        self.value = truncate_chars(value, CUSTOM_VARIABLE_MAX_LEN);
    }

    /// A slot counts only when both name and value are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }
}

/// The five-slot custom variable set attached to a visit or a screen view.
///
/// Slots are 1-based on the wire. Setting a variable whose name already
/// occupies a slot overwrites that slot; otherwise the first free slot is
/// used. Names and values are truncated to [`CUSTOM_VARIABLE_MAX_LEN`]
/// characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomVariables {
    slots: [CustomVariable; CUSTOM_VARIABLE_SLOTS],
}

impl CustomVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable at an explicit 1-based slot. Out-of-range slots are
    /// ignored.
    pub fn set_at(&mut self, slot: usize, name: &str, value: &str) {
        if (1..=CUSTOM_VARIABLE_SLOTS).contains(&slot) {
            self.slots[slot - 1].set(name, value);
        }
    }

    /// Set a variable, reusing the slot already holding `name` or the first
    /// free slot. A full set with no matching name drops the variable.
    pub fn set(&mut self, name: &str, value: &str) {
        if let Some(i) = self.index_of(name) {
            self.slots[i].set(name, value);
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|v| v.name == name)
            .or_else(|| self.slots.iter().position(|v| !v.is_valid()))
    }

    /// True when at least one slot is populated.
    pub fn is_valid(&self) -> bool {
        self.slots.iter().any(|v| v.is_valid())
    }

    /// Iterate populated slots as `(1-based index, variable)`.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &CustomVariable)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_valid())
            .map(|(i, v)| (i + 1, v))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_not_valid() {
        let vars = CustomVariables::new();
        assert!(!vars.is_valid());
        assert_eq!(vars.entries().count(), 0);
    }

    #[test]
    fn set_fills_first_free_slot() {
        let mut vars = CustomVariables::new();
        vars.set("browser", "firefox");
        vars.set("theme", "dark");

        let entries: Vec<_> = vars.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 1);
        assert_eq!(entries[0].1.name, "browser");
        assert_eq!(entries[1].0, 2);
        assert_eq!(entries[1].1.value, "dark");
    }

    #[test]
    fn set_overwrites_matching_name() {
        let mut vars = CustomVariables::new();
        vars.set("browser", "firefox");
        vars.set("browser", "chrome");

        let entries: Vec<_> = vars.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.value, "chrome");
    }

    #[test]
    fn set_at_respects_explicit_slot() {
        let mut vars = CustomVariables::new();
        vars.set_at(3, "plan", "pro");
        vars.set_at(0, "ignored", "x");
        vars.set_at(6, "ignored", "x");

        let entries: Vec<_> = vars.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, 3);
    }

    #[test]
    fn long_values_are_truncated() {
        let mut vars = CustomVariables::new();
        let long = "x".repeat(500);
        vars.set("key", &long);

        let entries: Vec<_> = vars.entries().collect();
        assert_eq!(entries[0].1.value.chars().count(), CUSTOM_VARIABLE_MAX_LEN);
    }

    #[test]
    fn full_set_drops_unknown_name() {
        let mut vars = CustomVariables::new();
        for i in 0..CUSTOM_VARIABLE_SLOTS {
            vars.set(&format!("k{i}"), "v");
        }
        vars.set("overflow", "v");
        assert!(vars.entries().all(|(_, v)| v.name != "overflow"));
    }
}
