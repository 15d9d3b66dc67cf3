use crate::config::Options;
use crate::external::{ProcessLauncher, SystemLauncher};
use std::borrow::Cow;
use std::env as stdenv;

/// A session variable created by `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

/// Variables set during the session, with a read-only fallback to the process
/// environment.
///
/// Names are unique: setting an existing name replaces its value in place.
/// Entries are never removed.
#[derive(Debug, Clone)]
pub struct VariableStore {
    vars: Vec<Variable>,
    inherit_env: bool,
}

impl VariableStore {
    /// An empty table that falls back to the process environment on lookup.
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            inherit_env: true,
        }
    }

    /// An empty table that never consults the process environment.
    pub fn isolated() -> Self {
        Self {
            vars: Vec::new(),
            inherit_env: false,
        }
    }

    /// Look `name` up in the session table first, then in the process environment.
    pub fn get(&self, name: &str) -> Option<Cow<'_, str>> {
        if let Some(var) = self.vars.iter().find(|v| v.name == name) {
            return Some(Cow::Borrowed(&var.value));
        }
        if !self.inherit_env || !is_env_name(name) {
            return None;
        }
        stdenv::var_os(name).map(|v| Cow::Owned(v.to_string_lossy().into_owned()))
    }

    /// Set or overwrite a session variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.vars.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.value = value,
            None => self.vars.push(Variable { name, value }),
        }
    }

    /// Session variables, most recently created first.
    ///
    /// Variables that only exist in the process environment are not listed.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

// The platform rejects these names outright.
fn is_env_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['=', '\0'])
}

/// State that lives for the whole session and is handed to every command.
pub struct Session {
    pub vars: VariableStore,
    pub options: Options,
    launcher: Box<dyn ProcessLauncher>,
}

impl Session {
    /// A session that runs external programs as real child processes.
    pub fn new(options: Options) -> Self {
        Self::with_launcher(options, VariableStore::new(), Box::new(SystemLauncher))
    }

    pub fn with_launcher(
        options: Options,
        vars: VariableStore,
        launcher: Box<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            vars,
            options,
            launcher,
        }
    }

    pub fn launcher_mut(&mut self) -> &mut dyn ProcessLauncher {
        self.launcher.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_var() {
        let mut vars = VariableStore::isolated();

        // initially absent
        assert_eq!(vars.get("KEY"), None);

        vars.set("KEY", "VALUE");

        assert_eq!(vars.get("KEY").as_deref(), Some("VALUE"));
    }

    #[test]
    fn test_set_overwrites_instead_of_duplicating() {
        let mut vars = VariableStore::isolated();
        vars.set("A", "1");
        vars.set("A", "2");

        assert_eq!(vars.get("A").as_deref(), Some("2"));
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_iter_is_newest_first_and_stable() {
        let mut vars = VariableStore::isolated();
        vars.set("A", "1");
        vars.set("B", "2");
        vars.set("C", "3");
        vars.set("A", "4");

        let listed: Vec<(&str, &str)> = vars
            .iter()
            .map(|v| (v.name.as_str(), v.value.as_str()))
            .collect();
        assert_eq!(listed, vec![("C", "3"), ("B", "2"), ("A", "4")]);

        let again: Vec<&Variable> = vars.iter().collect();
        assert_eq!(again.len(), 3);
        assert_eq!(again[0].name, "C");
    }

    #[test]
    fn test_reads_from_process_env() {
        let vars = VariableStore::new();
        assert!(vars.get("PATH").is_some());
        // environment-only variables are never enumerated
        assert!(vars.is_empty());
        assert_eq!(vars.iter().count(), 0);
    }

    #[test]
    fn test_isolated_ignores_process_env() {
        let vars = VariableStore::isolated();
        assert_eq!(vars.get("PATH"), None);
    }

    #[test]
    fn test_session_table_shadows_env() {
        let mut vars = VariableStore::new();
        vars.set("PATH", "shadowed");
        assert_eq!(vars.get("PATH").as_deref(), Some("shadowed"));
    }

    #[test]
    fn test_unrepresentable_env_names() {
        let vars = VariableStore::new();
        assert_eq!(vars.get(""), None);
        assert_eq!(vars.get("A=B"), None);
        assert_eq!(vars.get("A\0B"), None);
    }

    #[test]
    fn test_odd_names_live_in_session_table() {
        let mut vars = VariableStore::new();
        vars.set("A=B", "x");
        assert_eq!(vars.get("A=B").as_deref(), Some("x"));
    }
}
