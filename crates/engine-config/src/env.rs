use crate::error::ConfigError;
use std::{collections::HashMap, fs, path::Path};

/// Environment variable view seeded from the process environment, optionally
/// overlaid with `.env` files. File values win over inherited ones.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        EnvManager {
            vars: std::env::vars().collect(),
        }
    }

    pub fn empty() -> Self {
        EnvManager {
            vars: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::EnvFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_from_str(&content)
    }

    pub fn load_from_str(&mut self, content: &str) -> Result<(), ConfigError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(ConfigError::EnvFormat(format!(
                    "malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = line[..eq_pos].trim();
            if key.is_empty() {
                return Err(ConfigError::EnvFormat(format!(
                    "empty key at line {}",
                    line_num + 1
                )));
            }

            let value = unquote_value(&line[eq_pos + 1..]);
            self.vars.insert(key.to_string(), value);
        }

        Ok(())
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}

fn unquote_value(value: &str) -> String {
    let value = value.trim();

    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        return value[1..value.len() - 1].to_string();
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_entries_and_skips_comments() {
        let mut env = EnvManager::empty();
        env.load_from_str("# comment\nKEY1=value1\n\nKEY2=value2\n")
            .unwrap();
        assert_eq!(env.get("KEY1"), Some("value1"));
        assert_eq!(env.get("KEY2"), Some("value2"));
    }

    #[test]
    fn strips_matching_quotes() {
        let mut env = EnvManager::empty();
        env.load_from_str("QUOTED=\"value with spaces\"\nSINGLE='one'\nPLAIN=x\n")
            .unwrap();
        assert_eq!(env.get("QUOTED"), Some("value with spaces"));
        assert_eq!(env.get("SINGLE"), Some("one"));
        assert_eq!(env.get("PLAIN"), Some("x"));
    }

    #[test]
    fn rejects_lines_without_equals() {
        let mut env = EnvManager::empty();
        assert!(env.load_from_str("NOT A PAIR").is_err());
    }
}
