use std::collections::BTreeMap;

/// Case-insensitive map from a table's storage name (`spelleffect`) to the
/// name its definition uses (`SpellEffect`).
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    by_key: BTreeMap<String, String>,
}

impl DisplayNames {
    /// Lines are `internal;Friendly` or a bare `Friendly` name.
    pub fn parse(text: &str) -> Self {
        let mut names = DisplayNames::default();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match line.split_once(';') {
                Some((internal, friendly)) => names.insert(internal.trim(), friendly.trim()),
                None => names.insert(line, line),
            }
        }
        names
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = DisplayNames::default();
        for name in names {
            out.insert(name.as_ref(), name.as_ref());
        }
        out
    }

    pub fn insert(&mut self, internal: &str, friendly: &str) {
        self.by_key
            .insert(internal.to_ascii_lowercase(), friendly.to_string());
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn lookup(&self, internal: &str) -> Option<&str> {
        self.by_key
            .get(&internal.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `dbfilesclient/spelleffect.db2` -> `SpellEffect`.
    pub fn friendly_for_path(&self, path: &str) -> Option<&str> {
        let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
        self.lookup(stem)
    }
}
