use std::collections::BTreeMap;

/// `FileDataID;path` pairs from a community listfile.
#[derive(Debug, Clone, Default)]
pub struct Listfile {
    entries: BTreeMap<u32, String>,
}

impl Listfile {
    /// Blank lines, lines without a `;`, and lines whose id is not a number are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut skipped = 0usize;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((id, path)) = line.split_once(';') else {
                skipped += 1;
                continue;
            };
            let Ok(id) = id.trim().parse::<u32>() else {
                skipped += 1;
                continue;
            };
            entries.insert(id, path.trim().to_string());
        }
        if skipped > 0 {
            log::debug!("listfile: skipped {skipped} malformed lines");
        }
        Listfile { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path_for(&self, file_data_id: u32) -> Option<&str> {
        self.entries.get(&file_data_id).map(String::as_str)
    }

    /// Exact path match; 0 when the path is unknown.
    pub fn file_data_id_for(&self, path: &str) -> u32 {
        self.entries
            .iter()
            .find(|(_, p)| p.as_str() == path)
            .map(|(id, _)| *id)
            .unwrap_or(0)
    }

    /// Every `.db2` entry, ordered by path ignoring case.
    pub fn db2_tables(&self) -> Vec<(u32, &str)> {
        let mut out: Vec<(u32, &str)> = self
            .entries
            .iter()
            .filter(|(_, p)| p.ends_with(".db2"))
            .map(|(id, p)| (*id, p.as_str()))
            .collect();
        out.sort_by_key(|(_, p)| p.to_ascii_lowercase());
        out
    }
}
