use crate::dbd::ColumnType;

const LOCALIZED_SUFFIX: &str = "_lang";

/// Emitted C++ member name for a DBD field name.
///
/// `Name_lang` loses its localization suffix when the column is a `locstring`;
/// every remaining `_` is dropped and the character after it upper-cased.
pub fn normalize_field_name(raw: &str, column_type: &ColumnType) -> String {
    let mut name = match column_type {
        ColumnType::LocString => raw.strip_suffix(LOCALIZED_SUFFIX).unwrap_or(raw),
        _ => raw,
    }
    .to_string();

    while let Some(idx) = name.find('_') {
        name.remove(idx);
        if let Some(next) = name[idx..].chars().next() {
            let upper: String = next.to_uppercase().collect();
            name.replace_range(idx..idx + next.len_utf8(), &upper);
        }
    }
    name
}

/// `SpellEffect` -> `SPELL_EFFECT`: a `_` goes between each lower-case letter
/// and the upper-case letter that follows it.
pub fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if prev_lower && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        prev_lower = c.is_lowercase();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_localized_suffix_then_camel_cases() {
        assert_eq!(
            normalize_field_name("dungeon_encounter_lang", &ColumnType::LocString),
            "dungeonEncounter"
        );
        assert_eq!(normalize_field_name("Name_lang", &ColumnType::LocString), "Name");
    }

    #[test]
    fn suffix_is_kept_for_non_localized_columns() {
        assert_eq!(normalize_field_name("spell_effect", &ColumnType::Int), "spellEffect");
        assert_eq!(normalize_field_name("Name_lang", &ColumnType::String), "NameLang");
    }

    #[test]
    fn consecutive_and_trailing_separators() {
        assert_eq!(normalize_field_name("a__b", &ColumnType::Int), "aB");
        assert_eq!(normalize_field_name("Flags_", &ColumnType::Int), "Flags");
        assert_eq!(normalize_field_name("ID", &ColumnType::Int), "ID");
    }

    #[test]
    fn screaming_snake_splits_on_case_boundaries() {
        assert_eq!(screaming_snake("SpellEffect"), "SPELL_EFFECT");
        assert_eq!(screaming_snake("UIMap"), "UIMAP");
        assert_eq!(screaming_snake("ChrClassUIDisplay"), "CHR_CLASS_UIDISPLAY");
        assert_eq!(screaming_snake("Achievement"), "ACHIEVEMENT");
    }
}
