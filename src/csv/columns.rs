use std::collections::HashSet;

/// Derive unique, non-empty column names from a raw header row.
///
/// Embedded BOM remnants and surrounding whitespace are stripped first. A
/// blank name becomes `col_<1-based-position>`. A name that collides with
/// any previously assigned name gets `_2`, `_3`, ... appended until it is
/// unique.
pub fn unique_column_names(header: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut base = raw.replace('\u{feff}', "").trim().to_string();
            if base.is_empty() {
                base = format!("col_{}", index + 1);
            }
            let mut name = base.clone();
            let mut counter = 2;
            while seen.contains(&name) {
                name = format!("{base}_{counter}");
                counter += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Normalize a single data cell: a missing cell becomes the empty string,
/// present cells get BOM remnants stripped and whitespace trimmed.
pub fn normalize_cell(value: Option<&String>) -> String {
    match value {
        Some(cell) => cell.replace('\u{feff}', "").trim().to_string(),
        None => String::new(),
    }
}
