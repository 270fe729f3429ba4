//! Line splitting and header detection for delimited exports.

/// Minimum number of fields a header line must have.
const MIN_HEADER_FIELDS: usize = 3;

/// Minimum number of fields that must contain a header keyword.
const MIN_HEADER_MATCHES: usize = 2;

/// Splits a delimited line into raw fields.
///
/// A `"` toggles quoting; the separator is literal while inside quotes. The
/// quote characters themselves are dropped and fields are not trimmed.
pub fn split_line(line: &str, separator: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Picks tab when the line holds more tabs than commas, comma otherwise.
pub fn detect_separator(first_line: &str) -> char {
    let tabs = first_line.matches('\t').count();
    let commas = first_line.matches(',').count();
    if tabs > commas { '\t' } else { ',' }
}

/// Returns true when `fields` look like a header row.
///
/// Each field is lowercased and tested for containment of any keyword.
pub fn is_header_line(fields: &[String], keywords: &[&str]) -> bool {
    if fields.len() < MIN_HEADER_FIELDS {
        return false;
    }
    let matches = fields
        .iter()
        .filter(|field| {
            let field = field.trim().to_lowercase();
            keywords
                .iter()
                .any(|keyword| field.contains(&keyword.to_lowercase()))
        })
        .count();
    matches >= MIN_HEADER_MATCHES
}

/// Returns the trimmed field at `index`, or an empty string.
pub fn field(fields: &[String], index: usize) -> &str {
    fields.get(index).map_or("", |value| value.trim())
}
