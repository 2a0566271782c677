use super::book::BookTags;
use super::field::TagField;

/// One line per known field, in [`TagField`] order; unset fields are skipped.
pub fn render(tags: &BookTags) -> String {
    let mut out = String::new();
    for field in TagField::ALL {
        let line = match field {
            TagField::Cover => tags
                .cover()
                .map(|c| format!("<{} image, {} bytes>", c.format.label(), c.data.len())),
            _ => tags.get(field).map(|v| v.replace('\n', "\n    ")),
        };
        if let Some(value) = line {
            out.push_str(&format!("{:<12} ({}): {value}\n", field.name(), field.atom()));
        }
    }
    if out.is_empty() {
        out.push_str("(no tags)\n");
    }
    out
}
