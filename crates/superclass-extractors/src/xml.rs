//! Small helpers over quick-xml shared by the XML-based extractors.

use quick_xml::events::{BytesStart, BytesText};

use crate::error::ExtractError;

/// Unescaped text of a text event, falling back to the raw bytes when the
/// text contains entities XML does not predefine (common in XHTML).
pub(crate) fn text_of(t: &BytesText<'_>) -> String {
    match t.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// Value of the attribute whose local name is `name`, ignoring any prefix.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// Map a quick-xml parse failure to a malformed-document error.
pub(crate) fn parse_error(format: &'static str, err: quick_xml::Error) -> ExtractError {
    ExtractError::malformed(format, format!("XML parse error: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    #[test]
    fn test_attribute_ignores_prefix() {
        let mut reader = Reader::from_str(r#"<rootfile opf:full-path="OEBPS/content.opf" media-type="x"/>"#);
        match reader.read_event().unwrap() {
            Event::Empty(e) => {
                assert_eq!(attribute(&e, b"full-path").as_deref(), Some("OEBPS/content.opf"));
                assert_eq!(attribute(&e, b"missing"), None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_text_of_unknown_entity_falls_back() {
        let mut reader = Reader::from_str("<p>a&nbsp;b &amp; c</p>");
        let mut texts = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Text(t) => texts.push(text_of(&t)),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(texts.concat(), "a&nbsp;b &amp; c");
    }

    #[test]
    fn test_text_of_predefined_entities() {
        let mut reader = Reader::from_str("<p>fish &amp; chips</p>");
        let mut text = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Text(t) => text.push_str(&text_of(&t)),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(text, "fish & chips");
    }
}
