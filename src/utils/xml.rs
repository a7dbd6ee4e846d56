//! Shared quick-xml plumbing for the markup passes.

use quick_xml::{Reader, Writer, events::BytesStart};
use std::borrow::Cow;
use std::io::Cursor;

pub type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Reader configured for html exports: no text trimming, no well-formedness
/// checks (void elements never close, end names are not matched).
#[inline]
pub fn create_xml_reader(content: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().enable_all_checks(false);
    reader
}

#[inline]
pub fn create_xml_writer(capacity: usize) -> XmlWriter {
    Writer::new(Cursor::new(Vec::with_capacity(capacity)))
}

/// Lowercased element name.
#[inline]
pub fn tag_name(elem: &BytesStart<'_>) -> Vec<u8> {
    elem.name().as_ref().to_ascii_lowercase()
}

/// Rebuild an element keeping only the attributes `filter` returns a value for.
///
/// Attribute keys are passed lowercased; values stay in their raw (escaped)
/// form, and attribute order is preserved.
pub fn filter_elem<F>(elem: &BytesStart<'_>, mut filter: F) -> BytesStart<'static>
where
    F: FnMut(&[u8], Cow<'_, [u8]>) -> Option<Cow<'static, [u8]>>,
{
    let tag = String::from_utf8_lossy(&tag_name(elem)).into_owned();
    let attrs: Vec<_> = elem
        .html_attributes()
        .flatten()
        .filter_map(|attr| {
            let key = attr.key.as_ref().to_ascii_lowercase();
            let value = filter(&key, attr.value)?;
            Some((key, value))
        })
        .collect();

    let mut new_elem = BytesStart::new(tag);
    for (k, v) in attrs {
        new_elem.push_attribute((k.as_slice(), v.as_ref()));
    }
    new_elem
}
