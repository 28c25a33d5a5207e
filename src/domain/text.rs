//! Checks that values can be stored as XML 1.0 text and names.
//!
//! Rust strings are always valid UTF-8, but XML forbids most control
//! characters and the noncharacters U+FFFE/U+FFFF. Tags and attribute keys
//! must also be names that a namespace-aware parser reads back unchanged.
//! Values entering the store are checked here so nothing fails later when the
//! file is parsed again.

use std::ffi::OsStr;

use crate::domain::error::{DomainError, DomainResult};

/// `Char` production of XML 1.0.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Fails with [`DomainError::Encoding`] naming the first offending character.
pub fn ensure_xml_text(field: &str, value: &str) -> DomainResult<()> {
    match value.char_indices().find(|(_, c)| !is_xml_char(*c)) {
        Some((pos, c)) => Err(DomainError::Encoding {
            field: field.to_string(),
            reason: format!("character U+{:04X} at byte {}", c as u32, pos),
        }),
        None => Ok(()),
    }
}

/// `NameStartChar` of XML 1.0 without the colon (namespaces use it).
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Fails with [`DomainError::Encoding`] unless `value` is a colon-free XML name.
///
/// `xmlns` is rejected as well: parsers treat it as a namespace declaration.
pub fn ensure_xml_name(field: &str, value: &str) -> DomainResult<()> {
    let err = |reason: String| DomainError::Encoding {
        field: field.to_string(),
        reason,
    };
    let mut chars = value.char_indices();
    match chars.next() {
        None => return Err(err("empty name".to_string())),
        Some((_, c)) if !is_name_start_char(c) => {
            return Err(err(format!("{:?} cannot start a name", c)));
        }
        Some(_) => {}
    }
    if let Some((pos, c)) = chars.find(|(_, c)| !is_name_char(*c)) {
        return Err(err(format!("{:?} not allowed in a name at byte {}", c, pos)));
    }
    if value == "xmlns" {
        return Err(err("reserved name \"xmlns\"".to_string()));
    }
    Ok(())
}

/// Convert an OS string (command line, environment) into checked text.
pub fn from_os_str(field: &str, value: &OsStr) -> DomainResult<String> {
    let value = value.to_str().ok_or_else(|| DomainError::Encoding {
        field: field.to_string(),
        reason: format!("not valid unicode: {}", value.to_string_lossy()),
    })?;
    ensure_xml_text(field, value)?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_is_accepted() {
        assert!(ensure_xml_text("name", "Testlöpning Åre").is_ok());
        assert!(ensure_xml_text("name", "line\r\nbreak\ttab").is_ok());
    }

    #[test]
    fn test_control_character_is_rejected() {
        let err = ensure_xml_text("Time", "17:23\u{1}").unwrap_err();
        assert_eq!(
            err,
            DomainError::Encoding {
                field: "Time".to_string(),
                reason: "character U+0001 at byte 5".to_string(),
            }
        );
    }

    #[test]
    fn test_noncharacter_is_rejected() {
        assert!(ensure_xml_text("text", "\u{FFFE}").is_err());
    }

    #[test]
    fn test_names_accept_xml_name_characters() {
        for name in ["SIstation", "Nr", "_x", "löpare", "a-b.c_1", "名前"] {
            assert!(ensure_xml_name("tag", name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_names_reject_non_name_characters() {
        for name in ["", "bad tag", "1st", "-x", "a=b", "a<b", "a&b", "a\"b", "ns:tag", "xmlns"] {
            assert!(
                matches!(ensure_xml_name("tag", name), Err(DomainError::Encoding { .. })),
                "{name:?}"
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_os_str_is_encoding_error() {
        use std::os::unix::ffi::OsStrExt;
        let raw = OsStr::from_bytes(&[0x39, 0x37, 0xfe]);
        assert!(matches!(
            from_os_str("station", raw),
            Err(DomainError::Encoding { .. })
        ));
    }
}
