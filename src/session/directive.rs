use crate::error::WarnCode;
use crate::session::warn;
use std::fs;
use std::path::Path;

/// Load the prime directive file, if present. The contents are injected
/// verbatim into the system instruction of every prompt. A missing file
/// means the feature is off; an unreadable one is reported and skipped.
pub fn load_directive(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(err) => {
            warn::emit(
                WarnCode::W005DirectiveUnreadable,
                "startup",
                "",
                &path.display().to_string(),
                &err.to_string(),
            );
            None
        }
    }
}

pub fn compose_system(persona: &str, directive: Option<&str>) -> String {
    let mut out = persona.trim().to_string();
    if let Some(directive) = directive {
        out.push_str("\n\n");
        out.push_str(directive);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{compose_system, load_directive};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_directive_is_none() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(load_directive(&tmp.path().join("PRIME_DIRECTIVE.md")), None);
    }

    #[test]
    fn blank_directive_is_none() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("PRIME_DIRECTIVE.md");
        fs::write(&path, "  \n\n").expect("write directive");
        assert_eq!(load_directive(&path), None);
    }

    #[test]
    fn directive_text_is_injected_verbatim() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("PRIME_DIRECTIVE.md");
        fs::write(&path, "Always answer in rhyme.\n").expect("write directive");

        let directive = load_directive(&path);
        assert_eq!(directive.as_deref(), Some("Always answer in rhyme."));

        let system = compose_system("You are a pirate.", directive.as_deref());
        assert_eq!(system, "You are a pirate.\n\nAlways answer in rhyme.");
    }

    #[test]
    fn compose_without_directive_is_just_persona() {
        assert_eq!(compose_system(" persona ", None), "persona");
    }
}
