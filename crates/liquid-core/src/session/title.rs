use crate::constants::{GLYPH_ERROR, GLYPH_LOADING, GLYPH_LOCKED, GLYPH_MUTED};

/// Page load lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    LoadedOk,
    LoadedError,
}

/// Builds a window title from the base text and the session's status.
///
/// Glyphs follow in a fixed order (locked, muted, then loading or error),
/// space-separated, with a single space after the base.
pub fn compose_title(base: &str, geometry_locked: bool, muted: bool, load: LoadState) -> String {
    let mut glyphs: Vec<&str> = Vec::with_capacity(3);

    if geometry_locked {
        glyphs.push(GLYPH_LOCKED);
    }
    if muted {
        glyphs.push(GLYPH_MUTED);
    }
    match load {
        LoadState::Loading => glyphs.push(GLYPH_LOADING),
        LoadState::LoadedError => glyphs.push(GLYPH_ERROR),
        LoadState::LoadedOk => {}
    }

    if glyphs.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, glyphs.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_glyphs() {
        assert_eq!(
            compose_title("Example Domain", false, false, LoadState::LoadedOk),
            "Example Domain"
        );
    }

    #[test]
    fn test_muted_glyph() {
        assert_eq!(
            compose_title("Example Domain", false, true, LoadState::LoadedOk),
            "Example Domain 🔇"
        );
    }

    #[test]
    fn test_glyph_order() {
        assert_eq!(
            compose_title("Mail", true, true, LoadState::Loading),
            format!("Mail {} {} {}", GLYPH_LOCKED, GLYPH_MUTED, GLYPH_LOADING)
        );
        assert_eq!(
            compose_title("Mail", true, false, LoadState::LoadedError),
            format!("Mail {} {}", GLYPH_LOCKED, GLYPH_ERROR)
        );
    }
}
