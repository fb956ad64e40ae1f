//! Ready-made edit instructions.
//!
//! Numbered from 1 so they line up with `lumina presets` output and
//! `lumina edit --preset <N>`.

/// Built-in edit instructions, in display order.
pub const PROMPT_PRESETS: &[&str] = &[
    "Change the background to a cyberpunk city at night",
    "Add cinematic stage lighting and fog",
    "Turn this into a watercolor painting",
    "Make it look like a vintage 1980s photo",
    "смени ми фона с по тъмен и сцена с остветление",
];

/// Returns preset `number` (1-based), or `None` if it does not exist.
pub fn preset(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|i| PROMPT_PRESETS.get(i))
        .copied()
}

/// Iterates over `(number, prompt)` pairs.
pub fn numbered() -> impl Iterator<Item = (usize, &'static str)> {
    PROMPT_PRESETS.iter().copied().enumerate().map(|(i, p)| (i + 1, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_is_one_based() {
        assert_eq!(preset(0), None);
        assert_eq!(
            preset(1),
            Some("Change the background to a cyberpunk city at night")
        );
        assert_eq!(preset(4), Some("Make it look like a vintage 1980s photo"));
        assert_eq!(preset(PROMPT_PRESETS.len() + 1), None);
    }

    #[test]
    fn test_numbered_matches_preset() {
        for (number, prompt) in numbered() {
            assert_eq!(preset(number), Some(prompt));
            assert!(!prompt.trim().is_empty());
        }
        assert_eq!(numbered().count(), PROMPT_PRESETS.len());
    }

    #[test]
    fn test_preset_feeds_session_prompt() {
        let mut session = crate::EditSession::new();
        session.select_image(crate::codec::encode(b"x", "image/png"));
        session.set_prompt(preset(3).unwrap());
        assert_eq!(session.state().prompt, "Turn this into a watercolor painting");
        assert!(session.can_generate());
    }
}
