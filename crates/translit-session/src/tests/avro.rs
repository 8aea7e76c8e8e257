//! End-to-end typing through the bundled Bengali Avro method.

use super::*;
use crate::types::KeyEvent;

#[test]
fn consonant_then_vowel_becomes_sign() {
    let registry = avro_registry();
    let mut session = session_with(&registry, "bn-avro");
    let mut buf = EditBuffer::new();

    // "k" has no consonant rule to join with, so the base mapping fires.
    type_text(&mut session, &mut buf, "k");
    assert_eq!(buf.text(), "ক");

    // "a" joins the consonant: the window "কa" rewrites to "কা", which
    // diverges at index 1, so only the trailing one-character range is
    // replaced with the vowel sign.
    let event = KeyEvent::char('a');
    let resp = session.handle_key(event, &buf);
    let edit = resp.edit.as_ref().unwrap();
    assert_eq!((edit.start, edit.end), (1, 1));
    assert_eq!(edit.text, "া");

    buf.apply_response(event, &resp);
    assert_eq!(buf.text(), "কা");
}

#[test]
fn word_corpus() {
    let registry = avro_registry();
    for (typed, expected) in [
        ("ami", "আমি"),
        ("kotha", "কথা"),
        ("bangla", "বাংলা"),
        ("korbo", "করব"),
        ("kk", "ক্ক"),
        ("123", "১২৩"),
    ] {
        let mut session = session_with(&registry, "bn-avro");
        let mut buf = EditBuffer::new();
        type_text(&mut session, &mut buf, typed);
        assert_eq!(buf.text(), expected, "typing {typed:?}");
    }
}

#[test]
fn inherent_vowel_is_swallowed() {
    let registry = avro_registry();
    let mut session = session_with(&registry, "bn-avro");
    let mut buf = EditBuffer::new();

    // "ko": the o marks the inherent vowel and produces no character.
    type_text(&mut session, &mut buf, "ko");
    assert_eq!(buf.text(), "ক");
    // It still counts as context: "o" blocks the vowel-sign rule, so a
    // following "o" maps through the [o`] context branch.
    type_text(&mut session, &mut buf, "o");
    assert_eq!(buf.text(), "কু");
}

#[test]
fn context_survives_only_raw_keystrokes() {
    let registry = avro_registry();
    let mut session = session_with(&registry, "bn-avro");
    let mut buf = EditBuffer::new();

    type_text(&mut session, &mut buf, "kotha");
    assert_eq!(session.context(), "otha");
    assert_eq!(buf.text(), "কথা");
}

#[test]
fn fresh_field_vowel_is_independent() {
    let registry = avro_registry();
    let mut session = session_with(&registry, "bn-avro");
    let mut buf = EditBuffer::new();

    // With no preceding consonant, "a" is the full vowel.
    type_text(&mut session, &mut buf, "a");
    assert_eq!(buf.text(), "আ");
}

#[test]
fn backspace_resets_avro_context() {
    let registry = avro_registry();
    let mut session = session_with(&registry, "bn-avro");
    let mut buf = EditBuffer::new();

    type_text(&mut session, &mut buf, "ko");
    assert_eq!(buf.text(), "ক");

    // Backspace wipes the context; the next "o" no longer sees the
    // inherent-vowel keystroke and maps to the independent vowel.
    let resp = session.handle_key(KeyEvent::Backspace, &buf);
    buf.apply_default(KeyEvent::Backspace);
    assert!(!resp.consumed);
    assert_eq!(buf.text(), "");

    type_text(&mut session, &mut buf, "o");
    assert_eq!(buf.text(), "অ");
}
