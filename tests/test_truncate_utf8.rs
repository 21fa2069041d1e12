use ai_code_reviewer::truncate_utf8_safe;

#[test]
fn truncate_utf8_safe_preserves_char_boundaries_and_adds_ellipsis() {
    let s = "services/Ünïcödé_🌍🚀_loader.py";
    let t = truncate_utf8_safe(s, 12);
    assert_eq!(t.chars().count(), 12);
    assert!(t.ends_with('…'));
    assert!(!t.contains('\u{FFFD}'));
}

#[test]
fn truncate_utf8_safe_no_truncate_when_short() {
    let s = "Привет.py";
    assert_eq!(truncate_utf8_safe(s, 10), s);
}
