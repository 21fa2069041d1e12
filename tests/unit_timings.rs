#[test]
fn unit_timings_summary_produces_output() {
    std::env::set_var("AST_TIMINGS", "1");
    ai_code_reviewer::analysis::timings::record("metrics/python", 10);
    ai_code_reviewer::analysis::timings::record("metrics/python", 12);
    ai_code_reviewer::analysis::timings::record("metrics/python", 8);
    let s = ai_code_reviewer::analysis::timings::summary();
    assert!(s.contains("=== TIMINGS (ms) ==="));
    assert!(s.contains("metrics/python"));
}

#[test]
fn parsing_records_a_sample_when_enabled() {
    std::env::set_var("AST_TIMINGS", "1");
    ai_code_reviewer::parse_python("def ready():\n    return True\n").unwrap();
    assert!(ai_code_reviewer::analysis::timings::summary().contains("parse/python"));
}
