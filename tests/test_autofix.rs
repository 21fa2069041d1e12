use ai_code_reviewer::fix::{auto_fix_code, format_unified_diff};

const MESSY: &str = "def show(total, extra):\n    \"\"\"Show totals.\"\"\"\n    print('debug: entering show')\n    print('Total:'+str(total)  )   \n    total += extra   \n    print('Sum', total+extra)\n    return total\n";

#[test]
fn fixes_print_lines_and_drops_debug_output() {
    let fixed = auto_fix_code(MESSY);
    assert_eq!(
        fixed,
        "def show(total, extra):\n    \"\"\"Show totals.\"\"\"\n    print('Total:' + str(total))\n    total += extra\n    print('Sum', total + extra)\n    return total\n"
    );
}

#[test]
fn fixing_twice_changes_nothing() {
    let once = auto_fix_code(MESSY);
    assert_eq!(auto_fix_code(&once), once);
}

#[test]
fn code_without_prints_only_loses_trailing_whitespace() {
    let src = "value = a+b  \nresult = value\t\n";
    assert_eq!(auto_fix_code(src), "value = a+b\nresult = value\n");
}

#[test]
fn diff_shows_removed_and_rewritten_lines() {
    let fixed = auto_fix_code(MESSY);
    let diff = format_unified_diff("app/show.py", MESSY, &fixed);

    assert!(diff.starts_with("--- app/show.py\n+++ app/show.py (fixed)\n"), "{diff}");
    assert!(diff.contains("-    print('debug: entering show')\n"));
    assert!(diff.contains("+    print('Total:' + str(total))\n"));
    assert!(diff.contains("@@"));
}

#[test]
fn unchanged_file_has_empty_diff() {
    let src = "def clean():\n    \"\"\"Nothing to do.\"\"\"\n    return None\n";
    assert_eq!(format_unified_diff("clean.py", src, &auto_fix_code(src)), "");
}
