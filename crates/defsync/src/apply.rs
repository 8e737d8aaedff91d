//! Output assembly for the CLI.
//!
//! The sentinels and transformations here are part of the tool's
//! observable contract: scripts grep for the headers, and `--skip-drop`
//! must keep destructive statements visible while commenting them out.

/// Header preceding applied DDLs.
pub const APPLY_HEADER: &str = "-- Apply --\n";
/// Header replacing [`APPLY_HEADER`] under `--dry-run`.
pub const DRY_RUN_HEADER: &str = "-- dry run --\n";
/// Printed when the diff is empty.
pub const NOTHING_MODIFIED: &str = "-- Nothing is modified --\n";
/// Printed when `--export` finds an empty database.
pub const NO_TABLE_EXISTS: &str = "-- No table exists --\n";

/// Formats the diff result for display: header, then one statement per
/// line terminated with `;`. Lines starting with `DROP` are commented
/// out under `--skip-drop`.
pub fn format_apply(ddls: &[String], dry_run: bool, skip_drop: bool) -> String {
    if ddls.is_empty() {
        return NOTHING_MODIFIED.to_string();
    }

    let mut out = String::from(if dry_run { DRY_RUN_HEADER } else { APPLY_HEADER });
    for ddl in ddls {
        let statement = format!("{ddl};");
        for line in statement.lines() {
            if skip_drop && line.starts_with("DROP") {
                out.push_str("-- Skipped: ");
            }
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// The statements that should actually run: everything, minus `DROP`
/// statements when `--skip-drop` is set.
pub fn executable_ddls(ddls: &[String], skip_drop: bool) -> Vec<String> {
    ddls.iter()
        .filter(|ddl| !(skip_drop && ddl.starts_with("DROP")))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn empty_diff_reports_nothing_modified() {
        assert_eq!(format_apply(&[], false, false), NOTHING_MODIFIED);
    }

    #[test]
    fn statements_are_terminated_and_headed() {
        let out = format_apply(&ddls(&["CREATE TABLE a (x int)"]), false, false);
        assert_eq!(out, "-- Apply --\nCREATE TABLE a (x int);\n");
    }

    #[test]
    fn dry_run_swaps_the_header() {
        let out = format_apply(&ddls(&["CREATE TABLE a (x int)"]), true, false);
        assert!(out.starts_with(DRY_RUN_HEADER));
    }

    #[test]
    fn skip_drop_comments_out_drop_lines() {
        let out = format_apply(
            &ddls(&["DROP TABLE `old`", "CREATE TABLE a (x int)"]),
            false,
            true,
        );
        assert_eq!(
            out,
            "-- Apply --\n-- Skipped: DROP TABLE `old`;\nCREATE TABLE a (x int);\n"
        );
    }

    #[test]
    fn skip_drop_filters_execution() {
        let list = ddls(&["DROP TABLE `old`", "CREATE TABLE a (x int)"]);
        assert_eq!(
            executable_ddls(&list, true),
            ddls(&["CREATE TABLE a (x int)"])
        );
        assert_eq!(executable_ddls(&list, false), list);
    }
}
